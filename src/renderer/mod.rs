//! WebGPU rendering module
//!
//! One fullscreen pass; everything on screen is a signed distance field.

pub mod sdf_pipeline;

pub use sdf_pipeline::SdfRenderState;
