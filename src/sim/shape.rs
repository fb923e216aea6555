//! Target shape geometry
//!
//! A round's target is one of three shape kinds with randomly sampled
//! extents and rotation. The judged quantity is the bounding span: the
//! diameter of the smallest circle that covers the shape.

use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::{EXTENT_MAX, EXTENT_MIN, LINE_THICKNESS, ROTATION_MAX};

/// Shape kinds, cycled in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Disc,
    Rect,
    Line,
}

/// Display order of the shape cycle
pub const SHAPE_CYCLE: [ShapeKind; 3] = [ShapeKind::Disc, ShapeKind::Rect, ShapeKind::Line];

impl ShapeKind {
    /// Kind shown on a given round (disc, rectangle, line, repeating)
    pub fn for_round(round: u32) -> Self {
        SHAPE_CYCLE[(round % SHAPE_CYCLE.len() as u32) as usize]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Disc => "disc",
            ShapeKind::Rect => "rectangle",
            ShapeKind::Line => "line",
        }
    }
}

/// The shape displayed for one round
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetShape {
    pub kind: ShapeKind,
    /// Horizontal extent before rotation (diameter for a disc)
    pub width: f32,
    /// Vertical extent before rotation
    pub height: f32,
    /// Display rotation in degrees (never changes the bounding span)
    pub rotation_deg: f32,
}

impl TargetShape {
    /// Sample a shape of the given kind from a round-local RNG
    ///
    /// Width, height and rotation are always drawn, matching the per-round
    /// resample; a disc mirrors its width and a line pins its thickness.
    pub fn sample(kind: ShapeKind, rng: &mut Pcg32) -> Self {
        let width = sample_extent(rng);
        let height = sample_extent(rng);
        let rotation_deg = sample_rotation(rng);

        let height = match kind {
            ShapeKind::Disc => width,
            ShapeKind::Rect => height,
            ShapeKind::Line => LINE_THICKNESS,
        };

        Self {
            kind,
            width,
            height,
            rotation_deg,
        }
    }

    /// Diameter of the smallest circle covering the shape
    pub fn bounding_span(&self) -> f32 {
        match self.kind {
            ShapeKind::Disc => self.width,
            ShapeKind::Rect => (self.width * self.width + self.height * self.height).sqrt(),
            ShapeKind::Line => (self.width * self.width + LINE_THICKNESS * LINE_THICKNESS).sqrt(),
        }
    }

    /// Half extents, as the renderer consumes them
    pub fn half_extents(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }
}

/// Whole-pixel extent, uniform over the open interval (EXTENT_MIN, EXTENT_MAX)
fn sample_extent(rng: &mut Pcg32) -> f32 {
    rng.random_range(EXTENT_MIN + 1..EXTENT_MAX) as f32
}

/// Whole-degree rotation, uniform over the open interval (0, ROTATION_MAX)
fn sample_rotation(rng: &mut Pcg32) -> f32 {
    rng.random_range(1..ROTATION_MAX) as f32
}
