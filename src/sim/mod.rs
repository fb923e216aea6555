//! Deterministic round logic
//!
//! Everything that decides a round's outcome lives here and stays free of
//! platform code: fixed timestep, seeded RNG, no rendering or DOM access.
//! Given a seed and an input sequence, a session replays exactly.

pub mod gesture;
pub mod shape;
pub mod state;
pub mod tick;

pub use gesture::{FitResult, Ring, judge_fit};
pub use shape::{SHAPE_CYCLE, ShapeKind, TargetShape};
pub use state::{GameEvent, GamePhase, GameState, round_rng, shape_for_round};
pub use tick::{TickInput, tick};
