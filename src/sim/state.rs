//! Game state and core simulation types

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::gesture::{FitResult, Ring};
use super::shape::{ShapeKind, TargetShape};

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Shape on display, waiting for a pinch
    Ready,
    /// Two contact points down, ring following the fingers
    Tracing,
    /// Verdict on screen, next round pending
    Reveal,
}

/// One-shot happenings for the host to map to audio and HUD
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// A pinch became an active trace
    TraceStarted,
    /// Released ring covered the shape, with pixels to spare
    Covered { margin: f32 },
    /// Released ring fell short by this many pixels
    Missed { shortfall: f32 },
    /// Round advanced without a trace
    RoundSkipped,
}

/// Complete game state (deterministic)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    /// Current round index (0-based)
    pub round: u32,
    /// Shape on display this round
    pub shape: TargetShape,
    /// Current phase
    pub phase: GamePhase,
    /// Ring being traced (or held frozen during Reveal)
    pub ring: Option<Ring>,
    /// Verdict of the last judged ring
    pub last_outcome: Option<FitResult>,
    /// Seconds of Reveal remaining
    pub reveal_timer: f32,
    /// Consecutive covers
    pub streak: u32,
    /// Best streak this session
    pub best_streak: u32,
    /// Rounds that were actually judged
    pub rounds_played: u32,
    /// Judged rounds that covered
    pub covered_count: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Pending events, drained by the host each frame
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new session with the given seed, round 0 on display
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            round: 0,
            shape: shape_for_round(seed, 0),
            phase: GamePhase::Ready,
            ring: None,
            last_outcome: None,
            reveal_timer: 0.0,
            streak: 0,
            best_streak: 0,
            rounds_played: 0,
            covered_count: 0,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    /// Take all pending events, leaving the queue empty
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

/// RNG for a single round, derived from the session seed
///
/// Hashing (seed, round) keeps every round reproducible without carrying
/// RNG state between rounds.
pub fn round_rng(seed: u64, round: u32) -> Pcg32 {
    let round_seed = (round as u64).wrapping_mul(2654435761).wrapping_add(seed);
    Pcg32::seed_from_u64(round_seed)
}

/// The shape shown on a given round of a session
pub fn shape_for_round(seed: u64, round: u32) -> TargetShape {
    let mut rng = round_rng(seed, round);
    TargetShape::sample(ShapeKind::for_round(round), &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_ready() {
        let state = GameState::new(12345);
        assert_eq!(state.phase, GamePhase::Ready);
        assert_eq!(state.round, 0);
        assert_eq!(state.shape.kind, ShapeKind::Disc);
        assert!(state.ring.is_none());
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_shape_for_round_is_stable() {
        let a = shape_for_round(777, 5);
        let b = shape_for_round(777, 5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_rounds_differ_within_session() {
        let a = shape_for_round(777, 3);
        let b = shape_for_round(777, 6);
        // Same kind (cycle length 3), different dims
        assert_eq!(a.kind, b.kind);
        assert!(a.width != b.width || a.height != b.height || a.rotation_deg != b.rotation_deg);
    }

    #[test]
    fn test_drain_events_empties_queue() {
        let mut state = GameState::new(1);
        state.events.push(GameEvent::TraceStarted);
        state.events.push(GameEvent::Covered { margin: 4.0 });
        let drained = state.drain_events();
        assert_eq!(drained.len(), 2);
        assert!(state.events.is_empty());
    }
}
