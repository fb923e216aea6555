//! Fixed timestep simulation tick
//!
//! The round state machine: Ready -> Tracing -> Reveal -> Ready.

use glam::Vec2;

use super::gesture::{Ring, judge_fit};
use super::state::{GameEvent, GamePhase, GameState, shape_for_round};
use crate::consts::REVEAL_SECS;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Active pinch endpoints in screen pixels, if two contacts are down
    pub pinch: Option<(Vec2, Vec2)>,
    /// A press was released without ever becoming a pinch
    pub skip: bool,
    /// Reset counters and rounds, keeping the seed
    pub restart: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.restart {
        let seed = state.seed;
        *state = GameState::new(seed);
        log::info!("Session restarted (seed {})", seed);
        return;
    }

    state.time_ticks += 1;

    match state.phase {
        GamePhase::Ready => {
            if let Some((a, b)) = input.pinch {
                state.ring = Some(Ring::from_pinch(a, b));
                state.phase = GamePhase::Tracing;
                state.events.push(GameEvent::TraceStarted);
            } else if input.skip {
                advance_round(state);
                state.events.push(GameEvent::RoundSkipped);
            }
        }

        GamePhase::Tracing => match input.pinch {
            Some((a, b)) => {
                state.ring = Some(Ring::from_pinch(a, b));
            }
            None => {
                // Release: the frozen ring is judged exactly once
                let diameter = state.ring.map(|r| r.diameter).unwrap_or(0.0);
                let result = judge_fit(diameter, &state.shape);

                state.rounds_played += 1;
                if result.covered {
                    state.covered_count += 1;
                    state.streak += 1;
                    state.best_streak = state.best_streak.max(state.streak);
                    state.events.push(GameEvent::Covered {
                        margin: result.margin,
                    });
                } else {
                    state.streak = 0;
                    state.events.push(GameEvent::Missed {
                        shortfall: result.margin,
                    });
                }

                state.last_outcome = Some(result);
                state.reveal_timer = REVEAL_SECS;
                state.phase = GamePhase::Reveal;
            }
        },

        GamePhase::Reveal => {
            // Pinches are ignored here - the round is already judged
            state.reveal_timer -= dt;
            if state.reveal_timer <= 0.0 {
                advance_round(state);
            }
        }
    }
}

/// Move to the next round: next kind in the cycle, fresh dims
fn advance_round(state: &mut GameState) {
    state.round += 1;
    state.shape = shape_for_round(state.seed, state.round);
    state.ring = None;
    state.last_outcome = None;
    state.reveal_timer = 0.0;
    state.phase = GamePhase::Ready;
    log::debug!(
        "Round {}: {} {:.0}x{:.0} at {:.0} deg",
        state.round,
        state.shape.kind.as_str(),
        state.shape.width,
        state.shape.height,
        state.shape.rotation_deg
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::shape::ShapeKind;

    /// A pinch wide enough to cover any sampled shape (diameter 1400)
    fn wide_pinch() -> TickInput {
        TickInput {
            pinch: Some((Vec2::new(0.0, 0.0), Vec2::new(700.0, 0.0))),
            ..Default::default()
        }
    }

    /// A zero-diameter pinch that can never cover
    fn tiny_pinch() -> TickInput {
        TickInput {
            pinch: Some((Vec2::new(100.0, 100.0), Vec2::new(100.0, 100.0))),
            ..Default::default()
        }
    }

    fn run_reveal_out(state: &mut GameState) {
        let input = TickInput::default();
        while state.phase == GamePhase::Reveal {
            tick(state, &input, SIM_DT);
        }
    }

    #[test]
    fn test_pinch_starts_trace() {
        let mut state = GameState::new(12345);
        tick(&mut state, &wide_pinch(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Tracing);
        assert!(state.ring.is_some());
        assert_eq!(state.drain_events(), vec![GameEvent::TraceStarted]);
    }

    #[test]
    fn test_release_judges_cover() {
        let mut state = GameState::new(12345);
        tick(&mut state, &wide_pinch(), SIM_DT);
        tick(&mut state, &TickInput::default(), SIM_DT);

        assert_eq!(state.phase, GamePhase::Reveal);
        assert_eq!(state.streak, 1);
        assert_eq!(state.best_streak, 1);
        assert_eq!(state.rounds_played, 1);
        assert_eq!(state.covered_count, 1);
        let outcome = state.last_outcome.expect("judged");
        assert!(outcome.covered);
        assert!(matches!(
            state.events.last(),
            Some(GameEvent::Covered { .. })
        ));
        // Ring stays frozen for the reveal
        assert!(state.ring.is_some());
    }

    #[test]
    fn test_miss_resets_streak() {
        let mut state = GameState::new(12345);

        // Cover once
        tick(&mut state, &wide_pinch(), SIM_DT);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.streak, 1);
        run_reveal_out(&mut state);

        // Then miss
        tick(&mut state, &tiny_pinch(), SIM_DT);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.streak, 0);
        assert_eq!(state.best_streak, 1);
        assert_eq!(state.rounds_played, 2);
        assert_eq!(state.covered_count, 1);
        assert!(matches!(
            state.events.last(),
            Some(GameEvent::Missed { .. })
        ));
    }

    #[test]
    fn test_reveal_advances_to_next_round() {
        let mut state = GameState::new(12345);
        tick(&mut state, &wide_pinch(), SIM_DT);
        tick(&mut state, &TickInput::default(), SIM_DT);
        run_reveal_out(&mut state);

        assert_eq!(state.phase, GamePhase::Ready);
        assert_eq!(state.round, 1);
        assert_eq!(state.shape.kind, ShapeKind::Rect);
        assert!(state.ring.is_none());
        assert!(state.last_outcome.is_none());
    }

    #[test]
    fn test_pinch_during_reveal_is_ignored() {
        let mut state = GameState::new(12345);
        tick(&mut state, &wide_pinch(), SIM_DT);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Reveal);

        let frozen = state.ring;
        tick(&mut state, &wide_pinch(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Reveal);
        assert_eq!(state.ring, frozen);
        assert_eq!(state.rounds_played, 1);
    }

    #[test]
    fn test_skip_advances_without_judging() {
        let mut state = GameState::new(12345);
        let input = TickInput {
            skip: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);

        assert_eq!(state.round, 1);
        assert_eq!(state.phase, GamePhase::Ready);
        assert_eq!(state.rounds_played, 0);
        assert_eq!(state.streak, 0);
        assert!(state.events.contains(&GameEvent::RoundSkipped));
    }

    #[test]
    fn test_restart_keeps_seed() {
        let mut state = GameState::new(999);
        tick(&mut state, &wide_pinch(), SIM_DT);
        tick(&mut state, &TickInput::default(), SIM_DT);
        run_reveal_out(&mut state);
        assert!(state.round > 0);

        let input = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.seed, 999);
        assert_eq!(state.round, 0);
        assert_eq!(state.rounds_played, 0);
        assert_eq!(state.best_streak, 0);
        assert_eq!(state.shape, shape_for_round(999, 0));
    }

    #[test]
    fn test_determinism() {
        // Two states with the same seed fed identical inputs stay identical
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);

        let inputs = [
            wide_pinch(),
            wide_pinch(),
            TickInput::default(),
            TickInput::default(),
            tiny_pinch(),
            TickInput::default(),
            TickInput {
                skip: true,
                ..Default::default()
            },
        ];

        for input in &inputs {
            tick(&mut state1, input, SIM_DT);
            tick(&mut state2, input, SIM_DT);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.round, state2.round);
        assert_eq!(state1.phase, state2.phase);
        assert_eq!(state1.shape, state2.shape);
        assert_eq!(state1.streak, state2.streak);
    }
}
