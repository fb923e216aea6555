//! Best-streak leaderboard
//!
//! Persisted to LocalStorage, tracks the top 10 streaks.

use serde::{Deserialize, Serialize};

/// Maximum number of leaderboard entries to keep
pub const MAX_HIGH_SCORES: usize = 10;

#[cfg(target_arch = "wasm32")]
const STORAGE_KEY: &str = "encircle_streaks";

/// A single leaderboard entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakEntry {
    /// Consecutive covers achieved
    pub streak: u32,
    /// Rounds judged in that session
    pub rounds: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Streak leaderboard, sorted descending; ties rank below earlier equals
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<StreakEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a streak would make the board
    pub fn qualifies(&self, streak: u32) -> bool {
        streak > 0
            && (self.entries.len() < MAX_HIGH_SCORES
                || self.entries.last().is_some_and(|e| streak > e.streak))
    }

    /// Rank a streak would land at (1-indexed), if it qualifies
    pub fn potential_rank(&self, streak: u32) -> Option<usize> {
        self.qualifies(streak)
            .then(|| self.entries.partition_point(|e| e.streak >= streak) + 1)
    }

    /// Insert a streak at its rank, dropping whatever falls off the bottom.
    /// Returns the 1-indexed rank achieved, or None if it didn't qualify.
    pub fn add_streak(&mut self, streak: u32, rounds: u32, timestamp: f64) -> Option<usize> {
        let rank = self.potential_rank(streak)?;
        self.entries.insert(
            rank - 1,
            StreakEntry {
                streak,
                rounds,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest streak on the board (if any)
    pub fn top_streak(&self) -> Option<u32> {
        self.entries.first().map(|e| e.streak)
    }

    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let stored = storage()
            .and_then(|s| s.get_item(STORAGE_KEY).ok().flatten())
            .and_then(|json| serde_json::from_str::<HighScores>(&json).ok());
        match stored {
            Some(scores) => {
                log::info!("Loaded {} streak entries", scores.entries.len());
                scores
            }
            None => Self::new(),
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let Some(store) = storage() else { return };
        if let Ok(json) = serde_json::to_string(self) {
            let _ = store.set_item(STORAGE_KEY, &json);
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(target_arch = "wasm32")]
fn storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

/// Relative date string for the leaderboard list
#[cfg(target_arch = "wasm32")]
pub fn format_date(timestamp: f64) -> String {
    let minutes = (js_sys::Date::now() - timestamp) / 60_000.0;
    let hours = minutes / 60.0;
    let days = hours / 24.0;

    if days >= 7.0 {
        let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp));
        format!(
            "{}/{}/{}",
            date.get_month() + 1,
            date.get_date(),
            date.get_full_year() % 100
        )
    } else if days >= 2.0 {
        format!("{} days ago", days.floor() as u32)
    } else if days >= 1.0 {
        "Yesterday".to_string()
    } else if hours >= 2.0 {
        format!("{} hours ago", hours.floor() as u32)
    } else if hours >= 1.0 {
        "1 hour ago".to_string()
    } else if minutes >= 2.0 {
        format!("{} mins ago", minutes.floor() as u32)
    } else if minutes >= 1.0 {
        "1 min ago".to_string()
    } else {
        "Just now".to_string()
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn format_date(_timestamp: f64) -> String {
    "N/A".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_streak_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert!(scores.qualifies(1));
    }

    #[test]
    fn test_ranked_insertion() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_streak(3, 10, 0.0), Some(1));
        assert_eq!(scores.add_streak(7, 12, 1.0), Some(1));
        assert_eq!(scores.add_streak(5, 8, 2.0), Some(2));
        assert_eq!(scores.top_streak(), Some(7));
        let streaks: Vec<u32> = scores.entries.iter().map(|e| e.streak).collect();
        assert_eq!(streaks, vec![7, 5, 3]);
    }

    #[test]
    fn test_tie_ranks_below_existing_entry() {
        let mut scores = HighScores::new();
        scores.add_streak(5, 9, 0.0);
        assert_eq!(scores.add_streak(5, 11, 1.0), Some(2));
        assert_eq!(scores.entries[0].rounds, 9);
    }

    #[test]
    fn test_board_truncates_at_capacity() {
        let mut scores = HighScores::new();
        for i in 1..=12u32 {
            scores.add_streak(i, i, i as f64);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_streak(), Some(12));
        // 1 and 2 fell off the bottom
        assert!(scores.entries.iter().all(|e| e.streak >= 3));
        // A streak matching the lowest kept entry no longer qualifies
        assert!(!scores.qualifies(3));
        assert_eq!(scores.potential_rank(4), Some(10));
    }
}
