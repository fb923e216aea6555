//! Player preferences
//!
//! A small serde struct saved to LocalStorage; native builds keep the
//! defaults in memory.

use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
const STORAGE_KEY: &str = "encircle_settings";

/// Player-tunable preferences
///
/// `serde(default)` lets older stored blobs pick up new fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute when the window loses focus
    pub mute_on_blur: bool,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,
    /// Show a faint circle marking the shape's bounding span
    pub show_hint: bool,

    // === Accessibility ===
    /// Reduced motion (suppresses the verdict flash)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            mute_on_blur: true,

            show_fps: true,
            show_hint: false,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Whether the verdict flash should render (respects reduced_motion)
    pub fn effective_flash(&self) -> bool {
        !self.reduced_motion
    }

    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let Some(json) = storage().and_then(|s| s.get_item(STORAGE_KEY).ok().flatten()) else {
            log::info!("No stored settings, using defaults");
            return Self::default();
        };
        serde_json::from_str(&json).unwrap_or_else(|e| {
            log::warn!("Discarding unreadable settings: {}", e);
            Self::default()
        })
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
        Self::default()
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
