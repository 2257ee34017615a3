//! Core configuration

use embassy_time::Duration;

/// Default storage namespace shared by all core keys
pub const DEFAULT_NAMESPACE: &str = "led-wall";

/// Default time the activation overlay stays on screen
pub const DEFAULT_OVERLAY_DURATION: Duration = Duration::from_millis(800);

/// Default length of one cooperative wait slice during the overlay
pub const DEFAULT_OVERLAY_SLICE: Duration = Duration::from_millis(10);

/// Default quiet period before scheduler state is flushed to storage
pub const DEFAULT_PERSIST_DEBOUNCE: Duration = Duration::from_millis(2000);

/// Configuration for the plugin core
#[derive(Debug, Clone, Copy)]
pub struct CoreConfig {
    /// Storage namespace for every persisted key
    pub namespace: &'static str,
    /// How long the activated effect id is shown
    pub overlay_duration: Duration,
    /// Wait granularity while the id is shown
    pub overlay_slice: Duration,
    /// Debounce window for the scheduler's active flag
    pub persist_debounce: Duration,
}

impl CoreConfig {
    /// Number of yields needed to cover the overlay duration
    pub fn overlay_slices(&self) -> u64 {
        let slice = self.overlay_slice.as_micros().max(1);
        self.overlay_duration.as_micros().div_ceil(slice)
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE,
            overlay_duration: DEFAULT_OVERLAY_DURATION,
            overlay_slice: DEFAULT_OVERLAY_SLICE,
            persist_debounce: DEFAULT_PERSIST_DEBOUNCE,
        }
    }
}
