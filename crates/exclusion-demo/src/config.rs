//! Application configuration for the demo.

use std::time::Duration;

/// Log filter used when `EXCLUSION_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info";
/// Frame rate stamped on buffers when none is given.
pub const DEFAULT_FPS: u32 = 25;

/// Runtime configuration for the exclusion demo.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `tracing_subscriber::EnvFilter` directive string.
    pub log_filter: String,
    /// Frames per second used for timestamps and caps.
    pub fps: u32,
}

impl AppConfig {
    /// Duration of one frame at the configured rate.
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_filter: std::env::var("EXCLUSION_LOG")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            fps: DEFAULT_FPS,
        }
    }
}
