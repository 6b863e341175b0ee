//! Viewer configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunable knobs for a viewer instance. Hosts can persist this via serde.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Zoom scale applied when a document opens and after `reset_zoom`.
    pub initial_scale: f32,
    /// How many thumbnails to eagerly warm around the current page.
    pub thumbnail_window_size: u16,
    /// Fixed scale thumbnails are painted at, independent of the main view.
    pub thumbnail_scale: f32,
    /// Quiet period before a burst of thumbnail scroll events collapses
    /// into one visibility scan.
    pub scroll_quiet: Duration,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            initial_scale: 1.5,
            thumbnail_window_size: 5,
            thumbnail_scale: 0.3,
            scroll_quiet: Duration::from_millis(200),
        }
    }
}

impl ViewerConfig {
    /// Sets the scale used at open and by `reset_zoom`.
    pub fn with_initial_scale(mut self, scale: f32) -> Self {
        self.initial_scale = scale;
        self
    }

    /// Sets the eager thumbnail window size.
    pub fn with_thumbnail_window_size(mut self, size: u16) -> Self {
        self.thumbnail_window_size = size;
        self
    }

    /// Sets the fixed thumbnail scale.
    pub fn with_thumbnail_scale(mut self, scale: f32) -> Self {
        self.thumbnail_scale = scale;
        self
    }

    /// Sets the scroll coalescing quiet period.
    pub fn with_scroll_quiet(mut self, quiet: Duration) -> Self {
        self.scroll_quiet = quiet;
        self
    }
}
