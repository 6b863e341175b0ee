//! Folio viewer core
//!
//! UI-toolkit-agnostic coordination for a paginated document viewer:
//! navigation, zoom and rotation state, a render scheduler that keeps
//! exactly the last-issued request on screen, a lazy thumbnail cache, and
//! debounced scroll handling. Document formats plug in through the
//! `folio-engine` traits; hosts drive a [`ViewerController`] and blit its
//! surfaces.

pub mod coalesce;
pub mod config;
pub mod controller;
pub mod error;
pub mod hooks;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod thumbnails;

#[cfg(test)]
pub(crate) mod testutil;

pub use coalesce::QuietWindow;
pub use config::ViewerConfig;
pub use controller::{ViewerController, ViewerPhase};
pub use error::ViewerError;
pub use hooks::{NoopHooks, ViewerHooks};
pub use scheduler::{AppliedRender, RenderOutcome, RenderScheduler};
pub use session::DocumentSession;
pub use state::{ViewState, MAX_SCALE, MIN_SCALE, ZOOM_STEP};
pub use thumbnails::{ThumbnailCache, ThumbnailStatus};
