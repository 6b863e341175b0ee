//! Supersede-on-request scheduling for the primary drawing surface.
//!
//! The scheduler never queues: issuing a render invalidates every earlier
//! in-flight one by taking the next generation number, and commit is gated
//! on that number still being current. "At most one render wins" is
//! enforced by the generation check plus the surface lock, not by aborting
//! engine work; a superseded render runs to completion and its result is
//! dropped.

use std::sync::atomic::{AtomicU64, Ordering};

use folio_engine::{DrawSurface, PageHandle, RenderEngine, Rgba, Viewport, ViewportParams};
use tokio::sync::Mutex;

use crate::error::ViewerError;
use crate::session::DocumentSession;

/// How a render request settled. Failures travel separately as
/// [`ViewerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Completed and became the visible output.
    Applied,
    /// A newer request took over before this one committed.
    Superseded,
    /// Validation failed (page out of range, or no open document). Nothing
    /// was painted and no earlier request was superseded.
    Rejected,
}

/// Description of the render the surface currently shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedRender {
    pub page: u16,
    pub scale: f32,
    pub rotation: u16,
    pub viewport: Viewport,
}

pub struct RenderScheduler<S: DrawSurface> {
    surface: Mutex<S>,
    generation: AtomicU64,
    applied: std::sync::Mutex<Option<AppliedRender>>,
}

impl<S: DrawSurface> RenderScheduler<S> {
    /// Takes exclusive ownership of the primary surface.
    pub fn new(surface: S) -> Self {
        Self {
            surface: Mutex::new(surface),
            generation: AtomicU64::new(0),
            applied: std::sync::Mutex::new(None),
        }
    }

    /// Renders `page` at the given scale and rotation onto the primary
    /// surface.
    ///
    /// The generation number is taken before the first suspension point, so
    /// supersession happens at request time: once this method has been
    /// entered, every earlier in-flight render is condemned even if it has
    /// not noticed yet. The generation is re-checked after the surface lock
    /// is acquired (a stale request leaves the surface untouched) and again
    /// after paint, before commit.
    pub async fn render<E: RenderEngine>(
        &self,
        session: &DocumentSession<E>,
        page: u16,
        params: ViewportParams,
    ) -> Result<RenderOutcome, ViewerError> {
        if session.validate(page).is_err() {
            return Ok(RenderOutcome::Rejected);
        }

        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        let handle = match session.page(page).await {
            Ok(handle) => handle,
            Err(error) => return self.settle_failure(generation, page, error),
        };
        let viewport = handle.viewport(params);

        let mut surface = self.surface.lock().await;
        if self.is_stale(generation) {
            log::debug!("render of page {page} superseded before paint");
            return Ok(RenderOutcome::Superseded);
        }

        surface.resize(viewport.size());
        surface.clear(Rgba::WHITE);

        if let Err(error) = handle.paint(&mut *surface, viewport).await {
            let error = ViewerError::Render { page, source: error };
            return self.settle_failure(generation, page, error);
        }

        if self.is_stale(generation) {
            log::debug!("render of page {page} superseded after paint");
            return Ok(RenderOutcome::Superseded);
        }

        *self.applied.lock().unwrap() =
            Some(AppliedRender { page, scale: params.scale, rotation: params.rotation, viewport });
        log::trace!("page {page} committed at generation {generation}");

        Ok(RenderOutcome::Applied)
    }

    /// Invalidates every in-flight render and forgets the applied record.
    /// In-flight renders resolve `Superseded`.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        *self.applied.lock().unwrap() = None;
    }

    /// The last committed render, if any.
    pub fn applied(&self) -> Option<AppliedRender> {
        *self.applied.lock().unwrap()
    }

    /// Runs `f` against the surface. Waits for an in-flight render to
    /// release it first.
    pub async fn with_surface<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let surface = self.surface.lock().await;
        f(&surface)
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) != generation
    }

    /// A failure on an already-superseded request is moot: the surface
    /// belongs to a newer request, so report `Superseded` instead.
    fn settle_failure(
        &self,
        generation: u64,
        page: u16,
        error: ViewerError,
    ) -> Result<RenderOutcome, ViewerError> {
        if self.is_stale(generation) {
            log::debug!("render of page {page} failed after supersession: {error}");
            return Ok(RenderOutcome::Superseded);
        }
        Err(error)
    }
}
