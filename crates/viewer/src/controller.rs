//! Composition root: turns user intents into validated state changes and
//! render requests, and owns the document lifecycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use folio_engine::{DrawSurface, RenderEngine};

use crate::coalesce::QuietWindow;
use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::hooks::{NoopHooks, ViewerHooks};
use crate::scheduler::{RenderOutcome, RenderScheduler};
use crate::session::DocumentSession;
use crate::state::ViewState;
use crate::thumbnails::ThumbnailCache;

/// Where the controller is in the document lifecycle.
///
/// `Error` is reached from a failed open or a failed first render; once
/// `Ready`, render failures are reported but the phase stays `Ready`, since
/// the document itself is still valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerPhase {
    NoDocument,
    Loading,
    Ready,
    Error,
}

type VisibilityProbe = Arc<dyn Fn(u16) -> bool + Send + Sync>;

/// Owns the view state, render scheduler, thumbnail cache, and document
/// session. All operations take `&self`; state lives behind locks that are
/// never held across an await, so intents arriving while a render is in
/// flight are accepted immediately.
pub struct ViewerController<E: RenderEngine, S: DrawSurface> {
    config: ViewerConfig,
    session: DocumentSession<E>,
    scheduler: RenderScheduler<S>,
    thumbnails: ThumbnailCache<S>,
    state: Mutex<ViewState>,
    phase: Mutex<ViewerPhase>,
    last_url: Mutex<Option<String>>,
    hooks: Box<dyn ViewerHooks + Send + Sync>,
    probe: Option<VisibilityProbe>,
    quiet: QuietWindow,
    scanning: AtomicBool,
}

impl<E, S> ViewerController<E, S>
where
    E: RenderEngine,
    S: DrawSurface + Default,
{
    /// Takes ownership of the engine and the primary drawing surface.
    pub fn new(engine: E, surface: S, config: ViewerConfig) -> Self {
        Self {
            session: DocumentSession::new(engine),
            scheduler: RenderScheduler::new(surface),
            thumbnails: ThumbnailCache::new(config.thumbnail_scale),
            state: Mutex::new(ViewState::new(config.initial_scale)),
            phase: Mutex::new(ViewerPhase::NoDocument),
            last_url: Mutex::new(None),
            hooks: Box::new(NoopHooks),
            probe: None,
            quiet: QuietWindow::new(config.scroll_quiet),
            scanning: AtomicBool::new(false),
            config,
        }
    }

    /// Installs lifecycle hooks.
    pub fn with_hooks(mut self, hooks: impl ViewerHooks + Send + Sync + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    /// Installs the host's thumbnail visibility test. Without one,
    /// visibility scans fall back to the window around the current page.
    pub fn with_visibility_probe(
        mut self,
        probe: impl Fn(u16) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.probe = Some(Arc::new(probe));
        self
    }

    pub fn state(&self) -> ViewState {
        *self.state.lock().unwrap()
    }

    pub fn phase(&self) -> ViewerPhase {
        *self.phase.lock().unwrap()
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// The scheduler, for reading the primary surface and applied render.
    pub fn scheduler(&self) -> &RenderScheduler<S> {
        &self.scheduler
    }

    /// The thumbnail cache, for reading statuses and surfaces.
    pub fn thumbnails(&self) -> &ThumbnailCache<S> {
        &self.thumbnails
    }

    /// Opens `url`, replacing any open document, and renders its first
    /// page. On success the phase is `Ready` and `on_load` fires after the
    /// first page's `on_page_change`; an open failure or a failure of this
    /// first render is terminal and moves the phase to `Error`.
    pub async fn open(&self, url: &str) -> Result<(), ViewerError> {
        self.set_phase(ViewerPhase::Loading);
        *self.last_url.lock().unwrap() = Some(url.to_owned());

        self.scheduler.invalidate();
        self.thumbnails.clear();
        {
            let mut state = self.state.lock().unwrap();
            state.current_page = 1;
            state.total_pages = 0;
        }

        let total_pages = match self.session.open(url).await {
            Ok(total_pages) => total_pages,
            Err(error) => {
                self.set_phase(ViewerPhase::Error);
                self.hooks.on_error(&error);
                return Err(error);
            }
        };

        self.state.lock().unwrap().total_pages = total_pages;
        self.thumbnails.initialize(total_pages);
        log::info!("document loaded: {total_pages} pages");

        match self.render_current().await {
            // Closed out from under us mid-open; leave the phase where the
            // close put it.
            Ok(RenderOutcome::Rejected) => Ok(()),
            Ok(_) => {
                self.hooks.on_load(total_pages);
                self.set_phase(ViewerPhase::Ready);
                Ok(())
            }
            Err(error) => {
                self.set_phase(ViewerPhase::Error);
                self.hooks.on_error(&error);
                Err(error)
            }
        }
    }

    /// Reopens the last URL passed to [`open`](Self::open). This is the
    /// `Error -> Loading` edge.
    pub async fn retry(&self) -> Result<(), ViewerError> {
        let url = self.last_url.lock().unwrap().clone();
        match url {
            Some(url) => self.open(&url).await,
            None => Err(ViewerError::NoDocument),
        }
    }

    /// Jumps to 1-based `page`. Out-of-range input is rejected outright:
    /// no state change, no render, and no error-hook dispatch, since this
    /// is caller input, not a document failure.
    pub async fn jump_to_page(&self, page: u16) -> Result<RenderOutcome, ViewerError> {
        {
            let mut state = self.state.lock().unwrap();
            if !state.page_in_range(page) {
                return Err(ViewerError::PageRange { page, total: state.total_pages });
            }
            state.current_page = page;
        }
        self.render_after_intent().await
    }

    /// Advances one page; a no-op at the last page.
    pub async fn next_page(&self) -> Result<RenderOutcome, ViewerError> {
        {
            let mut state = self.state.lock().unwrap();
            if state.current_page >= state.total_pages {
                return Ok(RenderOutcome::Rejected);
            }
            state.current_page += 1;
        }
        self.render_after_intent().await
    }

    /// Goes back one page; a no-op at the first page.
    pub async fn previous_page(&self) -> Result<RenderOutcome, ViewerError> {
        {
            let mut state = self.state.lock().unwrap();
            if state.current_page <= 1 {
                return Ok(RenderOutcome::Rejected);
            }
            state.current_page -= 1;
        }
        self.render_after_intent().await
    }

    /// Steps the zoom up. Re-renders even when already at the limit.
    pub async fn zoom_in(&self) -> Result<RenderOutcome, ViewerError> {
        self.state.lock().unwrap().zoom_in();
        self.render_after_intent().await
    }

    /// Steps the zoom down. Re-renders even when already at the limit.
    pub async fn zoom_out(&self) -> Result<RenderOutcome, ViewerError> {
        self.state.lock().unwrap().zoom_out();
        self.render_after_intent().await
    }

    /// Back to the configured initial scale.
    pub async fn reset_zoom(&self) -> Result<RenderOutcome, ViewerError> {
        let initial_scale = self.config.initial_scale;
        self.state.lock().unwrap().set_scale(initial_scale);
        self.render_after_intent().await
    }

    pub async fn rotate_left(&self) -> Result<RenderOutcome, ViewerError> {
        self.state.lock().unwrap().rotate_left();
        self.render_after_intent().await
    }

    pub async fn rotate_right(&self) -> Result<RenderOutcome, ViewerError> {
        self.state.lock().unwrap().rotate_right();
        self.render_after_intent().await
    }

    /// Flips the thumbnail panel. Becoming visible triggers a visibility
    /// scan. Returns the new visibility.
    pub async fn toggle_thumbnails(&self) -> bool {
        let visible = {
            let mut state = self.state.lock().unwrap();
            state.thumbnails_visible = !state.thumbnails_visible;
            state.thumbnails_visible
        };
        if visible {
            self.scan_visible().await;
        }
        visible
    }

    /// Entry point for host scroll events over the thumbnail panel. A
    /// burst of calls collapses into one visibility scan: every call pokes
    /// the quiet window, the first caller waits it out and scans, and the
    /// rest return immediately. A waiter whose future is dropped releases
    /// the claim.
    pub async fn thumbnails_scrolled(&self) {
        self.quiet.poke();
        if self.scanning.swap(true, Ordering::AcqRel) {
            return;
        }
        let claim = ScanClaim(&self.scanning);
        self.quiet.wait_quiet().await;
        drop(claim);
        self.scan_visible().await;
    }

    /// Tears down in a fixed order: condemn in-flight renders, drop the
    /// thumbnail entries, reset the view state, and release the engine
    /// handle last. Safe to call repeatedly.
    pub fn close(&self) {
        self.scheduler.invalidate();
        self.thumbnails.clear();
        self.state.lock().unwrap().reset(self.config.initial_scale);
        *self.last_url.lock().unwrap() = None;
        self.set_phase(ViewerPhase::NoDocument);
        self.session.close();
    }

    /// Renders the current view state. On commit: page-change hook, active
    /// thumbnail marker, and, with the panel visible, warming the window
    /// around the new page. No error-hook dispatch here; callers own the
    /// failure policy.
    async fn render_current(&self) -> Result<RenderOutcome, ViewerError> {
        let (page, params) = {
            let state = self.state.lock().unwrap();
            (state.current_page, state.viewport_params())
        };

        let outcome = self.scheduler.render(&self.session, page, params).await?;
        if outcome == RenderOutcome::Applied {
            self.hooks.on_page_change(page);
            self.thumbnails.set_active(page);
            let visible = self.state.lock().unwrap().thumbnails_visible;
            if visible {
                self.thumbnails
                    .ensure_range_rendered(&self.session, page, self.config.thumbnail_window_size)
                    .await;
            }
        }

        Ok(outcome)
    }

    /// Render for an accepted intent: transient failures go to the error
    /// hook and the phase stays `Ready`.
    async fn render_after_intent(&self) -> Result<RenderOutcome, ViewerError> {
        match self.render_current().await {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                self.hooks.on_error(&error);
                Err(error)
            }
        }
    }

    async fn scan_visible(&self) {
        match &self.probe {
            Some(probe) => {
                self.thumbnails.ensure_visible_rendered(&self.session, |page| probe(page)).await;
            }
            None => {
                let page = self.state.lock().unwrap().current_page;
                self.thumbnails
                    .ensure_range_rendered(&self.session, page, self.config.thumbnail_window_size)
                    .await;
            }
        }
    }

    fn set_phase(&self, phase: ViewerPhase) {
        let mut current = self.phase.lock().unwrap();
        if *current != phase {
            log::debug!("viewer phase: {:?} -> {:?}", *current, phase);
            *current = phase;
        }
    }
}

/// Exclusive claim on the scroll scan. Dropping it clears the flag, on the
/// normal path and when the waiting future is dropped mid-await.
struct ScanClaim<'a>(&'a AtomicBool);

impl Drop for ScanClaim<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
