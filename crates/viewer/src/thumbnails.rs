//! Lazy thumbnail materialization.
//!
//! One small surface per page, painted at a fixed scale on first demand.
//! Failures are contained here: a broken thumbnail gets an error fill and a
//! `Failed` status, and is left alone until a caller explicitly resets it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use folio_engine::{DrawSurface, PageHandle, RenderEngine, Rgba, SurfaceSize, ViewportParams};
use futures::future::join_all;

use crate::error::ViewerError;
use crate::session::DocumentSession;

pub(crate) const ERROR_FILL: Rgba = Rgba::new(255, 204, 204, 255);

/// Fallback extent when a thumbnail fails before its viewport is known.
const FAILED_SIZE: SurfaceSize = SurfaceSize::new(60, 80);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailStatus {
    Unrendered,
    /// A render is in flight; further demands for this page are dropped.
    Pending,
    Rendered,
    Failed,
}

struct Slot<S> {
    status: ThumbnailStatus,
    surface: Arc<tokio::sync::Mutex<S>>,
}

/// Per-page preview surfaces, materialized at most once per document.
///
/// Distinct pages may render concurrently (each owns its surface); duplicate
/// renders of the same page are excluded by the `Pending` status. The epoch
/// counter ties in-flight work to the entries it started against, so a
/// rebuild for a new document ignores stragglers from the old one.
pub struct ThumbnailCache<S: DrawSurface> {
    scale: f32,
    epoch: AtomicU64,
    slots: Mutex<Vec<Slot<S>>>,
    active: Mutex<Option<u16>>,
}

impl<S: DrawSurface> ThumbnailCache<S> {
    /// `scale` is the fixed paint scale, independent of the main view.
    pub fn new(scale: f32) -> Self {
        Self {
            scale,
            epoch: AtomicU64::new(0),
            slots: Mutex::new(Vec::new()),
            active: Mutex::new(None),
        }
    }

    /// Discards all entries and creates `total_pages` unrendered ones.
    /// In-flight renders from before the call can no longer mark entries.
    pub fn initialize(&self, total_pages: u16)
    where
        S: Default,
    {
        let mut slots = self.slots.lock().unwrap();
        self.epoch.fetch_add(1, Ordering::AcqRel);
        *slots = (0..total_pages)
            .map(|_| Slot {
                status: ThumbnailStatus::Unrendered,
                surface: Arc::new(tokio::sync::Mutex::new(S::default())),
            })
            .collect();
        *self.active.lock().unwrap() = None;
        log::debug!("thumbnail cache initialized for {total_pages} pages");
    }

    /// Drops every entry. Used at teardown.
    pub fn clear(&self)
    where
        S: Default,
    {
        self.initialize(0);
    }

    pub fn total(&self) -> u16 {
        self.slots.lock().unwrap().len() as u16
    }

    pub fn status(&self, page: u16) -> Option<ThumbnailStatus> {
        let slots = self.slots.lock().unwrap();
        page.checked_sub(1).and_then(|index| slots.get(usize::from(index))).map(|slot| slot.status)
    }

    pub fn statuses(&self) -> Vec<ThumbnailStatus> {
        self.slots.lock().unwrap().iter().map(|slot| slot.status).collect()
    }

    /// Moves the presentation-only highlight. Out-of-range pages are
    /// ignored.
    pub fn set_active(&self, page: u16) {
        if page >= 1 && page <= self.total() {
            *self.active.lock().unwrap() = Some(page);
        }
    }

    pub fn active(&self) -> Option<u16> {
        *self.active.lock().unwrap()
    }

    /// Puts a `Failed` entry back to `Unrendered` so the next demand check
    /// retries it. Returns whether anything changed.
    pub fn reset_failed(&self, page: u16) -> bool {
        let mut slots = self.slots.lock().unwrap();
        let Some(slot) = page.checked_sub(1).and_then(|index| slots.get_mut(usize::from(index)))
        else {
            return false;
        };
        if slot.status != ThumbnailStatus::Failed {
            return false;
        }
        slot.status = ThumbnailStatus::Unrendered;
        true
    }

    /// Renders the thumbnail for `page` if it has never been tried.
    /// Rendered, pending, failed, and out-of-range pages are no-ops.
    /// Never propagates a failure. A demand dropped mid-render settles its
    /// entry back to `Unrendered`.
    pub async fn ensure_rendered<E: RenderEngine>(
        &self,
        session: &DocumentSession<E>,
        page: u16,
    ) {
        let (epoch, surface) = {
            let mut slots = self.slots.lock().unwrap();
            let Some(slot) =
                page.checked_sub(1).and_then(|index| slots.get_mut(usize::from(index)))
            else {
                return;
            };
            if slot.status != ThumbnailStatus::Unrendered {
                return;
            }
            slot.status = ThumbnailStatus::Pending;
            (self.epoch.load(Ordering::Acquire), Arc::clone(&slot.surface))
        };

        // Settles the slot on every exit, including a drop at an await.
        let mut claim = SlotClaim { cache: self, epoch, page, status: ThumbnailStatus::Unrendered };

        match self.paint_thumbnail(session, page, &surface).await {
            Ok(()) => claim.status = ThumbnailStatus::Rendered,
            Err(error) => {
                log::warn!("thumbnail for page {page} failed: {error}");
                let mut target = surface.lock().await;
                if target.size().pixel_count() == 0 {
                    target.resize(FAILED_SIZE);
                }
                target.clear(ERROR_FILL);
                claim.status = ThumbnailStatus::Failed;
            }
        }
    }

    /// Warms a window of `count` pages centered on `center`, clamped to the
    /// document. The window renders concurrently.
    pub async fn ensure_range_rendered<E: RenderEngine>(
        &self,
        session: &DocumentSession<E>,
        center: u16,
        count: u16,
    ) {
        let total = self.total();
        if total == 0 || count == 0 {
            return;
        }
        let start = center.saturating_sub(count / 2).max(1);
        let end = start.saturating_add(count - 1).min(total);

        join_all((start..=end).map(|page| self.ensure_rendered(session, page))).await;
    }

    /// Renders every page the visibility test accepts. This is the lazy
    /// path for a scrollable panel: the host reports what is on screen.
    pub async fn ensure_visible_rendered<E, F>(&self, session: &DocumentSession<E>, visible: F)
    where
        E: RenderEngine,
        F: Fn(u16) -> bool,
    {
        let total = self.total();
        let pages: Vec<u16> = (1..=total).filter(|page| visible(*page)).collect();

        join_all(pages.into_iter().map(|page| self.ensure_rendered(session, page))).await;
    }

    /// Runs `f` against the surface for `page`, or returns `None` when the
    /// page has no entry.
    pub async fn with_surface<R>(&self, page: u16, f: impl FnOnce(&S) -> R) -> Option<R> {
        let surface = {
            let slots = self.slots.lock().unwrap();
            let slot = page.checked_sub(1).and_then(|index| slots.get(usize::from(index)))?;
            Arc::clone(&slot.surface)
        };
        let surface = surface.lock().await;
        Some(f(&surface))
    }

    async fn paint_thumbnail<E: RenderEngine>(
        &self,
        session: &DocumentSession<E>,
        page: u16,
        surface: &tokio::sync::Mutex<S>,
    ) -> Result<(), ViewerError> {
        let handle = session.page(page).await?;
        let viewport = handle.viewport(ViewportParams::new(self.scale, 0));

        let mut target = surface.lock().await;
        target.resize(viewport.size());
        target.clear(Rgba::WHITE);
        handle
            .paint(&mut *target, viewport)
            .await
            .map_err(|source| ViewerError::Render { page, source })
    }

    fn finish(&self, epoch: u64, page: u16, status: ThumbnailStatus) {
        let mut slots = self.slots.lock().unwrap();
        if self.epoch.load(Ordering::Acquire) != epoch {
            return;
        }
        if let Some(slot) = page.checked_sub(1).and_then(|index| slots.get_mut(usize::from(index)))
        {
            slot.status = status;
        }
    }
}

/// A claimed `Pending` slot. Dropping the claim writes `status` back through
/// the epoch check, so a claim abandoned before a render resolves restores
/// `Unrendered` rather than leaving the slot stuck at `Pending`.
struct SlotClaim<'a, S: DrawSurface> {
    cache: &'a ThumbnailCache<S>,
    epoch: u64,
    page: u16,
    status: ThumbnailStatus,
}

impl<S: DrawSurface> Drop for SlotClaim<'_, S> {
    fn drop(&mut self) {
        self.cache.finish(self.epoch, self.page, self.status);
    }
}
