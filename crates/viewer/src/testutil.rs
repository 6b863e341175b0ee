//! In-memory engine for tests: deterministic page fills, injectable open,
//! fetch, and paint failures, and per-page gates for staging races.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use folio_engine::{
    DocumentHandle, DrawSurface, EngineError, PageHandle, RenderEngine, Rgba, Viewport,
    ViewportParams,
};
use tokio::sync::Notify;

use crate::error::ViewerError;
use crate::hooks::ViewerHooks;

/// One solid fill per page, distinct across pages and from the white clear
/// and the failure fill.
pub(crate) fn page_color(page: u16) -> Rgba {
    let page = u32::from(page);
    Rgba::new(
        (page * 37 % 256) as u8,
        (page * 71 % 256) as u8,
        (page * 113 % 256) as u8,
        255,
    )
}

#[derive(Debug, Default)]
struct MockShared {
    pages: Vec<(f32, f32)>,
    fail_open: AtomicBool,
    fail_fetch: Mutex<HashSet<u16>>,
    fail_paint: Mutex<HashSet<u16>>,
    fetch_gates: Mutex<HashMap<u16, Arc<Notify>>>,
    paint_gates: Mutex<HashMap<u16, Arc<Notify>>>,
    paint_counts: Mutex<HashMap<u16, usize>>,
    drops: AtomicUsize,
}

/// Engine double. Clones share state, so a clone kept outside the viewer
/// works as a probe for counters set up before or after handing the engine
/// over.
#[derive(Clone)]
pub(crate) struct MockEngine {
    shared: Arc<MockShared>,
}

impl MockEngine {
    /// Every page is 100x150 points, so scale 1.5 gives a 150x225 viewport
    /// and the 0.3 thumbnail scale gives 30x45.
    pub(crate) fn new(page_count: u16) -> Self {
        Self {
            shared: Arc::new(MockShared {
                pages: vec![(100.0, 150.0); usize::from(page_count)],
                ..MockShared::default()
            }),
        }
    }

    /// Makes subsequent opens fail until [`allow_open`](Self::allow_open).
    pub(crate) fn fail_open(&self) {
        self.shared.fail_open.store(true, Ordering::Relaxed);
    }

    pub(crate) fn allow_open(&self) {
        self.shared.fail_open.store(false, Ordering::Relaxed);
    }

    /// Makes fetches of `page` fail.
    pub(crate) fn fail_fetch(&self, page: u16) {
        self.shared.fail_fetch.lock().unwrap().insert(page);
    }

    /// Makes paints of `page` fail. Counted like any other paint attempt.
    pub(crate) fn fail_paint(&self, page: u16) {
        self.shared.fail_paint.lock().unwrap().insert(page);
    }

    /// Blocks the next fetch of `page` until the returned gate is notified.
    pub(crate) fn gate_fetch(&self, page: u16) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.shared.fetch_gates.lock().unwrap().insert(page, Arc::clone(&gate));
        gate
    }

    /// Blocks the next paint of `page` until the returned gate is notified.
    /// The paint attempt is counted before the gate.
    pub(crate) fn gate_paint(&self, page: u16) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.shared.paint_gates.lock().unwrap().insert(page, Arc::clone(&gate));
        gate
    }

    /// How many document handles have been dropped.
    pub(crate) fn drops(&self) -> usize {
        self.shared.drops.load(Ordering::Relaxed)
    }

    pub(crate) fn paint_count(&self, page: u16) -> usize {
        self.shared.paint_counts.lock().unwrap().get(&page).copied().unwrap_or(0)
    }

    pub(crate) fn total_paints(&self) -> usize {
        self.shared.paint_counts.lock().unwrap().values().sum()
    }
}

impl RenderEngine for MockEngine {
    type Document = MockDocument;

    async fn open(&self, _url: &str) -> Result<MockDocument, EngineError> {
        if self.shared.fail_open.load(Ordering::Relaxed) {
            return Err(EngineError::Open("injected open failure".to_owned()));
        }
        Ok(MockDocument { shared: Arc::clone(&self.shared) })
    }
}

pub(crate) struct MockDocument {
    shared: Arc<MockShared>,
}

impl Drop for MockDocument {
    fn drop(&mut self) {
        self.shared.drops.fetch_add(1, Ordering::Relaxed);
    }
}

impl DocumentHandle for MockDocument {
    type Page = MockPage;

    fn page_count(&self) -> u16 {
        self.shared.pages.len() as u16
    }

    async fn page(&self, number: u16) -> Result<MockPage, EngineError> {
        let gate = self.shared.fetch_gates.lock().unwrap().get(&number).map(Arc::clone);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.shared.fail_fetch.lock().unwrap().contains(&number) {
            return Err(EngineError::PageLoad {
                page: number,
                reason: "injected fetch failure".to_owned(),
            });
        }
        let (width_pt, height_pt) = usize::from(number)
            .checked_sub(1)
            .and_then(|index| self.shared.pages.get(index))
            .copied()
            .ok_or(EngineError::PageOutOfRange {
                page: number,
                page_count: self.page_count(),
            })?;
        Ok(MockPage {
            shared: Arc::clone(&self.shared),
            number,
            width_pt,
            height_pt,
        })
    }
}

#[derive(Debug)]
pub(crate) struct MockPage {
    shared: Arc<MockShared>,
    number: u16,
    width_pt: f32,
    height_pt: f32,
}

impl PageHandle for MockPage {
    fn viewport(&self, params: ViewportParams) -> Viewport {
        Viewport::of(self.width_pt, self.height_pt, params)
    }

    async fn paint<S: DrawSurface>(
        &self,
        surface: &mut S,
        viewport: Viewport,
    ) -> Result<(), EngineError> {
        *self.shared.paint_counts.lock().unwrap().entry(self.number).or_insert(0) += 1;
        let gate = self.shared.paint_gates.lock().unwrap().get(&self.number).map(Arc::clone);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.shared.fail_paint.lock().unwrap().contains(&self.number) {
            return Err(EngineError::Paint {
                page: self.number,
                reason: "injected paint failure".to_owned(),
            });
        }
        surface.fill_rect(0, 0, viewport.width, viewport.height, page_color(self.number));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HookEvent {
    Load(u16),
    Error(&'static str),
    PageChange(u16),
}

fn error_kind(error: &ViewerError) -> &'static str {
    match error {
        ViewerError::Load { .. } => "load",
        ViewerError::PageRange { .. } => "page-range",
        ViewerError::NoDocument => "no-document",
        ViewerError::PageFetch { .. } => "page-fetch",
        ViewerError::Render { .. } => "render",
    }
}

/// Hooks that append every callback to a shared log.
#[derive(Default)]
pub(crate) struct RecordingHooks {
    events: Arc<Mutex<Vec<HookEvent>>>,
}

impl RecordingHooks {
    /// Handle onto the event log, for asserting after the hooks move into
    /// the controller.
    pub(crate) fn log(&self) -> Arc<Mutex<Vec<HookEvent>>> {
        Arc::clone(&self.events)
    }
}

impl ViewerHooks for RecordingHooks {
    fn on_load(&self, total_pages: u16) {
        self.events.lock().unwrap().push(HookEvent::Load(total_pages));
    }

    fn on_error(&self, error: &ViewerError) {
        self.events.lock().unwrap().push(HookEvent::Error(error_kind(error)));
    }

    fn on_page_change(&self, page: u16) {
        self.events.lock().unwrap().push(HookEvent::PageChange(page));
    }
}
