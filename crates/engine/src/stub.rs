//! Built-in backend serving synthetic pages, so hosts can run the viewer
//! without a real document engine behind it.

use crate::error::EngineError;
use crate::surface::{DrawSurface, Rgba};
use crate::viewport::{Viewport, ViewportParams};
use crate::{DocumentHandle, PageHandle, RenderEngine};

const PAGE_BORDER: Rgba = Rgba::new(220, 220, 220, 255);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_pt: f32,
    pub height_pt: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self { width_pt: 612.0, height_pt: 792.0 }
    }
}

/// Backend that accepts any non-empty URL and serves the configured page
/// geometry. Paints a blank page with a border as placeholder content.
#[derive(Debug, Clone, Default)]
pub struct StubEngine {
    pages: Vec<PageGeometry>,
}

impl StubEngine {
    /// Engine serving `page_count` uniform US-letter pages.
    pub fn new(page_count: u16) -> Self {
        Self { pages: vec![PageGeometry::default(); usize::from(page_count)] }
    }

    pub fn with_pages(pages: Vec<PageGeometry>) -> Self {
        Self { pages }
    }
}

impl RenderEngine for StubEngine {
    type Document = StubDocument;

    async fn open(&self, url: &str) -> Result<StubDocument, EngineError> {
        if url.trim().is_empty() {
            return Err(EngineError::EmptySource);
        }
        if self.pages.is_empty() {
            return Err(EngineError::Open("no pages configured".to_owned()));
        }

        Ok(StubDocument { pages: self.pages.clone() })
    }
}

#[derive(Debug, Clone)]
pub struct StubDocument {
    pages: Vec<PageGeometry>,
}

impl DocumentHandle for StubDocument {
    type Page = StubPage;

    fn page_count(&self) -> u16 {
        self.pages.len() as u16
    }

    async fn page(&self, number: u16) -> Result<StubPage, EngineError> {
        let out_of_range =
            || EngineError::PageOutOfRange { page: number, page_count: self.page_count() };
        let index = usize::from(number.checked_sub(1).ok_or_else(out_of_range)?);
        let geometry = self.pages.get(index).copied().ok_or_else(out_of_range)?;

        Ok(StubPage { geometry })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StubPage {
    geometry: PageGeometry,
}

impl PageHandle for StubPage {
    fn viewport(&self, params: ViewportParams) -> Viewport {
        Viewport::of(self.geometry.width_pt, self.geometry.height_pt, params)
    }

    async fn paint<S: DrawSurface>(
        &self,
        surface: &mut S,
        viewport: Viewport,
    ) -> Result<(), EngineError> {
        let (width, height) = (viewport.width, viewport.height);
        surface.fill_rect(0, 0, width, height, Rgba::WHITE);

        if width >= 4 && height >= 4 {
            surface.fill_rect(0, 0, width, 1, PAGE_BORDER);
            surface.fill_rect(0, height - 1, width, 1, PAGE_BORDER);
            surface.fill_rect(0, 0, 1, height, PAGE_BORDER);
            surface.fill_rect(width - 1, 0, 1, height, PAGE_BORDER);
        }

        Ok(())
    }
}
