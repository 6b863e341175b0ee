//! Document-rendering engine abstraction for folio.
//!
//! The viewer coordinates navigation, zoom, and thumbnails; everything that
//! understands a document format lives behind the traits here. An engine
//! opens a URL into a document handle, a document hands out page handles,
//! and a page computes its viewport and paints into a caller-provided
//! surface. Disposal is `Drop` on the document handle.

#![allow(async_fn_in_trait)]

pub mod error;
pub mod stub;
pub mod surface;
pub mod viewport;

pub use error::EngineError;
pub use stub::{PageGeometry, StubEngine};
pub use surface::{DrawSurface, PixelSurface, Rgba, SurfaceSize};
pub use viewport::{Viewport, ViewportParams};

/// Entry point into a document backend.
pub trait RenderEngine {
    type Document: DocumentHandle;

    /// Opens the document at `url`. Fails when the URL is empty or invalid,
    /// the source cannot be fetched, or the document is unsupported.
    async fn open(&self, url: &str) -> Result<Self::Document, EngineError>;
}

/// An open document. Dropping the handle releases engine-side resources.
pub trait DocumentHandle {
    type Page: PageHandle;

    fn page_count(&self) -> u16;

    /// Retrieves the handle for 1-based page `number`.
    async fn page(&self, number: u16) -> Result<Self::Page, EngineError>;
}

/// A single page of an open document.
pub trait PageHandle {
    /// Pixel dimensions required to present this page at the given scale
    /// and rotation.
    fn viewport(&self, params: ViewportParams) -> Viewport;

    /// Paints the page into `surface`, which the caller has already sized
    /// to `viewport` and cleared.
    async fn paint<S: DrawSurface>(
        &self,
        surface: &mut S,
        viewport: Viewport,
    ) -> Result<(), EngineError>;
}
