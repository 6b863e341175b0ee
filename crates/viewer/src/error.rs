use folio_engine::EngineError;

/// Failure taxonomy for the viewer. Supersession of a render is not an
/// error and is reported through [`RenderOutcome`](crate::RenderOutcome)
/// instead.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// Bad URL, fetch failure, or an unsupported document. Terminal for the
    /// load attempt.
    #[error("failed to load document: {source}")]
    Load {
        #[source]
        source: EngineError,
    },
    /// Caller asked for a page outside `[1, total_pages]`. Never clamped.
    #[error("page {page} out of range (total_pages={total})")]
    PageRange { page: u16, total: u16 },
    #[error("no document is open")]
    NoDocument,
    /// The engine failed to retrieve a page of an otherwise healthy
    /// document. The session survives.
    #[error("failed to fetch page {page}: {source}")]
    PageFetch {
        page: u16,
        #[source]
        source: EngineError,
    },
    /// Paint failed mid-render. The session survives and view state is not
    /// rolled back.
    #[error("failed to render page {page}: {source}")]
    Render {
        page: u16,
        #[source]
        source: EngineError,
    },
}
