#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("document source is empty")]
    EmptySource,
    #[error("failed to open document: {0}")]
    Open(String),
    #[error("page {page} out of range (page_count={page_count})")]
    PageOutOfRange { page: u16, page_count: u16 },
    #[error("failed to load page {page}: {reason}")]
    PageLoad { page: u16, reason: String },
    #[error("failed to paint page {page}: {reason}")]
    Paint { page: u16, reason: String },
}
