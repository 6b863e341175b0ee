//! Ownership of the open document handle.

use std::sync::{Arc, Mutex};

use folio_engine::{DocumentHandle, EngineError, RenderEngine};

use crate::error::ViewerError;

struct OpenSlot<D> {
    document: Arc<D>,
    total_pages: u16,
}

/// Wraps the engine and the at-most-one open document, and mediates every
/// call into the engine. Page handles are fetched through an `Arc` clone of
/// the document, so a render that is still in flight when the session moves
/// on keeps the handle alive until it finishes; the engine-side dispose runs
/// exactly once, when the last user drops it.
///
/// The slot mutex is never held across an await.
pub struct DocumentSession<E: RenderEngine> {
    engine: E,
    slot: Mutex<Option<OpenSlot<E::Document>>>,
}

impl<E: RenderEngine> DocumentSession<E> {
    pub fn new(engine: E) -> Self {
        Self { engine, slot: Mutex::new(None) }
    }

    /// Closes any previous document, then opens `url`. Returns the page
    /// count of the new document; a document with no pages is rejected as a
    /// load failure. On failure the previous document is already gone and
    /// the session is empty.
    pub async fn open(&self, url: &str) -> Result<u16, ViewerError> {
        self.close();

        if url.trim().is_empty() {
            return Err(ViewerError::Load { source: EngineError::EmptySource });
        }

        let document =
            self.engine.open(url).await.map_err(|source| ViewerError::Load { source })?;
        let total_pages = document.page_count();
        if total_pages == 0 {
            return Err(ViewerError::Load {
                source: EngineError::Open("document has no pages".to_owned()),
            });
        }

        log::debug!("document opened: {total_pages} pages");
        *self.slot.lock().unwrap() = Some(OpenSlot { document: Arc::new(document), total_pages });

        Ok(total_pages)
    }

    pub fn is_open(&self) -> bool {
        self.slot.lock().unwrap().is_some()
    }

    /// Page count of the open document, 0 when none is open.
    pub fn total_pages(&self) -> u16 {
        self.slot.lock().unwrap().as_ref().map_or(0, |slot| slot.total_pages)
    }

    /// Checks that `page` addresses the open document without fetching it.
    pub fn validate(&self, page: u16) -> Result<(), ViewerError> {
        let slot = self.slot.lock().unwrap();
        let Some(slot) = slot.as_ref() else {
            return Err(ViewerError::NoDocument);
        };
        if page < 1 || page > slot.total_pages {
            return Err(ViewerError::PageRange { page, total: slot.total_pages });
        }
        Ok(())
    }

    /// Fetches the handle for 1-based `page`. Range problems and engine
    /// fetch failures surface as distinct errors.
    pub async fn page(&self, page: u16) -> Result<<E::Document as DocumentHandle>::Page, ViewerError> {
        let document = {
            let slot = self.slot.lock().unwrap();
            let Some(slot) = slot.as_ref() else {
                return Err(ViewerError::NoDocument);
            };
            if page < 1 || page > slot.total_pages {
                return Err(ViewerError::PageRange { page, total: slot.total_pages });
            }
            Arc::clone(&slot.document)
        };

        document.page(page).await.map_err(|source| ViewerError::PageFetch { page, source })
    }

    /// Releases the document handle. Closing a closed or never-opened
    /// session is a no-op.
    pub fn close(&self) {
        if self.slot.lock().unwrap().take().is_some() {
            log::debug!("document session closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockEngine;

    #[tokio::test]
    async fn open_reports_page_count() {
        let session = DocumentSession::new(MockEngine::new(7));

        let total = session.open("mock://doc").await.expect("open should succeed");

        assert_eq!(total, 7);
        assert_eq!(session.total_pages(), 7);
        assert!(session.is_open());
    }

    #[tokio::test]
    async fn empty_url_fails_with_load_error() {
        let session = DocumentSession::new(MockEngine::new(3));

        let err = session.open("   ").await.expect_err("blank url should fail");

        assert!(matches!(err, ViewerError::Load { .. }));
        assert!(!session.is_open());
    }

    #[tokio::test]
    async fn engine_rejection_maps_to_load_error() {
        let engine = MockEngine::new(3);
        engine.fail_open();
        let session = DocumentSession::new(engine);

        let err = session.open("mock://doc").await.expect_err("open should fail");

        assert!(matches!(err, ViewerError::Load { .. }));
    }

    #[tokio::test]
    async fn pageless_document_is_rejected_as_load_failure() {
        let session = DocumentSession::new(MockEngine::new(0));

        let err = session.open("mock://doc").await.expect_err("pageless document should fail");

        assert!(matches!(err, ViewerError::Load { .. }));
        assert!(!session.is_open());
    }

    #[tokio::test]
    async fn page_out_of_range_is_rejected_not_clamped() {
        let session = DocumentSession::new(MockEngine::new(4));
        session.open("mock://doc").await.expect("open should succeed");

        let low = session.page(0).await.expect_err("page 0 should fail");
        let high = session.page(5).await.expect_err("page 5 should fail");

        assert!(matches!(low, ViewerError::PageRange { page: 0, total: 4 }));
        assert!(matches!(high, ViewerError::PageRange { page: 5, total: 4 }));
    }

    #[tokio::test]
    async fn fetch_failure_is_distinct_from_range_error() {
        let engine = MockEngine::new(4);
        engine.fail_fetch(2);
        let session = DocumentSession::new(engine);
        session.open("mock://doc").await.expect("open should succeed");

        let err = session.page(2).await.expect_err("fetch should fail");

        assert!(matches!(err, ViewerError::PageFetch { page: 2, .. }));
    }

    #[tokio::test]
    async fn page_without_document_is_no_document() {
        let session = DocumentSession::new(MockEngine::new(4));

        let err = session.page(1).await.expect_err("no document yet");

        assert!(matches!(err, ViewerError::NoDocument));
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let engine = MockEngine::new(2);
        let probe = engine.clone();
        let session = DocumentSession::new(engine);
        session.open("mock://doc").await.expect("open should succeed");

        session.close();
        session.close();

        assert!(!session.is_open());
        assert_eq!(probe.drops(), 1);
    }

    #[tokio::test]
    async fn reopen_disposes_previous_document_exactly_once() {
        let engine = MockEngine::new(2);
        let probe = engine.clone();
        let session = DocumentSession::new(engine);

        session.open("mock://first").await.expect("open should succeed");
        assert_eq!(probe.drops(), 0);

        session.open("mock://second").await.expect("reopen should succeed");

        assert_eq!(probe.drops(), 1);
        assert!(session.is_open());
    }
}
