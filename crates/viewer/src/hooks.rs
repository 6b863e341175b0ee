use crate::error::ViewerError;

/// Lifecycle notifications from the controller to its host. All methods
/// default to no-ops so hosts implement only what they present.
pub trait ViewerHooks {
    /// A document finished opening and its first page has rendered. Fires
    /// after that page's `on_page_change`.
    fn on_load(&self, _total_pages: u16) {}

    /// A load failed, or a render of the main view failed. Thumbnail
    /// failures never arrive here.
    fn on_error(&self, _error: &ViewerError) {}

    /// A render committed to the main surface.
    fn on_page_change(&self, _page: u16) {}
}

/// Host that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl ViewerHooks for NoopHooks {}
