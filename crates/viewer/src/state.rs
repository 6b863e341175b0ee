//! View state: the single source of truth for what the main surface should
//! be showing.

use folio_engine::ViewportParams;

pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 3.0;
pub const ZOOM_STEP: f32 = 0.25;

/// Current presentation of the open document. Mutated only by the
/// controller in response to validated intents; updates are synchronous
/// even while a render for the previous value is still in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    /// 1-based. Stays within `[1, max(total_pages, 1)]` once a document is
    /// open. Reflects intent, not necessarily rendered output.
    pub current_page: u16,
    /// 0 until a document is open.
    pub total_pages: u16,
    /// Clamped to `[MIN_SCALE, MAX_SCALE]`.
    pub scale: f32,
    /// Degrees, a multiple of 90, normalized to `[0, 360)`.
    pub rotation: u16,
    pub thumbnails_visible: bool,
}

impl ViewState {
    pub fn new(initial_scale: f32) -> Self {
        Self {
            current_page: 1,
            total_pages: 0,
            scale: initial_scale.clamp(MIN_SCALE, MAX_SCALE),
            rotation: 0,
            thumbnails_visible: false,
        }
    }

    /// Back to the defaults used before any document was open.
    pub fn reset(&mut self, initial_scale: f32) {
        *self = Self::new(initial_scale);
    }

    pub fn page_in_range(&self, page: u16) -> bool {
        page >= 1 && page <= self.total_pages
    }

    /// Steps the scale up, saturating at [`MAX_SCALE`].
    pub fn zoom_in(&mut self) -> f32 {
        self.scale = (self.scale + ZOOM_STEP).min(MAX_SCALE);
        self.scale
    }

    /// Steps the scale down, saturating at [`MIN_SCALE`].
    pub fn zoom_out(&mut self) -> f32 {
        self.scale = (self.scale - ZOOM_STEP).max(MIN_SCALE);
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) -> f32 {
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        self.scale
    }

    pub fn rotate_right(&mut self) -> u16 {
        self.rotation = (self.rotation + 90) % 360;
        self.rotation
    }

    pub fn rotate_left(&mut self) -> u16 {
        self.rotation = (self.rotation + 270) % 360;
        self.rotation
    }

    pub fn viewport_params(&self) -> ViewportParams {
        ViewportParams::new(self.scale, self.rotation)
    }
}
