//! Viewport math shared by engine backends.

use crate::surface::SurfaceSize;

/// Scale and rotation a page should be presented at. Rotation is in degrees
/// and must be a multiple of 90, normalized to `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportParams {
    pub scale: f32,
    pub rotation: u16,
}

impl ViewportParams {
    pub const fn new(scale: f32, rotation: u16) -> Self {
        Self { scale, rotation }
    }
}

/// Pixel dimensions needed to paint a page at a given scale and rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Computes the viewport for a page of `width_pt` x `height_pt` points.
    /// Rotations of 90 and 270 swap the axes; dimensions round to pixels and
    /// never drop below 1.
    pub fn of(width_pt: f32, height_pt: f32, params: ViewportParams) -> Self {
        let scale = if params.scale <= 0.0 { 1.0 } else { params.scale };
        let (width_pt, height_pt) = if params.rotation % 180 == 90 {
            (height_pt, width_pt)
        } else {
            (width_pt, height_pt)
        };

        Self {
            width: (width_pt * scale).round().max(1.0) as u32,
            height: (height_pt * scale).round().max(1.0) as u32,
        }
    }

    pub fn size(self) -> SurfaceSize {
        SurfaceSize::new(self.width, self.height)
    }
}
