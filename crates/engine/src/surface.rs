//! Drawing surfaces the engine paints into.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// An addressable 2D raster target. The engine resizes, clears, and paints
/// through this interface; it never assumes a particular backing store.
pub trait DrawSurface {
    fn size(&self) -> SurfaceSize;

    /// Reallocates the target to `size`. Existing content is discarded.
    fn resize(&mut self, size: SurfaceSize);

    fn clear(&mut self, color: Rgba);

    /// Fills the rectangle at (`x`, `y`) with the given extent, clipped to
    /// the surface bounds.
    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba);
}

/// In-memory RGBA8 surface, row-major, four bytes per pixel.
#[derive(Debug, Clone, Default)]
pub struct PixelSurface {
    size: SurfaceSize,
    pixels: Vec<u8>,
}

impl PixelSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self { size, pixels: vec![0; size.pixel_count() * 4] }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let offset = (y as usize * self.size.width as usize + x as usize) * 4;
        let bytes = &self.pixels[offset..offset + 4];
        Some(Rgba::new(bytes[0], bytes[1], bytes[2], bytes[3]))
    }

    fn put_span(&mut self, y: u32, x0: u32, x1: u32, color: Rgba) {
        let row = y as usize * self.size.width as usize;
        for x in x0..x1 {
            let offset = (row + x as usize) * 4;
            self.pixels[offset] = color.r;
            self.pixels[offset + 1] = color.g;
            self.pixels[offset + 2] = color.b;
            self.pixels[offset + 3] = color.a;
        }
    }
}

impl DrawSurface for PixelSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
        self.pixels.clear();
        self.pixels.resize(size.pixel_count() * 4, 0);
    }

    fn clear(&mut self, color: Rgba) {
        let size = self.size;
        for y in 0..size.height {
            self.put_span(y, 0, size.width, color);
        }
    }

    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba) {
        let x1 = x.saturating_add(width).min(self.size.width);
        let y1 = y.saturating_add(height).min(self.size.height);
        if x >= x1 {
            return;
        }
        for row in y..y1 {
            self.put_span(row, x, x1, color);
        }
    }
}
