/// Pixel extent of a render target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

/// Output surface the raycaster writes a frame into.
///
/// Writes outside `bounds()` must be ignored, and so must every write made
/// before a backing surface exists.
pub trait RenderTarget {
    fn bounds(&self) -> Rect;

    fn set_pixel(&mut self, x: usize, y: usize, color: u32);

    /// Record the nearest wall distance for column `x`.
    fn set_depth(&mut self, x: usize, depth: f32);
}

/// Row-major `u32` color buffer with a per-column depth row.
#[derive(Clone, Debug, Default)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    // Empty while detached
    pixels: Vec<u32>,
    depth: Vec<f32>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let mut fb = Self::detached(width, height);
        fb.attach();
        fb
    }

    /// Target with known bounds but no storage yet.
    pub fn detached(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: Vec::new(),
            depth: Vec::new(),
        }
    }

    /// Allocate storage for the current bounds.
    pub fn attach(&mut self) {
        self.pixels = vec![0; self.width * self.height];
        self.depth = vec![f32::INFINITY; self.width];
    }

    #[inline]
    pub fn is_attached(&self) -> bool {
        !self.pixels.is_empty() || self.width * self.height == 0
    }

    /// Change bounds, reallocating only when attached.
    pub fn resize(&mut self, width: usize, height: usize) {
        let attached = !self.pixels.is_empty();
        self.width = width;
        self.height = height;
        if attached {
            self.attach();
        } else {
            self.pixels.clear();
            self.depth.clear();
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn depths(&self) -> &[f32] {
        &self.depth
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    #[inline]
    pub fn depth(&self, x: usize) -> Option<f32> {
        self.depth.get(x).copied()
    }

    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }
}

impl RenderTarget for Framebuffer {
    #[inline]
    fn bounds(&self) -> Rect {
        Rect::new(self.width, self.height)
    }

    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        if let Some(px) = self.pixels.get_mut(y * self.width + x) {
            *px = color;
        }
    }

    #[inline]
    fn set_depth(&mut self, x: usize, depth: f32) {
        if let Some(z) = self.depth.get_mut(x) {
            *z = depth;
        }
    }
}
