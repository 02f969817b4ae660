use std::path::Path;

use image::{ImageError, Rgba, RgbaImage};

/// Owned RGBA8 image. Used for frame snapshots and screen artwork.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    image: RgbaImage,
}

impl Texture {
    pub fn blank(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba(color)),
        }
    }

    /// Wraps raw RGBA bytes. Returns `None` when the length does not match
    /// `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        RgbaImage::from_raw(width, height, rgba).map(|image| Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        (x < self.width() && y < self.height()).then(|| self.image.get_pixel(x, y).0)
    }

    pub fn as_rgba(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn save_png(&self, path: &Path) -> Result<(), ImageError> {
        self.image.save_with_format(path, image::ImageFormat::Png)
    }
}

/// Something that can paint itself onto a canvas.
pub trait Drawable {
    fn draw(&self, canvas: &mut Canvas<'_>);
}

/// Where screens draw their frame.
pub trait RenderTarget {
    fn size(&self) -> (u32, u32);
    fn draw(&mut self, drawable: &dyn Drawable);
    /// Copy of everything drawn so far.
    fn capture_snapshot(&self) -> Texture;
}

/// Clipped RGBA8 drawing surface over a borrowed pixel slice.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self, color: [u8; 4]) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        let offset = self.byte_offset(x, y)?;
        let mut out = [0; 4];
        out.copy_from_slice(&self.frame[offset..offset + 4]);
        Some(out)
    }

    pub fn put_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if let Some(offset) = self.byte_offset(x, y) {
            self.frame[offset..offset + 4].copy_from_slice(&color);
        }
    }

    /// Alpha-blends `color` over the existing pixel.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        let Some(offset) = self.byte_offset(x, y) else {
            return;
        };
        let alpha = u32::from(color[3]);
        if alpha == 255 {
            self.frame[offset..offset + 4].copy_from_slice(&color);
            return;
        }
        for channel in 0..3 {
            let dst = u32::from(self.frame[offset + channel]);
            let src = u32::from(color[channel]);
            self.frame[offset + channel] = ((src * alpha + dst * (255 - alpha)) / 255) as u8;
        }
        self.frame[offset + 3] = 255;
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: [u8; 4]) {
        for py in y..y.saturating_add(height as i32) {
            for px in x..x.saturating_add(width as i32) {
                self.blend_pixel(px, py, color);
            }
        }
    }

    pub fn outline_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: [u8; 4]) {
        if width == 0 || height == 0 {
            return;
        }
        let right = x + width as i32 - 1;
        let bottom = y + height as i32 - 1;
        for px in x..=right {
            self.put_pixel(px, y, color);
            self.put_pixel(px, bottom, color);
        }
        for py in y..=bottom {
            self.put_pixel(x, py, color);
            self.put_pixel(right, py, color);
        }
    }

    /// Copies `texture` with its top-left corner at (`x`, `y`), clipped to
    /// the canvas.
    pub fn blit(&mut self, texture: &Texture, x: i32, y: i32) {
        for ty in 0..texture.height() {
            for tx in 0..texture.width() {
                if let Some(color) = texture.pixel(tx, ty) {
                    self.blend_pixel(x + tx as i32, y + ty as i32, color);
                }
            }
        }
    }

    fn byte_offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let pixel = (y as usize).checked_mul(self.width as usize)?.checked_add(x as usize)?;
        let offset = pixel.checked_mul(4)?;
        (offset + 4 <= self.frame.len()).then_some(offset)
    }
}

/// Headless RGBA8 render target. The window loop presents it; tests read it
/// back directly.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        *self = Self::new(width, height);
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.pixels
    }

    pub fn canvas(&mut self) -> Canvas<'_> {
        Canvas::new(&mut self.pixels, self.width, self.height)
    }
}

impl RenderTarget for FrameBuffer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn draw(&mut self, drawable: &dyn Drawable) {
        drawable.draw(&mut self.canvas());
    }

    fn capture_snapshot(&self) -> Texture {
        Texture::from_rgba(self.width, self.height, self.pixels.clone())
            .unwrap_or_else(|| Texture::blank(self.width, self.height, [0, 0, 0, 255]))
    }
}
