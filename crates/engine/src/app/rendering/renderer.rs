use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use super::{FrameBuffer, RenderTarget, Viewport};

/// Presents a [`FrameBuffer`] in the window through `pixels`.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub fn present(&mut self, frame: &FrameBuffer) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }
        copy_frame_into(
            self.pixels.frame_mut(),
            self.viewport,
            frame.as_rgba(),
            frame.size(),
        );
        self.pixels.render()
    }
}

/// Copies `src` row by row into `dst`, clipping to the smaller of the two
/// sizes. Uncovered destination pixels are left untouched.
fn copy_frame_into(dst: &mut [u8], dst_viewport: Viewport, src: &[u8], src_size: (u32, u32)) {
    let copy_width = dst_viewport.width.min(src_size.0) as usize * 4;
    let rows = dst_viewport.height.min(src_size.1) as usize;
    let dst_stride = dst_viewport.width as usize * 4;
    let src_stride = src_size.0 as usize * 4;
    for row in 0..rows {
        let dst_start = row * dst_stride;
        let src_start = row * src_stride;
        let (Some(dst_row), Some(src_row)) = (
            dst.get_mut(dst_start..dst_start + copy_width),
            src.get(src_start..src_start + copy_width),
        ) else {
            return;
        };
        dst_row.copy_from_slice(src_row);
    }
}
