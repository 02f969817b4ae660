mod frame;
mod renderer;
mod transform;

pub use frame::{Canvas, Drawable, FrameBuffer, RenderTarget, Texture};
pub use renderer::Renderer;
pub use transform::{tile_to_world_px, world_to_screen_px, Viewport, TILE_SIZE_PX};
