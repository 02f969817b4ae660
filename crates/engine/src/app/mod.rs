mod input;
mod keymap;
mod loop_runner;
mod metrics;
mod rendering;
mod screen;

pub use input::{InputAction, InputEvent, InputSnapshot};
pub use keymap::{key_code_from_name, KeyBindingError, KeyBindings};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{
    tile_to_world_px, world_to_screen_px, Canvas, Drawable, FrameBuffer, RenderTarget, Renderer,
    Texture, Viewport, TILE_SIZE_PX,
};
pub use screen::{
    Bootstrap, FrameOutcome, NextScreenSlot, Screen, ScreenError, ScreenKind, ScreenMachine,
    ScreenStatus, LOADING_INDICATOR_FRAMES,
};
