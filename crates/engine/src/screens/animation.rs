use crate::app::{
    Canvas, Drawable, InputEvent, InputSnapshot, RenderTarget, Screen, ScreenKind, ScreenStatus,
    Texture,
};
use crate::world::Session;

const BACKGROUND_COLOR: [u8; 4] = [0, 0, 0, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WooshDirection {
    /// Overlay rises from the bottom edge until it covers the screen.
    Up,
    /// Overlay sinks from full cover out through the bottom edge.
    Down,
}

/// Fixed-length slide of an overlay texture over a still backdrop. Ignores
/// input and returns to the screen beneath when the last frame is drawn.
#[derive(Debug)]
pub struct AnimationScreen {
    backdrop: Texture,
    overlay: Texture,
    direction: WooshDirection,
    frame: u32,
    total_frames: u32,
}

impl AnimationScreen {
    pub fn woosh(
        backdrop: Texture,
        overlay: Texture,
        direction: WooshDirection,
        frames: u32,
    ) -> Self {
        Self {
            backdrop,
            overlay,
            direction,
            frame: 0,
            total_frames: frames.max(1),
        }
    }

    pub fn direction(&self) -> WooshDirection {
        self.direction
    }

    pub fn is_done(&self) -> bool {
        self.frame >= self.total_frames
    }

    /// Vertical offset of the overlay on a screen `height` pixels tall.
    fn overlay_offset(&self, height: u32) -> i32 {
        let height = i64::from(height);
        let frame = i64::from(self.frame.min(self.total_frames));
        let total = i64::from(self.total_frames);
        let offset = match self.direction {
            WooshDirection::Up => height * (total - frame) / total,
            WooshDirection::Down => height * frame / total,
        };
        offset as i32
    }
}

struct WooshFrame<'a> {
    screen: &'a AnimationScreen,
}

impl Drawable for WooshFrame<'_> {
    fn draw(&self, canvas: &mut Canvas<'_>) {
        canvas.clear(BACKGROUND_COLOR);
        canvas.blit(&self.screen.backdrop, 0, 0);
        let offset = self.screen.overlay_offset(canvas.height());
        canvas.blit(&self.screen.overlay, 0, offset);
    }
}

impl Screen for AnimationScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::Animation
    }

    fn handle_input(
        &mut self,
        _event: InputEvent,
        _input: &InputSnapshot,
        _session: &mut Session,
    ) -> ScreenStatus {
        ScreenStatus::Continue
    }

    fn update(&mut self, _session: &mut Session, target: &mut dyn RenderTarget) -> ScreenStatus {
        self.frame = self.frame.saturating_add(1);
        target.draw(&WooshFrame { screen: self });
        if self.is_done() {
            ScreenStatus::PreviousSilent
        } else {
            ScreenStatus::Continue
        }
    }
}
