use tracing::info;

use crate::app::{
    Canvas, Drawable, InputAction, InputEvent, InputSnapshot, RenderTarget, Screen, ScreenKind,
    ScreenStatus, Texture,
};
use crate::world::Session;

const SHADE_COLOR: [u8; 4] = [0, 0, 0, 120];
const PANEL_COLOR: [u8; 4] = [28, 32, 58, 235];
const PANEL_BORDER_COLOR: [u8; 4] = [235, 235, 235, 255];
const ITEM_COLOR: [u8; 4] = [200, 200, 210, 255];
const CURSOR_COLOR: [u8; 4] = [255, 210, 60, 255];
const GLYPH_WIDTH_PX: i32 = 6;
const GLYPH_HEIGHT_PX: i32 = 10;
const ROW_HEIGHT_PX: i32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Resume,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 2] = [MenuItem::Resume, MenuItem::Quit];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Resume => "Resume",
            MenuItem::Quit => "Quit",
        }
    }
}

/// Pause menu opened from the overworld.
#[derive(Debug, Default)]
pub struct MenuScreen {
    cursor: usize,
}

impl MenuScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> MenuItem {
        MenuItem::ALL[self.cursor % MenuItem::ALL.len()]
    }

    fn move_cursor(&mut self, step: isize) {
        let len = MenuItem::ALL.len() as isize;
        self.cursor = (self.cursor as isize + step).rem_euclid(len) as usize;
    }

    /// The menu's look without item text: a translucent shade with the panel
    /// on top. Used as the sliding overlay when the menu opens and closes.
    pub fn texture(width: u32, height: u32) -> Texture {
        let (px, py, pw, ph) = panel_rect(width, height);
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let inside = x >= px && x < px + pw as i32 && y >= py && y < py + ph as i32;
                let on_border = inside
                    && (x == px || y == py || x == px + pw as i32 - 1 || y == py + ph as i32 - 1);
                let color = if on_border {
                    PANEL_BORDER_COLOR
                } else if inside {
                    PANEL_COLOR
                } else {
                    SHADE_COLOR
                };
                rgba.extend_from_slice(&color);
            }
        }
        Texture::from_rgba(width, height, rgba)
            .unwrap_or_else(|| Texture::blank(width, height, SHADE_COLOR))
    }
}

/// Panel rectangle for a screen of the given size: centred, a third of the
/// width and half the height.
fn panel_rect(width: u32, height: u32) -> (i32, i32, u32, u32) {
    let panel_width = (width / 3).max(1);
    let panel_height = (height / 2).max(1);
    let x = width.saturating_sub(panel_width) as i32 / 2;
    let y = height.saturating_sub(panel_height) as i32 / 2;
    (x, y, panel_width, panel_height)
}

struct MenuFrame<'a> {
    background: Option<&'a Texture>,
    selected: MenuItem,
}

impl Drawable for MenuFrame<'_> {
    fn draw(&self, canvas: &mut Canvas<'_>) {
        canvas.clear([0, 0, 0, 255]);
        if let Some(background) = self.background {
            canvas.blit(background, 0, 0);
        }
        canvas.fill_rect(0, 0, canvas.width(), canvas.height(), SHADE_COLOR);
        let (px, py, pw, ph) = panel_rect(canvas.width(), canvas.height());
        canvas.fill_rect(px, py, pw, ph, PANEL_COLOR);
        canvas.outline_rect(px, py, pw, ph, PANEL_BORDER_COLOR);

        for (row, item) in MenuItem::ALL.into_iter().enumerate() {
            let y = py + 16 + row as i32 * ROW_HEIGHT_PX;
            let color = if item == self.selected {
                canvas.fill_rect(px + 8, y + 2, 6, 6, CURSOR_COLOR);
                CURSOR_COLOR
            } else {
                ITEM_COLOR
            };
            for (index, _) in item.label().chars().enumerate() {
                let x = px + 22 + index as i32 * GLYPH_WIDTH_PX;
                canvas.fill_rect(x, y, GLYPH_WIDTH_PX as u32 - 1, GLYPH_HEIGHT_PX as u32, color);
            }
        }
    }
}

impl Screen for MenuScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::Menu
    }

    fn handle_input(
        &mut self,
        event: InputEvent,
        _input: &InputSnapshot,
        _session: &mut Session,
    ) -> ScreenStatus {
        match event.pressed() {
            Some(InputAction::MoveUp) => self.move_cursor(-1),
            Some(InputAction::MoveDown) => self.move_cursor(1),
            Some(InputAction::Interact) => {
                let item = self.selected();
                info!(item = item.label(), "menu_item_selected");
                return match item {
                    MenuItem::Resume => ScreenStatus::PreviousSilent,
                    MenuItem::Quit => ScreenStatus::Stop,
                };
            }
            Some(InputAction::Menu | InputAction::Back) => return ScreenStatus::PreviousSilent,
            _ => {}
        }
        ScreenStatus::Continue
    }

    fn update(&mut self, session: &mut Session, target: &mut dyn RenderTarget) -> ScreenStatus {
        target.draw(&MenuFrame {
            background: session.menu_background(),
            selected: self.selected(),
        });
        ScreenStatus::Continue
    }

    fn debug_title(&self, _session: &Session) -> Option<String> {
        Some(format!("Menu | {}", self.selected().label()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::FrameBuffer;
    use crate::test_support::{open_map, session_at};
    use crate::world::{Facing, TilePos};

    fn session() -> Session {
        session_at(vec![open_map("m", 4, 4)], TilePos::new(0, 0), Facing::Down).0
    }

    fn press(screen: &mut MenuScreen, session: &mut Session, action: InputAction) -> ScreenStatus {
        screen.handle_input(InputEvent::Pressed(action), &InputSnapshot::empty(), session)
    }

    #[test]
    fn cursor_wraps_both_ways() {
        let mut session = session();
        let mut menu = MenuScreen::new();
        assert_eq!(menu.selected(), MenuItem::Resume);
        press(&mut menu, &mut session, InputAction::MoveUp);
        assert_eq!(menu.selected(), MenuItem::Quit);
        press(&mut menu, &mut session, InputAction::MoveDown);
        assert_eq!(menu.selected(), MenuItem::Resume);
    }

    #[test]
    fn interact_selects_current_item() {
        let mut session = session();
        let mut menu = MenuScreen::new();
        assert_eq!(
            press(&mut menu, &mut session, InputAction::Interact),
            ScreenStatus::PreviousSilent
        );
        press(&mut menu, &mut session, InputAction::MoveDown);
        assert_eq!(
            press(&mut menu, &mut session, InputAction::Interact),
            ScreenStatus::Stop
        );
    }

    #[test]
    fn menu_and_back_keys_close() {
        let mut session = session();
        let mut menu = MenuScreen::new();
        assert_eq!(press(&mut menu, &mut session, InputAction::Menu), ScreenStatus::PreviousSilent);
        assert_eq!(press(&mut menu, &mut session, InputAction::Back), ScreenStatus::PreviousSilent);
        assert_eq!(
            menu.handle_input(InputEvent::Idle, &InputSnapshot::empty(), &mut session),
            ScreenStatus::Continue
        );
    }

    #[test]
    fn texture_is_translucent_outside_panel() {
        let texture = MenuScreen::texture(30, 20);
        assert_eq!((texture.width(), texture.height()), (30, 20));
        assert_eq!(texture.pixel(0, 0), Some(SHADE_COLOR));
        assert_eq!(texture.pixel(15, 10), Some(PANEL_COLOR));
        assert_eq!(texture.pixel(10, 5), Some(PANEL_BORDER_COLOR));
    }

    #[test]
    fn update_draws_over_captured_background() {
        let mut session = session();
        session.set_menu_background(Texture::blank(8, 8, [255, 255, 255, 255]));
        let mut target = FrameBuffer::new(8, 8);
        let mut menu = MenuScreen::new();

        assert_eq!(menu.update(&mut session, &mut target), ScreenStatus::Continue);
        let corner = target.capture_snapshot().pixel(0, 0).expect("pixel");
        assert!(corner[0] > 100 && corner[0] < 255, "{corner:?}");
    }
}
