use crate::app::{tile_to_world_px, world_to_screen_px, Canvas, Drawable, Viewport, TILE_SIZE_PX};
use crate::world::{Dialog, GameMap, Position, TilePos, MAP_LAYER_COUNT, STEP_FRAMES};

const CLEAR_COLOR: [u8; 4] = [12, 14, 20, 255];
const PLAYER_COLOR: [u8; 4] = [70, 130, 230, 255];
const PLAYER_FACING_COLOR: [u8; 4] = [250, 250, 250, 255];
const COLLISION_COLOR: [u8; 4] = [230, 40, 40, 110];
const DIALOG_BACK_COLOR: [u8; 4] = [16, 16, 32, 230];
const DIALOG_BORDER_COLOR: [u8; 4] = [235, 235, 235, 255];
const DIALOG_GLYPH_COLOR: [u8; 4] = [220, 220, 220, 255];
const DEBUG_MARKER_COLOR: [u8; 4] = [255, 220, 0, 255];
const GLYPH_WIDTH_PX: i32 = 6;
const GLYPH_HEIGHT_PX: i32 = 10;

/// Exploration display state: debug toggles and the camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverworldView {
    pub debug_mode: bool,
    pub layer_visible: [bool; MAP_LAYER_COUNT],
    pub show_collisions: bool,
    pub camera_locked: bool,
    /// World pixel position shown at the centre of the screen.
    pub camera_px: (i32, i32),
}

impl Default for OverworldView {
    fn default() -> Self {
        Self {
            debug_mode: false,
            layer_visible: [true; MAP_LAYER_COUNT],
            show_collisions: false,
            camera_locked: false,
            camera_px: (0, 0),
        }
    }
}

impl OverworldView {
    pub fn toggle_layer(&mut self, layer: usize) {
        if let Some(visible) = self.layer_visible.get_mut(layer) {
            *visible = !*visible;
        }
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.camera_px.0 += dx;
        self.camera_px.1 += dy;
    }

    pub fn follow(&mut self, position: &Position) {
        if self.camera_locked {
            return;
        }
        let (x, y) = walker_world_px(position);
        self.camera_px = (x + TILE_SIZE_PX / 2, y + TILE_SIZE_PX / 2);
    }
}

/// World pixel position of a walker, including the step in progress.
pub fn walker_world_px(position: &Position) -> (i32, i32) {
    let (x, y) = tile_to_world_px(position.tile());
    let (dx, dy) = position.facing().delta();
    let remaining = i32::from(position.anim_frames()) * TILE_SIZE_PX / i32::from(STEP_FRAMES);
    (x - dx * remaining, y - dy * remaining)
}

/// Tile id to display colour. Zero on an overlay layer is transparent.
fn tile_color(id: u16, layer: usize) -> Option<[u8; 4]> {
    if id == 0 && layer > 0 {
        return None;
    }
    let id = u32::from(id);
    let r = 40 + (id * 53 % 120) as u8;
    let g = 90 + (id * 97 % 110) as u8;
    let b = 40 + (id * 31 % 90) as u8;
    Some([r, g, b, 255])
}

/// One exploration frame, ready to draw.
pub struct OverworldFrame<'a> {
    pub map: &'a GameMap,
    pub player: &'a Position,
    pub dialog: Option<&'a Dialog>,
    pub view: &'a OverworldView,
}

impl OverworldFrame<'_> {
    fn tile_rect(&self, viewport: Viewport, tile: TilePos) -> (i32, i32) {
        world_to_screen_px(tile_to_world_px(tile), self.view.camera_px, viewport)
    }
}

impl Drawable for OverworldFrame<'_> {
    fn draw(&self, canvas: &mut Canvas<'_>) {
        let viewport = Viewport {
            width: canvas.width(),
            height: canvas.height(),
        };
        canvas.clear(CLEAR_COLOR);
        let (map_width, map_height) = self.map.size();
        let size = TILE_SIZE_PX as u32;

        for (layer_index, layer) in self.map.layers().iter().enumerate() {
            if !self.view.layer_visible.get(layer_index).copied().unwrap_or(true) {
                continue;
            }
            for y in 0..map_height as i32 {
                for x in 0..map_width as i32 {
                    let tile = TilePos::new(x, y);
                    let Some(color) = layer
                        .tile_at(tile)
                        .and_then(|id| tile_color(id, layer_index))
                    else {
                        continue;
                    };
                    let (sx, sy) = self.tile_rect(viewport, tile);
                    canvas.fill_rect(sx, sy, size, size, color);
                }
            }
        }

        for event in self.map.events() {
            let Some(color) = event.color() else {
                continue;
            };
            let (sx, sy) = self.tile_rect(viewport, event.tile());
            canvas.fill_rect(sx + 4, sy + 4, size - 8, size - 8, color);
        }

        let (px, py) = world_to_screen_px(walker_world_px(self.player), self.view.camera_px, viewport);
        canvas.fill_rect(px + 4, py + 2, size - 8, size - 4, PLAYER_COLOR);
        let (fx, fy) = self.player.facing().delta();
        let center = TILE_SIZE_PX / 2;
        canvas.fill_rect(
            px + center - 3 + fx * (center - 6),
            py + center - 3 + fy * (center - 6),
            6,
            6,
            PLAYER_FACING_COLOR,
        );

        if self.view.show_collisions {
            for y in 0..map_height as i32 {
                for x in 0..map_width as i32 {
                    let tile = TilePos::new(x, y);
                    if self.map.is_blocked(tile) {
                        let (sx, sy) = self.tile_rect(viewport, tile);
                        canvas.fill_rect(sx, sy, size, size, COLLISION_COLOR);
                    }
                }
            }
        }

        if self.view.debug_mode {
            canvas.outline_rect(0, 0, viewport.width, viewport.height, DEBUG_MARKER_COLOR);
        }

        if let Some(dialog) = self.dialog.filter(|dialog| !dialog.is_finished()) {
            draw_dialog(canvas, dialog);
        }
    }
}

fn draw_dialog(canvas: &mut Canvas<'_>, dialog: &Dialog) {
    let margin = 16;
    let height = (canvas.height() / 4).max(GLYPH_HEIGHT_PX as u32 * 3);
    let width = canvas.width().saturating_sub(margin as u32 * 2);
    let top = canvas.height() as i32 - height as i32 - margin;
    canvas.fill_rect(margin, top, width, height, DIALOG_BACK_COLOR);
    canvas.outline_rect(margin, top, width, height, DIALOG_BORDER_COLOR);

    // Glyph blocks stand in for text; layout is the font renderer's job.
    let left = margin + 12;
    let right = margin + width as i32 - 12;
    let mut x = left;
    let mut y = top + 12;
    for c in dialog.current_line().unwrap_or_default().chars() {
        if x + GLYPH_WIDTH_PX > right {
            x = left;
            y += GLYPH_HEIGHT_PX + 4;
        }
        if !c.is_whitespace() {
            canvas.fill_rect(
                x,
                y,
                GLYPH_WIDTH_PX as u32 - 1,
                GLYPH_HEIGHT_PX as u32,
                DIALOG_GLYPH_COLOR,
            );
        }
        x += GLYPH_WIDTH_PX;
    }

    let (line, total) = dialog.progress();
    for index in 0..total {
        let color = if index <= line {
            DIALOG_BORDER_COLOR
        } else {
            DIALOG_BACK_COLOR
        };
        let dot_x = margin + width as i32 - 12 - (total - index) as i32 * 8;
        canvas.fill_rect(dot_x, top + height as i32 - 10, 5, 5, color);
    }
}
