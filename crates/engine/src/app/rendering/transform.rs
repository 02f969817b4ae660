use crate::world::TilePos;

/// Edge length of a map tile in screen pixels.
pub const TILE_SIZE_PX: i32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// World pixel position of a tile's top-left corner.
pub fn tile_to_world_px(tile: TilePos) -> (i32, i32) {
    (tile.x * TILE_SIZE_PX, tile.y * TILE_SIZE_PX)
}

/// Converts a world pixel position to the screen, with `camera_px` at the
/// centre of the viewport.
pub fn world_to_screen_px(world_px: (i32, i32), camera_px: (i32, i32), viewport: Viewport) -> (i32, i32) {
    (
        world_px.0 - camera_px.0 + viewport.width as i32 / 2,
        world_px.1 - camera_px.1 + viewport.height as i32 / 2,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_position_maps_to_viewport_center() {
        let viewport = Viewport {
            width: 800,
            height: 600,
        };
        assert_eq!(world_to_screen_px((64, 96), (64, 96), viewport), (400, 300));
    }

    #[test]
    fn camera_offset_shifts_screen_position() {
        let viewport = Viewport {
            width: 800,
            height: 600,
        };
        let world = tile_to_world_px(TilePos::new(3, -1));
        assert_eq!(world, (96, -32));
        assert_eq!(world_to_screen_px(world, (0, 0), viewport), (496, 268));
    }
}
