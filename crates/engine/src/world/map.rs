use thiserror::Error;

use super::event::{EventId, MapEvent};
use super::side::Facing;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn step(self, facing: Facing) -> Self {
        let (dx, dy) = facing.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Row-major grid of tile ids. Tile (0,0) is the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Tilemap {
    width: u32,
    height: u32,
    tiles: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
    #[error("layer size {actual:?} does not match map size {expected:?}")]
    LayerSizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error("map registry needs at least one map")]
    NoMaps,
    #[error("unknown map '{0}'")]
    UnknownMap(String),
}

impl Tilemap {
    pub fn new(width: u32, height: u32, tiles: Vec<u16>) -> Result<Self, MapError> {
        let expected = width as usize * height as usize;
        let actual = tiles.len();
        if expected != actual {
            return Err(MapError::TileCountMismatch { expected, actual });
        }
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    pub fn filled(width: u32, height: u32, fill: u16) -> Self {
        Self {
            width,
            height,
            tiles: vec![fill; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, tile: TilePos) -> bool {
        self.index_of(tile).is_some()
    }

    pub fn index_of(&self, tile: TilePos) -> Option<usize> {
        if tile.x < 0 || tile.y < 0 {
            return None;
        }
        let (x, y) = (tile.x as u32, tile.y as u32);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn tile_at(&self, tile: TilePos) -> Option<u16> {
        self.index_of(tile)
            .and_then(|index| self.tiles.get(index).copied())
    }

    pub fn set_tile(&mut self, tile: TilePos, id: u16) -> bool {
        match self.index_of(tile) {
            Some(index) => {
                self.tiles[index] = id;
                true
            }
            None => false,
        }
    }
}

pub const MAP_LAYER_COUNT: usize = 3;

/// A map: up to three visual layers, a collision layer, the events placed on
/// it and the background track played while it is current.
pub struct GameMap {
    name: String,
    layers: Vec<Tilemap>,
    collision: Tilemap,
    events: Vec<MapEvent>,
    next_event_id: u32,
    background_track: String,
}

impl GameMap {
    pub fn new(name: impl Into<String>, ground: Tilemap, background_track: impl Into<String>) -> Self {
        let collision = Tilemap::filled(ground.width(), ground.height(), 0);
        Self {
            name: name.into(),
            layers: vec![ground],
            collision,
            events: Vec::new(),
            next_event_id: 0,
            background_track: background_track.into(),
        }
    }

    /// Adds a visual layer above the existing ones. Extra layers past
    /// [`MAP_LAYER_COUNT`] are ignored.
    pub fn with_layer(mut self, layer: Tilemap) -> Result<Self, MapError> {
        self.check_size(&layer)?;
        if self.layers.len() < MAP_LAYER_COUNT {
            self.layers.push(layer);
        }
        Ok(self)
    }

    pub fn with_collision(mut self, collision: Tilemap) -> Result<Self, MapError> {
        self.check_size(&collision)?;
        self.collision = collision;
        Ok(self)
    }

    fn check_size(&self, layer: &Tilemap) -> Result<(), MapError> {
        let expected = self.size();
        let actual = (layer.width(), layer.height());
        if expected != actual {
            return Err(MapError::LayerSizeMismatch { expected, actual });
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> (u32, u32) {
        (self.collision.width(), self.collision.height())
    }

    pub fn contains(&self, tile: TilePos) -> bool {
        self.collision.contains(tile)
    }

    pub fn layers(&self) -> &[Tilemap] {
        &self.layers
    }

    pub fn collision(&self) -> &Tilemap {
        &self.collision
    }

    pub fn set_blocked(&mut self, tile: TilePos, blocked: bool) -> bool {
        self.collision.set_tile(tile, u16::from(blocked))
    }

    pub fn is_blocked(&self, tile: TilePos) -> bool {
        self.collision.tile_at(tile).map_or(true, |id| id != 0)
    }

    /// True when the player may step onto `tile`: inside the map, free on the
    /// collision layer and not occupied by a blocking event.
    pub fn is_passable(&self, tile: TilePos) -> bool {
        !self.is_blocked(tile) && !self.events_at(tile).any(MapEvent::is_blocking)
    }

    pub fn background_track(&self) -> &str {
        &self.background_track
    }

    pub fn add_event(&mut self, mut event: MapEvent) -> EventId {
        let id = EventId(self.next_event_id);
        self.next_event_id = self.next_event_id.saturating_add(1);
        event.assign_id(id);
        self.events.push(event);
        id
    }

    pub fn events(&self) -> &[MapEvent] {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut [MapEvent] {
        &mut self.events
    }

    pub fn event(&self, id: EventId) -> Option<&MapEvent> {
        self.events.iter().find(|event| event.id() == id)
    }

    pub fn events_at(&self, tile: TilePos) -> impl Iterator<Item = &MapEvent> {
        self.events.iter().filter(move |event| event.tile() == tile)
    }

    pub fn events_at_mut(&mut self, tile: TilePos) -> impl Iterator<Item = &mut MapEvent> {
        self.events.iter_mut().filter(move |event| event.tile() == tile)
    }
}

impl std::fmt::Debug for GameMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameMap")
            .field("name", &self.name)
            .field("size", &self.size())
            .field("layers", &self.layers.len())
            .field("events", &self.events.len())
            .field("background_track", &self.background_track)
            .finish()
    }
}

/// Ordered set of maps with one current map.
#[derive(Debug)]
pub struct MapRegistry {
    maps: Vec<GameMap>,
    current: usize,
}

impl MapRegistry {
    pub fn new(maps: Vec<GameMap>, start: &str) -> Result<Self, MapError> {
        if maps.is_empty() {
            return Err(MapError::NoMaps);
        }
        let current = maps
            .iter()
            .position(|map| map.name() == start)
            .ok_or_else(|| MapError::UnknownMap(start.to_string()))?;
        Ok(Self { maps, current })
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &GameMap {
        &self.maps[self.current]
    }

    pub fn current_mut(&mut self) -> &mut GameMap {
        &mut self.maps[self.current]
    }

    pub fn get(&self, index: usize) -> Option<&GameMap> {
        self.maps.get(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.maps.iter().position(|map| map.name() == name)
    }

    pub fn select(&mut self, name: &str) -> Result<bool, MapError> {
        let index = self
            .index_of(name)
            .ok_or_else(|| MapError::UnknownMap(name.to_string()))?;
        let changed = index != self.current;
        self.current = index;
        Ok(changed)
    }

    /// Name of the map `offset` places away from the current one, wrapping
    /// around both ends.
    pub fn neighbor_name(&self, offset: isize) -> &str {
        let len = self.maps.len() as isize;
        let index = (self.current as isize + offset).rem_euclid(len) as usize;
        self.maps[index].name()
    }
}
