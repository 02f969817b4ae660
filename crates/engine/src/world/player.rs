use super::map::{GameMap, TilePos};
use super::side::Facing;

/// Frames a one-tile step animation lasts.
pub const STEP_FRAMES: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved { from: TilePos, to: TilePos },
    Blocked,
    Locked,
    Busy,
}

/// Tile position, facing and step animation of a walker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Position {
    tile: TilePos,
    facing: Facing,
    anim_frames: u8,
    moving: bool,
    locked: bool,
}

impl Position {
    pub fn new(tile: TilePos, facing: Facing) -> Self {
        Self {
            tile,
            facing,
            ..Self::default()
        }
    }

    pub fn tile(&self) -> TilePos {
        self.tile
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn set_facing(&mut self, facing: Facing) {
        self.facing = facing;
    }

    /// True while a step is in progress.
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// True while any animation is still playing.
    pub fn is_animating(&self) -> bool {
        self.anim_frames > 0
    }

    pub fn anim_frames(&self) -> u8 {
        self.anim_frames
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    /// Turns toward `direction` and starts a one-tile step if the target tile
    /// is passable. With `ignore_collisions` only the map bounds are checked.
    pub fn move_toward(
        &mut self,
        direction: Facing,
        map: &GameMap,
        ignore_collisions: bool,
    ) -> StepOutcome {
        if self.locked {
            return StepOutcome::Locked;
        }
        if self.is_animating() {
            return StepOutcome::Busy;
        }
        self.facing = direction;
        let target = self.tile.step(direction);
        let free = if ignore_collisions {
            map.contains(target)
        } else {
            map.is_passable(target)
        };
        if !free {
            return StepOutcome::Blocked;
        }
        let from = self.tile;
        self.tile = target;
        self.anim_frames = STEP_FRAMES;
        self.moving = true;
        StepOutcome::Moved { from, to: target }
    }

    /// Advances the step animation by one frame.
    pub fn tick(&mut self) {
        if self.anim_frames == 0 {
            return;
        }
        self.anim_frames -= 1;
        if self.anim_frames == 0 {
            self.moving = false;
        }
    }

    /// Places the walker on `tile` immediately, cancelling any animation.
    pub fn teleport_to(&mut self, tile: TilePos, facing: Option<Facing>) {
        self.tile = tile;
        if let Some(facing) = facing {
            self.facing = facing;
        }
        self.anim_frames = 0;
        self.moving = false;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    name: String,
    position: Position,
}

impl Player {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn position_mut(&mut self) -> &mut Position {
        &mut self.position
    }
}
