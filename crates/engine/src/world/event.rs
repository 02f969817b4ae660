use serde::Deserialize;

use super::battle::DeclaredBattle;
use super::dialog::Dialog;
use super::map::TilePos;
use super::player::Position;
use super::side::{Facing, SideMask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub u32);

impl EventId {
    const UNASSIGNED: EventId = EventId(u32::MAX);
}

/// Condition class under which a map event may fire. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    /// Fires once per completed step onto the event's tile.
    OnEnterTile,
    /// Fires when interact is held while facing the event's tile.
    OnInteractPress,
    /// Fires every stationary poll while the player stands on the tile.
    OnOccupyTile,
}

pub type EventAction = Box<dyn FnMut(&mut EventContext<'_>)>;

/// Per-frame hook of an ambient event. Receives the event's own tile so
/// scripted movers can walk.
pub type AmbientHook = Box<dyn FnMut(&mut TilePos, &mut EventContext<'_>)>;

const DEFAULT_EVENT_COLOR: [u8; 4] = [230, 200, 90, 255];

pub struct MapEvent {
    id: EventId,
    tile: TilePos,
    trigger: TriggerKind,
    sides: SideMask,
    blocking: bool,
    color: Option<[u8; 4]>,
    action: EventAction,
    ambient: Option<AmbientHook>,
}

impl MapEvent {
    pub fn new(
        trigger: TriggerKind,
        sides: SideMask,
        action: impl FnMut(&mut EventContext<'_>) + 'static,
    ) -> Self {
        Self {
            id: EventId::UNASSIGNED,
            tile: TilePos::default(),
            trigger,
            sides,
            blocking: false,
            color: None,
            action: Box::new(action),
            ambient: None,
        }
    }

    pub fn at(mut self, tile: TilePos) -> Self {
        self.tile = tile;
        self
    }

    /// Marks the event as solid: the player cannot step onto its tile.
    pub fn blocking(mut self) -> Self {
        self.blocking = true;
        self
    }

    /// Gives the event a visible marker of the given colour.
    pub fn with_color(mut self, color: [u8; 4]) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_ambient(
        mut self,
        hook: impl FnMut(&mut TilePos, &mut EventContext<'_>) + 'static,
    ) -> Self {
        self.ambient = Some(Box::new(hook));
        self
    }

    pub(crate) fn assign_id(&mut self, id: EventId) {
        self.id = id;
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn tile(&self) -> TilePos {
        self.tile
    }

    pub fn trigger(&self) -> TriggerKind {
        self.trigger
    }

    pub fn sides(&self) -> SideMask {
        self.sides
    }

    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    pub fn is_ambient(&self) -> bool {
        self.ambient.is_some()
    }

    /// Marker colour, if the event is visible. Blocking events without an
    /// explicit colour get a default marker.
    pub fn color(&self) -> Option<[u8; 4]> {
        self.color
            .or_else(|| self.blocking.then_some(DEFAULT_EVENT_COLOR))
    }

    pub(crate) fn fire(&mut self, ctx: &mut EventContext<'_>) {
        ctx.event = self.id;
        (self.action)(ctx);
    }

    pub(crate) fn tick_ambient(&mut self, ctx: &mut EventContext<'_>) {
        let Self {
            id, tile, ambient, ..
        } = self;
        if let Some(hook) = ambient {
            ctx.event = *id;
            hook(tile, ctx);
        }
    }
}

impl std::fmt::Debug for MapEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapEvent")
            .field("id", &self.id)
            .field("tile", &self.tile)
            .field("trigger", &self.trigger)
            .field("sides", &self.sides)
            .field("blocking", &self.blocking)
            .field("ambient", &self.ambient.is_some())
            .finish()
    }
}

/// Destination of a teleport requested by an event or a debug key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Teleport {
    pub map: String,
    pub tile: (i32, i32),
    #[serde(default)]
    pub facing: Option<Facing>,
}

impl Teleport {
    pub fn new(map: impl Into<String>, tile: TilePos) -> Self {
        Self {
            map: map.into(),
            tile: (tile.x, tile.y),
            facing: None,
        }
    }

    pub fn facing(mut self, facing: Facing) -> Self {
        self.facing = Some(facing);
        self
    }

    pub fn tile_pos(&self) -> TilePos {
        TilePos::new(self.tile.0, self.tile.1)
    }
}

/// Everything an event action may touch. The map itself is not reachable
/// here; map changes go through [`EventContext::teleport`] and are applied
/// after dispatch.
pub struct EventContext<'a> {
    event: EventId,
    player: &'a mut Position,
    dialog: &'a mut Option<Dialog>,
    battle: &'a mut Option<DeclaredBattle>,
    teleport: &'a mut Option<Teleport>,
}

impl<'a> EventContext<'a> {
    pub(crate) fn new(
        player: &'a mut Position,
        dialog: &'a mut Option<Dialog>,
        battle: &'a mut Option<DeclaredBattle>,
        teleport: &'a mut Option<Teleport>,
    ) -> Self {
        Self {
            event: EventId::UNASSIGNED,
            player,
            dialog,
            battle,
            teleport,
        }
    }

    /// Id of the event currently running.
    pub fn event_id(&self) -> EventId {
        self.event
    }

    pub fn player(&self) -> &Position {
        &*self.player
    }

    pub fn player_mut(&mut self) -> &mut Position {
        &mut *self.player
    }

    pub fn player_tile(&self) -> TilePos {
        self.player.tile()
    }

    pub fn player_facing(&self) -> Facing {
        self.player.facing()
    }

    pub fn lock_player(&mut self) {
        self.player.set_locked(true);
    }

    /// Opens a dialog unless one is already showing.
    pub fn open_dialog<I, S>(&mut self, lines: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.dialog.as_ref().is_some_and(|dialog| !dialog.is_finished()) {
            return false;
        }
        *self.dialog = Some(Dialog::new(lines));
        true
    }

    /// Declares a battle unless one is already pending.
    pub fn declare_battle(&mut self, opponent: impl Into<String>) -> bool {
        if self.battle.is_some() {
            return false;
        }
        *self.battle = Some(DeclaredBattle::new(opponent));
        true
    }

    pub fn teleport(&mut self, destination: Teleport) {
        *self.teleport = Some(destination);
    }
}
