mod battle;
mod dialog;
mod event;
mod jukebox;
mod map;
mod player;
mod side;

pub use battle::DeclaredBattle;
pub use dialog::Dialog;
pub use event::{AmbientHook, EventAction, EventContext, EventId, MapEvent, Teleport, TriggerKind};
pub use jukebox::{Jukebox, TracingJukebox};
pub use map::{GameMap, MapError, MapRegistry, TilePos, Tilemap, MAP_LAYER_COUNT};
pub use player::{Player, Position, StepOutcome, STEP_FRAMES};
pub use side::{Facing, SideMask};

use crate::app::Texture;

/// Game state shared by every screen. The screen driver owns it and lends it
/// to the active screen for the duration of each call.
pub struct Session {
    maps: MapRegistry,
    player: Player,
    dialog: Option<Dialog>,
    battle: Option<DeclaredBattle>,
    pending_teleport: Option<Teleport>,
    menu_background: Option<Texture>,
    jukebox: Box<dyn Jukebox>,
}

impl Session {
    pub fn new(maps: MapRegistry, player: Player, jukebox: Box<dyn Jukebox>) -> Self {
        Self {
            maps,
            player,
            dialog: None,
            battle: None,
            pending_teleport: None,
            menu_background: None,
            jukebox,
        }
    }

    pub fn maps(&self) -> &MapRegistry {
        &self.maps
    }

    pub fn maps_mut(&mut self) -> &mut MapRegistry {
        &mut self.maps
    }

    pub fn current_map(&self) -> &GameMap {
        self.maps.current()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn dialog_mut(&mut self) -> Option<&mut Dialog> {
        self.dialog.as_mut()
    }

    /// A dialog is open and has lines left to show.
    pub fn dialog_is_active(&self) -> bool {
        self.dialog.as_ref().is_some_and(|dialog| !dialog.is_finished())
    }

    pub fn open_dialog<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dialog = Some(Dialog::new(lines));
    }

    pub fn clear_finished_dialog(&mut self) {
        if self.dialog.as_ref().is_some_and(Dialog::is_finished) {
            self.dialog = None;
        }
    }

    pub fn declared_battle(&self) -> Option<&DeclaredBattle> {
        self.battle.as_ref()
    }

    pub fn declare_battle(&mut self, opponent: impl Into<String>) {
        self.battle = Some(DeclaredBattle::new(opponent));
    }

    /// Marks the declared battle as over. Returns false when none is declared.
    pub fn finish_declared_battle(&mut self) -> bool {
        match self.battle.as_mut() {
            Some(battle) => {
                battle.finish();
                true
            }
            None => false,
        }
    }

    pub fn end_battle(&mut self) -> Option<DeclaredBattle> {
        self.battle.take()
    }

    pub fn request_teleport(&mut self, destination: Teleport) {
        self.pending_teleport = Some(destination);
    }

    pub fn take_pending_teleport(&mut self) -> Option<Teleport> {
        self.pending_teleport.take()
    }

    /// Moves the player to `destination`. Returns whether the current map
    /// changed.
    pub fn teleport_player(&mut self, destination: &Teleport) -> Result<bool, MapError> {
        let changed = self.maps.select(&destination.map)?;
        self.player
            .position_mut()
            .teleport_to(destination.tile_pos(), destination.facing);
        Ok(changed)
    }

    /// Steps the player one tile toward `direction` on the current map.
    pub fn move_player(&mut self, direction: Facing, ignore_collisions: bool) -> StepOutcome {
        let map = self.maps.current();
        self.player
            .position_mut()
            .move_toward(direction, map, ignore_collisions)
    }

    pub fn menu_background(&self) -> Option<&Texture> {
        self.menu_background.as_ref()
    }

    pub fn set_menu_background(&mut self, texture: Texture) {
        self.menu_background = Some(texture);
    }

    pub fn jukebox_mut(&mut self) -> &mut dyn Jukebox {
        self.jukebox.as_mut()
    }

    /// Plays the background track of the current map.
    pub fn play_map_track(&mut self) {
        let track = self.maps.current().background_track().to_string();
        self.jukebox.play(&track);
    }

    /// Splits the session into the current map and the context handed to
    /// its event actions.
    pub(crate) fn event_scope(&mut self) -> (&mut GameMap, EventContext<'_>) {
        let map = self.maps.current_mut();
        let ctx = EventContext::new(
            self.player.position_mut(),
            &mut self.dialog,
            &mut self.battle,
            &mut self.pending_teleport,
        );
        (map, ctx)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("map", &self.maps.current().name())
            .field("player", &self.player)
            .field("dialog", &self.dialog)
            .field("battle", &self.battle)
            .field("pending_teleport", &self.pending_teleport)
            .finish()
    }
}
