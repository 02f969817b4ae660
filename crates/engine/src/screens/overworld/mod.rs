//! Exploration screen: walks the player around the current map, dispatches
//! map events and hands off to the battle, menu and transition screens.

mod transition;
mod view;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::app::{
    InputAction, InputEvent, InputSnapshot, NextScreenSlot, RenderTarget, Screen, ScreenError,
    ScreenKind, ScreenStatus, Texture, TILE_SIZE_PX,
};
use crate::dispatch::{tick_ambient, EventDispatcher, PressDedupPolicy};
use crate::world::{Facing, Session, StepOutcome, Teleport, TilePos};

use super::{AnimationScreen, BattleScreen, MenuScreen, WooshDirection};

pub use transition::{TransitionRequest, TransitionResolver};
pub use view::{walker_world_px, OverworldFrame, OverworldView};

/// Tile the previous/next map debug keys drop the player on.
pub const DEBUG_WARP_TILE: TilePos = TilePos::new(5, 5);
/// Length of the menu slide animation.
pub const WOOSH_FRAMES: u32 = 15;

const MOVE_KEYS: [(InputAction, Facing); 4] = [
    (InputAction::MoveUp, Facing::Up),
    (InputAction::MoveDown, Facing::Down),
    (InputAction::MoveLeft, Facing::Left),
    (InputAction::MoveRight, Facing::Right),
];

const CAMERA_KEYS: [(InputAction, Facing); 4] = [
    (InputAction::CameraUp, Facing::Up),
    (InputAction::CameraDown, Facing::Down),
    (InputAction::CameraLeft, Facing::Left),
    (InputAction::CameraRight, Facing::Right),
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OverworldConfig {
    pub start_in_debug_mode: bool,
    pub press_dedup: PressDedupPolicy,
    /// Destination of the debug teleport key.
    pub debug_teleport: Option<Teleport>,
    pub camera_pan_step_px: i32,
}

impl Default for OverworldConfig {
    fn default() -> Self {
        Self {
            start_in_debug_mode: false,
            press_dedup: PressDedupPolicy::default(),
            debug_teleport: None,
            camera_pan_step_px: 4,
        }
    }
}

pub struct OverworldScreen {
    config: OverworldConfig,
    view: OverworldView,
    dispatcher: EventDispatcher,
    transition: TransitionResolver,
    ignore_collisions: bool,
    just_teleported: bool,
    suspended: bool,
    next: NextScreenSlot,
}

impl OverworldScreen {
    pub fn new(config: OverworldConfig) -> Self {
        let view = OverworldView {
            debug_mode: config.start_in_debug_mode,
            ..OverworldView::default()
        };
        Self {
            dispatcher: EventDispatcher::new(config.press_dedup),
            config,
            view,
            transition: TransitionResolver::default(),
            ignore_collisions: false,
            just_teleported: false,
            suspended: false,
            next: NextScreenSlot::default(),
        }
    }

    pub fn view(&self) -> &OverworldView {
        &self.view
    }

    pub fn transition(&self) -> TransitionRequest {
        self.transition.request()
    }

    pub fn ignores_collisions(&self) -> bool {
        self.ignore_collisions
    }

    /// Debug keys. Returns a status only when the key ends the frame.
    fn handle_debug_key(&mut self, action: InputAction, session: &mut Session) -> Option<ScreenStatus> {
        if action == InputAction::ToggleDebug {
            self.view.debug_mode = !self.view.debug_mode;
            if !self.view.debug_mode {
                self.ignore_collisions = false;
                self.view.camera_locked = false;
            }
            info!(debug_mode = self.view.debug_mode, "debug_mode_toggled");
            return None;
        }
        if !self.view.debug_mode {
            return None;
        }
        match action {
            InputAction::Reboot => {
                info!("reboot_requested");
                return Some(ScreenStatus::Reboot);
            }
            InputAction::ToggleLayer1 => self.view.toggle_layer(0),
            InputAction::ToggleLayer2 => self.view.toggle_layer(1),
            InputAction::ToggleLayer3 => self.view.toggle_layer(2),
            InputAction::ToggleCollisionOverlay => {
                self.view.show_collisions = !self.view.show_collisions;
            }
            InputAction::ToggleCollisionBypass => {
                self.ignore_collisions = !self.ignore_collisions;
                debug!(ignore_collisions = self.ignore_collisions, "collision_bypass_toggled");
            }
            InputAction::ToggleCameraLock => {
                self.view.camera_locked = !self.view.camera_locked;
            }
            InputAction::PreviousMap | InputAction::NextMap => {
                let offset = if action == InputAction::NextMap { 1 } else { -1 };
                let name = session.maps().neighbor_name(offset).to_string();
                self.teleport(session, &Teleport::new(name, DEBUG_WARP_TILE));
            }
            InputAction::DebugTeleport => match self.config.debug_teleport.clone() {
                Some(destination) => self.teleport(session, &destination),
                None => warn!("debug_teleport_unset"),
            },
            _ => {}
        }
        None
    }

    fn teleport(&mut self, session: &mut Session, destination: &Teleport) {
        match session.teleport_player(destination) {
            Ok(map_changed) => {
                self.just_teleported = true;
                info!(
                    map = %destination.map,
                    x = destination.tile.0,
                    y = destination.tile.1,
                    map_changed,
                    "teleported"
                );
                if map_changed {
                    session.play_map_track();
                }
            }
            Err(error) => warn!(error = %error, "teleport_failed"),
        }
    }

    fn apply_pending_teleport(&mut self, session: &mut Session) {
        if let Some(destination) = session.take_pending_teleport() {
            self.teleport(session, &destination);
        }
    }

    fn pan_camera(&mut self, input: &InputSnapshot) {
        let step = self.config.camera_pan_step_px;
        for (action, direction) in CAMERA_KEYS {
            if input.is_down(action) {
                let (dx, dy) = direction.delta();
                self.view.pan(dx * step, dy * step);
            }
        }
    }

    fn try_move(&mut self, input: &InputSnapshot, session: &mut Session) {
        if self.just_teleported {
            return;
        }
        let Some(direction) = MOVE_KEYS
            .iter()
            .find(|(action, _)| input.is_down(*action))
            .map(|(_, direction)| *direction)
        else {
            return;
        };
        if let StepOutcome::Moved { to, .. } = session.move_player(direction, self.ignore_collisions) {
            self.dispatcher.dispatch_enter(session, to);
            self.apply_pending_teleport(session);
        }
    }

    fn check_battle(&mut self, session: &mut Session) -> ScreenStatus {
        let Some(battle) = session.declared_battle() else {
            return ScreenStatus::Continue;
        };
        if battle.is_finished() {
            if let Some(battle) = session.end_battle() {
                info!(opponent = battle.opponent(), "battle_ended");
            }
            session.player_mut().position_mut().set_locked(false);
            return ScreenStatus::Continue;
        }
        info!(opponent = battle.opponent(), "battle_declared");
        self.transition.request_battle();
        ScreenStatus::Advance
    }
}

/// Pixel size of the current map, used as the backdrop size before the
/// first frame has been drawn.
fn map_extent_px(session: &Session) -> (u32, u32) {
    let (width, height) = session.current_map().size();
    let tile = TILE_SIZE_PX as u32;
    ((width * tile).max(1), (height * tile).max(1))
}

impl Screen for OverworldScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::Overworld
    }

    fn handle_input(
        &mut self,
        event: InputEvent,
        input: &InputSnapshot,
        session: &mut Session,
    ) -> ScreenStatus {
        if let Some(status) = self.transition.advance_sequence() {
            return status;
        }

        if session.dialog_is_active() {
            if event.is_press(InputAction::Interact) {
                if let Some(dialog) = session.dialog_mut() {
                    dialog.advance();
                }
            }
            return ScreenStatus::Continue;
        }

        if let Some(action) = event.pressed() {
            if let Some(status) = self.handle_debug_key(action, session) {
                return status;
            }
            if action == InputAction::Menu {
                self.transition.begin_menu();
                info!("menu_requested");
                return ScreenStatus::AdvanceSilent;
            }
        }

        if self.view.camera_locked {
            self.pan_camera(input);
        }

        self.dispatcher
            .dispatch_press(session, input.is_down(InputAction::Interact));
        self.apply_pending_teleport(session);
        self.try_move(input, session);
        // After the step so the frame that leaves an occupy tile skips it.
        self.dispatcher.dispatch_occupy(session);
        self.apply_pending_teleport(session);

        self.check_battle(session)
    }

    fn update(&mut self, session: &mut Session, target: &mut dyn RenderTarget) -> ScreenStatus {
        if !session.dialog_is_active() {
            tick_ambient(session);
            self.apply_pending_teleport(session);
        }
        session.player_mut().position_mut().tick();
        session.clear_finished_dialog();
        self.just_teleported = false;
        self.view.follow(session.player().position());

        target.draw(&OverworldFrame {
            map: session.current_map(),
            player: session.player().position(),
            dialog: session.dialog(),
            view: &self.view,
        });
        self.transition.capture(target.capture_snapshot());
        ScreenStatus::Continue
    }

    fn produce_next_screen(&mut self, session: &mut Session) -> Result<(), ScreenError> {
        let backdrop = match self.transition.snapshot() {
            Some(snapshot) => snapshot.clone(),
            None => {
                let (width, height) = map_extent_px(session);
                debug!(width, height, "transition_without_snapshot");
                Texture::blank(width, height, [0, 0, 0, 255])
            }
        };
        session.set_menu_background(backdrop.clone());
        let (width, height) = (backdrop.width(), backdrop.height());

        let request = self.transition.request();
        let next: Box<dyn Screen> = match request {
            TransitionRequest::Battle => {
                let battle = session
                    .declared_battle()
                    .cloned()
                    .ok_or(ScreenError::MissingBattle)?;
                Box::new(BattleScreen::new(battle))
            }
            TransitionRequest::MenuOpen => Box::new(AnimationScreen::woosh(
                backdrop,
                MenuScreen::texture(width, height),
                WooshDirection::Up,
                WOOSH_FRAMES,
            )),
            TransitionRequest::Menu => Box::new(MenuScreen::new()),
            TransitionRequest::MenuClose => Box::new(AnimationScreen::woosh(
                backdrop,
                MenuScreen::texture(width, height),
                WooshDirection::Down,
                WOOSH_FRAMES,
            )),
            TransitionRequest::None => {
                return Err(ScreenError::UnexpectedTransition {
                    code: request.code(),
                    context: "a screen to load from the overworld",
                })
            }
        };
        self.next.put(next);
        Ok(())
    }

    fn take_next_screen(&mut self) -> Option<Box<dyn Screen>> {
        self.next.take()
    }

    fn suspend(&mut self, session: &mut Session) {
        if self.suspended {
            return;
        }
        self.suspended = true;
        if self.transition.request() == TransitionRequest::Battle {
            session.jukebox_mut().pause();
        }
    }

    fn resume(&mut self, session: &mut Session) {
        if !self.suspended {
            return;
        }
        self.suspended = false;
        session.play_map_track();
    }

    fn debug_title(&self, session: &Session) -> Option<String> {
        let position = session.player().position();
        let mut title = format!(
            "Adventure | {} ({}, {})",
            session.current_map().name(),
            position.tile().x,
            position.tile().y
        );
        if self.view.debug_mode {
            title.push_str(" | debug");
            if self.ignore_collisions {
                title.push_str(" noclip");
            }
        }
        Some(title)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::app::FrameBuffer;
    use crate::test_support::{open_map, session_at, JukeboxLog};
    use crate::world::{EventContext, GameMap, MapEvent, SideMask, TriggerKind};

    fn counting_event(trigger: TriggerKind, tile: TilePos) -> (Rc<Cell<u32>>, MapEvent) {
        let count = Rc::new(Cell::new(0));
        let inner = Rc::clone(&count);
        let event = MapEvent::new(trigger, SideMask::all(), move |_ctx: &mut EventContext<'_>| {
            inner.set(inner.get() + 1)
        })
        .at(tile);
        (count, event)
    }

    fn overworld() -> OverworldScreen {
        OverworldScreen::new(OverworldConfig::default())
    }

    fn debug_overworld() -> OverworldScreen {
        OverworldScreen::new(OverworldConfig {
            start_in_debug_mode: true,
            ..OverworldConfig::default()
        })
    }

    fn single_map_session(map: GameMap) -> (Session, JukeboxLog) {
        session_at(vec![map], TilePos::new(5, 5), Facing::Up)
    }

    fn held(action: InputAction) -> InputSnapshot {
        InputSnapshot::empty().with_action_down(action, true)
    }

    fn press(action: InputAction) -> InputEvent {
        InputEvent::Pressed(action)
    }

    #[test]
    fn interact_fires_event_in_front_once() {
        let mut map = open_map("room", 10, 10);
        let (count, event) = counting_event(TriggerKind::OnInteractPress, TilePos::new(5, 4));
        map.add_event(event);
        let (mut session, _) = single_map_session(map);
        let mut screen = overworld();

        let status = screen.handle_input(
            press(InputAction::Interact),
            &held(InputAction::Interact),
            &mut session,
        );

        assert_eq!(status, ScreenStatus::Continue);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn occupy_event_fires_while_stationary_and_not_on_step_off() {
        let mut map = open_map("room", 10, 10);
        let (count, event) = counting_event(TriggerKind::OnOccupyTile, TilePos::new(5, 5));
        map.add_event(event);
        let (mut session, _) = single_map_session(map);
        let mut screen = overworld();
        let mut target = FrameBuffer::new(32, 32);
        let still = InputSnapshot::empty();
        let down = held(InputAction::MoveDown);

        let mut fires = Vec::new();
        for input in [&still, &still, &down, &down] {
            let before = count.get();
            screen.handle_input(InputEvent::Idle, input, &mut session);
            screen.update(&mut session, &mut target);
            fires.push(count.get() - before);
        }

        assert_eq!(fires, vec![1, 1, 0, 0]);
        assert_eq!(session.player().position().tile(), TilePos::new(5, 6));
    }

    #[test]
    fn blocked_step_keeps_occupy_firing() {
        let mut map = open_map("room", 10, 10);
        let (count, event) = counting_event(TriggerKind::OnOccupyTile, TilePos::new(5, 5));
        map.add_event(event);
        map.add_event(
            MapEvent::new(TriggerKind::OnInteractPress, SideMask::all(), |_ctx| {})
                .at(TilePos::new(5, 6))
                .blocking(),
        );
        let (mut session, _) = single_map_session(map);
        let mut screen = overworld();

        for _ in 0..2 {
            screen.handle_input(InputEvent::Idle, &held(InputAction::MoveDown), &mut session);
        }

        assert_eq!(count.get(), 2);
        assert_eq!(session.player().position().tile(), TilePos::new(5, 5));
    }

    #[test]
    fn menu_key_runs_three_silent_advances_then_continues() {
        let (mut session, _) = single_map_session(open_map("room", 10, 10));
        let mut screen = overworld();
        let idle = InputSnapshot::empty();

        let statuses = [
            screen.handle_input(press(InputAction::Menu), &idle, &mut session),
            screen.handle_input(InputEvent::Idle, &idle, &mut session),
            screen.handle_input(InputEvent::Idle, &idle, &mut session),
            screen.handle_input(InputEvent::Idle, &idle, &mut session),
        ];

        assert_eq!(
            statuses,
            [
                ScreenStatus::AdvanceSilent,
                ScreenStatus::AdvanceSilent,
                ScreenStatus::AdvanceSilent,
                ScreenStatus::Continue,
            ]
        );
        assert_eq!(screen.transition(), TransitionRequest::MenuClose);
    }

    #[test]
    fn menu_sequence_produces_woosh_menu_woosh() {
        let (mut session, _) = single_map_session(open_map("room", 10, 10));
        let mut screen = overworld();
        let idle = InputSnapshot::empty();
        let mut kinds = Vec::new();

        let mut event = press(InputAction::Menu);
        for _ in 0..3 {
            assert_eq!(
                screen.handle_input(event, &idle, &mut session),
                ScreenStatus::AdvanceSilent
            );
            screen.produce_next_screen(&mut session).expect("successor");
            kinds.push(screen.take_next_screen().expect("slot").kind());
            event = InputEvent::Idle;
        }

        assert_eq!(
            kinds,
            vec![ScreenKind::Animation, ScreenKind::Menu, ScreenKind::Animation]
        );
        assert!(session.menu_background().is_some());
    }

    #[test]
    fn menu_before_first_frame_gets_map_sized_backdrop() {
        let (mut session, _) = single_map_session(open_map("room", 10, 6));
        let mut screen = overworld();

        screen.handle_input(press(InputAction::Menu), &InputSnapshot::empty(), &mut session);
        screen.produce_next_screen(&mut session).expect("successor");

        let backdrop = session.menu_background().expect("backdrop");
        let tile = TILE_SIZE_PX as u32;
        assert_eq!(
            (backdrop.width(), backdrop.height()),
            (10 * tile, 6 * tile)
        );
    }

    #[test]
    fn battle_declared_by_step_advances_same_frame() {
        let mut map = open_map("route", 10, 10);
        map.add_event(
            MapEvent::new(TriggerKind::OnEnterTile, SideMask::all(), |ctx| {
                ctx.lock_player();
                ctx.declare_battle("Rival");
            })
            .at(TilePos::new(5, 4)),
        );
        let (mut session, _) = single_map_session(map);
        let mut screen = overworld();

        let status =
            screen.handle_input(InputEvent::Idle, &held(InputAction::MoveUp), &mut session);

        assert_eq!(status, ScreenStatus::Advance);
        assert_eq!(session.player().position().tile(), TilePos::new(5, 4));
        screen.produce_next_screen(&mut session).expect("battle");
        let next = screen.take_next_screen().expect("slot");
        assert_eq!(next.kind(), ScreenKind::Battle);
        assert_eq!(next.debug_title(&session).as_deref(), Some("Battle vs Rival"));
    }

    #[test]
    fn finished_battle_is_cleared_and_player_unlocked() {
        let (mut session, _) = single_map_session(open_map("route", 10, 10));
        session.declare_battle("Rival");
        session.finish_declared_battle();
        session.player_mut().position_mut().set_locked(true);
        let mut screen = overworld();

        let status = screen.handle_input(InputEvent::Idle, &InputSnapshot::empty(), &mut session);

        assert_eq!(status, ScreenStatus::Continue);
        assert!(session.declared_battle().is_none());
        assert!(!session.player().position().is_locked());
    }

    #[test]
    fn double_suspend_pauses_once() {
        let (mut session, log) = single_map_session(open_map("route", 10, 10));
        session.declare_battle("Rival");
        let mut screen = overworld();
        assert_eq!(
            screen.handle_input(InputEvent::Idle, &InputSnapshot::empty(), &mut session),
            ScreenStatus::Advance
        );

        screen.suspend(&mut session);
        screen.suspend(&mut session);
        screen.resume(&mut session);
        screen.resume(&mut session);

        assert_eq!(*log.borrow(), vec!["pause", "play:route_theme"]);
    }

    #[test]
    fn menu_suspend_keeps_music_playing() {
        let (mut session, log) = single_map_session(open_map("route", 10, 10));
        let mut screen = overworld();
        screen.handle_input(press(InputAction::Menu), &InputSnapshot::empty(), &mut session);

        screen.suspend(&mut session);

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn produce_without_request_is_fatal() {
        let (mut session, _) = single_map_session(open_map("route", 10, 10));
        let mut screen = overworld();

        let error = screen
            .produce_next_screen(&mut session)
            .expect_err("no request");

        assert_eq!(
            error,
            ScreenError::UnexpectedTransition {
                code: 0,
                context: "a screen to load from the overworld",
            }
        );
        assert!(screen.take_next_screen().is_none());
    }

    #[test]
    fn open_dialog_only_listens_to_interact() {
        let (mut session, _) = single_map_session(open_map("room", 10, 10));
        session.open_dialog(["Hello", "Bye"]);
        let mut screen = overworld();

        let status = screen.handle_input(
            press(InputAction::Menu),
            &held(InputAction::MoveUp),
            &mut session,
        );
        assert_eq!(status, ScreenStatus::Continue);
        assert_eq!(screen.transition(), TransitionRequest::None);
        assert_eq!(session.player().position().tile(), TilePos::new(5, 5));

        screen.handle_input(press(InputAction::Interact), &InputSnapshot::empty(), &mut session);
        assert_eq!(session.dialog().and_then(|d| d.current_line()), Some("Bye"));
        screen.handle_input(press(InputAction::Interact), &InputSnapshot::empty(), &mut session);
        assert!(!session.dialog_is_active());
    }

    #[test]
    fn held_interact_reopens_sign_under_per_poll_but_not_per_key_press() {
        for (policy, expected_reads) in [
            (PressDedupPolicy::PerPoll, 2),
            (PressDedupPolicy::PerKeyPress, 1),
        ] {
            let mut map = open_map("room", 10, 10);
            let reads = Rc::new(Cell::new(0));
            let inner = Rc::clone(&reads);
            map.add_event(
                MapEvent::new(TriggerKind::OnInteractPress, SideMask::all(), move |ctx| {
                    inner.set(inner.get() + 1);
                    ctx.open_dialog(["A sign."]);
                })
                .at(TilePos::new(5, 4)),
            );
            let (mut session, _) = single_map_session(map);
            let mut screen = OverworldScreen::new(OverworldConfig {
                press_dedup: policy,
                ..OverworldConfig::default()
            });
            let interact = held(InputAction::Interact);

            screen.handle_input(press(InputAction::Interact), &interact, &mut session);
            screen.handle_input(press(InputAction::Interact), &interact, &mut session);
            assert!(!session.dialog_is_active());
            screen.handle_input(InputEvent::Idle, &interact, &mut session);

            assert_eq!(reads.get(), expected_reads, "{policy:?}");
        }
    }

    #[test]
    fn debug_keys_need_debug_mode() {
        let (mut session, _) = single_map_session(open_map("room", 10, 10));
        let mut screen = overworld();
        let idle = InputSnapshot::empty();

        screen.handle_input(press(InputAction::ToggleCollisionBypass), &idle, &mut session);
        assert!(!screen.ignores_collisions());
        assert_eq!(
            screen.handle_input(press(InputAction::Reboot), &idle, &mut session),
            ScreenStatus::Continue
        );

        screen.handle_input(press(InputAction::ToggleDebug), &idle, &mut session);
        screen.handle_input(press(InputAction::ToggleCollisionBypass), &idle, &mut session);
        screen.handle_input(press(InputAction::ToggleCameraLock), &idle, &mut session);
        screen.handle_input(press(InputAction::ToggleLayer2), &idle, &mut session);
        assert!(screen.ignores_collisions());
        assert!(screen.view().camera_locked);
        assert_eq!(screen.view().layer_visible, [true, false, true]);
        assert_eq!(
            screen.handle_input(press(InputAction::Reboot), &idle, &mut session),
            ScreenStatus::Reboot
        );

        screen.handle_input(press(InputAction::ToggleDebug), &idle, &mut session);
        assert!(!screen.ignores_collisions());
        assert!(!screen.view().camera_locked);
    }

    #[test]
    fn collision_bypass_walks_through_walls() {
        let mut map = open_map("room", 10, 10);
        map.set_blocked(TilePos::new(5, 4), true);
        let (mut session, _) = single_map_session(map);
        let mut screen = debug_overworld();
        let up = held(InputAction::MoveUp);

        screen.handle_input(InputEvent::Idle, &up, &mut session);
        assert_eq!(session.player().position().tile(), TilePos::new(5, 5));

        screen.handle_input(press(InputAction::ToggleCollisionBypass), &up, &mut session);
        assert_eq!(session.player().position().tile(), TilePos::new(5, 4));
    }

    #[test]
    fn map_cycling_warps_to_fixed_tile_and_plays_track() {
        let (mut session, log) = session_at(
            vec![
                open_map("house", 10, 10),
                open_map("town", 10, 10),
                open_map("cave", 10, 10),
            ],
            TilePos::new(1, 1),
            Facing::Down,
        );
        let mut screen = debug_overworld();
        let up = held(InputAction::MoveUp);

        screen.handle_input(press(InputAction::PreviousMap), &up, &mut session);

        assert_eq!(session.current_map().name(), "cave");
        assert_eq!(session.player().position().tile(), DEBUG_WARP_TILE);
        assert_eq!(*log.borrow(), vec!["play:cave_theme"]);

        let mut target = FrameBuffer::new(16, 16);
        screen.update(&mut session, &mut target);
        screen.handle_input(press(InputAction::NextMap), &InputSnapshot::empty(), &mut session);
        screen.handle_input(press(InputAction::NextMap), &InputSnapshot::empty(), &mut session);
        assert_eq!(session.current_map().name(), "town");
    }

    #[test]
    fn event_teleport_is_applied_after_dispatch() {
        let mut map = open_map("house", 10, 10);
        map.add_event(
            MapEvent::new(TriggerKind::OnEnterTile, SideMask::all(), |ctx| {
                ctx.teleport(Teleport::new("town", TilePos::new(2, 3)).facing(Facing::Down));
            })
            .at(TilePos::new(5, 4)),
        );
        let (mut session, log) = session_at(
            vec![map, open_map("town", 10, 10)],
            TilePos::new(5, 5),
            Facing::Up,
        );
        let mut screen = overworld();
        let up = held(InputAction::MoveUp);

        screen.handle_input(InputEvent::Idle, &up, &mut session);
        assert_eq!(session.current_map().name(), "town");
        assert_eq!(session.player().position().tile(), TilePos::new(2, 3));

        screen.handle_input(InputEvent::Idle, &up, &mut session);
        assert_eq!(session.player().position().tile(), TilePos::new(2, 3));
        assert_eq!(*log.borrow(), vec!["play:town_theme"]);
    }

    #[test]
    fn locked_camera_pans_instead_of_following() {
        let (mut session, _) = single_map_session(open_map("room", 10, 10));
        let mut screen = debug_overworld();
        let mut target = FrameBuffer::new(16, 16);
        screen.update(&mut session, &mut target);
        let start = screen.view().camera_px;

        screen.handle_input(
            press(InputAction::ToggleCameraLock),
            &held(InputAction::CameraRight),
            &mut session,
        );
        screen.update(&mut session, &mut target);

        assert_eq!(screen.view().camera_px, (start.0 + 4, start.1));
    }

    #[test]
    fn config_fills_missing_fields_with_defaults() {
        let config: OverworldConfig = serde_json::from_str(
            r#"{
                "start_in_debug_mode": true,
                "debug_teleport": { "map": "cave", "tile": [2, 7], "facing": "left" }
            }"#,
        )
        .expect("config");

        assert!(config.start_in_debug_mode);
        assert_eq!(config.press_dedup, PressDedupPolicy::PerPoll);
        assert_eq!(config.camera_pan_step_px, 4);
        assert_eq!(
            config.debug_teleport,
            Some(Teleport::new("cave", TilePos::new(2, 7)).facing(Facing::Left))
        );
    }

    #[test]
    fn debug_teleport_uses_configured_target() {
        let (mut session, _) = session_at(
            vec![open_map("house", 10, 10), open_map("cave", 10, 10)],
            TilePos::new(1, 1),
            Facing::Down,
        );
        let idle = InputSnapshot::empty();

        let mut unset = debug_overworld();
        unset.handle_input(press(InputAction::DebugTeleport), &idle, &mut session);
        assert_eq!(session.current_map().name(), "house");

        let mut screen = OverworldScreen::new(OverworldConfig {
            start_in_debug_mode: true,
            debug_teleport: Some(Teleport::new("cave", TilePos::new(2, 7)).facing(Facing::Left)),
            ..OverworldConfig::default()
        });
        screen.handle_input(press(InputAction::DebugTeleport), &idle, &mut session);
        assert_eq!(session.current_map().name(), "cave");
        assert_eq!(session.player().position().tile(), TilePos::new(2, 7));
        assert_eq!(session.player().position().facing(), Facing::Left);
    }

    #[test]
    fn ambient_hooks_pause_while_dialog_open() {
        let mut map = open_map("room", 10, 10);
        map.add_event(
            MapEvent::new(TriggerKind::OnInteractPress, SideMask::all(), |_ctx| {})
                .at(TilePos::new(0, 0))
                .with_ambient(|tile, _ctx| tile.x += 1),
        );
        let (mut session, _) = single_map_session(map);
        let mut screen = overworld();
        let mut target = FrameBuffer::new(16, 16);

        screen.update(&mut session, &mut target);
        session.open_dialog(["wait"]);
        screen.update(&mut session, &mut target);

        assert_eq!(session.current_map().events()[0].tile(), TilePos::new(1, 0));
    }
}
