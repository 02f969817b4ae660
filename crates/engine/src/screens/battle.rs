use tracing::info;

use crate::app::{
    Canvas, Drawable, InputAction, InputEvent, InputSnapshot, RenderTarget, Screen, ScreenKind,
    ScreenStatus,
};
use crate::world::{DeclaredBattle, Session};

pub const BATTLE_TRACK: &str = "battle";

const ARENA_COLOR: [u8; 4] = [24, 60, 36, 255];
const GROUND_COLOR: [u8; 4] = [70, 120, 60, 255];
const PLAYER_COLOR: [u8; 4] = [70, 130, 230, 255];
const OPPONENT_COLOR: [u8; 4] = [220, 80, 70, 255];
const PROMPT_COLOR: [u8; 4] = [240, 240, 240, 255];

/// Placeholder encounter. Shows both sides and resolves on interact; the
/// rules of a fight live outside this engine.
#[derive(Debug)]
pub struct BattleScreen {
    battle: DeclaredBattle,
    music_started: bool,
    frames: u32,
}

impl BattleScreen {
    pub fn new(battle: DeclaredBattle) -> Self {
        Self {
            battle,
            music_started: false,
            frames: 0,
        }
    }

    pub fn battle(&self) -> &DeclaredBattle {
        &self.battle
    }
}

struct BattleFrame {
    frames: u32,
}

impl Drawable for BattleFrame {
    fn draw(&self, canvas: &mut Canvas<'_>) {
        let (width, height) = (canvas.width(), canvas.height());
        canvas.clear(ARENA_COLOR);
        let ground_top = (height * 2 / 3) as i32;
        canvas.fill_rect(0, ground_top, width, height / 3 + 1, GROUND_COLOR);

        let size = (width.min(height) / 5).max(2);
        canvas.fill_rect(
            (width / 5) as i32,
            ground_top - size as i32,
            size,
            size,
            PLAYER_COLOR,
        );
        canvas.fill_rect(
            (width * 3 / 5) as i32,
            (height / 5) as i32,
            size,
            size,
            OPPONENT_COLOR,
        );

        // Blinking prompt in the bottom-right corner.
        if (self.frames / 30) % 2 == 0 {
            canvas.fill_rect(width as i32 - 20, height as i32 - 14, 8, 8, PROMPT_COLOR);
        }
    }
}

impl Screen for BattleScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::Battle
    }

    fn handle_input(
        &mut self,
        event: InputEvent,
        _input: &InputSnapshot,
        session: &mut Session,
    ) -> ScreenStatus {
        if !event.is_press(InputAction::Interact) {
            return ScreenStatus::Continue;
        }
        self.battle.finish();
        let resolved = session.finish_declared_battle();
        info!(opponent = self.battle.opponent(), resolved, "battle_resolved");
        ScreenStatus::Previous
    }

    fn update(&mut self, session: &mut Session, target: &mut dyn RenderTarget) -> ScreenStatus {
        if !self.music_started {
            session.jukebox_mut().play(BATTLE_TRACK);
            self.music_started = true;
        }
        self.frames = self.frames.wrapping_add(1);
        target.draw(&BattleFrame {
            frames: self.frames,
        });
        ScreenStatus::Continue
    }

    fn debug_title(&self, _session: &Session) -> Option<String> {
        Some(format!("Battle vs {}", self.battle.opponent()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::FrameBuffer;
    use crate::test_support::{open_map, session_at};
    use crate::world::{Facing, TilePos};

    #[test]
    fn plays_battle_track_once() {
        let (mut session, log) = session_at(vec![open_map("m", 4, 4)], TilePos::new(0, 0), Facing::Down);
        let mut screen = BattleScreen::new(DeclaredBattle::new("Rival"));
        let mut target = FrameBuffer::new(20, 20);

        screen.update(&mut session, &mut target);
        screen.update(&mut session, &mut target);

        assert_eq!(*log.borrow(), vec!["play:battle"]);
    }

    #[test]
    fn interact_finishes_session_battle_and_returns() {
        let (mut session, _) = session_at(vec![open_map("m", 4, 4)], TilePos::new(0, 0), Facing::Down);
        session.declare_battle("Rival");
        let battle = session.declared_battle().cloned().expect("battle");
        let mut screen = BattleScreen::new(battle);

        let idle = screen.handle_input(InputEvent::Idle, &InputSnapshot::empty(), &mut session);
        assert_eq!(idle, ScreenStatus::Continue);
        assert!(!session.declared_battle().expect("battle").is_finished());

        let status = screen.handle_input(
            InputEvent::Pressed(InputAction::Interact),
            &InputSnapshot::empty(),
            &mut session,
        );
        assert_eq!(status, ScreenStatus::Previous);
        assert!(session.declared_battle().expect("battle").is_finished());
        assert!(screen.battle().is_finished());
    }
}
