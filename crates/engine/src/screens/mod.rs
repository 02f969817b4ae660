mod animation;
mod battle;
mod menu;
pub mod overworld;

pub use animation::{AnimationScreen, WooshDirection};
pub use battle::{BattleScreen, BATTLE_TRACK};
pub use menu::{MenuItem, MenuScreen};
pub use overworld::{OverworldConfig, OverworldScreen, TransitionRequest};
