use std::collections::HashMap;

use thiserror::Error;
use winit::keyboard::KeyCode;

use super::InputAction;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyBindingError {
    #[error("unknown key name `{name}` bound to {action:?}")]
    UnknownKey { action: InputAction, name: String },
    #[error("no keys bound to {0:?}")]
    Unbound(InputAction),
}

const DEFAULT_BINDINGS: &[(KeyCode, InputAction)] = &[
    (KeyCode::ArrowUp, InputAction::MoveUp),
    (KeyCode::KeyW, InputAction::MoveUp),
    (KeyCode::ArrowDown, InputAction::MoveDown),
    (KeyCode::KeyS, InputAction::MoveDown),
    (KeyCode::ArrowLeft, InputAction::MoveLeft),
    (KeyCode::KeyA, InputAction::MoveLeft),
    (KeyCode::ArrowRight, InputAction::MoveRight),
    (KeyCode::KeyD, InputAction::MoveRight),
    (KeyCode::Enter, InputAction::Interact),
    (KeyCode::KeyZ, InputAction::Interact),
    (KeyCode::Space, InputAction::Interact),
    (KeyCode::KeyM, InputAction::Menu),
    (KeyCode::Backspace, InputAction::Back),
    (KeyCode::KeyX, InputAction::Back),
    (KeyCode::Numpad8, InputAction::CameraUp),
    (KeyCode::Numpad2, InputAction::CameraDown),
    (KeyCode::Numpad4, InputAction::CameraLeft),
    (KeyCode::Numpad6, InputAction::CameraRight),
    (KeyCode::Numpad5, InputAction::ToggleCameraLock),
    (KeyCode::Equal, InputAction::ToggleDebug),
    (KeyCode::KeyR, InputAction::Reboot),
    (KeyCode::F10, InputAction::ToggleLayer1),
    (KeyCode::F11, InputAction::ToggleLayer2),
    (KeyCode::F12, InputAction::ToggleLayer3),
    (KeyCode::KeyC, InputAction::ToggleCollisionOverlay),
    (KeyCode::KeyN, InputAction::ToggleCollisionBypass),
    (KeyCode::PageUp, InputAction::PreviousMap),
    (KeyCode::PageDown, InputAction::NextMap),
    (KeyCode::KeyB, InputAction::DebugTeleport),
    (KeyCode::F2, InputAction::Screenshot),
    (KeyCode::Escape, InputAction::Quit),
];

/// Physical key to action table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    by_key: HashMap<KeyCode, InputAction>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            by_key: DEFAULT_BINDINGS.iter().copied().collect(),
        }
    }
}

impl KeyBindings {
    pub fn action_for(&self, key: KeyCode) -> Option<InputAction> {
        self.by_key.get(&key).copied()
    }

    pub fn keys_for(&self, action: InputAction) -> Vec<KeyCode> {
        let mut keys: Vec<KeyCode> = self
            .by_key
            .iter()
            .filter(|(_, bound)| **bound == action)
            .map(|(key, _)| *key)
            .collect();
        keys.sort_by_key(|key| format!("{key:?}"));
        keys
    }

    /// Replaces the keys of every action named in `overrides`. Actions not
    /// named keep their current keys; a key taken by an override is removed
    /// from whatever action it was bound to before.
    pub fn with_overrides(
        mut self,
        overrides: &HashMap<InputAction, Vec<String>>,
    ) -> Result<Self, KeyBindingError> {
        let mut parsed = Vec::new();
        for (action, names) in overrides {
            if names.is_empty() {
                return Err(KeyBindingError::Unbound(*action));
            }
            for name in names {
                let key = key_code_from_name(name).ok_or_else(|| KeyBindingError::UnknownKey {
                    action: *action,
                    name: name.clone(),
                })?;
                parsed.push((key, *action));
            }
        }
        self.by_key
            .retain(|_, action| !overrides.contains_key(action));
        self.by_key.extend(parsed);
        Ok(self)
    }
}

/// Parses a key name as written in config files: winit `KeyCode` variant
/// names (`ArrowUp`, `KeyW`, `Numpad5`, `F10`) or a single letter or digit.
pub fn key_code_from_name(name: &str) -> Option<KeyCode> {
    let name = name.trim();
    if let Some(key) = single_char_key(name) {
        return Some(key);
    }
    if let Some(letter) = name.strip_prefix("Key") {
        return single_char_key(letter).filter(|_| letter.chars().all(|c| c.is_ascii_alphabetic()));
    }
    if let Some(digit) = name.strip_prefix("Digit") {
        return single_char_key(digit).filter(|_| digit.chars().all(|c| c.is_ascii_digit()));
    }
    let key = match name {
        "ArrowUp" => KeyCode::ArrowUp,
        "ArrowDown" => KeyCode::ArrowDown,
        "ArrowLeft" => KeyCode::ArrowLeft,
        "ArrowRight" => KeyCode::ArrowRight,
        "Enter" => KeyCode::Enter,
        "Space" => KeyCode::Space,
        "Backspace" => KeyCode::Backspace,
        "Escape" => KeyCode::Escape,
        "Tab" => KeyCode::Tab,
        "Equal" => KeyCode::Equal,
        "Minus" => KeyCode::Minus,
        "PageUp" => KeyCode::PageUp,
        "PageDown" => KeyCode::PageDown,
        "Home" => KeyCode::Home,
        "End" => KeyCode::End,
        "ShiftLeft" => KeyCode::ShiftLeft,
        "ShiftRight" => KeyCode::ShiftRight,
        "ControlLeft" => KeyCode::ControlLeft,
        "ControlRight" => KeyCode::ControlRight,
        "F1" => KeyCode::F1,
        "F2" => KeyCode::F2,
        "F3" => KeyCode::F3,
        "F4" => KeyCode::F4,
        "F5" => KeyCode::F5,
        "F6" => KeyCode::F6,
        "F7" => KeyCode::F7,
        "F8" => KeyCode::F8,
        "F9" => KeyCode::F9,
        "F10" => KeyCode::F10,
        "F11" => KeyCode::F11,
        "F12" => KeyCode::F12,
        "Numpad0" => KeyCode::Numpad0,
        "Numpad1" => KeyCode::Numpad1,
        "Numpad2" => KeyCode::Numpad2,
        "Numpad3" => KeyCode::Numpad3,
        "Numpad4" => KeyCode::Numpad4,
        "Numpad5" => KeyCode::Numpad5,
        "Numpad6" => KeyCode::Numpad6,
        "Numpad7" => KeyCode::Numpad7,
        "Numpad8" => KeyCode::Numpad8,
        "Numpad9" => KeyCode::Numpad9,
        "NumpadEnter" => KeyCode::NumpadEnter,
        _ => return None,
    };
    Some(key)
}

fn single_char_key(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    let c = chars.next()?.to_ascii_uppercase();
    if chars.next().is_some() {
        return None;
    }
    let key = match c {
        'A' => KeyCode::KeyA,
        'B' => KeyCode::KeyB,
        'C' => KeyCode::KeyC,
        'D' => KeyCode::KeyD,
        'E' => KeyCode::KeyE,
        'F' => KeyCode::KeyF,
        'G' => KeyCode::KeyG,
        'H' => KeyCode::KeyH,
        'I' => KeyCode::KeyI,
        'J' => KeyCode::KeyJ,
        'K' => KeyCode::KeyK,
        'L' => KeyCode::KeyL,
        'M' => KeyCode::KeyM,
        'N' => KeyCode::KeyN,
        'O' => KeyCode::KeyO,
        'P' => KeyCode::KeyP,
        'Q' => KeyCode::KeyQ,
        'R' => KeyCode::KeyR,
        'S' => KeyCode::KeyS,
        'T' => KeyCode::KeyT,
        'U' => KeyCode::KeyU,
        'V' => KeyCode::KeyV,
        'W' => KeyCode::KeyW,
        'X' => KeyCode::KeyX,
        'Y' => KeyCode::KeyY,
        'Z' => KeyCode::KeyZ,
        '0' => KeyCode::Digit0,
        '1' => KeyCode::Digit1,
        '2' => KeyCode::Digit2,
        '3' => KeyCode::Digit3,
        '4' => KeyCode::Digit4,
        '5' => KeyCode::Digit5,
        '6' => KeyCode::Digit6,
        '7' => KeyCode::Digit7,
        '8' => KeyCode::Digit8,
        '9' => KeyCode::Digit9,
        '=' => KeyCode::Equal,
        _ => return None,
    };
    Some(key)
}
