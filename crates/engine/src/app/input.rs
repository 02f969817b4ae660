use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Interact,
    Menu,
    Back,
    CameraUp,
    CameraDown,
    CameraLeft,
    CameraRight,
    ToggleDebug,
    Reboot,
    ToggleLayer1,
    ToggleLayer2,
    ToggleLayer3,
    ToggleCollisionOverlay,
    ToggleCollisionBypass,
    ToggleCameraLock,
    PreviousMap,
    NextMap,
    DebugTeleport,
    Screenshot,
    Quit,
}

const ACTION_COUNT: usize = 24;

impl InputAction {
    pub const ALL: [InputAction; ACTION_COUNT] = [
        InputAction::MoveUp,
        InputAction::MoveDown,
        InputAction::MoveLeft,
        InputAction::MoveRight,
        InputAction::Interact,
        InputAction::Menu,
        InputAction::Back,
        InputAction::CameraUp,
        InputAction::CameraDown,
        InputAction::CameraLeft,
        InputAction::CameraRight,
        InputAction::ToggleDebug,
        InputAction::Reboot,
        InputAction::ToggleLayer1,
        InputAction::ToggleLayer2,
        InputAction::ToggleLayer3,
        InputAction::ToggleCollisionOverlay,
        InputAction::ToggleCollisionBypass,
        InputAction::ToggleCameraLock,
        InputAction::PreviousMap,
        InputAction::NextMap,
        InputAction::DebugTeleport,
        InputAction::Screenshot,
        InputAction::Quit,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

/// One discrete input occurrence, delivered to the active screen in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Stands in for an empty queue so screens still poll held keys once per
    /// frame.
    Idle,
    Pressed(InputAction),
    Released(InputAction),
}

impl InputEvent {
    /// The action this event pressed, if any.
    pub fn pressed(self) -> Option<InputAction> {
        match self {
            InputEvent::Pressed(action) => Some(action),
            _ => None,
        }
    }

    pub fn is_press(self, action: InputAction) -> bool {
        self == InputEvent::Pressed(action)
    }
}

/// Held state of every action at the time of the frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    actions: ActionStates,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(actions: ActionStates, window_width: u32, window_height: u32) -> Self {
        Self {
            actions,
            window_width,
            window_height,
        }
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}
