use thiserror::Error;
use tracing::info;

use crate::world::{MapError, Session};

use super::{Canvas, Drawable, InputEvent, InputSnapshot, RenderTarget};

/// Frames the generic loading indicator stays up after a non-silent
/// transition.
pub const LOADING_INDICATOR_FRAMES: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenKind {
    Overworld,
    Battle,
    Menu,
    Animation,
}

/// What the active screen asks the driver to do after a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenStatus {
    Continue,
    /// Push the screen's successor, showing the loading indicator.
    Advance,
    /// Push the screen's successor without the loading indicator.
    AdvanceSilent,
    /// Drop this screen and resume the one beneath it.
    Previous,
    PreviousSilent,
    /// Rebuild the session and root screen from scratch.
    Reboot,
    Stop,
}

impl ScreenStatus {
    pub fn is_silent(self) -> bool {
        matches!(
            self,
            ScreenStatus::Continue | ScreenStatus::AdvanceSilent | ScreenStatus::PreviousSilent
        )
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ScreenError {
    #[error("unexpected transition code {code} while choosing {context}")]
    UnexpectedTransition { code: u8, context: &'static str },
    #[error("{screen:?} screen asked to advance but produced no successor")]
    MissingSuccessor { screen: ScreenKind },
    #[error("battle transition requested without a declared battle")]
    MissingBattle,
    #[error("failed to rebuild the session: {0}")]
    Rebuild(#[from] MapError),
}

/// One self-contained mode of the game (exploration, battle, menu,
/// transition animation). Exactly one screen is active at a time.
pub trait Screen {
    fn kind(&self) -> ScreenKind;
    /// Reacts to one queued input event. Must not block.
    fn handle_input(
        &mut self,
        event: InputEvent,
        input: &InputSnapshot,
        session: &mut Session,
    ) -> ScreenStatus;
    /// Advances one frame and draws it.
    fn update(&mut self, session: &mut Session, target: &mut dyn RenderTarget) -> ScreenStatus;
    /// Builds the successor after an advance status and parks it in the
    /// screen's pending slot.
    fn produce_next_screen(&mut self, _session: &mut Session) -> Result<(), ScreenError> {
        Err(ScreenError::MissingSuccessor {
            screen: self.kind(),
        })
    }
    fn take_next_screen(&mut self) -> Option<Box<dyn Screen>> {
        None
    }
    fn suspend(&mut self, _session: &mut Session) {}
    fn resume(&mut self, _session: &mut Session) {}
    fn debug_title(&self, _session: &Session) -> Option<String> {
        None
    }
}

/// Single pending-successor slot owned by a screen.
#[derive(Default)]
pub struct NextScreenSlot {
    next: Option<Box<dyn Screen>>,
}

impl NextScreenSlot {
    pub fn put(&mut self, screen: Box<dyn Screen>) {
        self.next = Some(screen);
    }

    pub fn take(&mut self) -> Option<Box<dyn Screen>> {
        self.next.take()
    }
}

impl std::fmt::Debug for NextScreenSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NextScreenSlot")
            .field("next", &self.next.as_ref().map(|screen| screen.kind()))
            .finish()
    }
}

pub type Bootstrap = Box<dyn FnMut() -> Result<(Session, Box<dyn Screen>), ScreenError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameOutcome {
    /// The run is over: the root screen was dropped or a screen stopped.
    pub exit: bool,
    /// Non-continue status applied this frame.
    pub transition: Option<ScreenStatus>,
    /// The loading indicator was drawn over this frame.
    pub loading: bool,
}

/// Drives the active screen and applies the status it returns.
pub struct ScreenMachine {
    session: Session,
    stack: Vec<Box<dyn Screen>>,
    bootstrap: Bootstrap,
    loading_frames: u32,
    stopped: bool,
}

impl ScreenMachine {
    pub fn new(mut bootstrap: Bootstrap) -> Result<Self, ScreenError> {
        let (session, root) = bootstrap()?;
        info!(screen = ?root.kind(), map = session.current_map().name(), "screen_loaded");
        Ok(Self {
            session,
            stack: vec![root],
            bootstrap,
            loading_frames: 0,
            stopped: false,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn active_kind(&self) -> Option<ScreenKind> {
        self.stack.last().map(|screen| screen.kind())
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn debug_title_active(&self) -> Option<String> {
        self.stack
            .last()
            .and_then(|screen| screen.debug_title(&self.session))
    }

    /// Runs one frame: every queued event through `handle_input` (an idle
    /// event when none are queued), then `update`. The first non-continue
    /// input status drops the remaining events and wins over whatever
    /// `update` returns; `update` still runs so the frame is drawn before
    /// the transition is applied.
    pub fn run_frame(
        &mut self,
        events: &[InputEvent],
        input: &InputSnapshot,
        target: &mut dyn RenderTarget,
    ) -> Result<FrameOutcome, ScreenError> {
        let exited = FrameOutcome {
            exit: true,
            ..FrameOutcome::default()
        };
        if self.stopped {
            return Ok(exited);
        }
        let Some(screen) = self.stack.last_mut() else {
            return Ok(exited);
        };

        let idle = [InputEvent::Idle];
        let events = if events.is_empty() { &idle[..] } else { events };
        let mut status = ScreenStatus::Continue;
        for event in events {
            status = screen.handle_input(*event, input, &mut self.session);
            if status != ScreenStatus::Continue {
                break;
            }
        }
        let updated = screen.update(&mut self.session, target);
        if status == ScreenStatus::Continue {
            status = updated;
        }

        let mut outcome = self.apply_status(status)?;
        if self.loading_frames > 0 {
            target.draw(&LoadingIndicator {
                frames_left: self.loading_frames,
            });
            self.loading_frames -= 1;
            outcome.loading = true;
        }
        Ok(outcome)
    }

    fn apply_status(&mut self, status: ScreenStatus) -> Result<FrameOutcome, ScreenError> {
        let mut outcome = FrameOutcome::default();
        if status == ScreenStatus::Continue {
            return Ok(outcome);
        }
        outcome.transition = Some(status);
        if !status.is_silent() {
            self.loading_frames = LOADING_INDICATOR_FRAMES;
        }

        match status {
            ScreenStatus::Continue => {}
            ScreenStatus::Advance | ScreenStatus::AdvanceSilent => {
                let depth = self.stack.len() + 1;
                let Some(screen) = self.stack.last_mut() else {
                    outcome.exit = true;
                    return Ok(outcome);
                };
                screen.produce_next_screen(&mut self.session)?;
                let next = screen
                    .take_next_screen()
                    .ok_or(ScreenError::MissingSuccessor {
                        screen: screen.kind(),
                    })?;
                screen.suspend(&mut self.session);
                info!(
                    from = ?screen.kind(),
                    to = ?next.kind(),
                    silent = status.is_silent(),
                    depth,
                    "screen_advanced"
                );
                self.stack.push(next);
            }
            ScreenStatus::Previous | ScreenStatus::PreviousSilent => {
                let finished = self.stack.pop().map(|screen| screen.kind());
                let depth = self.stack.len();
                match self.stack.last_mut() {
                    Some(screen) => {
                        screen.resume(&mut self.session);
                        info!(
                            from = ?finished,
                            to = ?screen.kind(),
                            silent = status.is_silent(),
                            depth,
                            "screen_returned"
                        );
                    }
                    None => {
                        info!(from = ?finished, "root_screen_closed");
                        self.stopped = true;
                        outcome.exit = true;
                    }
                }
            }
            ScreenStatus::Reboot => {
                let (session, root) = (self.bootstrap)()?;
                self.suspend_all();
                self.session = session;
                info!(screen = ?root.kind(), map = self.session.current_map().name(), "screen_rebooted");
                self.stack.push(root);
            }
            ScreenStatus::Stop => {
                info!(screen = ?self.active_kind(), "screen_stopped");
                self.stopped = true;
                outcome.exit = true;
            }
        }
        Ok(outcome)
    }

    /// Suspends and drops every screen, top first.
    pub fn shutdown_all(&mut self) {
        self.suspend_all();
        self.stopped = true;
    }

    fn suspend_all(&mut self) {
        while let Some(mut screen) = self.stack.pop() {
            screen.suspend(&mut self.session);
        }
    }
}

const LOADING_BAR_COLOR: [u8; 4] = [240, 240, 240, 220];
const LOADING_BACK_COLOR: [u8; 4] = [0, 0, 0, 160];

struct LoadingIndicator {
    frames_left: u32,
}

impl Drawable for LoadingIndicator {
    fn draw(&self, canvas: &mut Canvas<'_>) {
        let width = (canvas.width() / 4).max(8);
        let height = 8;
        let x = canvas.width() as i32 - width as i32 - 12;
        let y = canvas.height() as i32 - height as i32 - 12;
        canvas.fill_rect(x, y, width, height, LOADING_BACK_COLOR);
        let elapsed = LOADING_INDICATOR_FRAMES.saturating_sub(self.frames_left) + 1;
        let filled = width * elapsed.min(LOADING_INDICATOR_FRAMES) / LOADING_INDICATOR_FRAMES;
        canvas.fill_rect(x, y, filled, height, LOADING_BAR_COLOR);
        canvas.outline_rect(x, y, width, height, LOADING_BAR_COLOR);
    }
}
