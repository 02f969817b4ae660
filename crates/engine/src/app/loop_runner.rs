use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use image::ImageError;
use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{error, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::WindowBuilder;

use crate::StartupError;

use super::input::ActionStates;
use super::metrics::MetricsAccumulator;
use super::{
    Bootstrap, FrameBuffer, InputAction, InputEvent, InputSnapshot, KeyBindings, RenderTarget,
    Renderer, ScreenError, ScreenMachine,
};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub max_render_fps: Option<u32>,
    /// Where the screenshot key writes PNG files. Screenshots are disabled
    /// when unset.
    pub screenshot_dir: Option<PathBuf>,
    pub key_bindings: KeyBindings,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Adventure".to_string(),
            window_width: 960,
            window_height: 640,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            max_render_fps: None,
            screenshot_dir: None,
            key_bindings: KeyBindings::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
    #[error("screen failure: {0}")]
    Screen(#[from] ScreenError),
}

pub fn run_app(config: LoopConfig, bootstrap: Bootstrap) -> Result<(), AppError> {
    let mut machine = ScreenMachine::new(bootstrap)?;

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;
    let viewport = renderer.viewport();
    let mut frame_buffer = FrameBuffer::new(viewport.width, viewport.height);

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let effective_render_cap = normalize_render_fps_cap(config.max_render_fps);
    let render_frame_target = target_frame_duration(effective_render_cap);
    let mut input_collector =
        InputCollector::new(config.key_bindings.clone(), viewport.width, viewport.height);

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        render_fps_cap = %format_render_cap(effective_render_cap),
        screenshots = config.screenshot_dir.is_some(),
        "loop_config"
    );

    let fatal: Rc<RefCell<Option<ScreenError>>> = Rc::default();
    let fatal_in_loop = Rc::clone(&fatal);
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    input_collector.set_window_size(new_size.width, new_size.height);
                    frame_buffer.resize(new_size.width, new_size.height);
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    input_collector.set_window_size(size.width, size.height);
                    frame_buffer.resize(size.width, size.height);
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_key(event.physical_key, event.state);
                    if input_collector.quit_requested {
                        info!(reason = "quit_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                    accumulator = accumulator.saturating_add(clamped_frame_dt);

                    let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    // Queued events belong to the first tick; later ticks poll held keys only.
                    let mut events = if step_plan.ticks_to_run > 0 {
                        input_collector.take_events()
                    } else {
                        Vec::new()
                    };
                    for _ in 0..step_plan.ticks_to_run {
                        let snapshot = input_collector.snapshot();
                        let result = machine.run_frame(&events, &snapshot, &mut frame_buffer);
                        events.clear();
                        metrics_accumulator.record_tick();
                        match result {
                            Ok(outcome) => {
                                if outcome.transition.is_some() {
                                    metrics_accumulator.record_transition();
                                }
                                if outcome.exit {
                                    info!(reason = "screen_exit", "shutdown_requested");
                                    window_target.exit();
                                    break;
                                }
                            }
                            Err(screen_error) => {
                                error!(error = %screen_error, "screen_failed");
                                *fatal_in_loop.borrow_mut() = Some(screen_error);
                                window_target.exit();
                                break;
                            }
                        }
                    }
                    accumulator = step_plan.remaining_accumulator;

                    if step_plan.dropped_backlog > Duration::ZERO {
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame, "sim_clamp_triggered"
                        );
                    }

                    if input_collector.take_screenshot_pressed() {
                        match config.screenshot_dir.as_deref() {
                            Some(dir) => match save_screenshot(&frame_buffer, dir) {
                                Ok(path) => info!(path = %path.display(), "screenshot_saved"),
                                Err(error) => warn!(error = %error, "screenshot_failed"),
                            },
                            None => warn!("screenshot_dir_unset"),
                        }
                    }

                    let elapsed_since_last_present =
                        Instant::now().saturating_duration_since(last_present_instant);
                    let cap_sleep =
                        compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }

                    if let Err(error) = renderer.present(&frame_buffer) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    last_present_instant = Instant::now();
                    let next_title = machine.debug_title_active();
                    if next_title != last_applied_title {
                        window.set_title(next_title.as_deref().unwrap_or(&config.window_title));
                        last_applied_title = next_title;
                    }
                    metrics_accumulator.record_frame(raw_frame_dt);

                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            transitions = snapshot.transitions,
                            screen = ?machine.active_kind(),
                            depth = machine.depth(),
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                machine.shutdown_all();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)?;

    let failure = fatal.borrow_mut().take();
    match failure {
        Some(screen_error) => Err(AppError::Screen(screen_error)),
        None => Ok(()),
    }
}

fn save_screenshot(frame: &FrameBuffer, dir: &Path) -> Result<PathBuf, ImageError> {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    let path = dir.join(format!("screenshot-{stamp}.png"));
    frame.capture_snapshot().save_png(&path)?;
    Ok(path)
}

/// Turns key transitions into ordered press/release events plus held state.
/// Auto-repeat presses of a key that is already down produce no event.
#[derive(Debug)]
struct InputCollector {
    bindings: KeyBindings,
    quit_requested: bool,
    screenshot_pressed_edge: bool,
    action_states: ActionStates,
    pending_events: Vec<InputEvent>,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(bindings: KeyBindings, window_width: u32, window_height: u32) -> Self {
        Self {
            bindings,
            quit_requested: false,
            screenshot_pressed_edge: false,
            action_states: ActionStates::default(),
            pending_events: Vec::new(),
            window_width,
            window_height,
        }
    }

    fn handle_key(&mut self, key: PhysicalKey, state: ElementState) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        let Some(action) = self.bindings.action_for(code) else {
            return;
        };
        let was_down = self.action_states.is_down(action);
        match state {
            ElementState::Pressed => {
                if was_down {
                    return;
                }
                self.action_states.set(action, true);
                self.pending_events.push(InputEvent::Pressed(action));
                match action {
                    InputAction::Quit => self.quit_requested = true,
                    InputAction::Screenshot => self.screenshot_pressed_edge = true,
                    _ => {}
                }
            }
            ElementState::Released => {
                if !was_down {
                    return;
                }
                self.action_states.set(action, false);
                self.pending_events.push(InputEvent::Released(action));
            }
        }
    }

    fn take_events(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn snapshot(&self) -> InputSnapshot {
        InputSnapshot::new(self.action_states, self.window_width, self.window_height)
    }

    fn take_screenshot_pressed(&mut self) -> bool {
        std::mem::take(&mut self.screenshot_pressed_edge)
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;
    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_render_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use winit::keyboard::KeyCode;

    use super::*;

    fn collector() -> InputCollector {
        InputCollector::new(KeyBindings::default(), 320, 240)
    }

    fn key(code: KeyCode) -> PhysicalKey {
        PhysicalKey::Code(code)
    }

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let clamped = clamp_frame_delta(Duration::from_millis(900), Duration::from_millis(250));
        assert_eq!(clamped, Duration::from_millis(250));
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(10);
        let plan = plan_sim_steps(Duration::from_millis(35), fixed_dt, 5);
        assert_eq!(plan.ticks_to_run, 3);
        assert_eq!(plan.remaining_accumulator, Duration::from_millis(5));
        assert_eq!(plan.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let fixed_dt = Duration::from_millis(10);
        let plan = plan_sim_steps(Duration::from_millis(95), fixed_dt, 5);
        assert_eq!(plan.ticks_to_run, 5);
        assert_eq!(plan.remaining_accumulator, Duration::ZERO);
        assert_eq!(plan.dropped_backlog, Duration::from_millis(45));
    }

    #[test]
    fn press_and_release_produce_ordered_events() {
        let mut input = collector();
        input.handle_key(key(KeyCode::KeyM), ElementState::Pressed);
        input.handle_key(key(KeyCode::Enter), ElementState::Pressed);
        input.handle_key(key(KeyCode::KeyM), ElementState::Released);

        assert_eq!(
            input.take_events(),
            vec![
                InputEvent::Pressed(InputAction::Menu),
                InputEvent::Pressed(InputAction::Interact),
                InputEvent::Released(InputAction::Menu),
            ]
        );
        assert!(input.take_events().is_empty());
        let snapshot = input.snapshot();
        assert!(snapshot.is_down(InputAction::Interact));
        assert!(!snapshot.is_down(InputAction::Menu));
    }

    #[test]
    fn held_key_does_not_repeat_press_events() {
        let mut input = collector();
        for _ in 0..3 {
            input.handle_key(key(KeyCode::ArrowUp), ElementState::Pressed);
        }
        assert_eq!(
            input.take_events(),
            vec![InputEvent::Pressed(InputAction::MoveUp)]
        );
        assert!(input.snapshot().is_down(InputAction::MoveUp));
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let mut input = collector();
        input.handle_key(key(KeyCode::KeyQ), ElementState::Pressed);
        input.handle_key(key(KeyCode::ArrowUp), ElementState::Released);
        assert!(input.take_events().is_empty());
        assert_eq!(input.snapshot(), InputSnapshot::new(ActionStates::default(), 320, 240));
    }

    #[test]
    fn quit_and_screenshot_keys_set_flags() {
        let mut input = collector();
        input.handle_key(key(KeyCode::F2), ElementState::Pressed);
        assert!(input.take_screenshot_pressed());
        assert!(!input.take_screenshot_pressed());
        assert!(!input.quit_requested);
        input.handle_key(key(KeyCode::Escape), ElementState::Pressed);
        assert!(input.quit_requested);
    }

    #[test]
    fn snapshot_carries_window_size() {
        let mut input = collector();
        input.set_window_size(800, 600);
        assert_eq!(input.snapshot().window_size(), (800, 600));
    }

    #[test]
    fn target_frame_duration_none_when_cap_off() {
        assert_eq!(target_frame_duration(None), None);
        assert_eq!(normalize_render_fps_cap(Some(0)), None);
    }

    #[test]
    fn compute_cap_sleep_only_when_under_budget() {
        let target = Some(Duration::from_millis(16));
        assert_eq!(
            compute_cap_sleep(Duration::from_millis(20), target),
            Duration::ZERO
        );
        assert_eq!(
            compute_cap_sleep(Duration::from_millis(10), target),
            Duration::from_millis(6)
        );
    }
}
