//! Claire face demo -- main loop and application entry point.
//!
//! winit drives the event loop via `ApplicationHandler`. Each `RedrawRequested`
//! is one frame:
//!
//!   1. `begin_frame()` -- sample the wall clock
//!   2. `FaceController::update` -- edge-triggered W/E/R presses advance the
//!      eyes/eyebrows/mouth atlas cells, debounced, and push the new UV offsets
//!      to the face materials through the engine host
//!   3. `end_frame()` -- clear this frame's key transitions
//!
//! The engine host is headless: it records materials and shader parameters
//! instead of drawing them, and the current cells are mirrored in the window
//! title.
//!
//! `claire_demo [config.json] [--replay replay.json]` -- with `--replay` no
//! window is opened; the replay runs on a fixed clock and the final cells are
//! logged.

use std::path::PathBuf;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use claire_core::atlas_cycle::FaceFeature;
use claire_core::character::{instructions_text, spawn_character};
use claire_core::config::{load_config_or_default, DemoConfig, QUIT_KEY};
use claire_core::engine::{EngineHost, HeadlessHost};
use claire_core::face::FaceController;
use claire_core::input::{InputState, Key};
use claire_core::replay::{load_replay_from_path, run_replay};
use claire_core::time::FrameClock;
use claire_platform::window::PlatformConfig;

const CONFIG_PATH: &str = "assets/config/claire_demo.json";

#[derive(Debug, PartialEq, Eq)]
struct LaunchOptions {
    config_path: PathBuf,
    replay_path: Option<PathBuf>,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<LaunchOptions, String> {
    let mut config_path = None;
    let mut replay_path = None;
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--replay" => {
                let path = args
                    .next()
                    .ok_or_else(|| "--replay expects a file path".to_string())?;
                replay_path = Some(PathBuf::from(path));
            }
            flag if flag.starts_with("--") => {
                return Err(format!("Unknown option '{flag}'"));
            }
            path => {
                if config_path.is_some() {
                    return Err(format!("Unexpected extra argument '{path}'"));
                }
                config_path = Some(PathBuf::from(path));
            }
        }
    }
    Ok(LaunchOptions {
        config_path: config_path.unwrap_or_else(|| PathBuf::from(CONFIG_PATH)),
        replay_path,
    })
}

/// Character plus the face controller driving it, on a given host.
fn build_face<H: EngineHost>(
    config: &DemoConfig,
    host: &mut H,
    now_ms: u64,
) -> Result<FaceController, String> {
    let spawned = spawn_character(host, &config.character)?;
    host.show_text(&instructions_text(&config.bindings));
    let cycler = config.build_cycler(now_ms)?;
    Ok(FaceController::new(cycler, config.bindings, spawned.face))
}

struct DemoState {
    window: Arc<Window>,
    clock: FrameClock,
    input: InputState,
    host: HeadlessHost,
    face: FaceController,
    base_title: String,
}

impl DemoState {
    fn new(window: Arc<Window>, config: &DemoConfig) -> Self {
        let clock = FrameClock::new();
        let mut host = HeadlessHost::new();
        let face = build_face(config, &mut host, clock.elapsed_ms()).unwrap_or_else(|err| {
            panic!("Failed to set up character: {err}");
        });

        let state = Self {
            window,
            clock,
            input: InputState::new(),
            host,
            face,
            base_title: config.window.title.clone(),
        };
        state.refresh_title();
        state
    }

    fn refresh_title(&self) {
        self.window
            .set_title(&format!("{} | {}", self.base_title, cells_label(&self.face)));
    }
}

fn cells_label(face: &FaceController) -> String {
    let cycler = face.cycler();
    FaceFeature::ALL
        .iter()
        .map(|&feature| {
            format!(
                "{} {}/{}",
                feature,
                cycler.index(feature),
                cycler.region(feature).index_max()
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

struct App {
    config: DemoConfig,
    state: Option<DemoState>,
}

impl App {
    fn new(config: DemoConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let platform = PlatformConfig {
            title: self.config.window.title.clone(),
            width: self.config.window.width,
            height: self.config.window.height,
        };
        let window = match claire_platform::window::create_window(event_loop, &platform) {
            Ok(window) => window,
            Err(err) => {
                log::error!("{err}");
                event_loop.exit();
                return;
            }
        };
        log::info!("Window created: {}x{}", platform.width, platform.height);
        self.state = Some(DemoState::new(window, &self.config));
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => state.input.key_down(key),
                            ElementState::Released => state.input.key_up(key),
                        }
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                state.clock.begin_frame();

                if state.input.is_just_pressed(QUIT_KEY) {
                    log::info!("Quit key pressed, exiting.");
                    event_loop.exit();
                    return;
                }

                let now_ms = state.clock.elapsed_ms();
                let advanced = state.face.update(&state.input, now_ms, &mut state.host);
                if !advanced.is_empty() {
                    for feature in &advanced {
                        log::info!(
                            "{} -> cell {}",
                            feature,
                            state.face.cycler().index(*feature)
                        );
                    }
                    state.refresh_title();
                }

                state.input.end_frame();
            }

            _ => {}
        }
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::KeyQ => Some(Key::Q),
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyE => Some(Key::E),
        KeyCode::KeyR => Some(Key::R),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyD => Some(Key::D),
        _ => None,
    }
}

fn run_headless(config: &DemoConfig, replay_path: &std::path::Path) -> Result<(), String> {
    let replay = load_replay_from_path(replay_path)?;
    let mut host = HeadlessHost::new();
    let mut face = build_face(config, &mut host, 0)?;
    let summary = run_replay(&replay, &mut face, &mut host);
    log::info!(
        "Replay '{}': {} frames, {}ms, {} advances, {}",
        replay_path.display(),
        summary.frames,
        summary.elapsed_ms,
        summary.advances,
        cells_label(&face)
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Claire face demo starting...");

    let options = parse_args(std::env::args().skip(1)).unwrap_or_else(|err| {
        panic!("{err}\nusage: claire_demo [config.json] [--replay replay.json]");
    });
    let config = load_config_or_default(&options.config_path).unwrap_or_else(|err| {
        panic!(
            "Failed to load config '{}': {}",
            options.config_path.display(),
            err
        );
    });
    log::info!(
        "Debounce {}ms, gate mode {:?}",
        config.debounce_ms,
        config.gate
    );

    if let Some(replay_path) = &options.replay_path {
        if let Err(err) = run_headless(&config, replay_path) {
            log::error!("{err}");
            std::process::exit(1);
        }
        return;
    }

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app).expect("Event loop error");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_args_uses_default_config() {
        let options = parse_args(args(&[])).expect("parse");
        assert_eq!(options.config_path, PathBuf::from(CONFIG_PATH));
        assert!(options.replay_path.is_none());
    }

    #[test]
    fn config_and_replay_paths_are_parsed() {
        let options =
            parse_args(args(&["custom.json", "--replay", "r.json"])).expect("parse");
        assert_eq!(options.config_path, PathBuf::from("custom.json"));
        assert_eq!(options.replay_path, Some(PathBuf::from("r.json")));
    }

    #[test]
    fn bad_args_are_rejected() {
        assert!(parse_args(args(&["--replay"])).is_err());
        assert!(parse_args(args(&["--fast"])).is_err());
        assert!(parse_args(args(&["a.json", "b.json"])).is_err());
    }

    #[test]
    fn bound_keys_are_mapped() {
        assert_eq!(map_key(KeyCode::KeyW), Some(Key::W));
        assert_eq!(map_key(KeyCode::KeyE), Some(Key::E));
        assert_eq!(map_key(KeyCode::KeyR), Some(Key::R));
        assert_eq!(map_key(KeyCode::Escape), Some(QUIT_KEY));
        assert_eq!(map_key(KeyCode::KeyT), None);
        assert_eq!(map_key(KeyCode::F12), None);
    }

    #[test]
    fn build_face_shows_instructions_and_keeps_material_defaults() {
        let config = DemoConfig::default();
        let mut host = HeadlessHost::new();
        let face = build_face(&config, &mut host, 0).expect("face");
        assert_eq!(host.texts(), ["W=eyes, E=eyebrows, R=mouth".to_string()]);
        // Offsets are only written once a press is accepted.
        assert_eq!(host.parameter_writes(), 0);
        assert_eq!(
            cells_label(&face),
            "eyes 0/30, eyebrows 0/10, mouth 0/30"
        );
    }
}
