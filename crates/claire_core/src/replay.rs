//! Scripted key presses for running the face demo without a window.
//!
//! A replay is a JSON object with a `frames` list. Each entry gives a time
//! step `dt_ms` (default 16), the features whose keys are tapped on that frame
//! in `press`, and how many consecutive frames it stands for in `repeat`
//! (default 1):
//!
//! ```json
//! { "frames": [ { "dt_ms": 100, "repeat": 3 }, { "press": ["eyes", "mouth"] } ] }
//! ```
//!
//! `run_replay` drives a `FaceController` through the frames on a clock that
//! only advances by the scripted steps, so the same replay always ends on the
//! same cells.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::atlas_cycle::FaceFeature;
use crate::engine::EngineHost;
use crate::face::FaceController;
use crate::input::InputState;
use crate::time::FrameClock;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default = "default_dt_ms")]
    pub dt_ms: u64,
    #[serde(default)]
    pub press: Vec<FaceFeature>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub frames: u64,
    pub elapsed_ms: u64,
    pub advances: u32,
    pub eyes: u32,
    pub eyebrows: u32,
    pub mouth: u32,
}

impl ReplaySequence {
    /// One entry per simulated frame: time step and features pressed on it.
    pub fn expanded_frames(&self) -> impl Iterator<Item = (u64, &[FaceFeature])> + '_ {
        self.frames.iter().flat_map(|frame| {
            std::iter::repeat((frame.dt_ms, frame.press.as_slice()))
                .take(frame.repeat.max(1) as usize)
        })
    }
}

/// Drive `face` through the replay on a deterministic clock, tapping the keys
/// `face` itself is bound to.
pub fn run_replay(
    replay: &ReplaySequence,
    face: &mut FaceController,
    host: &mut impl EngineHost,
) -> ReplaySummary {
    let bindings = *face.bindings();
    let mut clock = FrameClock::new();
    let mut input = InputState::new();
    let mut advances = 0;

    for (dt_ms, pressed) in replay.expanded_frames() {
        clock.advance_us(dt_ms.saturating_mul(1000));
        for &feature in pressed {
            input.tap(bindings.key_for(feature));
        }
        advances += face.update(&input, clock.elapsed_ms(), host).len() as u32;
        input.end_frame();
    }

    let cycler = face.cycler();
    ReplaySummary {
        frames: clock.frame_count,
        elapsed_ms: clock.elapsed_ms(),
        advances,
        eyes: cycler.index(FaceFeature::Eyes),
        eyebrows: cycler.index(FaceFeature::Eyebrows),
        mouth: cycler.index(FaceFeature::Mouth),
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_dt_ms() -> u64 {
    16
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas_cycle::GateMode;
    use crate::character::{spawn_character, CharacterRig};
    use crate::config::DemoConfig;
    use crate::engine::HeadlessHost;
    use crate::input::Key;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "claire_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn run(replay: &ReplaySequence, gate: GateMode) -> ReplaySummary {
        run_with(
            replay,
            DemoConfig {
                gate,
                ..DemoConfig::default()
            },
        )
    }

    fn run_with(replay: &ReplaySequence, config: DemoConfig) -> ReplaySummary {
        let mut host = HeadlessHost::new();
        let spawned = spawn_character(&mut host, &CharacterRig::default()).expect("spawn");
        let mut face = FaceController::new(
            config.build_cycler(0).expect("cycler"),
            config.bindings,
            spawned.face,
        );
        run_replay(replay, &mut face, &mut host)
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "dt_ms": 100, "repeat": 3 },
                { "press": ["eyes", "mouth"] }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let expanded: Vec<_> = replay.expanded_frames().collect();
        assert_eq!(expanded.len(), 4);
        assert_eq!(expanded[0], (100, &[][..]));
        assert_eq!(
            expanded[3],
            (16, &[FaceFeature::Eyes, FaceFeature::Mouth][..])
        );

        let _ = fs::remove_file(path);
    }

    #[test]
    fn huge_repeat_is_expanded_lazily() {
        let replay = ReplaySequence {
            frames: vec![ReplayFrame {
                dt_ms: 16,
                press: vec![FaceFeature::Mouth],
                repeat: u32::MAX,
            }],
        };
        let first: Vec<_> = replay.expanded_frames().take(3).collect();
        assert_eq!(first.len(), 3);
        assert!(first.iter().all(|&(dt, press)| dt == 16 && press == [FaceFeature::Mouth]));
    }

    #[test]
    fn replay_rejects_empty_frames() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("empty replay should fail");
        assert!(err.contains("frames list is empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_rejects_unknown_feature() {
        let path = temp_file_path("unknown_feature");
        fs::write(&path, r#"{ "frames": [ { "press": ["nose"] } ] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("unknown feature should fail");
        assert!(err.contains("Failed to parse replay JSON"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn mashing_a_key_is_rate_limited() {
        // 30 presses at 100ms spacing over 3s: the gate admits every third press.
        let replay = ReplaySequence {
            frames: vec![ReplayFrame {
                dt_ms: 100,
                press: vec![FaceFeature::Eyebrows],
                repeat: 30,
            }],
        };
        let summary = run(&replay, GateMode::Shared);
        assert_eq!(summary.frames, 30);
        assert_eq!(summary.elapsed_ms, 3000);
        assert_eq!(summary.advances, 10);
        assert_eq!(summary.eyebrows, 0, "10 advances wrap a 10-cell strip");
    }

    #[test]
    fn shared_and_per_region_gates_diverge() {
        let replay = ReplaySequence {
            frames: vec![
                ReplayFrame {
                    dt_ms: 300,
                    press: vec![FaceFeature::Eyes],
                    repeat: 1,
                },
                ReplayFrame {
                    dt_ms: 50,
                    press: vec![FaceFeature::Mouth],
                    repeat: 1,
                },
            ],
        };
        let shared = run(&replay, GateMode::Shared);
        assert_eq!((shared.eyes, shared.mouth), (1, 0));

        let independent = run(&replay, GateMode::PerRegion);
        assert_eq!((independent.eyes, independent.mouth), (1, 1));
    }

    #[test]
    fn huge_frame_step_saturates_instead_of_panicking() {
        let replay = ReplaySequence {
            frames: vec![ReplayFrame {
                dt_ms: u64::MAX / 1000 + 1,
                press: vec![FaceFeature::Eyes],
                repeat: 2,
            }],
        };
        let summary = run(&replay, GateMode::Shared);
        assert_eq!(summary.frames, 2);
        assert_eq!(summary.elapsed_ms, u64::MAX / 1000);
        assert_eq!(summary.eyes, 1);
    }

    #[test]
    fn replay_taps_the_controllers_own_bindings() {
        let mut config = DemoConfig::default();
        config.bindings.eyes = Key::Q;
        config.bindings.mouth = Key::A;
        let replay = ReplaySequence {
            frames: vec![
                ReplayFrame {
                    dt_ms: 300,
                    press: vec![FaceFeature::Eyes],
                    repeat: 1,
                },
                ReplayFrame {
                    dt_ms: 300,
                    press: vec![FaceFeature::Mouth],
                    repeat: 1,
                },
            ],
        };
        let summary = run_with(&replay, config);
        assert_eq!((summary.eyes, summary.mouth), (1, 1));
        assert_eq!(summary.advances, 2);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let replay = ReplaySequence {
            frames: vec![
                ReplayFrame {
                    dt_ms: 16,
                    press: vec![],
                    repeat: 20,
                },
                ReplayFrame {
                    dt_ms: 90,
                    press: vec![FaceFeature::Eyes, FaceFeature::Eyebrows],
                    repeat: 25,
                },
                ReplayFrame {
                    dt_ms: 260,
                    press: vec![FaceFeature::Mouth],
                    repeat: 12,
                },
            ],
        };
        let run_a = run(&replay, GateMode::Shared);
        let run_b = run(&replay, GateMode::Shared);
        assert_eq!(run_a, run_b);
        assert!(run_a.eyes < 30 && run_a.eyebrows < 10 && run_a.mouth < 30);
    }

    #[test]
    fn shipped_replay_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/replays/blink_cycle.json");
        let replay = load_replay_from_path(&path).expect("shipped replay should load");
        let summary = run(&replay, GateMode::Shared);
        assert!(summary.advances > 0);
    }
}
