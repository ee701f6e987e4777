/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub movement: MovementConfig,
    pub gamepad: GamepadConfig,
    pub room_file: PathBuf,
}

#[derive(Clone, Debug)]
pub struct MovementConfig {
    /// Walk speed in world pixels per second.
    pub speed: f32,
    /// Player bounding-box size in world pixels.
    pub player_w: f32,
    pub player_h: f32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    movement: TomlMovement,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlMovement {
    #[serde(default = "default_speed")]
    speed: f32,
    #[serde(default = "default_player_w")]
    player_w: f32,
    #[serde(default = "default_player_h")]
    player_h: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_room_file")]
    room_file: String,
}

// ── Defaults ──

fn default_speed() -> f32 { 210.0 }
fn default_player_w() -> f32 { 64.0 }
fn default_player_h() -> f32 { 64.0 }

fn default_confirm() -> Vec<String> { vec!["A".into(), "Start".into()] }
fn default_cancel() -> Vec<String> { vec!["B".into(), "Select".into()] }
fn default_room_file() -> String { "room.toml".into() }

impl Default for TomlMovement {
    fn default() -> Self {
        TomlMovement {
            speed: default_speed(),
            player_w: default_player_w(),
            player_h: default_player_h(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            cancel: default_cancel(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            room_file: default_room_file(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);

        // Resolve the room file against the same candidate dirs
        let room_file_str = &toml_cfg.general.room_file;
        let room_file = if PathBuf::from(room_file_str).is_absolute() {
            PathBuf::from(room_file_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(room_file_str))
                .find(|p| p.is_file())
                .unwrap_or_else(|| PathBuf::from(room_file_str))
        };

        GameConfig {
            movement: MovementConfig {
                speed: toml_cfg.movement.speed,
                player_w: toml_cfg.movement.player_w,
                player_h: toml_cfg.movement.player_h,
            },
            gamepad: GamepadConfig {
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
            },
            room_file,
        }
    }

    /// Reject tunables that would make the simulation degenerate.
    /// Called once at startup, before the terminal enters raw mode.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.movement.speed > 0.0) {
            return Err(format!("movement.speed must be positive (got {})", self.movement.speed));
        }
        if !(self.movement.player_w > 0.0) || !(self.movement.player_h > 0.0) {
            return Err(format!(
                "player size must be positive (got {}x{})",
                self.movement.player_w, self.movement.player_h,
            ));
        }
        Ok(())
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
pub fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so data is found relative to the real binary
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
