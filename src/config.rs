/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub dig: DigConfig,
    /// Fixed seed for board generation. `None` = seeded from the OS.
    pub seed: Option<u64>,
}

/// Largest accepted dig board side, in cells.
pub const MAX_BOARD_SIDE: usize = 16;

/// Rules of the TNT field. Also the stun tick cadence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DigConfig {
    pub width: usize,
    pub height: usize,
    pub gems: usize,
    pub tnt: usize,
    pub gems_to_win: u32,
    pub stun_ms: u32,
    pub stun_tick_ms: u32,
}

impl Default for DigConfig {
    fn default() -> Self {
        let d = TomlDig::default();
        DigConfig {
            width: d.width,
            height: d.height,
            gems: d.gems,
            tnt: d.tnt,
            gems_to_win: d.gems_to_win,
            stun_ms: d.stun_ms,
            stun_tick_ms: d.stun_tick_ms,
        }
    }
}

impl DigConfig {
    /// Reason this rule set is unplayable, if any.
    pub fn problem(&self) -> Option<String> {
        if self.width > MAX_BOARD_SIDE || self.height > MAX_BOARD_SIDE {
            return Some(format!(
                "board {}x{} exceeds {MAX_BOARD_SIDE}x{MAX_BOARD_SIDE}",
                self.width, self.height
            ));
        }
        let cells = self.width * self.height;
        if cells == 0 {
            return Some("board has no cells".into());
        }
        let placed = match self.gems.checked_add(self.tnt) {
            Some(n) => n,
            None => return Some("gem and tnt counts overflow".into()),
        };
        if placed > cells {
            return Some(format!(
                "{} gems + {} tnt do not fit on {} cells",
                self.gems, self.tnt, cells
            ));
        }
        if self.gems_to_win == 0 || self.gems_to_win as usize > self.gems {
            return Some(format!(
                "gems_to_win = {} must be between 1 and gems = {}",
                self.gems_to_win, self.gems
            ));
        }
        if self.stun_tick_ms == 0 {
            return Some("stun_tick_ms must be positive".into());
        }
        None
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            dig: DigConfig::default(),
            seed: None,
        }
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    dig: TomlDig,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlDig {
    #[serde(default = "default_board_side")]
    width: usize,
    #[serde(default = "default_board_side")]
    height: usize,
    #[serde(default = "default_gems")]
    gems: usize,
    #[serde(default = "default_tnt")]
    tnt: usize,
    #[serde(default = "default_gems_to_win")]
    gems_to_win: u32,
    #[serde(default = "default_stun")]
    stun_ms: u32,
    #[serde(default = "default_stun_tick")]
    stun_tick_ms: u32,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
}

// ── Defaults ──

fn default_board_side() -> usize { 5 }
fn default_gems() -> usize { 5 }
fn default_tnt() -> usize { 7 }
fn default_gems_to_win() -> u32 { 3 }
fn default_stun() -> u32 { 2000 }      // 2s blackout after TNT
fn default_stun_tick() -> u32 { 100 }

impl Default for TomlDig {
    fn default() -> Self {
        TomlDig {
            width: default_board_side(),
            height: default_board_side(),
            gems: default_gems(),
            tnt: default_tnt(),
            gems_to_win: default_gems_to_win(),
            stun_ms: default_stun(),
            stun_tick_ms: default_stun_tick(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.local/share/craftduel`.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let toml_cfg = load_toml(&candidate_dirs());
        GameConfig::from_toml(toml_cfg)
    }

    /// Parse config text directly. Parse errors fall back to defaults.
    #[allow(dead_code)]
    pub fn parse(text: &str) -> Self {
        match toml::from_str::<TomlConfig>(text) {
            Ok(cfg) => GameConfig::from_toml(cfg),
            Err(e) => {
                log::warn!("config parse error: {e}; using default settings");
                GameConfig::default()
            }
        }
    }

    fn from_toml(toml_cfg: TomlConfig) -> Self {
        let d = toml_cfg.dig;
        let mut dig = DigConfig {
            width: d.width,
            height: d.height,
            gems: d.gems,
            tnt: d.tnt,
            gems_to_win: d.gems_to_win,
            stun_ms: d.stun_ms,
            stun_tick_ms: d.stun_tick_ms,
        };
        if let Some(problem) = dig.problem() {
            log::warn!("invalid [dig] section ({problem}); using default dig rules");
            dig = DigConfig::default();
        }

        GameConfig {
            dig,
            seed: toml_cfg.general.seed,
        }
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so an installed link still finds data
        // relative to the real binary.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/craftduel");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

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
                    Ok(cfg) => {
                        log::info!("loaded {}", path.display());
                        return cfg;
                    }
                    Err(e) => {
                        log::warn!("{} parse error: {e}; using default settings", path.display());
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    log::warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
