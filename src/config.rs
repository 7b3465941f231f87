//! Command-line surface and resolved runtime configuration.
//!
//! Arguments are parsed once in `main` into a [`Cli`], resolved against
//! the environment into a [`Config`], and passed by reference from there
//! on; no component reads argv or the environment itself.
//!
//! Anything after the known flags is forwarded opaquely to the picker UI
//! as `key=value` styling options (`i3mru --reverse -- background=black
//! foreground=white`).

use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;

/// File name of the persisted history, inside the runtime directory.
const HISTORY_FILE: &str = "i3mru.history";
/// File name of the picker PID/lock file, inside the runtime directory.
const PID_FILE: &str = "i3mru.pid";

/// The i3 modifier key whose release commits the switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModKey {
    Mod1,
    Mod4,
    Control,
    Shift,
}

impl ModKey {
    /// Name of the key-release event the UI toolkit should watch for.
    pub fn release_key_name(self) -> &'static str {
        match self {
            ModKey::Mod1 => "Alt_L",
            ModKey::Mod4 => "Super_L",
            ModKey::Control => "Control_L",
            ModKey::Shift => "Shift_L",
        }
    }
}

impl fmt::Display for ModKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModKey::Mod1 => write!(f, "mod1"),
            ModKey::Mod4 => write!(f, "mod4"),
            ModKey::Control => write!(f, "control"),
            ModKey::Shift => write!(f, "shift"),
        }
    }
}

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "i3mru", version, about = "MRU workspace switcher for i3")]
pub struct Cli {
    /// Run the history-tracking daemon instead of the picker.
    #[arg(short, long)]
    pub daemon: bool,

    /// Bound the history length (at least 2).
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(2..))]
    pub size: Option<u64>,

    /// Modifier key whose release commits the switch.
    #[arg(short = 'm', long = "mod", value_enum, ignore_case = true, default_value_t = ModKey::Mod4)]
    pub modifier: ModKey,

    /// Start the cursor at the oldest entry and advance backwards.
    #[arg(short, long)]
    pub reverse: bool,

    /// Styling options forwarded to the picker UI (`key=value` pairs).
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub ui_options: Vec<String>,
}

/// Errors from resolving the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("XDG_RUNTIME_DIR is not set")]
    MissingRuntimeDir,
}

/// Fully resolved configuration, built once at startup.
#[derive(Debug)]
pub struct Config {
    pub daemon: bool,
    pub capacity: Option<usize>,
    pub modifier: ModKey,
    pub reverse: bool,
    pub ui_options: Vec<(String, String)>,
    pub history_path: PathBuf,
    pub pid_path: PathBuf,
}

impl Config {
    /// Resolve `cli` against the runtime directory (normally
    /// `$XDG_RUNTIME_DIR`, injected by the caller so this stays testable).
    pub fn new(cli: Cli, runtime_dir: Option<PathBuf>) -> Result<Self, ConfigError> {
        let runtime_dir = runtime_dir.ok_or(ConfigError::MissingRuntimeDir)?;
        Ok(Self {
            daemon: cli.daemon,
            capacity: cli.size.map(|n| n as usize),
            modifier: cli.modifier,
            reverse: cli.reverse,
            ui_options: parse_ui_options(&cli.ui_options),
            history_path: runtime_dir.join(HISTORY_FILE),
            pid_path: runtime_dir.join(PID_FILE),
        })
    }
}

/// Pair up passthrough UI options.
///
/// Leading dashes are stripped and `key=value` tokens are split, so
/// `-bg=black fg white` and `bg black -fg=white` both yield
/// `[("bg", "black"), ("fg", "white")]`.  A trailing key without a value
/// is dropped.
fn parse_ui_options(raw: &[String]) -> Vec<(String, String)> {
    let mut flat = Vec::new();
    for item in raw {
        let item = item.trim_start_matches('-');
        match item.split_once('=') {
            Some((key, value)) => {
                flat.push(key.to_string());
                flat.push(value.to_string());
            }
            None => flat.push(item.to_string()),
        }
    }
    flat.chunks_exact(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect()
}

//  Tests
