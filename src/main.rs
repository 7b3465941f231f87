//! Entry point for **i3mru**.
//!
//! `--daemon` runs the history tracker forever on the main thread.  Every
//! other invocation is a picker: it races for the instance lock, and
//! either shows the UI (winner) or nudges the live picker's cursor and
//! exits (loser).  Exit codes follow the contention-is-normal rule: a
//! deferred invocation and an empty-or-too-short history both exit 0.

use clap::Parser;
use i3mru::config::{Cli, Config};
use i3mru::cursor::{Advance, CursorState};
use i3mru::daemon::Daemon;
use i3mru::history;
use i3mru::i3::wm::I3Events;
use i3mru::instance::{elect, Election};
use i3mru::signals::SignalAdvanceSource;
use log::{error, info};
use std::sync::mpsc;

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let runtime_dir = std::env::var_os("XDG_RUNTIME_DIR").map(Into::into);
    let config = match Config::new(cli, runtime_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("i3mru: {}", e);
            std::process::exit(1);
        }
    };

    if config.daemon {
        run_daemon(&config);
    }
    std::process::exit(run_picker(&config));
}

//  Daemon mode

fn run_daemon(config: &Config) -> ! {
    info!("starting daemon (capacity: {:?})", config.capacity);
    let daemon = Daemon::new(config.history_path.clone(), config.capacity);
    daemon.run_forever(I3Events::subscribe)
}

//  Picker mode

fn run_picker(config: &Config) -> i32 {
    // A missing file means no daemon has ever written history: a user
    // error worth a message.  Any other read failure is just "no usable
    // history" and a quiet no-op.
    let names = match history::load_names(&config.history_path) {
        Ok(names) => names,
        Err(history::HistoryError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            eprintln!("i3mru: history file doesn't exist (is the daemon running?)");
            return 1;
        }
        Err(e) => {
            info!("no usable history: {}", e);
            return 0;
        }
    };
    if names.len() < 2 {
        info!("history has {} entries, nothing to cycle", names.len());
        return 0;
    }

    let direction = if config.reverse {
        Advance::Backward
    } else {
        Advance::Forward
    };

    // Handlers must be live before the election: if we win, a racing
    // invocation may signal us immediately, and an unhandled SIGUSR1
    // would kill the process.
    let source = match SignalAdvanceSource::install() {
        Ok(source) => source,
        Err(e) => {
            error!("signal setup failed: {}", e);
            return 1;
        }
    };

    let _lock = match elect(&config.pid_path, direction) {
        Ok(Election::Elected(lock)) => lock,
        Ok(Election::Deferred) => {
            info!("picker already live, deferred");
            return 0;
        }
        Err(e) => {
            error!("instance election failed: {}", e);
            return 1;
        }
    };

    let cursor = match CursorState::new(names, direction) {
        Ok(cursor) => cursor,
        Err(e) => {
            info!("{}", e);
            return 0;
        }
    };

    let (advance_tx, advance_rx) = mpsc::channel::<Advance>();
    std::thread::spawn(move || {
        if let Err(e) = source.run(advance_tx) {
            error!("signal source error: {}", e);
        }
    });

    show_and_commit(config, cursor, advance_rx)
    // `_lock` drops here: the advisory lock is released and the PID file
    // removed as this picker's last act.
}

#[cfg(feature = "picker-gtk")]
fn show_and_commit(
    config: &Config,
    cursor: CursorState,
    advances: mpsc::Receiver<Advance>,
) -> i32 {
    use i3mru::i3::wm::I3Wm;
    use i3mru::picker::gtk::{GtkPickerUi, GtkUiError};
    use i3mru::traits::{PickerUi, WorkspaceCommander};

    let mut ui = GtkPickerUi::new(
        config.modifier.release_key_name(),
        config.ui_options.clone(),
    );
    let name = match ui.run(cursor, advances) {
        Ok(name) => name,
        Err(GtkUiError::NoSelection) => {
            // Window dismissed without a release: the user backed out.
            info!("picker dismissed, no switch");
            return 0;
        }
        Err(e) => {
            error!("picker ui failed: {}", e);
            return 1;
        }
    };

    match I3Wm::new().switch_to(&name) {
        Ok(()) => {
            info!("switched to {:?}", name);
            0
        }
        Err(e) => {
            error!("workspace switch failed: {}", e);
            1
        }
    }
}

#[cfg(not(feature = "picker-gtk"))]
fn show_and_commit(
    _config: &Config,
    _cursor: CursorState,
    _advances: mpsc::Receiver<Advance>,
) -> i32 {
    error!("no picker UI in this build");
    eprintln!("i3mru: built without the `picker-gtk` feature");
    1
}
