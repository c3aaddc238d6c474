pub mod autosave;
pub mod battle;
pub mod capture;
pub mod config;
pub mod console;
pub mod constants;
pub mod damage;
pub mod items;
pub mod messages;
pub mod model;
pub mod progression;
pub mod save;
pub mod skills;
pub mod storage;
pub mod store;
pub mod trainers;
pub mod types;

use crate::config::{load_config, GameConfig};
use crate::console::{execute, parse_command, ConsoleCommand};
use crate::storage::FileStorage;
pub use crate::store::GameStore;
use anyhow::Context;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Command-line overrides. Anything left unset comes from the config file,
/// then from [`GameConfig::default`].
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub config_path: Option<PathBuf>,
    pub save_path: Option<PathBuf>,
    pub seed: Option<u64>,
    pub autosave_ms: Option<u64>,
}

impl CliOptions {
    pub fn resolve(&self) -> anyhow::Result<GameConfig> {
        let mut config = match &self.config_path {
            Some(path) => load_config(path)?,
            None => GameConfig::default(),
        };
        if let Some(path) = &self.save_path {
            config.save_path = path.clone();
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(ms) = self.autosave_ms {
            if ms == 0 {
                anyhow::bail!("--autosave-ms must be > 0");
            }
            config.autosave_delay_ms = ms;
        }
        Ok(config)
    }
}

pub fn open_store(config: &GameConfig) -> GameStore {
    let store = GameStore::open(FileStorage::new(&config.save_path))
        .with_autosave_delay(config.autosave_delay());
    match config.seed {
        Some(seed) => store.with_seed(seed),
        None => store,
    }
}

/// Feeds console lines into the store until `quit` or end of input.
///
/// The autosave timer is polled between lines; whatever is still pending at
/// the end is flushed.
pub fn run_session(
    store: &mut GameStore,
    input: impl BufRead,
    mut output: impl Write,
) -> anyhow::Result<()> {
    for line in input.lines() {
        let line = line.context("Failed to read command input")?;
        store.tick();
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                writeln!(output, "error: {err:#}")?;
                continue;
            }
        };
        if command == ConsoleCommand::Quit {
            break;
        }
        match execute(store, command) {
            Ok(text) => writeln!(output, "{text}")?,
            Err(err) => writeln!(output, "error: {err:#}")?,
        }
        store.tick();
    }
    store.flush_autosave();
    Ok(())
}

pub fn run(opts: CliOptions) -> anyhow::Result<()> {
    let config = opts.resolve()?;
    tracing::info!(save = %config.save_path.display(), seed = ?config.seed, "starting session");
    let mut store = open_store(&config);
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    writeln!(stdout.lock(), "{}", console::summarize(store.state()))?;
    run_session(&mut store, stdin.lock(), stdout.lock())
}
