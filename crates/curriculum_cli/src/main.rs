//! Command-line entry point for the curriculum store.
//!
//! # Responsibility
//! - Verify `curriculum_core` linkage (`ping`).
//! - Import CSV files, set durations and print outlines from the configured store.

use clap::{Parser, Subcommand};
use curriculum_core::tree::outline::{outline, stats};
use curriculum_core::{
    core_version, normalize_input, parse_curriculum_csv, ping, with_store, CoreConfig,
    CurriculumStore, DurationUnit, EditorSession, Level, NodePath,
};
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

/// Curriculum tree store tools
#[derive(Parser, Debug)]
#[command(name = "curriculum")]
#[command(version, about, long_about = None)]
struct Cli {
    /// SQLite database path (overrides CURRICULUM_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// REST backend base URL (overrides CURRICULUM_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print core linkage info
    Ping,
    /// Import curricula from a CSV file
    Import { file: PathBuf },
    /// Print an indented outline of the tree or of one subtree
    Show {
        /// Flat path, e.g. `curriculum <id> grade <id>`
        path: Vec<String>,
    },
    /// Print node counts per level
    Stats { path: Vec<String> },
    /// Normalize a duration value typed in `unit`
    Normalize { value: String, unit: String },
    /// Set a node's duration through the debounced editor session
    SetDuration {
        value: String,
        unit: String,
        /// Flat path of the node
        path: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let mut config = CoreConfig::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(api_url) = cli.api_url {
        config.api_url = Some(api_url);
    }
    let backend = config.backend();

    match cli.command.unwrap_or(Command::Ping) {
        Command::Ping => {
            println!("curriculum_core ping={}", ping());
            println!("curriculum_core version={}", core_version());
            Ok(())
        }
        Command::Import { file } => {
            let reader = File::open(&file)
                .map_err(|err| format!("cannot open `{}`: {err}", file.display()))?;
            let curricula = parse_curriculum_csv(reader).map_err(|err| err.to_string())?;
            let count = curricula.len();
            with_store(&backend, |store| {
                let imported = store.import_curricula(curricula);
                store_result(store, imported, format!("imported {count} curricula"))
            })
            .map_err(|err| err.to_string())?
        }
        Command::Show { path } => {
            let path = NodePath::from_flat(&path).map_err(|err| err.to_string())?;
            let text = with_store(&backend, |store| outline(store.tree(), &path))
                .map_err(|err| err.to_string())?;
            print!("{text}");
            Ok(())
        }
        Command::Stats { path } => {
            let path = NodePath::from_flat(&path).map_err(|err| err.to_string())?;
            let counts = with_store(&backend, |store| stats(store.tree(), &path))
                .map_err(|err| err.to_string())?;
            for level in Level::ALL {
                println!("{:<10} {}", level.label(), counts.count(level));
            }
            Ok(())
        }
        Command::Normalize { value, unit } => {
            let unit = DurationUnit::parse(&unit).ok_or_else(|| format!("unknown unit `{unit}`"))?;
            match normalize_input(&value, unit) {
                Some(normalized) => println!("{normalized}"),
                None => println!("(cleared)"),
            }
            Ok(())
        }
        Command::SetDuration { value, unit, path } => {
            let unit = DurationUnit::parse(&unit).ok_or_else(|| format!("unknown unit `{unit}`"))?;
            let path = NodePath::from_flat(&path).map_err(|err| err.to_string())?;
            with_store(&backend, |store| {
                let mut session = EditorSession::from_config(store, &config);
                session.navigate(path);
                let typed_at = Instant::now();
                let commit_at = typed_at + session.quiet_period();
                if !session.type_duration(&value, unit, typed_at) {
                    return Err("path does not address a node with a duration".to_string());
                }
                let committed = session.tick(commit_at);
                store_result(&**session.store(), committed, "duration saved".to_string())
            })
            .map_err(|err| err.to_string())?
        }
    }
}

fn store_result(store: &dyn CurriculumStore, applied: bool, message: String) -> Result<(), String> {
    if let Some(error) = store.last_error() {
        return Err(error.to_string());
    }
    if !applied {
        return Err("nothing changed".to_string());
    }
    println!("{message}");
    Ok(())
}
