//! Terminal front-end over `pocketnote_core`.
//!
//! # Responsibility
//! - Drive the notes repository against the on-device SQLite store.
//! - Keep output line-oriented so it can be scripted.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{error, warn};
use pocketnote_core::config::{ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
use pocketnote_core::{init_logging, Note, NoteId, NotesConfig, NotesRepository, SqliteStore};
use std::path::PathBuf;

const PREVIEW_MAX_CHARS: usize = 60;

#[derive(Debug, Parser)]
#[command(name = "pocketnote", version, about = "Local note keeping")]
struct Cli {
    /// SQLite file holding the notes.
    #[arg(long, global = true, env = ENV_DB_PATH)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, global = true, env = ENV_LOG_DIR)]
    log_dir: Option<PathBuf>,

    #[arg(long, global = true, env = ENV_LOG_LEVEL)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a note.
    Add {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
    },
    /// List notes, newest first.
    List,
    /// Print one note in full.
    Show { id: String },
    /// Change title and/or content of a note.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete a note.
    Rm { id: String },
    /// Case-insensitive search over title and content.
    Search { query: String },
    /// Delete every note.
    Clear {
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
    /// Check core linkage.
    Ping,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Command::Ping = cli.command {
        print_ping();
        return Ok(());
    }

    let config = resolve_config(&cli)?;
    if let Some(log_dir) = config.log_dir.as_ref() {
        init_logging(config.log_level.as_str(), log_dir).context("failed to start logging")?;
    }

    let store = SqliteStore::open(&config.db_path)
        .with_context(|| format!("failed to open notes db `{}`", config.db_path.display()))?;
    let repo = NotesRepository::open(store).await;
    if let Some(error) = repo.status().error {
        error!("event=cli_open module=cli status=error error={error}");
        bail!("{error}");
    }

    run(&repo, cli.command).await
}

/// Flags win over `POCKETNOTE_*` variables; clap already folds those in.
fn resolve_config(cli: &Cli) -> Result<NotesConfig> {
    let mut config = NotesConfig::default();
    if let Some(db) = non_blank(cli.db.as_ref()) {
        config.db_path = db;
    }
    if let Some(dir) = non_blank(cli.log_dir.as_ref()) {
        config.log_dir = Some(dir);
    }
    if let Some(level) = cli.log_level.as_deref().map(str::trim) {
        if !level.is_empty() {
            config.log_level = level.to_string();
        }
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn non_blank(path: Option<&PathBuf>) -> Option<PathBuf> {
    path.filter(|path| !path.as_os_str().is_empty()).cloned()
}

async fn run(repo: &NotesRepository<SqliteStore>, command: Command) -> Result<()> {
    let name = command_name(&command);
    let outcome = dispatch(repo, command).await;
    if let Err(err) = &outcome {
        error!("event=cli_{name} module=cli status=error error={err:#}");
    }
    outcome
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Add { .. } => "add",
        Command::List => "list",
        Command::Show { .. } => "show",
        Command::Edit { .. } => "edit",
        Command::Rm { .. } => "rm",
        Command::Search { .. } => "search",
        Command::Clear { .. } => "clear",
        Command::Ping => "ping",
    }
}

async fn dispatch(repo: &NotesRepository<SqliteStore>, command: Command) -> Result<()> {
    match command {
        Command::Add { title, content } => {
            let note = repo.add(title, content).await?;
            println!("{}", note.id);
        }
        Command::List => print_rows(&repo.notes()),
        Command::Show { id } => {
            let note = repo
                .get(&NoteId::from(id.as_str()))
                .with_context(|| format!("note not found: {id}"))?;
            println!("id: {}", note.id);
            println!("title: {}", note.display_title());
            println!("updated: {}", note.updated_at.to_rfc3339());
            println!();
            println!("{}", note.content);
        }
        Command::Edit { id, title, content } => {
            let note_id = NoteId::from(id.as_str());
            let current = repo
                .get(&note_id)
                .with_context(|| format!("note not found: {id}"))?;
            let title = title.unwrap_or(current.title);
            let content = content.unwrap_or(current.content);
            repo.update(&note_id, title, content).await?;
            println!("{id}");
        }
        Command::Rm { id } => {
            if !repo.delete(&NoteId::from(id.as_str())).await? {
                warn!("event=cli_rm module=cli status=skipped reason=not_found");
                eprintln!("note not found: {id}");
            }
        }
        Command::Search { query } => print_rows(&repo.search(query.as_str())),
        Command::Clear { yes } => {
            if !yes {
                bail!("refusing to delete all notes without --yes");
            }
            let removed = repo.clear().await?;
            println!("deleted {removed} note(s)");
        }
        Command::Ping => print_ping(),
    }
    Ok(())
}

fn print_ping() {
    println!("pocketnote_core ping={}", pocketnote_core::ping());
    println!("pocketnote_core version={}", pocketnote_core::core_version());
}

fn print_rows(notes: &[Note]) {
    for note in notes {
        println!(
            "{}\t{}\t{}\t{}",
            note.id,
            note.updated_at.format("%Y-%m-%d %H:%M"),
            note.display_title(),
            note.preview(PREVIEW_MAX_CHARS)
        );
    }
}
