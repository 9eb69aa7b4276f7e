use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use topper_watcher::{
    AppConfig, DocumentId, FileFilter, FsHost, FsSaveEvents, SaveListener, Span, SystemClock,
    UpdateOutcome, Updater,
};

/// Keeps the last-modified field of topper headers current on save
#[derive(Parser, Debug)]
#[command(name = "topper-watcher")]
#[command(version = "0.1.0")]
#[command(about = "Rewrite the last-modified timestamp in file headers on save", long_about = None)]
struct Args {
    /// TOML settings file (missing file means defaults)
    #[arg(short, long, default_value = "topper.toml", global = true)]
    config: PathBuf,

    /// Label preceding the timestamp, overriding the settings file
    #[arg(short, long, global = true)]
    label: Option<String>,

    /// Output structured JSON instead of human-readable
    #[arg(short, long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watch files or directories and update headers whenever a file is saved
    Watch {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Only update this file, as if it were the one open in the editor
        #[arg(long)]
        focus: Option<PathBuf>,
    },
    /// Update the header of FILE once, as if it had just been saved
    Touch { file: PathBuf },
    /// Show where the last-modified timestamp of FILE is, without editing
    Find { file: PathBuf },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = AppConfig::load_from(&args.config)?;
    if let Some(label) = args.label {
        config.topper.last_modified = label;
    }

    match args.command {
        Command::Watch {
            paths,
            recursive,
            focus,
        } => {
            let host = Arc::new(match focus {
                Some(path) => {
                    let path = path
                        .canonicalize()
                        .with_context(|| format!("Cannot focus '{}'", path.display()))?;
                    FsHost::pinned(DocumentId::new(path))
                }
                None => FsHost::new(),
            });
            let recursive = recursive || config.watch.recursive;
            let debounce = config.watch.debounce();
            let filter = FileFilter::new(&config.watch.extensions);
            let events = FsSaveEvents::new(host.clone(), filter);

            let listener = SaveListener::new(Updater::new(
                host,
                Arc::new(config),
                Arc::new(SystemClock),
            ));
            listener.start(&events)?;

            events.watch(&paths, recursive, debounce)?;
        }
        Command::Touch { file } => {
            let id = DocumentId::new(file);
            let updater = Updater::new(
                Arc::new(FsHost::pinned(id.clone())),
                Arc::new(config),
                Arc::new(SystemClock),
            );
            let outcome = updater
                .update_last_modified(&id)
                .with_context(|| format!("Failed to update '{}'", id))?;
            output_outcome(&outcome, args.json);
        }
        Command::Find { file } => {
            let id = DocumentId::new(file);
            let updater = Updater::new(
                Arc::new(FsHost::new()),
                Arc::new(config),
                Arc::new(SystemClock),
            );
            let span = updater
                .locate(&id)
                .with_context(|| format!("Failed to read '{}'", id))?;
            output_span(&id, span, args.json);
        }
    }

    Ok(())
}

/// Format and print an update outcome
fn output_outcome(outcome: &UpdateOutcome, json_mode: bool) {
    let output = if json_mode {
        serde_json::to_string_pretty(outcome)
            .unwrap_or_else(|_| r#"{"error": "Failed to serialize outcome"}"#.to_string())
    } else {
        match outcome {
            UpdateOutcome::Updated {
                document,
                span,
                timestamp,
                ..
            } => format!("Updated {} line {}: {}", document, span.line + 1, timestamp),
            UpdateOutcome::NoMatch { document } => {
                format!("No last-modified field in {}", document)
            }
            UpdateOutcome::NotActive { document } => {
                format!("Skipped {}: not the active document", document)
            }
        }
    };
    println!("{}", output);
}

fn output_span(document: &DocumentId, span: Option<Span>, json_mode: bool) {
    let output = if json_mode {
        serde_json::to_string_pretty(&json!({ "document": document, "span": span }))
            .unwrap_or_else(|_| r#"{"error": "Failed to serialize span"}"#.to_string())
    } else {
        match span {
            Some(span) => {
                let (start, end) = (span.start(), span.end());
                format!(
                    "{}:{}:{}-{}",
                    document,
                    start.line + 1,
                    start.column + 1,
                    end.column + 1
                )
            }
            None => format!("No last-modified field in {}", document),
        }
    };
    println!("{}", output);
}
