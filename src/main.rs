//! pasteboard - cut, copy and paste files from the command line.
//!
//! Usage:
//!   pasteboard copy PATHS...       Mark paths for copying
//!   pasteboard cut PATHS...        Mark paths for moving
//!   pasteboard paste [DEST]        Paste marked paths into DEST
//!   pasteboard delete PATHS...     Permanently delete paths
//!   pasteboard --help              Show help

mod session;

use std::io::{self, BufRead, Write};
use std::path::{self, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use pasteboard_ops::{
    BatchSummary, ClipboardMode, ClipboardState, EngineConfig, FileOperationEngine,
    OperationEvent, OperationExecutor, OperationResult, PropertiesSnapshot, SystemClipboard,
};

use crate::session::SessionStore;

#[derive(Parser)]
#[command(
    name = "pasteboard",
    version,
    about = "Cut, copy and paste files with collision-free naming",
    long_about = "pasteboard marks files with `copy` or `cut` and materializes them with \
                  `paste`. Pasting onto an existing name creates `name_copy1.ext`, \
                  `name_copy2.ext`, and so on instead of overwriting."
)]
struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Engine config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Session file holding the clipboard (defaults to the user cache directory)
    #[arg(long, global = true)]
    session: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Mark paths to be copied on the next paste
    Copy {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Mark paths to be moved on the next paste
    Cut {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Paste marked paths into a directory
    Paste {
        /// Destination directory
        #[arg(default_value = ".")]
        destination: PathBuf,
    },

    /// Forget the marked paths
    Clear,

    /// Show the marked paths
    Status,

    /// Permanently delete paths (no trash)
    Delete {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Rename a file or directory
    Rename {
        path: PathBuf,
        new_name: String,
    },

    /// Create a directory
    Mkdir {
        name: String,

        /// Directory to create it in
        #[arg(short, long, default_value = ".")]
        parent: PathBuf,
    },

    /// Show properties of the first path
    Props {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::load_or_default()?,
    };
    debug!(?config, "loaded engine config");

    let session_path = match cli.session.clone().or_else(SessionStore::default_path) {
        Some(path) => path,
        None => bail!("No cache directory available; pass --session"),
    };
    let mut store = SessionStore::new(session_path);
    let clipboard = ClipboardState::new();
    store
        .restore_into(&clipboard)
        .with_context(|| format!("Failed to read session {}", store.path().display()))?;

    let executor = OperationExecutor::new(Arc::new(FileOperationEngine::new(config)));

    match cli.command {
        Command::Copy { paths } => run_mark(&clipboard, &mut store, paths, ClipboardMode::Copy),
        Command::Cut { paths } => run_mark(&clipboard, &mut store, paths, ClipboardMode::Cut),
        Command::Paste { destination } => {
            run_paste(&executor, &clipboard, &mut store, destination, cli.format).await
        }
        Command::Clear => {
            clipboard.clear();
            store.clear().context("Failed to clear session")?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Status => run_status(&clipboard, cli.format),
        Command::Delete { paths, yes } => run_delete(&executor, paths, yes, cli.format).await,
        Command::Rename { path, new_name } => {
            let rx = executor.start_rename(path, new_name);
            report(rx, cli.format, CancellationToken::new()).await
        }
        Command::Mkdir { name, parent } => {
            let rx = executor.start_create_directory(parent, name);
            report(rx, cli.format, CancellationToken::new()).await
        }
        Command::Props { paths } => run_props(executor.engine(), &paths, cli.format),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Record a copy or cut mark in the session.
fn run_mark(
    clipboard: &ClipboardState,
    store: &mut SessionStore,
    paths: Vec<PathBuf>,
    mode: ClipboardMode,
) -> Result<ExitCode> {
    let paths = paths
        .iter()
        .map(|p| path::absolute(p).with_context(|| format!("Invalid path {}", p.display())))
        .collect::<Result<Vec<_>>>()?;

    clipboard.mark(paths.clone(), mode);
    store.save_marks(clipboard).context("Failed to save session")?;
    store.set_paths(&paths).context("Failed to save session")?;

    eprintln!("Marked {} items to {}", paths.len(), mode.to_string().to_lowercase());
    Ok(ExitCode::SUCCESS)
}

/// Paste the session clipboard into `destination`.
async fn run_paste(
    executor: &OperationExecutor,
    clipboard: &ClipboardState,
    store: &mut SessionStore,
    destination: PathBuf,
    format: OutputFormat,
) -> Result<ExitCode> {
    let destination = path::absolute(&destination).context("Invalid destination")?;

    let Some(request) = clipboard
        .snapshot_from_system(&*store, destination)
        .context("Failed to read clipboard")?
    else {
        eprintln!("Nothing to paste");
        return Ok(ExitCode::SUCCESS);
    };

    let mode = request.mode;
    let cancel = CancellationToken::new();
    let rx = executor.start_paste_with_cancel(request, cancel.clone());
    let code = report(rx, format, cancel).await?;

    // A cut is consumed by the paste, even a partial one.
    if mode == ClipboardMode::Cut {
        clipboard.clear();
        store.clear().context("Failed to clear session")?;
    }

    Ok(code)
}

/// Permanently delete `paths` after confirmation.
async fn run_delete(
    executor: &OperationExecutor,
    paths: Vec<PathBuf>,
    yes: bool,
    format: OutputFormat,
) -> Result<ExitCode> {
    if !yes && !confirm(&format!(
        "Permanently delete {} items? They will not be moved to the trash. [y/N] ",
        paths.len()
    ))? {
        eprintln!("Aborted");
        return Ok(ExitCode::SUCCESS);
    }

    let cancel = CancellationToken::new();
    let rx = executor.start_delete_with_cancel(paths, cancel.clone());
    report(rx, format, cancel).await
}

fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{prompt}");
    io::stderr().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

/// Print events as they arrive and the summary at the end.
///
/// Ctrl-C cancels the batch before its next item; a second Ctrl-C exits.
async fn report(
    mut rx: mpsc::Receiver<OperationEvent>,
    format: OutputFormat,
    cancel: CancellationToken,
) -> Result<ExitCode> {
    let mut results: Vec<OperationResult> = Vec::new();
    let mut summary: Option<BatchSummary> = None;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => match interrupt(&cancel) {
                Interrupt::Cancel => {
                    eprintln!("Cancelling after the current item (Ctrl-C again to abort)...");
                }
                Interrupt::Abort => {
                    eprintln!("Aborted");
                    // The worker may be inside a long copy; do not wait for it.
                    std::process::exit(130);
                }
            },
            event = rx.recv() => {
                let Some(event) = event else { break };
                match event {
                    OperationEvent::Started { operation_type, total } => {
                        debug!(%operation_type, total, "batch started");
                    }
                    OperationEvent::Item { result, .. } => {
                        if matches!(format, OutputFormat::Text) {
                            println!("{result}");
                        }
                        results.push(result);
                    }
                    OperationEvent::Complete(s) => summary = Some(s),
                    OperationEvent::Rejected(e) => bail!(e),
                }
            }
        }
    }

    let success = summary.as_ref().is_some_and(BatchSummary::is_success);
    match format {
        OutputFormat::Text => {
            if let Some(summary) = &summary {
                eprintln!("{}", summary.summary());
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({ "results": results, "summary": summary });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// What a Ctrl-C press does to a running batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    /// First press: stop before the next item.
    Cancel,
    /// Already cancelling: stop now.
    Abort,
}

fn interrupt(cancel: &CancellationToken) -> Interrupt {
    if cancel.is_cancelled() {
        Interrupt::Abort
    } else {
        cancel.cancel();
        Interrupt::Cancel
    }
}

fn run_status(clipboard: &ClipboardState, format: OutputFormat) -> Result<ExitCode> {
    let mode = clipboard.mode();
    let paths = clipboard.marked_paths();

    match format {
        OutputFormat::Text => match mode {
            None => println!("Nothing marked"),
            Some(mode) => {
                println!("{} ({} items)", mode, paths.len());
                for path in &paths {
                    println!("  {}", path.display());
                }
            }
        },
        OutputFormat::Json => {
            let output = serde_json::json!({ "mode": mode, "paths": paths });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Show properties of the first path; the rest are ignored.
fn run_props(
    engine: &FileOperationEngine,
    paths: &[PathBuf],
    format: OutputFormat,
) -> Result<ExitCode> {
    let Some(props) = engine.query_properties_first(paths) else {
        return Ok(ExitCode::SUCCESS);
    };
    let props = props?;

    match format {
        OutputFormat::Text => print_properties(&props),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&props)?),
    }

    Ok(ExitCode::SUCCESS)
}

fn print_properties(props: &PropertiesSnapshot) {
    let size = match props.size_bytes {
        Some(bytes) => format_size(bytes),
        None => "Folder".to_string(),
    };

    println!("{:<10} {}", "Name:", props.name);
    println!("{:<10} {}", "Location:", props.parent_path.display());
    println!("{:<10} {}", "Size:", size);
    println!("{:<10} {}", "Created:", format_time(props.created_at));
    println!("{:<10} {}", "Modified:", format_time(props.modified_at));
    println!("{:<10} {}", "Attributes:", props.attributes().join(", "));
}

/// Format a timestamp as `yyyy/MM/dd HH:mm:ss` local time.
fn format_time(time: Option<DateTime<Utc>>) -> String {
    match time {
        Some(time) => time
            .with_timezone(&Local)
            .format("%Y/%m/%d %H:%M:%S")
            .to_string(),
        None => "-".to_string(),
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
