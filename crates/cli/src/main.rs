//! unitrack CLI - work through units and track progress.

mod output;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use unitrack_analytics::AnalyticsEngine;
use unitrack_core::{Clock, OutcomeId, SystemClock, TaskId, Unit, UnitId};
use unitrack_feedback::{Applied, FeedbackClient, FeedbackService, DEFAULT_FEEDBACK_TYPE};
use unitrack_progress::{ProgressStore, UnitCatalog};
use unitrack_storage::{JsonStorage, KeyValueStore, StorageFolder};
use unitrack_transfer::{
    FileSink, FileSource, RemoteFolder, TransferService, DEFAULT_CHUNK_THRESHOLD,
};

#[derive(Parser)]
#[command(name = "unitrack")]
#[command(about = "Learning unit progress tracker", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding units and progress
    #[arg(long, env = "UNITRACK_DATA_DIR", default_value = ".unitrack", global = true)]
    data_dir: PathBuf,

    /// SQLite database used instead of the data directory
    #[cfg(feature = "sqlite")]
    #[arg(long, env = "UNITRACK_SQLITE", global = true)]
    sqlite: Option<PathBuf>,

    /// Feedback service endpoint
    #[arg(long, env = "UNITRACK_FEEDBACK_URL", global = true)]
    feedback_url: Option<String>,

    /// Feedback request timeout in seconds
    #[arg(long, env = "UNITRACK_FEEDBACK_TIMEOUT", default_value_t = 120, global = true)]
    feedback_timeout: u64,

    /// Local folder for exports
    #[arg(long, env = "UNITRACK_STORAGE_DIR", default_value = "storage", global = true)]
    storage_dir: PathBuf,

    /// Storage server used for exports instead of the local folder
    #[arg(long, env = "UNITRACK_SERVER", global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add or replace a unit from a JSON file
    AddUnit {
        /// Unit file
        file: PathBuf,
    },
    /// List units
    Units,
    /// Remove a unit and its progress
    RemoveUnit {
        /// Unit ID
        id: String,
    },
    /// Show a unit with task statuses
    Show {
        /// Unit ID
        unit: String,
    },
    /// Write an answer
    Answer {
        /// Unit ID
        unit: String,
        /// Task ID
        task: String,
        /// Answer text
        text: Option<String>,
        /// Read the answer from a file
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },
    /// Mark a task complete
    Complete {
        /// Unit ID
        unit: String,
        /// Task ID
        task: String,
    },
    /// Mark a task incomplete
    Uncomplete {
        /// Unit ID
        unit: String,
        /// Task ID
        task: String,
    },
    /// Move to a task
    Goto {
        /// Unit ID
        unit: String,
        /// Learning outcome ID
        lo: String,
        /// Task ID
        task: String,
    },
    /// Move to the task after the current one
    Next {
        /// Unit ID
        unit: String,
    },
    /// Request feedback on an answer
    Feedback {
        /// Unit ID
        unit: String,
        /// Task ID
        task: String,
        /// Feedback type
        #[arg(long = "type", default_value = DEFAULT_FEEDBACK_TYPE)]
        feedback_type: String,
    },
    /// Show progress analytics
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export everything
    Export {
        /// Export name
        name: String,
        /// Split into per-unit files above this many bytes
        #[arg(long, default_value_t = DEFAULT_CHUNK_THRESHOLD)]
        chunk_threshold: usize,
    },
    /// Replace everything with an export
    Import {
        /// Export name
        name: String,
    },
    /// Show a task's status history
    History {
        /// Unit ID
        unit: String,
        /// Task ID
        task: String,
    },
    /// Recompute all unit summaries
    Recalculate,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let catalog = UnitCatalog::new(open_storage(&cli).await?, clock);
    run(cli, catalog).await
}

/// Execute one parsed command against `catalog`.
async fn run(cli: Cli, catalog: UnitCatalog) -> Result<()> {
    let clock = catalog.clock().clone();

    match cli.command {
        Commands::AddUnit { file } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let unit: Unit = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a valid unit", file.display()))?;
            let summary = catalog.add_unit(unit).await?;
            println!(
                "Added unit: {} - {} ({} tasks)",
                summary.id, summary.title, summary.total_tasks
            );
        }
        Commands::Units => {
            let summaries = catalog.summaries().await?;
            output::print_summaries(&summaries);
        }
        Commands::RemoveUnit { id } => {
            if catalog.remove_unit(&UnitId::from(id.as_str())).await? {
                println!("Removed unit: {}", id);
            } else {
                println!("Unit not found");
            }
        }
        Commands::Show { unit } => {
            let unit = catalog.require_unit(&UnitId::from(unit)).await?;
            let store = ProgressStore::open(catalog.clone(), unit.id.clone()).await?;
            output::print_unit(&unit, store.progress());
        }
        Commands::Answer { unit, task, text, file } => {
            let (_, mut store, task_id) = open_task(&catalog, unit, task).await?;
            let content = match (text, file) {
                (Some(text), _) => text,
                (None, Some(file)) => tokio::fs::read_to_string(&file)
                    .await
                    .with_context(|| format!("Failed to read {}", file.display()))?,
                (None, None) => bail!("Provide the answer text or --file"),
            };
            let answer = store.update_answer(&task_id, content).await?;
            println!(
                "Saved answer for {} (version {}, {})",
                task_id,
                answer.version,
                output::format_status(answer.status())
            );
        }
        Commands::Complete { unit, task } => {
            let (_, mut store, task_id) = open_task(&catalog, unit, task).await?;
            let status = store.mark_task_complete(&task_id).await?;
            println!("{}: {}", task_id, output::format_status(status));
        }
        Commands::Uncomplete { unit, task } => {
            let (_, mut store, task_id) = open_task(&catalog, unit, task).await?;
            let status = store.mark_task_incomplete(&task_id).await?;
            println!("{}: {}", task_id, output::format_status(status));
        }
        Commands::Goto { unit, lo, task } => {
            let (unit, mut store, task_id) = open_task(&catalog, unit, task).await?;
            let lo_id = OutcomeId::from(lo.as_str());
            let Some(outcome) = unit.outcome(&lo_id) else {
                bail!("Learning outcome {} not found in unit {}", lo_id, unit.id);
            };
            if !outcome.tasks.iter().any(|t| t.id == task_id) {
                bail!("Task {} is not part of {}", task_id, lo_id);
            }
            store.set_current_task(lo_id, task_id.clone()).await?;
            println!("Now on {} / {}", outcome.id, task_id);
        }
        Commands::Next { unit } => {
            let unit = catalog.require_unit(&UnitId::from(unit)).await?;
            let mut store = ProgressStore::open(catalog.clone(), unit.id.clone()).await?;
            match store.next_task(&unit.learning_outcomes) {
                Some((outcome, task)) => {
                    let (lo_id, task_id) = (outcome.id.clone(), task.id.clone());
                    println!("Next: {} / {} - {}", lo_id, task_id, task.description);
                    store.set_current_task(lo_id, task_id).await?;
                }
                None => println!("No further tasks"),
            }
        }
        Commands::Feedback { unit, task, feedback_type } => {
            let Some(url) = cli.feedback_url.clone() else {
                bail!("No feedback service configured; set --feedback-url or UNITRACK_FEEDBACK_URL");
            };
            let (unit, mut store, task_id) = open_task(&catalog, unit, task).await?;
            let client = FeedbackClient::with_timeout(url, Duration::from_secs(cli.feedback_timeout));
            let service = FeedbackService::new(Arc::new(client));
            match service
                .request_and_apply(&mut store, &unit, &task_id, &feedback_type)
                .await?
            {
                Applied::Stored(pending) => println!("{}", pending.text),
                Applied::Discarded(_) => println!("Feedback discarded; the current task changed"),
            }
        }
        Commands::Stats { json } => {
            let state = catalog.snapshot().await?;
            let stats = AnalyticsEngine::local().compute(&state, clock.now());
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                output::print_stats(&stats);
            }
        }
        Commands::Export { name, chunk_threshold } => {
            let transfer = TransferService::new(catalog.clone());
            let written = match &cli.server {
                Some(url) => {
                    let sink: &dyn FileSink = &RemoteFolder::new(url.clone());
                    transfer.export_to(sink, &name, chunk_threshold).await?
                }
                None => {
                    let sink: &dyn FileSink = &StorageFolder::new(&cli.storage_dir);
                    transfer.export_to(sink, &name, chunk_threshold).await?
                }
            };
            for file in written {
                println!("Wrote {}", file);
            }
        }
        Commands::Import { name } => {
            let transfer = TransferService::new(catalog.clone());
            let report = match &cli.server {
                Some(url) => {
                    let source: &dyn FileSource = &RemoteFolder::new(url.clone());
                    transfer.import_from(source, &name).await?
                }
                None => {
                    let source: &dyn FileSource = &StorageFolder::new(&cli.storage_dir);
                    transfer.import_from(source, &name).await?
                }
            };
            info!(version = report.version, chunked = report.chunked, "Import finished");
            println!("Imported {} units", report.units);
        }
        Commands::History { unit, task } => {
            let (_, store, task_id) = open_task(&catalog, unit, task).await?;
            match store.answer(&task_id) {
                Some(answer) => output::print_history(answer),
                None => println!("No answer for {}", task_id),
            }
        }
        Commands::Recalculate => {
            let summaries = catalog.recalculate().await?;
            output::print_summaries(&summaries);
        }
    }

    Ok(())
}

async fn open_storage(cli: &Cli) -> Result<Arc<dyn KeyValueStore>> {
    if let Some(storage) = open_sqlite(cli).await? {
        return Ok(storage);
    }

    let storage = JsonStorage::new(&cli.data_dir)
        .await
        .with_context(|| format!("Failed to open {}", cli.data_dir.display()))?;
    Ok(Arc::new(storage))
}

#[cfg(feature = "sqlite")]
async fn open_sqlite(cli: &Cli) -> Result<Option<Arc<dyn KeyValueStore>>> {
    let Some(path) = &cli.sqlite else {
        return Ok(None);
    };
    let storage = unitrack_storage::SqliteStorage::new_from_path(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(Some(Arc::new(storage)))
}

#[cfg(not(feature = "sqlite"))]
async fn open_sqlite(_cli: &Cli) -> Result<Option<Arc<dyn KeyValueStore>>> {
    Ok(None)
}

/// Load a unit, its progress store and a task id known to belong to it.
async fn open_task(
    catalog: &UnitCatalog,
    unit: String,
    task: String,
) -> Result<(Unit, ProgressStore, TaskId)> {
    let unit = catalog.require_unit(&UnitId::from(unit)).await?;
    let task_id = TaskId::from(task);
    if unit.find_task(&task_id).is_none() {
        bail!("Task {} not found in unit {}", task_id, unit.id);
    }
    let store = ProgressStore::open(catalog.clone(), unit.id.clone()).await?;
    Ok((unit, store, task_id))
}
