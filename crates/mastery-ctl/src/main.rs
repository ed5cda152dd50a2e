use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mastery_db::KvBackend;
use mastery_tracker::{Tracker, TrackerConfig};
use tracing::{debug, error};

mod commands;

#[derive(Parser)]
#[command(name = "mastery-ctl")]
#[command(about = "Self-Mastery daily habit tracker", long_about = None)]
struct Cli {
    #[arg(long, global = true, help = "Path to the configuration file")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Flip a task between done and not done
    Toggle {
        task_id: String,
        #[arg(short, long, help = "Day to update (YYYY-MM-DD, default today)")]
        date: Option<String>,
    },

    /// Record a free-text value such as screen time
    Log {
        task_id: String,
        value: String,
        #[arg(short, long, help = "Day to update (YYYY-MM-DD, default today)")]
        date: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },

    Day {
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Task-by-day table for the week containing the date
    Week {
        #[arg(short, long)]
        date: Option<String>,
    },

    Month {
        #[arg(short, long)]
        year: Option<i32>,
        #[arg(short, long, help = "Month number, 1-12")]
        month: Option<u32>,
    },

    Report {
        #[arg(help = "completion, category or trend")]
        kind: String,
        #[arg(short, long, help = "Last day of the report window")]
        date: Option<String>,
        #[arg(long, help = "Keep catalog/chronological order instead of ranking")]
        natural: bool,
        #[arg(short, long, help = "Output file (default self-mastery-<kind>-report.csv)")]
        output: Option<PathBuf>,
        #[arg(long, help = "Print the CSV instead of writing a file")]
        print: bool,
    },

    Login {
        username: String,
    },

    Logout,

    Whoami,

    Data {
        #[command(subcommand)]
        action: DataAction,
    },
}

#[derive(Subcommand)]
enum TaskAction {
    List,
    Add {
        name: String,
        #[arg(short, long, default_value = "productivity")]
        category: String,
        #[arg(long, help = "Track a duration value instead of done/not done")]
        duration: bool,
        #[arg(long)]
        description: Option<String>,
    },
}

#[derive(Subcommand)]
enum DataAction {
    /// Full JSON backup of tasks and entries
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace all tasks and entries with a JSON backup
    Import { path: PathBuf },
    /// Task catalog as CSV
    ExportTasks {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete every recorded entry, keeping the catalog
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(TrackerConfig::default_config_path);
    let config = TrackerConfig::load_from_path(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    config.validate()?;
    debug!("Using configuration from {:?}", config_path);

    let tracker = Tracker::open(&config).await.context("Failed to open tracker database")?;

    let result = run(cli.command, &tracker).await;
    tracker.close().await;

    if let Err(e) = &result {
        error!("Command failed: {:#}", e);
    }
    result
}

async fn run<B: KvBackend>(command: Commands, tracker: &Tracker<B>) -> Result<()> {
    match command {
        Commands::Task { action } => match action {
            TaskAction::List => commands::tasks::list(tracker).await?,
            TaskAction::Add { name, category, duration, description } => {
                commands::tasks::add(tracker, &name, &category, duration, description).await?;
            }
        },
        Commands::Toggle { task_id, date } => {
            commands::tasks::toggle(tracker, &task_id, date.as_deref()).await?;
        }
        Commands::Log { task_id, value, date, notes } => {
            commands::tasks::log_value(tracker, &task_id, &value, notes, date.as_deref()).await?;
        }
        Commands::Day { date } => commands::progress::day(tracker, date.as_deref()).await?,
        Commands::Week { date } => commands::progress::week(tracker, date.as_deref()).await?,
        Commands::Month { year, month } => commands::progress::month(tracker, year, month).await?,
        Commands::Report { kind, date, natural, output, print } => {
            commands::report::generate(tracker, &kind, date.as_deref(), natural, output, print)
                .await?
        }
        Commands::Login { username } => commands::session::login(tracker, &username).await?,
        Commands::Logout => commands::session::logout(tracker).await?,
        Commands::Whoami => commands::session::whoami(tracker).await?,
        Commands::Data { action } => match action {
            DataAction::Export { output } => commands::data::export(tracker, output).await?,
            DataAction::Import { path } => commands::data::import(tracker, &path).await?,
            DataAction::ExportTasks { output } => {
                commands::data::export_tasks(tracker, output).await?
            }
            DataAction::Clear { yes } => commands::data::clear(tracker, yes).await?,
        },
    }

    Ok(())
}
