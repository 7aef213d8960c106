use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use mostaql_watch::store::BaselineStore;
use mostaql_watch::{RunOutcome, SessionContext, WatchConfig, Watcher};

#[derive(Parser)]
#[command(name = "mostaql-watch")]
#[command(about = "Polls the mostaql.com dashboard and reports newly published projects", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[arg(
        long,
        env = "MOSTAQL_STATE_DIR",
        default_value = "logs",
        global = true,
        help = "Directory holding the baseline and notification files"
    )]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one poll cycle: fetch the dashboard, compare with the baseline and notify
    Check {
        #[arg(
            long,
            env = "MOSTAQL_URL",
            default_value = "https://mostaql.com/",
            help = "Dashboard page to fetch"
        )]
        url: String,

        #[arg(
            long,
            default_value_t = 30,
            value_parser = clap::value_parser!(u64).range(1..),
            help = "Request timeout in seconds"
        )]
        timeout: u64,

        #[arg(
            long,
            env = "MOSTAQL_WEBHOOK_URL",
            help = "Also POST the notification record to this URL"
        )]
        webhook_url: Option<String>,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
    /// Print the stored baseline without touching the network
    Baseline {
        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

fn print_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::NewItems { items, .. } => {
            println!("\n🆕 {} new project(s) this cycle.", items.len())
        }
        RunOutcome::NoNewItems { checked } => {
            println!("\n✅ No new projects found. (Total projects checked: {checked})");
            println!("All projects have been seen before.");
        }
        RunOutcome::BaselineReset { checked } => println!(
            "\n⚠️  Baseline was unreadable and has been rebuilt from {checked} project(s)."
        ),
        RunOutcome::FetchFailed { .. } | RunOutcome::StructureChanged | RunOutcome::NoItems => {
            println!("No projects found or error occurred")
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    let config = WatchConfig::default().with_state_dir(&cli.state_dir);

    match cli.command {
        Commands::Check {
            url,
            timeout,
            webhook_url,
            format,
        } => {
            let session = SessionContext::from_env().unwrap_or_else(|e| {
                log::error!("{e}");
                eprintln!("{}", SessionContext::guidance());
                process::exit(1);
            });
            log::debug!("Using cookies from environment variables: {:?}", session);

            let config = WatchConfig {
                url,
                timeout: Duration::from_secs(timeout),
                webhook_url,
                console_alerts: matches!(format, OutputFormat::Text),
                ..config
            };

            let watcher = Watcher::from_config(&config, session).unwrap_or_else(|e| {
                log::error!("{e}");
                process::exit(1);
            });

            let outcome = watcher.run().await;

            match format {
                OutputFormat::Json => serialize_json(&outcome),
                OutputFormat::Text => print_outcome(&outcome),
            }
        }

        Commands::Baseline { format } => {
            let store = BaselineStore::new(&config.baseline_path);
            match store.load() {
                Ok(Some(baseline)) => match format {
                    OutputFormat::Json => serialize_json(&baseline),
                    OutputFormat::Text => print!("{}", baseline),
                },
                Ok(None) => println!("No baseline at {}", store.path().display()),
                Err(e) => log::error!("{e}"),
            }
        }
    }
}
