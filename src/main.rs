use anyhow::{Context, Result};
use cdr_store::config::Config;
use cdr_store::display::DisplayManager;
use cdr_store::field_parser::FieldParser;
use cdr_store::file_discovery::FileDiscovery;
use cdr_store::logging::init_logging;
use cdr_store::{DateRange, QueryEngine, RecordStore};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "cdr-query")]
#[command(about = "Query call-detail records loaded from CSV exports")]
#[command(version)]
struct Cli {
    /// Directory holding the CSV exports (overrides CDR_DATA_DIR and config files)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Window {
    /// First call date, inclusive (DD/MM/YYYY or YYYY-MM-DD)
    #[arg(long, value_parser = parse_cli_date)]
    from: NaiveDate,

    /// Last call date, inclusive (DD/MM/YYYY or YYYY-MM-DD)
    #[arg(long, value_parser = parse_cli_date)]
    to: NaiveDate,
}

impl Window {
    fn range(&self) -> DateRange {
        DateRange::new(self.from, self.to)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a single call by its reference
    Reference {
        reference: String,
    },
    /// Count calls and total their duration within a date window
    Summary {
        #[command(flatten)]
        window: Window,
    },
    /// List a caller's calls within a date window
    Caller {
        caller_id: String,
        #[command(flatten)]
        window: Window,
    },
    /// Show a caller's most expensive calls within a date window
    Top {
        caller_id: String,
        #[command(flatten)]
        window: Window,
        /// Number of calls to show
        #[arg(long, short = 'n', default_value_t = 5)]
        count: usize,
    },
    /// Show ingestion statistics for the data directory
    Stats,
}

fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(e) = run(cli) {
        handle_error(e, json);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(data_dir) = cli.data_dir {
        config.store.data_directory = data_dir;
    }
    if cli.pretty {
        config.output.json_pretty = true;
    }

    let _log_guard = init_logging(&config.logging);
    config.log_summary();

    let discovery = FileDiscovery::new(config.store.file_extension.as_str());
    let store = RecordStore::load_with(&config.store.data_directory, &discovery)
        .with_context(|| {
            format!(
                "Failed to load records from {}",
                config.store.data_directory.display()
            )
        })?;

    let engine = QueryEngine::new(Arc::new(store));
    let display = DisplayManager::new(
        cli.json,
        config.output.json_pretty,
        config.output.date_format.as_str(),
    );

    match cli.command {
        Commands::Reference { reference } => {
            display.display_record(&reference, engine.get_by_reference(&reference))
        }
        Commands::Summary { window } => {
            let range = window.range();
            let summary = engine.get_call_count_and_total_duration(range.start, range.end);
            display.display_summary(range, &summary)
        }
        Commands::Caller { caller_id, window } => {
            let range = window.range();
            let calls = engine.get_cdrs_by_caller_id(&caller_id, range.start, range.end);
            display.display_records(&format!("Calls from {}", caller_id), &calls)
        }
        Commands::Top {
            caller_id,
            window,
            count,
        } => {
            let range = window.range();
            let calls = engine.get_most_expensive_calls(&caller_id, range.start, range.end, count);
            display.display_records(
                &format!("Top {} most expensive calls from {}", count, caller_id),
                &calls,
            )
        }
        Commands::Stats => display.display_report(engine.store().report()),
    }
}

fn parse_cli_date(value: &str) -> Result<NaiveDate, String> {
    FieldParser::parse_date(value)
        .or_else(|_| NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d"))
        .map_err(|_| format!("invalid date {:?}, use DD/MM/YYYY or YYYY-MM-DD", value))
}

fn handle_error(e: anyhow::Error, json: bool) -> ! {
    if json {
        println!("{}", serde_json::json!({ "error": format!("{:#}", e) }));
    } else {
        eprintln!("❌ Error: {:#}", e);
    }
    process::exit(1);
}
