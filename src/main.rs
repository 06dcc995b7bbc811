use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

use readyrs::config::AppConfig;
use readyrs::database::Database;
use readyrs::error::ReadyRsError;
use readyrs::export::{self, ExportFormat};
use readyrs::logging::{init_logging, LogLevel};
use readyrs::models::{DailyMetrics, DateRange};
use readyrs::provider::{import_range, DailyMetricsCollector, JsonDumpProvider};
use readyrs::readiness::ReadinessCalculator;
use readyrs::report;
use readyrs::trend::TrendAnalyzer;

/// readyrs - Training Readiness CLI
///
/// Stores daily wearable summaries and scores same-day training readiness
/// from training load, sleep, HRV, resting heart rate and Body Battery.
#[derive(Parser)]
#[command(name = "readyrs")]
#[command(version)]
#[command(about = "Training readiness scoring from daily wearable metrics", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import daily summaries from a provider export directory
    Import {
        /// Export root containing one YYYY-MM-DD directory per day
        #[arg(short, long)]
        dir: PathBuf,

        /// First day to import (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        from: Option<NaiveDate>,

        /// Last day to import (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        to: Option<NaiveDate>,
    },

    /// Show the readiness score for one day
    Readiness {
        /// Day to score (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show the multi-day readiness trend
    Trend {
        /// Last day of the window (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        end: Option<NaiveDate>,

        /// Window length in days (default: from config)
        #[arg(short, long)]
        days: Option<u32>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Export stored days with their readiness
    Export {
        /// Output file path (.csv or .json, default: under settings.export_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// First day (YYYY-MM-DD, default: 30 days before --to)
        #[arg(short, long)]
        from: Option<NaiveDate>,

        /// Last day (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        to: Option<NaiveDate>,

        /// Export format (csv, json; default: from the file extension)
        #[arg(long)]
        format: Option<ExportFormat>,
    },

    /// Configure application settings
    Config {
        /// List all configuration options
        #[arg(short, long)]
        list: bool,

        /// Set a configuration value (KEY=VALUE)
        #[arg(short, long)]
        set: Option<String>,

        /// Get a configuration value
        #[arg(short, long)]
        get: Option<String>,
    },
}

fn main() {
    if let Err(e) = run() {
        match e.downcast_ref::<ReadyRsError>() {
            Some(err) => {
                err.log();
                eprintln!("{} {}", "Error:".red().bold(), err.user_message());
                if let Some(hint) = err.retry_hint() {
                    eprintln!("{}", hint.yellow());
                }
            }
            None => eprintln!("{} {:#}", "Error:".red().bold(), e),
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(AppConfig::default_config_path);
    let mut config = AppConfig::load_or_default(Some(&config_path))?;

    let mut log_config = config.logging.clone();
    if cli.verbose > 0 {
        log_config.level = LogLevel::from_verbosity(cli.verbose);
    }
    init_logging(&log_config)?;

    match cli.command {
        Commands::Import { dir, from, to } => {
            let today = Local::now().date_naive();
            let end = to.unwrap_or(today);
            let start = from.unwrap_or(end);
            let range = DateRange::new(start, end)?;

            let provider = JsonDumpProvider::open(&dir)?;
            let collector = DailyMetricsCollector::new(provider);
            let mut db = open_database(&config.settings.database_path)?;

            println!("{}", "Importing daily metrics...".green().bold());
            println!("  Source: {}", dir.display());
            println!("  Period: {}", range);

            let pb = ProgressBar::new(range.num_days() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .context("Invalid progress bar template")?
                    .progress_chars("#>-"),
            );

            let summary = import_range(&collector, &mut db, &range, |day| {
                pb.set_message(day.metrics.date.to_string());
                pb.inc(1);
            });
            pb.finish_and_clear();

            println!(
                "{} {} day(s) stored, {} skipped (no data)",
                "✓".green(),
                summary.stored,
                summary.skipped
            );
            if summary.partial > 0 {
                println!(
                    "{}",
                    format!("  {} day(s) stored with missing categories (see log)", summary.partial).yellow()
                );
            }
            for (date, reason) in &summary.failed {
                println!("{}", format!("  {} not stored: {}", date, reason).red());
            }
        }

        Commands::Readiness { date, json } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let db = open_database(&config.settings.database_path)?;
            let calculator = ReadinessCalculator::with_config(config.readiness.clone())?;

            let history = db.query_range(&DateRange::trailing(date, config.trend.window_days)?)?;
            let day = db
                .get_daily_metrics(date)?
                .unwrap_or_else(|| DailyMetrics::new(date));

            let result = calculator.assess_in_history(&day, &history, config.trend.window_days);

            if json {
                println!("{}", report::to_json(&result)?);
            } else {
                print!("{}", report::render_readiness(&result, true)?);
            }
        }

        Commands::Trend { end, days, json } => {
            let end = end.unwrap_or_else(|| Local::now().date_naive());
            let days = days.unwrap_or(config.trend.window_days);
            let range = DateRange::trailing(end, days)?;

            let db = open_database(&config.settings.database_path)?;
            let calculator = ReadinessCalculator::with_config(config.readiness.clone())?;
            let history = db.query_range(&range.with_lookback(config.trend.window_days)?)?;

            let trend = TrendAnalyzer::new(calculator, config.trend.window_days).analyze(range, &history);

            if json {
                println!("{}", report::to_json(&trend)?);
            } else {
                print!("{}", report::render_trend(&trend)?);
            }
        }

        Commands::Export {
            output,
            from,
            to,
            format,
        } => {
            let end = to.unwrap_or_else(|| Local::now().date_naive());
            let start = match from {
                Some(from) => from,
                None => DateRange::trailing(end, 30)?.start,
            };
            let range = DateRange::new(start, end)?;

            let (output, format) = match output {
                Some(path) => {
                    let format = format.unwrap_or_else(|| ExportFormat::from_path(&path));
                    (path, format)
                }
                None => {
                    let format = format.unwrap_or(ExportFormat::Csv);
                    (export::default_output_path(&config.settings.export_dir, &range, format), format)
                }
            };

            let db = open_database(&config.settings.database_path)?;
            let calculator = ReadinessCalculator::with_config(config.readiness.clone())?;
            let history = db.query_range(&range.with_lookback(config.trend.window_days)?)?;

            if !history.iter().any(|day| range.contains(day.date)) {
                println!("{}", format!("No stored days in {}", range).yellow());
                return Ok(());
            }

            let rows = export::export_daily_metrics(
                &range,
                &history,
                &calculator,
                config.trend.window_days,
                format,
                &output,
            )?;
            println!(
                "{} Exported {} day(s) to {}",
                "✓".green(),
                rows,
                output.display()
            );
        }

        Commands::Config { list, set, get } => {
            if list {
                println!("{}", format!("Configuration ({})", config_path.display()).bold());
                for (key, value) in config.list() {
                    println!("  {:<32} {}", key, value);
                }
            }

            if let Some(key) = get {
                println!("{}", config.get(&key)?);
            }

            if let Some(assignment) = set {
                let (key, value) = assignment
                    .split_once('=')
                    .with_context(|| format!("Expected KEY=VALUE, got '{}'", assignment))?;
                config.set(key.trim(), value.trim())?;
                config.save_to_file(&config_path)?;
                println!("{} {} = {}", "✓".green(), key.trim(), value.trim());
            }
        }
    }

    Ok(())
}

/// Open the store, creating its directory on first use
fn open_database(path: &Path) -> Result<Database> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
        }
    }

    Database::new(path).with_context(|| format!("Failed to open database: {}", path.display()))
}
