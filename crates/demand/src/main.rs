use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use demand_core::db::{self, DEFAULT_DATABASE_URL};
use demand_core::ingestion::{FileInput, FileReport};
use demand_core::outputs::{write_daily_csv, write_daily_parquet, write_dirty_csv};
use demand_core::repository::{AppendReport, DemandStore, SqliteDemandStore, WriteMode};
use demand_core::{run_pipeline, EtlConfig, PipelineError, QualityStats};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Daily electricity demand ETL", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the daily demand table
    Init,
    /// Parse, clean and store a batch of rgd_DDMMYY workbooks
    Ingest(IngestArgs),
    /// Show how many days are stored and the latest one
    Stats,
    /// Write the stored daily series to a file
    Export(ExportArgs),
    /// Delete every stored day
    Clear(ClearArgs),
}

#[derive(Args, Debug)]
struct IngestArgs {
    /// Files or glob patterns, e.g. "data/rgd_*.xlsx"
    #[arg(required = true)]
    patterns: Vec<String>,
    /// TOML file with schema, cleaning and aggregation settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Replace stored days inside the ingested date range
    #[arg(long)]
    replace: bool,
    /// Run the pipeline without touching the database
    #[arg(long)]
    dry_run: bool,
    /// Write the uncleaned daily means as CSV
    #[arg(long)]
    dirty_out: Option<PathBuf>,
    /// Write the cleaned daily series as CSV
    #[arg(long)]
    clean_out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum ExportFormat {
    #[default]
    Csv,
    Parquet,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(long)]
    out: PathBuf,
    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    format: ExportFormat,
}

#[derive(Args, Debug)]
struct ClearArgs {
    /// Required confirmation
    #[arg(long)]
    yes: bool,
}

#[derive(Serialize)]
struct IngestSummary<'a> {
    dry_run: bool,
    days: usize,
    first_date: Option<NaiveDate>,
    last_date: Option<NaiveDate>,
    stats: QualityStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    stored: Option<AppendReport>,
    files: &'a [FileReport],
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Init => {
            let store = open_store().await?;
            store.initialize().await?;
            info!("daily demand table ready");
            Ok(())
        }
        Command::Ingest(args) => ingest(args).await,
        Command::Stats => {
            let store = open_store().await?;
            store.initialize().await?;
            let stats = store.stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
        Command::Export(args) => {
            let store = open_store().await?;
            store.initialize().await?;
            let series = store.load_all().await?;
            match args.format {
                ExportFormat::Csv => {
                    let file = File::create(&args.out)
                        .with_context(|| format!("creating {}", args.out.display()))?;
                    write_daily_csv(&series, BufWriter::new(file))?;
                }
                ExportFormat::Parquet => write_daily_parquet(&series, &args.out)?,
            }
            info!(days = series.len(), out = %args.out.display(), "daily series exported");
            Ok(())
        }
        Command::Clear(args) => {
            if !args.yes {
                bail!("refusing to delete stored data without --yes");
            }
            let store = open_store().await?;
            store.initialize().await?;
            let deleted = store.clear_all().await?;
            println!("{}", serde_json::json!({ "deleted": deleted }));
            Ok(())
        }
    }
}

async fn ingest(args: IngestArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => EtlConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EtlConfig::default(),
    };
    let parser = config.parser()?;

    let files = collect_files(&args.patterns)?;
    if files.is_empty() {
        bail!("no files matched {:?}", args.patterns);
    }
    let inputs: Vec<FileInput<'_>> = files
        .iter()
        .map(|(name, contents)| FileInput {
            name: name.as_str(),
            contents: contents.as_slice(),
        })
        .collect();

    let output = match run_pipeline(&inputs, &parser, &config) {
        Ok(output) => output,
        Err(PipelineError::EmptyBatch { reports }) => {
            println!("{}", serde_json::to_string_pretty(&reports)?);
            bail!("none of the {} files could be parsed", inputs.len());
        }
        Err(err) => return Err(err.into()),
    };

    if let Some(path) = &args.dirty_out {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        write_dirty_csv(&output.dirty, BufWriter::new(file))?;
    }
    if let Some(path) = &args.clean_out {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        write_daily_csv(&output.clean, BufWriter::new(file))?;
    }

    let stored = if args.dry_run {
        warn!("dry run, nothing is written to the database");
        None
    } else {
        let mode = if args.replace {
            WriteMode::ReplaceOverlap
        } else {
            WriteMode::SkipDuplicates
        };
        let store = open_store().await?;
        store.initialize().await?;
        Some(store.append(&output.clean, mode).await?)
    };

    let summary = IngestSummary {
        dry_run: args.dry_run,
        days: output.clean.len(),
        first_date: output.clean.first_date(),
        last_date: output.clean.last_date(),
        stats: output.stats,
        stored,
        files: &output.reports,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Expands each pattern and reads every matching file, keyed by file name.
fn collect_files(patterns: &[String]) -> Result<Vec<(String, Vec<u8>)>> {
    let mut files = Vec::new();
    for pattern in patterns {
        for entry in glob::glob(pattern).with_context(|| format!("invalid pattern {pattern}"))? {
            let path = match entry {
                Ok(path) => path,
                Err(err) => {
                    warn!(error = %err, "could not read path from glob pattern");
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            let contents =
                fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            files.push((file_name(&path), contents));
        }
    }
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

async fn open_store() -> Result<SqliteDemandStore> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("DEMAND_DATABASE_URL"))
        .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let pool = db::connect(&database_url)
        .await
        .with_context(|| format!("connecting to {database_url}"))?;
    Ok(SqliteDemandStore::new(pool))
}
