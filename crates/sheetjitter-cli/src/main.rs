mod registry;
mod settings;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use registry::{RunContext, init_console_logging, init_run_logging, start_run, write_report};
use settings::{SettingsError, load_config};
use sheetjitter_import::{ImportError, campaign_table, load_campaigns};
use sheetjitter_randomize::{
    ColumnBound, CsvStore, RandomizeError, RandomizeOptions, StoreError, TableRandomizer,
    TableStore,
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("config error: {0}")]
    Settings(#[from] SettingsError),
    #[error("randomize error: {0}")]
    Randomize(#[from] RandomizeError),
    #[error("import error: {0}")]
    Import(#[from] ImportError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(
    name = "sheetjitter",
    version,
    about = "Perturb campaign statistics sheets into look-alike synthetic data"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Randomize the numeric columns of a CSV file.
    Randomize(RandomizeArgs),
    /// Print the header name to rule category table.
    Rules(RulesArgs),
    /// Convert a saved Brevo emailCampaigns response into a campaign CSV.
    Import(ImportArgs),
}

#[derive(Args, Debug)]
struct RandomizeArgs {
    /// CSV file to read; rewritten in place unless --output is given.
    #[arg(value_name = "INPUT")]
    input: PathBuf,
    /// Write the randomized table here instead of over INPUT.
    #[arg(long)]
    output: Option<PathBuf>,
    /// TOML config file with range, variation factor and rule overrides.
    #[arg(long)]
    config: Option<PathBuf>,
    /// RNG seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,
    /// Proportional noise scale (0.1 means about +/- 10%).
    #[arg(long)]
    variation_factor: Option<f64>,
    /// First column to randomize: 0-based index or header name.
    #[arg(long, value_name = "COLUMN")]
    start_column: Option<String>,
    /// Last column to randomize (inclusive): 0-based index or header name.
    #[arg(long, value_name = "COLUMN")]
    end_column: Option<String>,
    /// Field delimiter of the CSV file.
    #[arg(long, default_value_t = ',')]
    delimiter: char,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
}

#[derive(Args, Debug)]
struct RulesArgs {
    /// TOML config file whose [rules] entries are merged in.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// JSON file holding one response page or a list of pages.
    #[arg(value_name = "CAMPAIGNS_JSON")]
    input: PathBuf,
    /// CSV file to create or replace.
    #[arg(long)]
    output: PathBuf,
    /// Field delimiter of the CSV file.
    #[arg(long, default_value_t = ',')]
    delimiter: char,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Randomize(args) => run_randomize(args),
        Command::Rules(args) => run_rules(args),
        Command::Import(args) => run_import(args),
    }
}

fn run_randomize(args: RandomizeArgs) -> Result<(), CliError> {
    let RandomizeArgs {
        input,
        output,
        config,
        seed,
        variation_factor,
        start_column,
        end_column,
        delimiter,
        run_dir,
    } = args;

    let mut options = load_config(config.as_deref())?.into_options();
    apply_overrides(
        &mut options,
        seed,
        variation_factor,
        start_column.as_deref(),
        end_column.as_deref(),
    );
    let delimiter = delimiter_byte(delimiter)?;
    let output = output.unwrap_or_else(|| input.clone());

    let run_id = Uuid::new_v4().to_string();
    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        run_dir,
        input: input.clone(),
        output: output.clone(),
        options: options.clone(),
    };

    let run_paths = start_run(&run_ctx)?;
    init_run_logging(&run_paths.logs_path)?;

    tracing::info!(event = "run_started", run_id = %run_id, input = %input.display());

    let timer = Instant::now();
    let mut store = CsvStore::new(&input)
        .with_output(&output)
        .with_delimiter(delimiter);
    let randomizer = TableRandomizer::new(options).with_run_id(run_id.clone());

    let report = match randomizer.run(&mut store) {
        Ok(report) => report,
        Err(err) => {
            tracing::error!(event = "run_failed", run_id = %run_id, error = %err);
            return Err(err.into());
        }
    };

    write_report(&run_paths, &report)?;
    tracing::info!(event = "report_written", path = %run_paths.report_path.display());

    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(event = "run_finished", status = "success", duration_ms = duration_ms);

    println!(
        "randomized {} cells in {} (seed {}, run {})",
        report.cells_randomized,
        output.display(),
        report.seed,
        run_paths.root.display()
    );

    Ok(())
}

fn run_rules(args: RulesArgs) -> Result<(), CliError> {
    let options = load_config(args.config.as_deref())?.into_options();
    for (name, category) in options.rules.entries() {
        println!("{name}\t{}", category.as_str());
    }
    println!("*\tdefault");
    Ok(())
}

fn run_import(args: ImportArgs) -> Result<(), CliError> {
    init_console_logging()?;
    let delimiter = delimiter_byte(args.delimiter)?;
    let rows = import_campaigns(&args.input, &args.output, delimiter)?;
    println!("wrote {rows} campaigns to {}", args.output.display());
    Ok(())
}

/// Returns the number of campaign rows written.
fn import_campaigns(input: &Path, output: &Path, delimiter: u8) -> Result<usize, CliError> {
    let campaigns = load_campaigns(input)?;
    let table = campaign_table(&campaigns);

    let mut store = CsvStore::new(output).with_delimiter(delimiter);
    store.write_all(&table)?;
    tracing::info!(
        event = "import_finished",
        input = %input.display(),
        output = %output.display(),
        campaigns = campaigns.len()
    );

    Ok(campaigns.len())
}

fn apply_overrides(
    options: &mut RandomizeOptions,
    seed: Option<u64>,
    variation_factor: Option<f64>,
    start_column: Option<&str>,
    end_column: Option<&str>,
) {
    if let Some(seed) = seed {
        options.seed = Some(seed);
    }
    if let Some(variation_factor) = variation_factor {
        options.variation_factor = variation_factor;
    }
    if let Some(column) = start_column {
        options.start_column = ColumnBound::parse(column);
    }
    if let Some(column) = end_column {
        options.end_column = ColumnBound::parse(column);
    }
}

fn delimiter_byte(delimiter: char) -> Result<u8, CliError> {
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| CliError::InvalidConfig(format!("delimiter must be ASCII, got '{delimiter}'")))
}
