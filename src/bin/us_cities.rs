use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use uscities::config::Config;
use uscities::credentials::{resolve_password, PasswordSource};
use uscities::ingest::{ingest, DEFAULT_BATCH_SIZE};
use uscities::io::cities_csv::CityRows;
use uscities::query::{dedup_states, latest_year, sum_population};
use uscities::render::{render_summary, render_totals};
use uscities::report::summarize;
use uscities::states::normalize;
use uscities::store::{ConnectionParams, PgStore};

#[derive(Parser, Debug)]
#[command(name = "us-cities", about = "Load and aggregate US city population data")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a city population CSV into the database
    Load(LoadArgs),
    /// Sum population per state
    Query(QueryArgs),
}

#[derive(Args, Debug)]
struct LoadArgs {
    /// Path to the CSV file
    #[arg(long, short = 'f', value_name = "PATH", default_value = "/data/cities.csv")]
    file: PathBuf,
    /// Rows per upsert statement
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,
    #[command(flatten)]
    db: DbArgs,
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// One or more US states (full name or 2-letter code)
    #[arg(long, value_name = "STATE", num_args = 1.., required = true)]
    states: Vec<String>,
    /// Year to aggregate; defaults to the latest year in the table
    #[arg(long)]
    year: Option<i32>,
    #[command(flatten)]
    db: DbArgs,
}

#[derive(Args, Debug)]
struct DbArgs {
    /// Database user; defaults to DB_USER
    #[arg(long)]
    user: Option<String>,
    #[command(flatten)]
    password: PasswordArgs,
    /// Enable verbose logging
    #[arg(long)]
    debug: bool,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct PasswordArgs {
    /// Prompt for the password on stdin
    #[arg(long)]
    pw_stdin: bool,
    /// Read the password from the first line of FILE
    #[arg(long, value_name = "FILE")]
    pw_file: Option<PathBuf>,
    /// Plain-text password (not recommended)
    #[arg(long, value_name = "PW")]
    password: Option<String>,
}

impl PasswordArgs {
    fn source(&self) -> PasswordSource {
        if self.pw_stdin {
            PasswordSource::Stdin
        } else if let Some(path) = &self.pw_file {
            PasswordSource::File(path.clone())
        } else {
            PasswordSource::Inline(self.password.clone().unwrap_or_default())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    // Optional; variables already set in the environment win.
    let _ = dotenvy::dotenv();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<uscities::Error>() {
            Some(uscities::Error::UnknownState(token)) => {
                error!(token = %token, "bad state");
                ExitCode::from(1)
            }
            _ => {
                eprintln!("Error: {err:?}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = Config::from_env().context("failed to read configuration")?;
    match cli.command {
        Command::Load(args) => {
            init_logging(args.db.debug || cfg.debug);
            handle_load(args, &cfg)
        }
        Command::Query(args) => {
            init_logging(args.db.debug || cfg.debug);
            handle_query(args, &cfg)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info,uscities=debug,us_cities=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();
    debug!(verbose, "logging initialised");
}

fn connection_params(db: &DbArgs, cfg: &Config) -> anyhow::Result<ConnectionParams> {
    let password = resolve_password(&db.password.source()).context("failed to resolve password")?;
    Ok(ConnectionParams {
        host: cfg.host.clone(),
        port: cfg.port,
        user: db.user.clone().unwrap_or_else(|| cfg.user.clone()),
        password,
        database: cfg.database.clone(),
    })
}

fn handle_load(args: LoadArgs, cfg: &Config) -> anyhow::Result<()> {
    info!(
        file = %args.file.display(),
        host = %cfg.host,
        port = cfg.port,
        database = %cfg.database,
        "loading CSV"
    );
    let params = connection_params(&args.db, cfg)?;

    let rows = CityRows::from_path(&args.file)
        .with_context(|| format!("Failed to open cities CSV: {}", args.file.display()))?;

    let mut store = PgStore::connect(&params)
        .with_context(|| format!("postgres connect failed ({})", params.describe()))?;
    store
        .ensure_schema()
        .context("postgres schema ensure failed")?;

    let written = ingest(&mut store, rows, args.batch_size)
        .with_context(|| format!("CSV load failed ({})", args.file.display()))?;
    info!(rows = written, "CSV load complete");

    info!("running summary statistics to validate the load");
    let summary = summarize(&mut store).context("load summary query failed")?;

    info!("load verification snapshot:");
    println!();
    print!("{}", render_summary(&summary));
    println!();
    Ok(())
}

fn handle_query(args: QueryArgs, cfg: &Config) -> anyhow::Result<()> {
    info!(states = ?args.states, "CLI input states");

    let normalized = args
        .states
        .iter()
        .map(|s| normalize(s))
        .collect::<uscities::Result<Vec<&str>>>()?;
    let (states, deduplicated) = dedup_states(&normalized);
    debug!(?states, deduplicated, "normalized states");

    let params = connection_params(&args.db, cfg)?;
    let mut store = PgStore::connect(&params)
        .with_context(|| format!("postgres connect failed ({})", params.describe()))?;

    let year = match args.year {
        Some(year) => year,
        None => {
            let year = latest_year(&mut store).context("failed to read latest year")?;
            info!(year, "querying latest year present in DB");
            year
        }
    };

    let result = sum_population(&mut store, &states, year)
        .with_context(|| format!("population query failed (year={year})"))?;
    drop(store);

    print!("{}", render_totals(&result));
    info!("query finished successfully");
    Ok(())
}
