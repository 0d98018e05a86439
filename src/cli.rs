//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::adapters::console::{
    parse_line, render_chart, render_outcome, render_status, render_trades, ConsoleCommand, HELP,
};
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_export_adapter::CsvExportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::validate_simulator_config;
use crate::domain::error::{DataLoadError, SimulatorError};
use crate::domain::session::{CommandOutcome, SessionCommand, SimulationSession};
use crate::domain::sim_config::{build_simulator_config, SimulatorConfig};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;
use crate::ports::export_port::ExportPort;

const PROMPT: &str = "> ";

#[derive(Parser, Debug)]
#[command(name = "tradesim", about = "Day-by-day stock trading simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a trading session
    Simulate {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Dataset name from the data directory
        #[arg(long, conflicts_with = "file")]
        dataset: Option<String>,
        /// CSV file to load instead of a named dataset
        #[arg(long)]
        file: Option<PathBuf>,
        /// Read console commands from a file instead of stdin
        #[arg(long)]
        script: Option<PathBuf>,
    },
    /// List datasets in the data directory
    Datasets {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Simulate {
            config,
            dataset,
            file,
            script,
        } => run_simulate(
            config.as_ref(),
            dataset.as_deref(),
            file.as_ref(),
            script.as_ref(),
        ),
        Command::Datasets { config } => run_datasets(config.as_ref()),
        Command::Validate { config } => run_validate(&config),
    }
}

/// Read the INI file, or an empty config when no path was given.
pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ExitCode> {
    match path {
        Some(path) => FileConfigAdapter::from_file(path).map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }),
        None => Ok(FileConfigAdapter::empty()),
    }
}

/// Validate then build the simulator config.
pub fn prepare_config(adapter: &dyn ConfigPort) -> Result<SimulatorConfig, SimulatorError> {
    validate_simulator_config(adapter)?;
    build_simulator_config(adapter)
}

/// Install the stderr subscriber. `RUST_LOG` wins over the configured level.
pub fn init_logging(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init();
}

fn setup(config_path: Option<&PathBuf>) -> Result<SimulatorConfig, ExitCode> {
    let adapter = load_config(config_path)?;
    let config = prepare_config(&adapter).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    init_logging(&config.log_level);
    Ok(config)
}

fn run_simulate(
    config_path: Option<&PathBuf>,
    dataset: Option<&str>,
    file: Option<&PathBuf>,
    script: Option<&PathBuf>,
) -> ExitCode {
    let config = match setup(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let data = CsvAdapter::new(config.data_dir.clone());

    let market = match file {
        Some(path) => data.load_path(path).map_err(SimulatorError::from),
        None => resolve_dataset(dataset, &config, &data)
            .and_then(|name| data.load(&name).map_err(SimulatorError::from)),
    };
    let market = match market {
        Ok(m) => m,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let mut session = SimulationSession::new(config, market);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = match script {
        Some(path) => match fs::File::open(path) {
            Ok(f) => run_session(
                &mut session,
                &data,
                &CsvExportAdapter,
                BufReader::new(f),
                &mut out,
                None,
            ),
            Err(e) => {
                eprintln!("error: cannot open script {}: {e}", path.display());
                return ExitCode::from(1);
            }
        },
        None => {
            let stdin = io::stdin();
            let prompt = stdin.is_terminal().then_some(PROMPT);
            run_session(
                &mut session,
                &data,
                &CsvExportAdapter,
                stdin.lock(),
                &mut out,
                prompt,
            )
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let err = SimulatorError::from(e);
            eprintln!("error: {err}");
            (&err).into()
        }
    }
}

/// Pick the dataset to start on: the requested one, else the configured
/// default, else the first one listed.
pub fn resolve_dataset(
    requested: Option<&str>,
    config: &SimulatorConfig,
    data: &dyn MarketDataPort,
) -> Result<String, SimulatorError> {
    if let Some(name) = requested.or(config.default_dataset.as_deref()) {
        return Ok(name.to_string());
    }
    data.list_datasets()?
        .into_iter()
        .next()
        .ok_or_else(|| {
            DataLoadError::NoDatasets {
                location: config.data_dir.display().to_string(),
            }
            .into()
        })
}

/// Drive a session from lines of input until EOF or `quit`.
///
/// Command failures are printed as `error: ...` and the loop carries on;
/// only I/O errors on `input` or `out` end it early.
pub fn run_session<R: BufRead, W: Write>(
    session: &mut SimulationSession,
    data: &CsvAdapter,
    export: &dyn ExportPort,
    mut input: R,
    out: &mut W,
    prompt: Option<&str>,
) -> io::Result<()> {
    writeln!(out, "{}", render_status(&session.snapshot()))?;

    let mut line = String::new();
    loop {
        if let Some(p) = prompt {
            write!(out, "{p}")?;
            out.flush()?;
        }
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        match parse_line(&line) {
            Ok(None) => {}
            Ok(Some(ConsoleCommand::Quit)) => break,
            Ok(Some(command)) => match execute(session, data, export, command) {
                Ok(text) => writeln!(out, "{text}")?,
                Err(e) => writeln!(out, "error: {e}")?,
            },
            Err(msg) => writeln!(out, "error: {msg}")?,
        }
    }
    out.flush()
}

/// Run one console command and render its result.
pub fn execute(
    session: &mut SimulationSession,
    data: &CsvAdapter,
    export: &dyn ExportPort,
    command: ConsoleCommand,
) -> Result<String, SimulatorError> {
    match command {
        ConsoleCommand::Session(command) => dispatch_and_render(session, command),
        ConsoleCommand::Status => Ok(render_status(&session.snapshot())),
        ConsoleCommand::Trades => Ok(render_trades(session.portfolio().trades())),
        ConsoleCommand::Chart => Ok(render_chart(&session.chart())),
        ConsoleCommand::Load(name) => {
            session.load_from(data, &name)?;
            let outcome = CommandOutcome::DatasetLoaded {
                name: session.market().name().to_string(),
                bars: session.market().len(),
            };
            let price = session.current_bar().close;
            Ok(format!(
                "{}\n{}",
                render_outcome(&outcome, price),
                render_status(&session.snapshot())
            ))
        }
        ConsoleCommand::Open(path) => {
            let market = data.load_path(&path).inspect_err(|e| {
                warn!(path = %path.display(), error = %e, "dataset load failed");
            })?;
            dispatch_and_render(session, SessionCommand::ReplaceDataset(market))
        }
        ConsoleCommand::Export(path) => {
            let trades = session.portfolio().trades();
            export.export(trades, &path)?;
            Ok(format!(
                "Exported {} trades to {}",
                trades.len(),
                path.display()
            ))
        }
        ConsoleCommand::Datasets => describe_datasets(data),
        ConsoleCommand::Help => Ok(HELP.to_string()),
        ConsoleCommand::Quit => Ok(String::new()),
    }
}

/// Dispatch to the session. Moves and dataset swaps are followed by the
/// new status, a chart resize by the redrawn chart.
fn dispatch_and_render(
    session: &mut SimulationSession,
    command: SessionCommand,
) -> Result<String, SimulatorError> {
    let market_price = session.current_bar().close;
    let outcome = session.dispatch(command)?;
    let text = render_outcome(&outcome, market_price);
    Ok(match outcome {
        CommandOutcome::Moved { .. } | CommandOutcome::DatasetLoaded { .. } => {
            format!("{text}\n{}", render_status(&session.snapshot()))
        }
        CommandOutcome::ChartDays(_) => format!("{text}\n{}", render_chart(&session.chart())),
        _ => text,
    })
}

/// One line per dataset: bar count and date range. Datasets that fail to
/// load are reported inline.
pub fn describe_datasets(data: &dyn MarketDataPort) -> Result<String, SimulatorError> {
    let names = data.list_datasets()?;
    if names.is_empty() {
        return Ok("No datasets found.".to_string());
    }
    let lines: Vec<String> = names
        .iter()
        .map(|name| match data.load(name) {
            Ok(market) => format!(
                "{}: {} bars, {} to {}",
                name,
                market.len(),
                market.first_date(),
                market.last_date()
            ),
            Err(e) => format!("{name}: error: {e}"),
        })
        .collect();
    Ok(lines.join("\n"))
}

fn run_datasets(config_path: Option<&PathBuf>) -> ExitCode {
    let config = match setup(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let data = CsvAdapter::new(config.data_dir);
    match describe_datasets(&data) {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(Some(config_path)) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let config = match prepare_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("  initial cash:  {}", config.initial_cash);
    eprintln!("  start day:     {}", config.start_day);
    eprintln!("  chart days:    {}", config.chart_days);
    eprintln!("  slippage rate: {}", config.execution.slippage_rate);
    eprintln!("  commission:    {}", config.execution.commission);
    eprintln!("  data dir:      {}", config.data_dir.display());
    if let Some(name) = &config.default_dataset {
        eprintln!("  dataset:       {name}");
    }
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
