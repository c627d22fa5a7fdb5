//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::backtest;
use crate::domain::error::StratsimError;
use crate::domain::rule_parser;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "stratsim", about = "Declarative trading-strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest and write the trade/metrics report
    Backtest {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        strategy: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Emit compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Parse a strategy file and report what it resolves to
    Validate {
        #[arg(short, long)]
        strategy: PathBuf,
    },
    /// Show bar count and time range of a data file
    Info {
        #[arg(short, long)]
        data: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data,
            strategy,
            output,
            compact,
        } => run_backtest(config.as_ref(), data, strategy, output, compact),
        Command::Validate { strategy } => run_validate(&strategy),
        Command::Info { data } => run_info(data),
    }
}

/// Resolved file locations for one backtest run. CLI flags override config
/// values; at minimum a data file and a strategy file must come from one of
/// the two.
#[derive(Debug, PartialEq)]
pub struct BacktestInputs {
    pub data: PathBuf,
    pub strategy: PathBuf,
    pub output: Option<PathBuf>,
    pub pretty: bool,
}

pub fn resolve_backtest_inputs(
    config: Option<&FileConfigAdapter>,
    data: Option<PathBuf>,
    strategy: Option<PathBuf>,
    output: Option<PathBuf>,
    compact: bool,
) -> Result<BacktestInputs, StratsimError> {
    let from_config = |section: &str, key: &str| {
        config
            .and_then(|c| c.get_string(section, key))
            .map(PathBuf::from)
    };

    let data = data
        .or_else(|| from_config("data", "file"))
        .ok_or_else(|| StratsimError::ConfigMissing {
            section: "data".into(),
            key: "file".into(),
        })?;
    let strategy = strategy
        .or_else(|| from_config("strategy", "file"))
        .ok_or_else(|| StratsimError::ConfigMissing {
            section: "strategy".into(),
            key: "file".into(),
        })?;
    let output = output.or_else(|| from_config("output", "file"));

    let pretty = if compact {
        false
    } else {
        config
            .map(|c| c.get_bool("output", "pretty", true))
            .unwrap_or(true)
    };

    Ok(BacktestInputs {
        data,
        strategy,
        output,
        pretty,
    })
}

/// Read a strategy file as JSON; anything that is not valid JSON is treated
/// as a free-text description (which the parser will reject, degrading the
/// run to an error report rather than aborting it).
pub fn load_rules(path: &PathBuf) -> Result<serde_json::Value, StratsimError> {
    let content = fs::read_to_string(path).map_err(StratsimError::Io)?;
    Ok(serde_json::from_str(&content)
        .unwrap_or_else(|_| serde_json::Value::String(content.trim().to_string())))
}

fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = StratsimError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn run_backtest(
    config_path: Option<&PathBuf>,
    data: Option<PathBuf>,
    strategy: Option<PathBuf>,
    output: Option<PathBuf>,
    compact: bool,
) -> ExitCode {
    let config = match config_path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            match load_config(path) {
                Ok(adapter) => Some(adapter),
                Err(code) => return code,
            }
        }
        None => None,
    };

    let inputs = match resolve_backtest_inputs(config.as_ref(), data, strategy, output, compact) {
        Ok(inputs) => inputs,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    let bars = match CsvAdapter::new(inputs.data.clone()).load_series() {
        Ok(bars) => bars,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };
    eprintln!("Loaded {} bars from {}", bars.len(), inputs.data.display());

    let rules = match load_rules(&inputs.strategy) {
        Ok(rules) => rules,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    let (trades, report) = backtest::run_backtest(&bars, &rules);
    if let Some(message) = report.error_message() {
        eprintln!("warning: strategy rejected: {message}");
    } else {
        eprintln!("Simulated {} trades", trades.len());
    }

    let writer = JsonReportAdapter::new(inputs.output.clone(), inputs.pretty);
    if let Err(e) = writer.write(&trades, &report) {
        eprintln!("error: {e}");
        return ExitCode::from(&e);
    }
    if let Some(path) = &inputs.output {
        eprintln!("Report written to {}", path.display());
    }

    ExitCode::SUCCESS
}

fn run_validate(strategy_path: &PathBuf) -> ExitCode {
    let rules = match load_rules(strategy_path) {
        Ok(rules) => rules,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    match rule_parser::parse(&rules) {
        Ok(spec) => {
            eprintln!("ok: {} strategy", spec.family());
            ExitCode::SUCCESS
        }
        Err(e) => {
            let err = StratsimError::from(e);
            eprintln!("error: {err}");
            ExitCode::from(&err)
        }
    }
}

fn run_info(data: PathBuf) -> ExitCode {
    let adapter = CsvAdapter::new(data);
    match adapter.series_range() {
        Ok(Some((first, last, count))) => {
            eprintln!("{count} bars, {first} .. {last}");
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("no bars");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}
