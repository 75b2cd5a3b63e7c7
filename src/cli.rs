//! CLI definition and dispatch.

use clap::{ArgAction, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::file_ledger_adapter::{read_ledger, FileLedger};
use crate::adapters::matrix_file_adapter::{write_table, MatrixFileAdapter};
use crate::adapters::memory_ledger_adapter::MemoryLedger;
use crate::domain::config_validation::{
    read_or, read_value, source_kind, strategy_name, validate_data_config,
    validate_strategy_config, validate_strategy_for, SourceKind,
};
use crate::domain::error::SimtraderError;
use crate::domain::generator::{generate_price_matrix, DEFAULT_DAYS};
use crate::domain::indicator::OscillatorKind;
use crate::domain::ledger::LedgerEntry;
use crate::domain::ledger_summary::LedgerSummary;
use crate::domain::news::DEFAULT_NEWS_CHANCE_PCT;
use crate::domain::price::PriceMatrix;
use crate::domain::strategy::crossing::{DEFAULT_FAST, DEFAULT_SLOW};
use crate::domain::strategy::momentum::{
    DEFAULT_COOL_OFF_PERIOD, DEFAULT_OVERBOUGHT, DEFAULT_OVERSOLD, DEFAULT_WINDOW,
};
use crate::domain::strategy::random::DEFAULT_TRADE_PERIOD;
use crate::domain::strategy::{
    run_strategy, CrossingAverages, Momentum, RunSummary, StrategyKind, StrategyName,
    StrategyParams, DEFAULT_AMOUNT, DEFAULT_FEES,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::ledger_port::LedgerSink;

pub const DEFAULT_LEDGER: &str = "ledger.txt";

/// The random policy's stream seed for a `--seed` shared with price generation.
pub fn policy_seed(seed: u64) -> u64 {
    seed.wrapping_add(1)
}

#[derive(Parser, Debug)]
#[command(name = "simtrader", about = "Backtester for rule-based trading strategies")]
pub struct Cli {
    /// Log more detail (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate synthetic prices and write them as a price table
    Generate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run a strategy and append its trades to the ledger
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// random, crossing_averages or momentum
        #[arg(short, long)]
        strategy: Option<String>,
        #[arg(short, long)]
        ledger: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
        /// Run without writing the ledger
        #[arg(long)]
        dry_run: bool,
    },
    /// Summarise a ledger
    Report {
        #[arg(short, long)]
        ledger: PathBuf,
        /// Horizon length; defaults to the last day in the ledger
        #[arg(long)]
        days: Option<usize>,
        /// Print the cash balance at the end of every day
        #[arg(long)]
        curve: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Generate {
            config,
            output,
            seed,
        } => run_generate(&config, &output, seed),
        Command::Backtest {
            config,
            strategy,
            ledger,
            seed,
            dry_run,
        } => run_backtest(
            &config,
            strategy.as_deref(),
            ledger.as_deref(),
            seed,
            dry_run,
        ),
        Command::Report {
            ledger,
            days,
            curve,
        } => run_report(&ledger, days, curve),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(err: &SimtraderError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

/// Where prices come from, as read from the `[data]` section.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Generate {
        days: usize,
        initial_prices: Option<Vec<f64>>,
        volatilities: Option<Vec<f64>>,
        news_chance_pct: f64,
        seed: Option<u64>,
    },
    Read {
        path: PathBuf,
        initial_prices: Option<Vec<f64>>,
        volatilities: Option<Vec<f64>>,
    },
}

pub fn build_data_source(
    config: &dyn ConfigPort,
    seed_override: Option<u64>,
) -> Result<DataSource, SimtraderError> {
    let initial_prices = config.get_double_list("data", "initial_prices")?;
    let volatilities = config.get_double_list("data", "volatilities")?;

    match source_kind(config)? {
        SourceKind::Generate => Ok(DataSource::Generate {
            days: read_or(config, "data", "days", DEFAULT_DAYS)?,
            initial_prices,
            volatilities,
            news_chance_pct: read_or(config, "data", "news_chance", DEFAULT_NEWS_CHANCE_PCT)?,
            seed: seed_override.or(read_value(config, "data", "seed")?),
        }),
        SourceKind::Read => {
            let path = config
                .get_string("data", "path")
                .filter(|p| !p.trim().is_empty())
                .ok_or_else(|| SimtraderError::missing("data", "path"))?;
            Ok(DataSource::Read {
                path: PathBuf::from(path.trim()),
                initial_prices,
                volatilities,
            })
        }
    }
}

/// Prices plus the volatility of each stock.
#[derive(Debug, Clone)]
pub struct LoadedPrices {
    pub matrix: PriceMatrix,
    pub volatilities: Vec<f64>,
}

pub fn load_prices(source: &DataSource) -> Result<LoadedPrices, SimtraderError> {
    match source {
        DataSource::Generate {
            days,
            initial_prices,
            volatilities,
            news_chance_pct,
            seed,
        } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(*seed),
                None => StdRng::from_entropy(),
            };
            let matrix = generate_price_matrix(
                *days,
                initial_prices.as_deref(),
                volatilities.as_deref(),
                *news_chance_pct,
                &mut rng,
            )?;
            Ok(LoadedPrices {
                matrix,
                volatilities: volatilities.clone().unwrap_or_default(),
            })
        }
        DataSource::Read {
            path,
            initial_prices,
            volatilities,
        } => {
            let table = MatrixFileAdapter::new(path).load_table()?;
            let selection = table.select(initial_prices.as_deref(), volatilities.as_deref())?;
            Ok(LoadedPrices {
                matrix: selection.matrix,
                volatilities: selection.volatilities,
            })
        }
    }
}

pub fn build_strategy_params(config: &dyn ConfigPort) -> Result<StrategyParams, SimtraderError> {
    Ok(StrategyParams {
        amount: read_or(config, "strategy", "amount", DEFAULT_AMOUNT)?,
        fees: read_or(config, "strategy", "fees", DEFAULT_FEES)?,
    })
}

pub fn build_strategy(
    config: &dyn ConfigPort,
    name_override: Option<StrategyName>,
    seed_override: Option<u64>,
) -> Result<StrategyKind, SimtraderError> {
    let name = match name_override {
        Some(name) => name,
        None => strategy_name(config)?,
    };

    match name {
        StrategyName::Random => Ok(StrategyKind::Random {
            period: read_or(config, "strategy", "period", DEFAULT_TRADE_PERIOD)?,
            seed: seed_override
                .map(policy_seed)
                .or(read_value(config, "strategy", "seed")?),
        }),
        StrategyName::CrossingAverages => Ok(StrategyKind::CrossingAverages(
            CrossingAverages::new(
                read_or(config, "strategy", "fast", DEFAULT_FAST)?,
                read_or(config, "strategy", "slow", DEFAULT_SLOW)?,
            )?,
        )),
        StrategyName::Momentum => {
            let kind = match config.get_string("strategy", "oscillator") {
                Some(raw) if !raw.trim().is_empty() => raw
                    .parse::<OscillatorKind>()
                    .map_err(|reason| SimtraderError::invalid("strategy", "oscillator", reason))?,
                _ => OscillatorKind::default(),
            };
            Ok(StrategyKind::Momentum(Momentum::new(
                kind,
                read_or(config, "strategy", "window", DEFAULT_WINDOW)?,
                read_or(config, "strategy", "overbought", DEFAULT_OVERBOUGHT)?,
                read_or(config, "strategy", "oversold", DEFAULT_OVERSOLD)?,
                read_or(config, "strategy", "cool_off_period", DEFAULT_COOL_OFF_PERIOD)?,
            )?))
        }
    }
}

pub fn resolve_ledger_path(ledger_override: Option<&Path>, config: &dyn ConfigPort) -> PathBuf {
    if let Some(path) = ledger_override {
        return path.to_path_buf();
    }
    config
        .get_string("strategy", "ledger")
        .filter(|p| !p.trim().is_empty())
        .map(|p| PathBuf::from(p.trim()))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LEDGER))
}

/// Keeps a copy of every entry for the console summary while forwarding to
/// the persistent sink, if any.
struct Recorder<'a> {
    sink: Option<&'a mut dyn LedgerSink>,
    copy: MemoryLedger,
}

impl LedgerSink for Recorder<'_> {
    fn append(&mut self, entry: &LedgerEntry) -> Result<(), SimtraderError> {
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.append(entry)?;
        }
        self.copy.append(entry)
    }
}

fn run_generate(config_path: &Path, output: &Path, seed: Option<u64>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_data_config(&config) {
        return fail(&e);
    }
    let source = match build_data_source(&config, seed) {
        Ok(DataSource::Read { .. }) => {
            return fail(&SimtraderError::invalid(
                "data",
                "source",
                "generate needs source = generate",
            ));
        }
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let prices = match load_prices(&source) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    if let Err(e) = write_table(output, &prices.volatilities, &prices.matrix) {
        return fail(&e);
    }

    let failed = failed_stocks(&prices.matrix);
    eprintln!(
        "Generated {} stocks over {} days ({} failed) into {}",
        prices.matrix.stocks(),
        prices.matrix.days(),
        failed.len(),
        output.display()
    );
    ExitCode::SUCCESS
}

fn run_backtest(
    config_path: &Path,
    strategy_override: Option<&str>,
    ledger_override: Option<&Path>,
    seed: Option<u64>,
    dry_run: bool,
) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    if let Err(e) = validate_data_config(&config) {
        return fail(&e);
    }

    let name = match strategy_override {
        Some(raw) => raw
            .parse::<StrategyName>()
            .map_err(|reason| SimtraderError::invalid("strategy", "kind", reason)),
        None => strategy_name(&config),
    };
    let name = match name {
        Ok(n) => n,
        Err(e) => return fail(&e),
    };
    if let Err(e) = validate_strategy_for(&config, name) {
        return fail(&e);
    }

    // Stage 2: Build strategy
    let strategy = match build_strategy(&config, Some(name), seed) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let params = match build_strategy_params(&config) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    eprintln!("Strategy: {}", strategy.name());

    // Stage 3: Load prices
    let source = match build_data_source(&config, seed) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let prices = match load_prices(&source) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    eprintln!(
        "Prices: {} stocks over {} days, {} failed",
        prices.matrix.stocks(),
        prices.matrix.days(),
        failed_stocks(&prices.matrix).len()
    );

    // Stage 4: Run
    let ledger_path = resolve_ledger_path(ledger_override, &config);
    let mut file_ledger = if dry_run {
        None
    } else {
        match FileLedger::open(&ledger_path) {
            Ok(l) => Some(l),
            Err(e) => return fail(&e),
        }
    };
    let mut recorder = Recorder {
        sink: file_ledger.as_mut().map(|l| l as &mut dyn LedgerSink),
        copy: MemoryLedger::new(),
    };

    let summary = match run_strategy(&strategy, &prices.matrix, params, &mut recorder) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    // Stage 5: Console summary
    let entries = recorder.copy.into_entries();
    if let Err(e) = print_run_summary(&summary, &entries, prices.matrix.last_day()) {
        return fail(&e);
    }
    if dry_run {
        eprintln!("\nDry run: ledger not written");
    } else {
        eprintln!(
            "\n{} entries appended to {}",
            entries.len(),
            ledger_path.display()
        );
    }
    ExitCode::SUCCESS
}

fn failed_stocks(matrix: &PriceMatrix) -> Vec<usize> {
    matrix
        .paths()
        .iter()
        .enumerate()
        .filter(|(_, path)| path.failure_day().is_some())
        .map(|(stock, _)| stock)
        .collect()
}

fn print_run_summary(
    summary: &RunSummary,
    entries: &[LedgerEntry],
    last_day: usize,
) -> Result<(), SimtraderError> {
    let totals = LedgerSummary::compute(entries, last_day)?;

    eprintln!("\n=== Run Results ===");
    eprintln!("Strategy:         {}", summary.strategy);
    eprintln!("Days:             {}", summary.days);
    eprintln!("Buys:             {}", summary.buys);
    eprintln!("Sells:            {}", summary.sells);
    eprintln!("Total Spent:      {:.2}", totals.total_spent);
    eprintln!("Total Earned:     {:.2}", totals.total_earned);
    eprintln!("Net Result:       {:.2}", totals.net);
    eprintln!("Max Drawdown:     {:.2}", totals.max_drawdown());

    if !summary.stranded.is_empty() {
        eprintln!("\n=== Stranded (delisted) ===");
        for (stock, shares) in &summary.stranded {
            eprintln!("  stock {}:  {} shares", stock, shares);
        }
    }

    if !totals.per_stock_return.is_empty() {
        eprintln!("\n=== Per-Stock Summary ===");
        for (stock, result) in &totals.per_stock_return {
            let sign = if *result >= 0.0 { "+" } else { "" };
            eprintln!("  stock {}:  {}{:.2}", stock, sign, result);
        }
    }
    Ok(())
}

/// Last day of the reported horizon.
///
/// Past the ledger's last entry nothing changes, so horizons longer than
/// that are cut to one day after it.
pub fn report_last_day(days: Option<usize>, entries: &[LedgerEntry]) -> Result<usize, SimtraderError> {
    let ledger_last = LedgerSummary::last_day_of(entries);
    match days {
        Some(0) => Err(SimtraderError::invalid("report", "days", "days must be at least 1")),
        Some(d) => Ok((d - 1).min(ledger_last.saturating_add(1))),
        None => Ok(ledger_last),
    }
}

fn run_report(ledger_path: &Path, days: Option<usize>, curve: bool) -> ExitCode {
    let entries = match read_ledger(ledger_path) {
        Ok(e) => e,
        Err(e) => return fail(&e),
    };
    let last_day = match report_last_day(days, &entries) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };
    let summary = match LedgerSummary::compute(&entries, last_day) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    println!("Transactions:     {}", summary.transactions);
    println!("Total Spent:      {:.2}", summary.total_spent);
    println!("Total Earned:     {:.2}", summary.total_earned);
    println!("Net Result:       {:.2}", summary.net);
    println!("Final Cash:       {:.2}", summary.final_cash());
    println!("Max Drawdown:     {:.2}", summary.max_drawdown());

    if !summary.holdings_before_last_day.is_empty() {
        println!("\nHoldings before day {}:", last_day);
        for (stock, shares) in &summary.holdings_before_last_day {
            println!("  stock {}:  {}", stock, shares);
        }
    }
    if !summary.stranded.is_empty() {
        println!("\nStill held after day {} (could not sell):", last_day);
        for (stock, shares) in &summary.stranded {
            println!("  stock {}:  {}", stock, shares);
        }
    }
    println!("\nPer-stock result:");
    for (stock, result) in &summary.per_stock_return {
        println!("  stock {}:  {:.2}", stock, result);
    }
    if curve {
        println!("\nCash by day:");
        for (day, cash) in summary.daily_cash.iter().skip(1).enumerate() {
            println!("  day {}:  {:.2}", day, cash);
        }
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_data_config(&config) {
        return fail(&e);
    }
    if let Err(e) = validate_strategy_config(&config) {
        return fail(&e);
    }
    let strategy = match build_strategy(&config, None, None) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    match build_data_source(&config, None) {
        Ok(DataSource::Generate { days, .. }) => {
            eprintln!("  data:     generate, {} days", days);
        }
        Ok(DataSource::Read { path, .. }) => {
            eprintln!("  data:     read from {}", path.display());
        }
        Err(e) => return fail(&e),
    }
    eprintln!("  strategy: {}", strategy.name());
    eprintln!(
        "  ledger:   {}",
        resolve_ledger_path(None, &config).display()
    );
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
