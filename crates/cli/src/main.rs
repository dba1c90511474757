use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use stockradar_core::{FundamentalSnapshot, Lookback, QuoteProvider};
use stockradar_data::{csv_loader, YahooProvider};
use stockradar_screener::{
    builtin_pools, diagnose, enrich, find_pool, fundamental_verdict, load_pools,
    parse_symbol_list, scan, Pool, ScanConfig,
};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "stockradar")]
#[command(about = "Stock screening radar — diagnose single tickers or scan candidate pools")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Extra candidate pools, as a TOML file
    #[arg(long, env = "STOCKRADAR_POOLS")]
    pools_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diagnose a single instrument
    Diagnose {
        /// Ticker symbol (e.g. "2330", "NVDA")
        symbol: String,

        /// Read bars from a local CSV file instead of the quote provider
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// History depth: 3mo, 6mo, or 1y
        #[arg(long, default_value = "6mo")]
        lookback: String,
    },

    /// Scan a candidate pool for strong instruments
    Scan {
        /// Name of a configured pool (see `pools`)
        #[arg(short, long)]
        pool: Option<String>,

        /// Free-form symbol list (comma or whitespace separated)
        #[arg(short, long)]
        symbols: Option<String>,

        /// Minimum strength score (1-7)
        #[arg(long, default_value = "3")]
        min_score: u8,

        /// History depth: 3mo, 6mo, or 1y
        #[arg(long, default_value = "3mo")]
        lookback: String,
    },

    /// List configured candidate pools
    Pools,

    /// Start the API server
    Server {
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0:3000")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let pools = resolve_pools(cli.pools_file.as_deref())?;

    match cli.command {
        Commands::Diagnose {
            symbol,
            file,
            lookback,
        } => {
            run_diagnose(symbol, file, parse_lookback(&lookback)?).await?;
        }
        Commands::Scan {
            pool,
            symbols,
            min_score,
            lookback,
        } => {
            run_scan(pool, symbols, min_score, parse_lookback(&lookback)?, &pools).await?;
        }
        Commands::Pools => {
            println!("Configured candidate pools:");
            for pool in &pools {
                println!("  {:<20} {:>3} symbols  - {}", pool.name, pool.symbols.len(), pool.description);
            }
        }
        Commands::Server { bind } => {
            let provider = Arc::new(YahooProvider::new()?);
            stockradar_api::start_server(provider, pools, &bind).await?;
        }
    }

    Ok(())
}

fn parse_lookback(raw: &str) -> Result<Lookback> {
    Lookback::parse(raw)
        .ok_or_else(|| anyhow::anyhow!("Unknown lookback '{raw}' (expected 3mo, 6mo, or 1y)"))
}

fn resolve_pools(pools_file: Option<&std::path::Path>) -> Result<Vec<Pool>> {
    let mut pools = builtin_pools();
    if let Some(path) = pools_file {
        pools.extend(load_pools(path)?);
    }
    Ok(pools)
}

async fn run_diagnose(symbol: String, file: Option<PathBuf>, lookback: Lookback) -> Result<()> {
    let (bars, name, fundamentals) = match file {
        Some(path) => {
            tracing::info!(file = %path.display(), "Loading bars from CSV");
            (csv_loader::load_price_bars(&path)?, symbol.clone(), None)
        }
        None => {
            let provider = YahooProvider::new()?;
            let bars = provider.price_history(&symbol, lookback).await?;
            let name = provider.display_name(&symbol).await;
            let fundamentals = provider.fundamentals(&symbol).await.ok();
            (bars, name, fundamentals)
        }
    };

    tracing::info!(bars = bars.len(), "Loaded price history");
    let series = enrich(&bars)?;
    let report = diagnose(&symbol, &name, &series, fundamentals)?;

    let sep = "=".repeat(60);
    println!("\n{sep}");
    println!("  DIAGNOSTICS — {} ({})", report.symbol, report.name);
    println!("{sep}");
    println!("  Date:         {}", report.latest.date);
    println!("  Close:        {:.2}", report.latest.close);
    println!("  Volume:       {}", report.latest.volume);
    println!("  Trend:        {:?}", report.trend);
    println!("  KD:           {:?}", report.stochastic);
    println!("  MACD:         {:?}", report.macd);
    println!("  Volume flow:  {:?}", report.volume);
    println!("  OBV:          {:?}", report.obv);
    print_fundamentals(report.fundamentals.as_ref());
    println!("{sep}\n");

    Ok(())
}

fn print_fundamentals(fundamentals: Option<&FundamentalSnapshot>) {
    let Some(snapshot) = fundamentals else {
        println!("  Fundamentals: unavailable");
        return;
    };

    if snapshot.is_fund_like {
        println!("  Type:         fund/ETF");
        if let Some(description) = &snapshot.description {
            println!("  About:        {description}");
        }
        for holding in snapshot.holdings.iter().take(10) {
            println!("    {:<28} {:>6.2}%", holding.name, holding.weight_pct);
        }
        return;
    }

    let fmt_opt = |value: Option<f64>| match value {
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    };
    println!("  EPS:          {}", fmt_opt(snapshot.trailing_eps));
    println!("  P/E:          {}", fmt_opt(snapshot.trailing_pe));
    println!("  ROE:          {}", fmt_opt(snapshot.return_on_equity.map(|v| v * 100.0)));
    println!("  Yield:        {}", fmt_opt(snapshot.dividend_yield.map(|v| v * 100.0)));
    if let Some(verdict) = fundamental_verdict(snapshot) {
        println!("  Verdict:      {verdict:?}");
    }
}

async fn run_scan(
    pool_name: Option<String>,
    symbols: Option<String>,
    min_score: u8,
    lookback: Lookback,
    pools: &[Pool],
) -> Result<()> {
    let candidates = match (symbols, pool_name) {
        (Some(input), _) => {
            let list = parse_symbol_list(&input);
            anyhow::ensure!(!list.is_empty(), "No symbols recognized in input");
            list
        }
        (None, Some(name)) => find_pool(pools, &name)
            .ok_or_else(|| anyhow::anyhow!("Unknown pool '{name}' (see `stockradar pools`)"))?
            .symbols
            .clone(),
        (None, None) => anyhow::bail!("Provide --pool or --symbols"),
    };

    anyhow::ensure!(
        (1..=7).contains(&min_score),
        "--min-score must be between 1 and 7"
    );

    tracing::info!(candidates = candidates.len(), min_score, "Starting radar scan");

    let provider = YahooProvider::new()?;
    let config = ScanConfig {
        min_score,
        lookback,
        ..Default::default()
    };
    let report = scan(&provider, &candidates, &config).await;

    let sep = "=".repeat(78);
    println!("\n{sep}");
    println!("  RADAR SCAN — {} candidates, {} evaluated", candidates.len(), report.evaluated);
    println!("{sep}");

    if report.results.is_empty() {
        println!("  No instruments reached strength >= {min_score}.");
    } else {
        println!(
            "  {:<8} {:<24} {:>10} {:>6}  {:<28} {:>8}",
            "SYMBOL", "NAME", "CLOSE", "SCORE", "SIGNALS", "EPS"
        );
        for row in &report.results {
            println!(
                "  {:<8} {:<24} {:>10.2} {:>6}  {:<28} {:>8}",
                row.symbol,
                truncate(&row.name, 24),
                row.close,
                row.score,
                row.reasons.join(", "),
                row.eps.as_deref().unwrap_or("-"),
            );
        }
    }
    println!("{sep}\n");

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
