//! ETF options tracker CLI
//!
//! # Fetch all tracked ETFs into the snapshot file
//! etf-options fetch
//!
//! # Report on IBIT from the snapshot
//! etf-options analyze --symbol IBIT --snapshot public/data/options.json
//!
//! # Report on FBTC straight from Yahoo Finance
//! etf-options analyze --symbol FBTC --live

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use etf_options::prelude::*;

#[derive(Parser)]
#[command(name = "etf-options")]
#[command(about = "Options volume and open-interest tracker for crypto ETFs")]
#[command(version)]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tracked ETFs
    Symbols,

    /// Fetch option chains for tracked ETFs and write the snapshot file
    Fetch {
        /// Symbols to fetch (default: all tracked)
        #[arg(short, long, value_delimiter = ',')]
        symbols: Vec<String>,

        /// Output path (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Expirations per symbol (overrides config)
        #[arg(long)]
        max_expirations: Option<usize>,
    },

    /// Aggregate and report one chain
    Analyze {
        /// Tracked ETF symbol
        #[arg(short, long, default_value = DEFAULT_SYMBOL)]
        symbol: String,

        /// Expiration as unix seconds (default: front expiration)
        #[arg(short, long)]
        expiration: Option<i64>,

        /// Fetch from Yahoo Finance instead of reading the snapshot
        #[arg(long)]
        live: bool,

        /// Snapshot path (overrides config)
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Vol/OI threshold (overrides config)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Maximum unusual contracts (overrides config)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Strikes per ranked table (overrides config)
        #[arg(long)]
        top: Option<usize>,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,

        /// Append term explanations
        #[arg(long)]
        explain: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> TrackerResult<()> {
    let mut config = match &cli.config {
        Some(path) => TrackerConfig::load(path)?,
        None => TrackerConfig::default(),
    };

    match cli.command {
        Commands::Symbols => {
            for etf in TRACKED_ETFS.iter() {
                println!("{:<6} {}", etf.symbol, etf.name);
            }
            Ok(())
        }

        Commands::Fetch {
            symbols,
            output,
            max_expirations,
        } => {
            if let Some(path) = output {
                config.snapshot_path = path;
            }
            if let Some(n) = max_expirations {
                config.fetch.max_expirations = n;
            }
            fetch(&config, &symbols)
        }

        Commands::Analyze {
            symbol,
            expiration,
            live,
            snapshot,
            threshold,
            limit,
            top,
            json,
            explain,
        } => {
            if let Some(path) = snapshot {
                config.snapshot_path = path;
            }
            if let Some(t) = threshold {
                config.analysis.unusual_threshold = t;
            }
            if let Some(l) = limit {
                config.analysis.unusual_limit = l;
            }
            if let Some(n) = top {
                config.analysis.top_strikes = n;
            }
            config.validate()?;

            let tracker = load_tracker(&config, &symbol, expiration, live)?;
            print_tracker(&tracker, config.analysis.unusual_threshold, json, explain)
        }
    }
}

fn fetch(config: &TrackerConfig, requested: &[String]) -> TrackerResult<()> {
    let symbols: Vec<&str> = if requested.is_empty() {
        tracked_symbols()
    } else {
        requested
            .iter()
            .map(|s| {
                find_etf(s)
                    .map(|etf| etf.symbol)
                    .ok_or_else(|| TrackerError::invalid_input(format!("{} is not a tracked ETF", s)))
            })
            .collect::<TrackerResult<_>>()?
    };

    tracing::info!("Fetching options data for {}", symbols.join(", "));

    let client = YahooClient::with_config(config.fetch.clone())?;
    let snapshot = client.fetch_all(&symbols);

    let failed = snapshot.failed_symbols();
    if !failed.is_empty() {
        tracing::warn!("No data for {}", failed.join(", "));
    }

    SnapshotStore::new(&config.snapshot_path).save(&snapshot)?;
    println!("Data saved to {}", config.snapshot_path.display());
    Ok(())
}

fn load_tracker(
    config: &TrackerConfig,
    symbol: &str,
    expiration: Option<i64>,
    live: bool,
) -> TrackerResult<Tracker> {
    let mut tracker = Tracker::new(config.analysis.clone());
    tracker.select_symbol(symbol)?;
    if let Some(ts) = expiration {
        tracker.select_expiration(ts);
    }

    tracker.begin_refresh();

    let result = if live {
        let client = YahooClient::with_config(config.fetch.clone())?;
        client
            .get_expirations(tracker.symbol())
            .map(|expirations| tracker.set_expirations(expirations))
            .and_then(|_| client.get_option_chain(tracker.symbol(), tracker.selected_expiration()))
    } else {
        let store = SnapshotStore::new(&config.snapshot_path);
        store.load().and_then(|snapshot| {
            let snapshot = snapshot.ok_or_else(|| {
                TrackerError::data(format!(
                    "No snapshot at {}; run `etf-options fetch` first",
                    store.path().display()
                ))
            })?;
            let entry = snapshot
                .symbol(tracker.symbol())
                .ok_or_else(|| TrackerError::data(format!("{} missing from snapshot", tracker.symbol())))?;
            tracker.set_expirations(entry.expiration_dates.clone());
            entry.chain(tracker.selected_expiration())
        })
    };

    match result {
        Ok(chain) => {
            tracker.apply_chain(chain);
        }
        Err(e) => tracker.apply_error(&e),
    }

    Ok(tracker)
}

fn print_tracker(tracker: &Tracker, threshold: f64, json: bool, explain: bool) -> TrackerResult<()> {
    match tracker.status() {
        TrackerStatus::Ready => {}
        TrackerStatus::Failed => {
            return Err(TrackerError::data(
                tracker.error().unwrap_or("refresh failed").to_string(),
            ));
        }
        TrackerStatus::Loading | TrackerStatus::Empty => {
            return Err(TrackerError::data(format!("No data for {}", tracker.symbol())));
        }
    }

    let Some(analysis) = tracker.analysis() else {
        return Err(TrackerError::data(format!("No data for {}", tracker.symbol())));
    };

    if json {
        println!("{}", serde_json::to_string_pretty(analysis)?);
        return Ok(());
    }

    print!("{}", Report::new(analysis, threshold).with_glossary(explain));

    let expirations = tracker.visible_expirations();
    if !expirations.is_empty() {
        let labels: Vec<String> = expirations
            .iter()
            .map(|&ts| {
                let label = format_expiration(ts);
                if Some(ts) == tracker.selected_expiration() {
                    format!("[{}]", label)
                } else {
                    label
                }
            })
            .collect();
        println!("\nExpirations: {}", labels.join("  "));
    }
    if let Some(updated) = tracker.last_update() {
        println!("Updated {}", updated.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    Ok(())
}
