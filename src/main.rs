//! KalshiDashboard - Main Entry Point
//!
//! Command-line access to the recommendation cache and the performance
//! tracker. Every command prints JSON on stdout.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use kalshi_dashboard::config::{load_config, load_from_env};
use kalshi_dashboard::performance::DEFAULT_PAGE_LIMIT;
use kalshi_dashboard::{
    CacheLookup, JsonFileGenerator, PerformanceTracker, Recommendation, RecommendationCache,
    RecommendationQuery, RecommendationRequest, RecommendationService, RecommendationStatus,
    Timeframe,
};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve recommendations, using the cache unless refreshing
    Recommend {
        #[arg(long)]
        strategy: String,
        #[arg(long, default_value = "medium")]
        risk_level: String,
        /// Maximum number of recommendations (1-10)
        #[arg(long)]
        max: Option<usize>,
        #[arg(long)]
        force_refresh: bool,
        /// JSON snapshot the recommendations are generated from
        #[arg(long, env = "RECOMMENDATION_SNAPSHOT")]
        snapshot: PathBuf,
    },
    /// List the strategies recommendations can be requested for
    Strategies,
    /// Inspect or seed the recommendation cache
    Cache {
        #[command(subcommand)]
        action: CacheCommand,
    },
    /// Start tracking recommendations read from a JSON file (object or array)
    Record {
        #[arg(long)]
        file: PathBuf,
    },
    /// Update the status of a tracked recommendation
    Update {
        id: String,
        #[arg(long)]
        status: RecommendationStatus,
        #[arg(long)]
        exit_price: Option<Decimal>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Overall performance across strategies
    Summary,
    /// Performance of one strategy, or of all when omitted
    Performance {
        strategy: Option<String>,
    },
    /// Tracked recommendations, newest first
    List {
        #[arg(long)]
        strategy: Option<String>,
        #[arg(long)]
        status: Option<RecommendationStatus>,
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Performance over a recent window
    Timeframe {
        #[arg(long, default_value = "all")]
        timeframe: Timeframe,
        #[arg(long)]
        strategy: Option<String>,
    },
    /// Replace tracked history with simulated records
    Simulate {
        #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u64).range(10..=1000))]
        count: u64,
    },
}

#[derive(Subcommand, Debug)]
enum CacheCommand {
    /// Look up cached recommendations
    Get {
        #[arg(long)]
        strategy: String,
        #[arg(long, default_value = "medium")]
        risk_level: String,
    },
    /// Store recommendations read from a JSON array file
    Put {
        #[arg(long)]
        strategy: String,
        #[arg(long, default_value = "medium")]
        risk_level: String,
        #[arg(long)]
        file: PathBuf,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Recommendation>),
    One(Recommendation),
}

impl From<OneOrMany> for Vec<Recommendation> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::Many(recs) => recs,
            OneOrMany::One(rec) => vec![rec],
        }
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_recommendations(path: &Path) -> Result<Vec<Recommendation>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let parsed: OneOrMany = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid recommendation JSON in {}", path.display()))?;
    Ok(parsed.into())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    // Without a config file, fall back to the flat launcher variables
    let config = if Path::new(&args.config).exists() {
        load_config(Some(&args.config))?
    } else {
        load_from_env()?
    };

    // Initialize logging
    let level = parse_level(
        args.log_level
            .as_deref()
            .unwrap_or(&config.settings.log_level),
    );

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting KalshiDashboard");
    info!("Configuration file: {}", args.config);

    let cache = RecommendationCache::new(&config.cache);
    let tracker = Arc::new(PerformanceTracker::open(&config.tracker));

    match args.command {
        Command::Recommend {
            strategy,
            risk_level,
            max,
            force_refresh,
            snapshot,
        } => {
            let service = RecommendationService::new(
                Arc::new(JsonFileGenerator::new(snapshot)),
                cache,
                Arc::clone(&tracker),
                config.recommendations.clone(),
            );
            let mut request = RecommendationRequest::new(strategy, risk_level);
            request.max_recommendations = max;
            request.force_refresh = force_refresh;

            let response = service.get_recommendations(&request).await?;
            print_json(&response)?;
        }
        Command::Strategies => {
            let service = RecommendationService::new(
                Arc::new(JsonFileGenerator::new(PathBuf::new())),
                cache,
                Arc::clone(&tracker),
                config.recommendations.clone(),
            );
            print_json(&json!({ "strategies": service.available_strategies() }))?;
        }
        Command::Cache { action } => match action {
            CacheCommand::Get {
                strategy,
                risk_level,
            } => {
                let output = match cache.get(&strategy, &risk_level)? {
                    CacheLookup::Hit(recommendations) => json!({
                        "hit": true,
                        "recommendations": recommendations,
                    }),
                    CacheLookup::Miss(reason) => json!({
                        "hit": false,
                        "reason": format!("{:?}", reason).to_lowercase(),
                    }),
                };
                print_json(&output)?;
            }
            CacheCommand::Put {
                strategy,
                risk_level,
                file,
            } => {
                let recommendations = read_recommendations(&file)?;
                cache.put(&strategy, &risk_level, &recommendations)?;
                print_json(&json!({ "cached": recommendations.len() }))?;
            }
        },
        Command::Record { file } => {
            let recorded: Vec<String> = read_recommendations(&file)?
                .iter()
                .filter_map(|rec| tracker.record(rec))
                .collect();
            print_json(&json!({ "recorded": recorded }))?;
        }
        Command::Update {
            id,
            status,
            exit_price,
            notes,
        } => {
            if !tracker.update_status(&id, status, exit_price, notes)? {
                bail!("Recommendation {} not found or no longer open", id);
            }
            print_json(&tracker.find(&id))?;
        }
        Command::Summary => print_json(&tracker.performance_summary())?,
        Command::Performance { strategy } => match strategy {
            Some(strategy) => print_json(&tracker.strategy_performance(&strategy))?,
            None => print_json(&json!({ "strategies": tracker.all_strategy_performance() }))?,
        },
        Command::List {
            strategy,
            status,
            limit,
            offset,
        } => {
            let mut query = RecommendationQuery::new().page(limit, offset);
            query.strategy = strategy;
            query.status = status;
            let recommendations = tracker.recommendations(&query);
            print_json(&json!({
                "recommendations": recommendations,
                "count": recommendations.len(),
                "limit": limit,
                "offset": offset,
            }))?;
        }
        Command::Timeframe {
            timeframe,
            strategy,
        } => print_json(&tracker.performance_by_timeframe(strategy.as_deref(), timeframe))?,
        Command::Simulate { count } => {
            tracker.simulate_history(count as usize);
            print_json(&json!({ "simulated": count }))?;
        }
    }

    Ok(())
}
