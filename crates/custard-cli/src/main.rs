mod geo;
mod signals;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use custard_core::{AppConfig, NationalBaseline};
use custard_signals::Thresholds;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "custard-cli")]
#[command(about = "Flavor signals and regional intelligence from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Ranked signals for one store
    Signals {
        /// Store identifier
        #[arg(long)]
        store: String,
        /// Maximum number of signals to print (defaults to CUSTARD_SIGNAL_LIMIT)
        #[arg(long)]
        limit: Option<usize>,
        /// Reference day, YYYY-MM-DD (defaults to today, UTC)
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Exclusive flavors, cadence variance and outlier stores for a scope
    Geo {
        /// One of store, metro, state, national
        #[arg(long)]
        scope: String,
        /// State code, metro slug or store id; ignored for national
        #[arg(long)]
        region: Option<String>,
        /// Reference day, YYYY-MM-DD (defaults to today, UTC)
        #[arg(long)]
        today: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },
    /// Diversity and coverage summary for one store
    Summary {
        #[arg(long)]
        store: String,
        #[arg(long)]
        today: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check the database connection
    Ping,
    /// Apply pending migrations
    Migrate,
}

/// Thresholds and optional national baseline, loaded once per invocation.
struct EngineInputs {
    thresholds: Thresholds,
    baseline: Option<NationalBaseline>,
}

fn load_engine_inputs(config: &AppConfig) -> anyhow::Result<EngineInputs> {
    let thresholds = match config.thresholds_path.as_deref() {
        Some(path) => custard_signals::load_thresholds(path)?,
        None => Thresholds::default(),
    };
    let baseline = config
        .national_baseline_path
        .as_deref()
        .map(custard_core::load_national_baseline)
        .transpose()?;
    Ok(EngineInputs {
        thresholds,
        baseline,
    })
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = custard_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("custard-cli ready; run with --help for commands");
        return Ok(());
    };

    let pool = custard_db::connect_pool_from_config(&config).await?;
    let today_or = |today: Option<NaiveDate>| today.unwrap_or_else(|| Utc::now().date_naive());

    match command {
        Commands::Db { command } => match command {
            DbCommands::Ping => {
                custard_db::health_check(&pool).await?;
                println!("database ok");
            }
            DbCommands::Migrate => {
                let applied = custard_db::run_migrations(&pool).await?;
                println!("applied {applied} migration(s)");
            }
        },
        Commands::Signals {
            store,
            limit,
            today,
            json,
        } => {
            let inputs = load_engine_inputs(&config)?;
            let limit = limit.unwrap_or(config.signal_limit).max(1);
            signals::run_signals(&pool, &inputs, &store, today_or(today), limit, json).await?;
        }
        Commands::Geo {
            scope,
            region,
            today,
            json,
        } => {
            let inputs = load_engine_inputs(&config)?;
            geo::run_geo(
                &pool,
                &config,
                &inputs,
                &scope,
                region.as_deref(),
                today_or(today),
                json,
            )
            .await?;
        }
        Commands::Summary { store, today, json } => {
            let inputs = load_engine_inputs(&config)?;
            signals::run_summary(&pool, &inputs, &store, today_or(today), json).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
