//! news-harvester CLI
//!
//! Runs the updaters and the search endpoint, or single maintenance steps.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use harvester::{
    app::NewsApp,
    config::load_rules,
    error::Result,
    models::Config,
    server,
    services::QueryService,
    storage::{ItemStorage, SqliteStorage},
};

/// news-harvester - self-refreshing personal news aggregator
#[derive(Parser, Debug)]
#[command(name = "news-harvester", version, about = "Harvest headlines and search them")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the rules file from the configuration
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Override the database file from the configuration
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the updaters and serve GET /news
    Serve,

    /// Run one cycle for every rule and exit
    Crawl,

    /// Print stored items matching a term as JSON
    Search {
        /// Substring to look for in titles (case-sensitive)
        term: Option<String>,
    },

    /// Validate configuration and rules
    Validate,

    /// Show store and rule counts
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[actix_web::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    if let Some(path) = cli.rules {
        config.paths.rules_file = path;
    }
    if let Some(path) = cli.db {
        config.storage.database_path = path;
    }

    match cli.command {
        Command::Serve => {
            log::info!("news-harvester starting...");
            let app = NewsApp::init(config)?;

            let server = server::bind(&app.config().server, app.query_service())?;
            let scheduler = app.start_updaters();

            let served = server.await;
            log::info!("Search endpoint stopped, shutting down updaters");
            scheduler.shutdown().await;
            served?;
        }

        Command::Crawl => {
            let app = NewsApp::init(config)?;
            let mut failures = 0;

            for (rule, result) in app.run_once().await {
                match result {
                    Ok(outcome) => log::info!("{}: {}", rule.url, outcome),
                    Err(e) => {
                        failures += 1;
                        log::error!("{}: {}", rule.url, e);
                    }
                }
            }

            log::info!(
                "Crawl complete: {} of {} rules succeeded, {} items stored",
                app.rules().len() - failures,
                app.rules().len(),
                app.storage().count().await?
            );
        }

        Command::Search { term } => {
            let storage = SqliteStorage::open(&config.storage.database_path)?;
            let items = QueryService::new(Arc::new(storage))
                .handle(term.as_deref())
                .await?;
            println!("{}", serde_json::to_string_pretty(&items)?);
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            let rules = load_rules(&config.paths.rules_file)?;
            log::info!("✓ {} rules OK", rules.len());

            log::info!("All validations passed!");
        }

        Command::Info => {
            log::info!("Rules file: {}", config.paths.rules_file.display());
            match load_rules(&config.paths.rules_file) {
                Ok(rules) => log::info!("Rules: {}", rules.len()),
                Err(e) => log::warn!("Rules: unavailable ({})", e),
            }

            log::info!("Database: {}", config.storage.database_path.display());
            if config.storage.database_path.exists() {
                let storage = SqliteStorage::open(&config.storage.database_path)?;
                let count = storage.count().await?;
                log::info!("Stored items: {}", count);
            } else {
                log::info!("No database yet.");
            }
        }
    }

    Ok(())
}
