use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod ingest;
mod query;

#[derive(Debug, Parser)]
#[command(name = "brandpulse")]
#[command(about = "Brand comment ingestion and aspect classification")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one ingestion for the most recently saved keyword set
    Ingest {
        /// First day of comments to keep (YYYY-MM-DD)
        #[arg(long)]
        start_date: String,
        /// Last day of comments to keep, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end_date: String,
    },
    /// Print a run's valid comments grouped by aspect
    Results {
        #[arg(long)]
        brand: String,
        #[arg(long)]
        scrape_id: String,
    },
    /// Inspect the run ledger
    Runs {
        #[command(subcommand)]
        command: RunsCommands,
    },
    /// Manage saved brand/keyword combinations
    Keywords {
        #[command(subcommand)]
        command: KeywordsCommands,
    },
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    Ping,
    Migrate,
}

#[derive(Debug, Subcommand)]
enum KeywordsCommands {
    /// Save a combination; the next ingestion uses it
    Save {
        #[arg(long)]
        brand: String,
        /// Repeat for each keyword
        #[arg(long = "keyword", required = true)]
        keywords: Vec<String>,
    },
    /// Show the combination the next ingestion will use
    Show,
}

#[derive(Debug, Subcommand)]
enum RunsCommands {
    List {
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    Show {
        #[arg(long)]
        scrape_id: String,
    },
}

fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("brandpulse ready; run with --help to list commands");
        return Ok(());
    };

    let config = brandpulse_core::load_app_config()?;
    init_tracing(&config.log_level)?;
    tracing::debug!(env = %config.env, "configuration loaded");

    let pool = brandpulse_db::connect_pool(
        &config.database_url,
        brandpulse_db::PoolConfig::from_app_config(&config),
    )
    .await?;

    match command {
        Commands::Ingest {
            start_date,
            end_date,
        } => {
            let outcome = ingest::run_ingest(pool, &config, &start_date, &end_date).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if matches!(outcome, brandpulse_ingest::IngestOutcome::Error { .. }) {
                std::process::exit(1);
            }
        }
        Commands::Results { brand, scrape_id } => {
            query::run_results(pool, &brand, &scrape_id).await?;
        }
        Commands::Runs { command } => match command {
            RunsCommands::List { limit } => query::run_runs_list(&pool, limit).await?,
            RunsCommands::Show { scrape_id } => query::run_runs_show(&pool, &scrape_id).await?,
        },
        Commands::Keywords { command } => match command {
            KeywordsCommands::Save { brand, keywords } => {
                query::run_keywords_save(&pool, &brand, keywords).await?;
            }
            KeywordsCommands::Show => query::run_keywords_show(&pool).await?,
        },
        Commands::Db { command } => match command {
            DbCommands::Ping => {
                brandpulse_db::ping(&pool).await?;
                println!("database reachable");
            }
            DbCommands::Migrate => {
                let applied = brandpulse_db::run_migrations(&pool).await?;
                println!("applied {applied} migration(s)");
            }
        },
    }

    Ok(())
}
