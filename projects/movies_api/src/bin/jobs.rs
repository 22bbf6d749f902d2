use anyhow::Context;
use clap::{Parser, Subcommand};
use interfaces_tmdb_movies::index::TmdbClient;
use projects_movies_api::config::AppConfig;
use projects_movies_api::db::{Db, CATALOG_VIEW, MOVIES_WITH_DETAILS};
use projects_movies_api::jobs;
use projects_movies_api::jobs::discover::DiscoverLimits;
use tracing::{error, info};
use utils_trace::tracing_init;

#[derive(Debug, Parser)]
#[command(name = "movies_jobs", about = "Batch loaders and maintenance for the movie catalog")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Walk TMDB discover pages and upsert movies with their details
    Discover,
    /// Backfill movies missing details, credits, providers or keywords
    Details,
    /// Rewrite the countries collection
    Countries,
    /// Rebuild first-name counts per origin country
    Names,
    /// Recreate the catalog and genres views
    Views {
        /// Leave out movies tagged with a keyword matching this regex
        #[arg(long)]
        exclude_keywords: Option<String>,
    },
    /// Materialise a view into a collection
    CopyView {
        #[arg(long, default_value = CATALOG_VIEW)]
        view: String,
        #[arg(long, default_value = MOVIES_WITH_DETAILS)]
        target: String,
    },
    /// Create the indexes the catalog view needs
    Indexes,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        // Tracing may not be installed when config or subscriber setup failed.
        eprintln!("{}", failure_line(&err));
        error!(error = ?err, "job failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("load config")?;
    tracing_init(&config.log_level, config.log_format).context("init tracing")?;

    let db = Db::connect(&config.mongodb_uri, &config.mongodb_db)
        .await
        .context("connect to MongoDB")?;
    info!(command = ?cli.command, database = %config.mongodb_db, "job starting");

    match cli.command {
        Command::Discover => {
            let tmdb = tmdb_client(&config)?;
            let limits = DiscoverLimits {
                batch_size: config.batch_size,
                max_pages: config.max_pages,
            };
            jobs::discover::run(&db, &tmdb, limits).await;
        }
        Command::Details => {
            let tmdb = tmdb_client(&config)?;
            jobs::details::run(&db, &tmdb).await?;
        }
        Command::Countries => {
            jobs::countries::run(&db).await?;
        }
        Command::Names => {
            jobs::names::run(&db).await?;
        }
        Command::Views { exclude_keywords } => {
            jobs::views::run(&db, exclude_keywords.as_deref()).await?;
        }
        Command::CopyView { view, target } => {
            jobs::copy_view::run(&db, &view, &target).await?;
        }
        Command::Indexes => {
            jobs::indexes::run(&db).await;
        }
    }

    info!("job completed");
    Ok(())
}

fn failure_line(err: &anyhow::Error) -> String {
    format!("movies_jobs: {err:#}")
}

fn tmdb_client(config: &AppConfig) -> anyhow::Result<TmdbClient> {
    let api_key = config.require_tmdb_api_key()?;
    Ok(TmdbClient::new(api_key, config.tmdb_base_url.as_str()))
}
