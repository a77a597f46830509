mod search;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "dealhawk-cli")]
#[command(about = "Dealhawk command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a deal search for a query and persist the winning listing.
    Search {
        /// Search query, e.g. "iphone 14".
        query: String,
    },
    /// List tracked products with their price history.
    Products {
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
    /// List recorded orders.
    Orders {
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
    /// Apply pending database migrations.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = dealhawk_core::load_app_config()?;
    let pool = dealhawk_db::connect_pool(
        &config.database_url,
        dealhawk_db::PoolConfig::from_app_config(&config),
    )
    .await?;

    match cli.command {
        Commands::Search { query } => search::run_search(&pool, &config, &query).await?,
        Commands::Products { limit } => list_products(&pool, limit).await?,
        Commands::Orders { limit } => list_orders(&pool, limit).await?,
        Commands::Migrate => {
            dealhawk_db::run_migrations(&pool).await?;
            println!("migrations applied");
        }
    }

    Ok(())
}

async fn list_products(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let rows = dealhawk_db::list_products(pool, limit).await?;
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

async fn list_orders(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let rows = dealhawk_db::list_orders(pool, limit).await?;
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
