//! CLI for running schema migrations outside the server process.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlx::PgPool;

use server_core::config::Config;

#[derive(Parser)]
#[command(name = "migrate_cli")]
#[command(about = "Schema migration CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply all pending migrations
    Run,

    /// List applied migrations
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env()?;
    let pool = PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Run => {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Migration failed")?;
            println!("migrations applied");
        }
        Commands::Status => {
            let rows = sqlx::query_as::<_, (i64, String)>(
                "SELECT version, description FROM _sqlx_migrations ORDER BY version",
            )
            .fetch_all(&pool)
            .await
            .context("Failed to read migration history")?;

            for (version, description) in rows {
                println!("{version}  {description}");
            }
        }
    }

    Ok(())
}
