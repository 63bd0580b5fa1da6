use clap::{Parser, Subcommand};
use sea_orm::DbErr;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use storefront_api::{config, db, migrator::Migrator};

#[derive(Debug, Parser)]
#[command(name = "migration", about = "Apply or roll back storefront schema migrations")]
struct Cli {
    /// Overrides the configured database url
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending migrations (default)
    Up {
        #[arg(short, long)]
        steps: Option<u32>,
    },
    /// Roll back applied migrations
    Down {
        #[arg(short, long, default_value_t = 1)]
        steps: u32,
    },
    /// Print applied and pending migrations
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut cfg = config::load_config()?;
    if let Some(url) = cli.database_url {
        cfg.database_url = url;
    }
    config::init_tracing(cfg.log_level(), cfg.log_json);

    info!("Starting database migration");
    let pool = db::establish_connection_from_app_config(&cfg).await?;

    let result: Result<(), DbErr> = match cli.command.unwrap_or(Command::Up { steps: None }) {
        Command::Up { steps } => Migrator::up(&pool, steps).await,
        Command::Down { steps } => Migrator::down(&pool, Some(steps)).await,
        Command::Status => Migrator::status(&pool).await,
    };
    result?;

    info!("Migration command completed successfully");
    db::close_pool(pool).await?;
    Ok(())
}
