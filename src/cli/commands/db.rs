use clap::Subcommand;
use serde_json::json;

use crate::cli::{utils::output_success, OutputFormat};
use crate::config;
use crate::database::DatabaseManager;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Create the drinks table if it does not exist")]
    Init {
        #[arg(long, help = "Drop the drinks table first (destroys all drinks)")]
        reset: bool,
        #[arg(long, requires = "reset", help = "Insert the sample drink after a reset")]
        seed: bool,
    },
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        DbCommands::Init { reset, seed } => {
            let pool = DatabaseManager::connect(&config::config().database).await?;
            DatabaseManager::init_schema(&pool, reset, seed).await?;
            pool.close().await;

            let message = match (reset, seed) {
                (true, true) => "Drinks table recreated and seeded",
                (true, false) => "Drinks table recreated",
                _ => "Drinks table ready",
            };
            output_success(&output_format, message, Some(json!({ "reset": reset, "seed": seed })))
        }
    }
}
