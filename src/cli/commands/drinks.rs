use anyhow::{bail, Context};
use clap::Subcommand;
use serde_json::Value;

use crate::cli::{utils::drink_line, OutputFormat};

#[derive(Subcommand)]
pub enum DrinksCommands {
    #[command(about = "List drinks (short view, or full recipes with --detail)")]
    List {
        #[arg(long, default_value = "http://localhost:5000", help = "Server base URL")]
        server: String,
        #[arg(long, requires = "token", help = "Use /drinks-detail (needs get:drinks-detail)")]
        detail: bool,
        #[arg(long, help = "Bearer token sent with the request")]
        token: Option<String>,
    },
}

pub async fn handle(cmd: DrinksCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        DrinksCommands::List { server, detail, token } => {
            let path = if detail { "drinks-detail" } else { "drinks" };
            let url = format!("{}/{}", server.trim_end_matches('/'), path);

            let mut request = reqwest::Client::new().get(&url);
            if let Some(token) = token {
                request = request.bearer_auth(token);
            }

            let response = request.send().await.with_context(|| format!("request to {} failed", url))?;
            let status = response.status();
            let body: Value = response.json().await.context("server did not return JSON")?;

            if !status.is_success() {
                bail!(
                    "{} returned {}: {}",
                    url,
                    status,
                    body["message"].as_str().unwrap_or("unknown error")
                );
            }

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&body["drinks"])?),
                OutputFormat::Text => {
                    let drinks = body["drinks"].as_array().cloned().unwrap_or_default();
                    if drinks.is_empty() {
                        println!("No drinks found");
                    }
                    for drink in &drinks {
                        println!("{}", drink_line(drink));
                    }
                }
            }
            Ok(())
        }
    }
}
