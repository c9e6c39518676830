use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use reelvault_core::error::CoreError;
use reelvault_core::query::MovieQuery;
use reelvault_core::types::DbId;
use serde_json::{json, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelvault_catalog::response::DataResponse;
use reelvault_catalog::{CatalogResult, CatalogService};

/// Movie catalog: import plain-text feeds and browse the result.
#[derive(Parser, Debug)]
#[command(name = "reelvault")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Imports every record of a plain-text feed.
    Import { file: PathBuf },

    /// Lists the first page of movies, optionally matching title or actor.
    List { search: Option<String> },

    /// Shows one movie with its cast.
    Get { id: DbId },

    /// Deletes a movie and its cast.
    Delete { id: DbId },
}

impl Command {
    async fn run(self, service: &CatalogService) -> CatalogResult<Value> {
        let output = match self {
            Command::Import { file } => {
                let reader = BufReader::new(File::open(&file)?);
                serde_json::to_value(service.import_movies(reader).await?)
            }
            Command::List { search } => {
                let query = MovieQuery {
                    search,
                    ..Default::default()
                };
                serde_json::to_value(service.list_movies(&query).await?)
            }
            Command::Get { id } => serde_json::to_value(DataResponse {
                data: service.get_movie(id).await?,
            }),
            Command::Delete { id } => {
                service.delete_movie(id).await?;
                Ok(json!({ "data": { "id": id } }))
            }
        };
        output.map_err(|e| CoreError::Internal(e.to_string()).into())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelvault=info,reelvault_catalog=info,reelvault_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Cli { command } = Cli::parse();

    let service = CatalogService::from_env()
        .await
        .context("Failed to start the catalog")?;

    match command.run(&service).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(err) => {
            let body = json!({ "status": 0, "error": err.describe() });
            println!("{}", serde_json::to_string_pretty(&body)?);
            Err(err.into())
        }
    }
}
