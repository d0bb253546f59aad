//! Pawprint CLI - run the asset pipeline and slug resolution from the command line.
//!
//! Configuration comes from the environment (or `.env`): STORAGE_BACKEND,
//! STORAGE_BUCKET, DATABASE_URL, UPLOAD_TIMEOUT_SECS, SLUG_MAX_ATTEMPTS, LOG_FORMAT.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use pawprint_cli::{init_telemetry, read_upload};
use pawprint_core::{Category, EntityKind, PawprintConfig, PolicyTable, SlugAttributes};
use pawprint_db::{build_slug, SlugRepository, SlugTable, UniquenessResolver};
use pawprint_processing::UploadCoordinator;
use pawprint_storage::create_storage;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "pawprint", about = "Pawprint asset pipeline CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate, resize and store an image
    Upload {
        /// Path to the image
        file: PathBuf,
        /// Upload category: pets, events, avatars, ongs, temp
        #[arg(long)]
        category: Category,
        /// Owner id used in the storage path
        #[arg(long)]
        owner: Option<String>,
    },
    /// Build the candidate slug for a record
    Slug {
        /// Entity kind: pet, ong, event, partner
        #[arg(long)]
        kind: EntityKind,
        #[arg(long)]
        name: Option<String>,
        /// Pet status or event/partner category
        #[arg(long)]
        r#type: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        state: Option<String>,
        /// Record date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Record id
        #[arg(long)]
        id: String,
        /// Also make the slug unique against the database
        #[arg(long)]
        resolve: bool,
    },
    /// Make a slug unique within its table
    ResolveSlug {
        slug: String,
        /// Owning table: pets, ongs, events, partners
        #[arg(long)]
        table: SlugTable,
        /// Record id to ignore (the record being updated)
        #[arg(long)]
        exclude: Option<Uuid>,
    },
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

async fn slug_resolver(config: &PawprintConfig) -> anyhow::Result<UniquenessResolver> {
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(config.database_url()?)
        .await
        .context("Failed to connect to database")?;

    Ok(UniquenessResolver::new(Arc::new(SlugRepository::new(pool)))
        .with_max_attempts(config.slug_max_attempts))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = PawprintConfig::from_env().context("Failed to load configuration")?;
    init_telemetry(config.log_json);
    tracing::debug!(
        environment = %config.environment,
        backend = ?config.storage_backend,
        bucket = %config.storage_bucket,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Upload {
            file,
            category,
            owner,
        } => {
            let policies = PolicyTable::load().context("Invalid upload policy table")?;
            let storage = create_storage(&config)
                .await
                .context("Failed to create storage backend")?;
            let coordinator =
                UploadCoordinator::new(storage, policies).with_timeout(config.upload_timeout());

            let request = read_upload(&file, category, owner).await?;

            let cancel = CancellationToken::new();
            let interrupt = {
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        tracing::info!("Interrupt received, cancelling upload");
                        cancel.cancel();
                    }
                })
            };

            let result = coordinator.upload(request, None, Some(cancel)).await;
            interrupt.abort();
            let report = result?;

            let asset = report.asset();
            print_json(&serde_json::json!({
                "url": asset.url,
                "path": asset.path,
                "resized": report.resized.map(|(from, to)| serde_json::json!({
                    "from": [from.0, from.1],
                    "to": [to.0, to.1],
                })),
                "warnings": report.warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
            }))?;
        }
        Commands::Slug {
            kind,
            name,
            r#type,
            city,
            state,
            date,
            id,
            resolve,
        } => {
            let attributes = SlugAttributes {
                name,
                kind: r#type,
                city,
                state,
                date: Some(date.unwrap_or_else(|| Utc::now().date_naive())),
            };
            let candidate = build_slug(kind, &attributes, &id)?;

            let slug = if resolve {
                slug_resolver(&config)
                    .await?
                    .resolve_unique_slug(&candidate, SlugTable::for_kind(kind), None)
                    .await?
            } else {
                candidate.clone()
            };

            print_json(&serde_json::json!({ "candidate": candidate, "slug": slug }))?;
        }
        Commands::ResolveSlug {
            slug,
            table,
            exclude,
        } => {
            let resolved = slug_resolver(&config)
                .await?
                .resolve_unique_slug(&slug, table, exclude)
                .await?;
            print_json(&serde_json::json!({ "table": table.as_str(), "slug": resolved }))?;
        }
    }

    Ok(())
}
