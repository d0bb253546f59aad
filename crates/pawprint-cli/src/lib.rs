use std::path::Path;

use anyhow::Context;
use pawprint_core::policy::content_type_for_extension;
use pawprint_core::{Category, UploadRequest};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for the CLI. `RUST_LOG` overrides the default filter.
pub fn init_telemetry(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pawprint=debug"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Build an upload request from a file on disk, deriving the content type from its extension
pub async fn read_upload(
    path: &Path,
    category: Category,
    owner_id: Option<String>,
) -> anyhow::Result<UploadRequest> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let content_type = content_type_for_extension(extension)
        .with_context(|| format!("Unrecognized image extension: {}", path.display()))?;

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let request = UploadRequest::new(data, filename, content_type, category);
    Ok(match owner_id {
        Some(owner) => request.with_owner(owner),
        None => request,
    })
}
