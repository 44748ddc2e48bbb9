use anyhow::{Result, anyhow};
use axum::Router;
use std::{io::ErrorKind, path::Path, sync::Arc};
use tokio::{fs, net::TcpListener};
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod lambda;
mod models;
mod routes;
mod services;

use config::{AppConfig, StorageBackend};
use services::{
    local_store::LocalStore, memory_store::MemoryStore, s3_store::S3Store, store::ObjectStore,
    upload_service::UploadService,
};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Parse config + lambda flag ---
    let (cfg, lambda_mode) = AppConfig::from_env_and_args()?;

    // --- Logging setup ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if lambda_mode {
        // function platforms ingest one JSON object per line
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!("Starting upload-function with config: {:?}", cfg);

    // --- Initialize the store once; every invocation shares it ---
    let store = build_store(&cfg).await?;
    let service = UploadService::new(store, cfg.bucket.clone());

    if lambda_mode {
        tracing::info!("Serving invocations from the Lambda runtime API");
        return lambda::serve(service)
            .await
            .map_err(|err| anyhow!("lambda runtime stopped: {}", err));
    }

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(service);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_store(cfg: &AppConfig) -> Result<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match cfg.backend {
        StorageBackend::S3 => {
            if let Some(endpoint) = &cfg.s3_endpoint {
                tracing::info!("Using custom S3 endpoint {}", endpoint);
            }
            Arc::new(S3Store::from_env(cfg.s3_endpoint.as_deref()).await)
        }
        StorageBackend::Local => {
            if !Path::new(&cfg.storage_dir).exists() {
                fs::create_dir_all(&cfg.storage_dir).await?;
                tracing::info!("Created storage directory at {}", cfg.storage_dir);
            }
            Arc::new(LocalStore::new(&cfg.storage_dir))
        }
        StorageBackend::Memory => {
            tracing::warn!("Memory backend selected; uploads are lost on exit");
            Arc::new(MemoryStore::new())
        }
    };
    tracing::info!("Object store backend: {}", cfg.backend);
    Ok(store)
}
