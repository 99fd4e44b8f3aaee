//! Application setup: storage areas, services, routes.

mod health;
pub mod routes;
pub mod server;

use crate::auth::JwksClient;
use crate::catalog::CatalogService;
use crate::lifecycle::LifecycleCoordinator;
use crate::state::AppState;
use anyhow::Result;
use axum::Router;
use docshelf_core::Config;
use docshelf_processing::{
    PdftoppmRenderer, PreviewGenerator, PreviewOptions, SofficeConverter,
};
use docshelf_storage::FileStore;
use std::sync::Arc;

/// Build the file store, the services layered on it, and the router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router)> {
    let store = FileStore::new(&config.storage_base_path, config.max_file_size_bytes)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize storage: {}", e))?;

    tracing::info!(
        base_path = %config.storage_base_path,
        max_file_size_mb = config.max_file_size_bytes / 1024 / 1024,
        "Storage areas ready"
    );

    let renderer = Arc::new(PdftoppmRenderer::new(&config.pdftoppm_path));
    let converter = Arc::new(SofficeConverter::new(&config.soffice_path));
    let previews = PreviewGenerator::new(
        store.clone(),
        renderer,
        converter,
        PreviewOptions {
            max_width: config.preview_max_width,
            max_height: config.preview_max_height,
            dpi: config.preview_dpi,
            timeout_secs: config.preview_timeout_secs,
            max_concurrent_renders: config.max_concurrent_renders,
        },
    );

    let jwks = config
        .idp_jwks_url
        .as_ref()
        .map(|url| Arc::new(JwksClient::new(url.clone(), Some(config.idp_jwks_cache_ttl_secs))));

    let state = Arc::new(AppState {
        catalog: CatalogService::new(store.clone()),
        lifecycle: LifecycleCoordinator::new(store.clone()),
        previews,
        store,
        jwks,
        config: config.clone(),
    });

    let router = routes::setup_routes(&config, state.clone())?;
    Ok((state, router))
}
