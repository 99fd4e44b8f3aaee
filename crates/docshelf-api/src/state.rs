//! Application state shared across handlers.

use crate::auth::JwksClient;
use crate::catalog::CatalogService;
use crate::lifecycle::LifecycleCoordinator;
use docshelf_core::Config;
use docshelf_processing::PreviewGenerator;
use docshelf_storage::FileStore;
use std::sync::Arc;

/// Main application state: the file store plus the services layered on it.
#[derive(Clone)]
pub struct AppState {
    pub store: FileStore,
    pub catalog: CatalogService,
    pub previews: PreviewGenerator,
    pub lifecycle: LifecycleCoordinator,
    /// Present only when an identity provider JWKS endpoint is configured.
    pub jwks: Option<Arc<JwksClient>>,
    pub config: Config,
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
