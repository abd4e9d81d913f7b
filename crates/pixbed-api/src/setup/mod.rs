//! Application setup: database, routes, server

pub mod database;
pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;

use crate::state::AppState;
use pixbed_core::Config;
use pixbed_db::{PgAssetStore, PgAuditSink};
use pixbed_storage::LocalStorage;

/// Initialize the application: connect the database, prepare the upload
/// root, and build the router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router), anyhow::Error> {
    let pool = database::setup_database(&config).await?;

    let storage = Arc::new(
        LocalStorage::new(&config.upload_root)
            .await
            .context("Failed to prepare upload root")?,
    );
    let store = Arc::new(PgAssetStore::new(pool.clone()));
    let audit = Arc::new(PgAuditSink::new(pool));

    let state = Arc::new(AppState::new(config, store, storage, audit));
    let router = routes::build_router(state.clone());

    Ok((state, router))
}
