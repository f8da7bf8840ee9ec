pub mod config;
pub mod controllers;
pub mod models;
pub mod services;
pub mod store;

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn store::DocumentStore>,
    pub upload: config::UploadConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn store::DocumentStore>, upload: config::UploadConfig) -> Arc<Self> {
        Arc::new(Self { store, upload })
    }

    /// Репозиторий бронирований поверх того же хранилища
    pub fn bookings(&self) -> services::BookingRepository {
        services::BookingRepository::new(self.store.clone())
    }
}

/// Full HTTP application: liveness, health and upload routes with request tracing.
pub fn router(state: Arc<AppState>) -> Router {
    let upload_max_bytes = state.upload.max_bytes;

    Router::new()
        .merge(controllers::routes(upload_max_bytes))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
