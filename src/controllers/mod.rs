pub mod health;
pub mod upload;

use axum::Router;
use std::sync::Arc;

// Бронирования доступны только как библиотека (services::bookings), HTTP-маршрутов для них нет
pub fn routes(upload_max_bytes: usize) -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(health::routes())
        .merge(upload::routes(upload_max_bytes))
}
