use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::app::routes::run_blocking;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/overview", get(get_overview))
        .route("/health", get(get_stock_health))
}

pub async fn get_overview(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match run_blocking(services, move |s| s.inventory.overview()).await {
        Ok(overview) => (StatusCode::OK, Json(overview)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn get_stock_health(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match run_blocking(services, move |s| s.inventory.stock_health()).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(resp) => resp,
    }
}
