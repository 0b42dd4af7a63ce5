use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;

use stockroom_core::DomainError;
use stockroom_infra::ServiceResult;

use crate::app::errors;
use crate::app::services::AppServices;

pub mod inventory;
pub mod products;
pub mod stock;
pub mod system;
pub mod transfers;
pub mod warehouses;

/// Router for everything under `/api`.
pub fn router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .nest("/warehouses", warehouses::router())
        .nest("/stock", stock::router())
        .nest("/transfers", transfers::router())
        .nest("/inventory", inventory::router())
}

/// Parse a path segment into a positive id, answering 400 on failure.
pub(crate) fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(errors::domain_error_to_response)
}

/// Run a service call on the blocking pool.
///
/// Service calls take a process-wide lock and may fsync the store, neither of
/// which belongs on an async worker thread.
pub(crate) async fn run_blocking<T, F>(
    services: Arc<AppServices>,
    call: F,
) -> Result<T, axum::response::Response>
where
    T: Send + 'static,
    F: FnOnce(&AppServices) -> ServiceResult<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || call(&services)).await {
        Ok(result) => result.map_err(errors::service_error_to_response),
        Err(e) => {
            tracing::error!("service call did not complete: {e}");
            Err(errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "service call did not complete",
            ))
        }
    }
}
