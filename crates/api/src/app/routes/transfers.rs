use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use stockroom_core::TransferId;

use crate::app::routes::{parse_id, run_blocking};
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_transfers).post(create_transfer))
        .route("/:id", get(get_transfer).delete(delete_transfer))
}

pub async fn list_transfers(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match run_blocking(services, move |s| s.inventory.list_transfers()).await {
        Ok(transfers) => (StatusCode::OK, Json(transfers)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn get_transfer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: TransferId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match run_blocking(services, move |s| s.inventory.get_transfer(id)).await {
        Ok(transfer) => (StatusCode::OK, Json(transfer)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn create_transfer(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateTransferRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(v) => v,
        Err(rejection) => return errors::body_rejection_to_response(rejection),
    };

    let request = match body.into_request() {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("transfer rejected: {e}");
            return errors::transfer_error_to_response(e);
        }
    };

    match run_blocking(services, move |s| s.inventory.create_transfer(request)).await {
        Ok(transfer) => (StatusCode::CREATED, Json(transfer)).into_response(),
        Err(resp) => resp,
    }
}

/// Deleting a transfer reverses its stock movement.
pub async fn delete_transfer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: TransferId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match run_blocking(services, move |s| s.inventory.delete_transfer(id)).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(resp) => resp,
    }
}
