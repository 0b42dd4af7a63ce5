use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use stockroom_core::StockRecordId;
use stockroom_inventory::{StockDraft, StockPatch};

use crate::app::errors;
use crate::app::routes::{parse_id, run_blocking};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_stock).post(create_stock))
        .route("/:id", get(get_stock).put(update_stock).delete(delete_stock))
}

pub async fn list_stock(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match run_blocking(services, move |s| s.inventory.list_stock()).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn get_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: StockRecordId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match run_blocking(services, move |s| s.inventory.get_stock(id)).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn create_stock(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<StockDraft>, JsonRejection>,
) -> axum::response::Response {
    let Json(draft) = match body {
        Ok(v) => v,
        Err(rejection) => return errors::body_rejection_to_response(rejection),
    };

    match run_blocking(services, move |s| s.inventory.create_stock(draft)).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn update_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<StockPatch>, JsonRejection>,
) -> axum::response::Response {
    let id: StockRecordId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(patch) = match body {
        Ok(v) => v,
        Err(rejection) => return errors::body_rejection_to_response(rejection),
    };

    match run_blocking(services, move |s| s.inventory.update_stock(id, patch)).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn delete_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: StockRecordId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match run_blocking(services, move |s| s.inventory.delete_stock(id)).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(resp) => resp,
    }
}
