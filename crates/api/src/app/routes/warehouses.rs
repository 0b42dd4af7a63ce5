use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use stockroom_core::WarehouseId;
use stockroom_inventory::{WarehouseDraft, WarehousePatch};

use crate::app::errors;
use crate::app::routes::{parse_id, run_blocking};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_warehouses).post(create_warehouse))
        .route(
            "/:id",
            get(get_warehouse).put(update_warehouse).delete(delete_warehouse),
        )
}

pub async fn list_warehouses(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match run_blocking(services, move |s| s.inventory.list_warehouses()).await {
        Ok(warehouses) => (StatusCode::OK, Json(warehouses)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn get_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: WarehouseId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match run_blocking(services, move |s| s.inventory.get_warehouse(id)).await {
        Ok(warehouse) => (StatusCode::OK, Json(warehouse)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn create_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<WarehouseDraft>, JsonRejection>,
) -> axum::response::Response {
    let Json(draft) = match body {
        Ok(v) => v,
        Err(rejection) => return errors::body_rejection_to_response(rejection),
    };

    match run_blocking(services, move |s| s.inventory.create_warehouse(draft)).await {
        Ok(warehouse) => (StatusCode::CREATED, Json(warehouse)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn update_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<WarehousePatch>, JsonRejection>,
) -> axum::response::Response {
    let id: WarehouseId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(patch) = match body {
        Ok(v) => v,
        Err(rejection) => return errors::body_rejection_to_response(rejection),
    };

    match run_blocking(services, move |s| s.inventory.update_warehouse(id, patch)).await {
        Ok(warehouse) => (StatusCode::OK, Json(warehouse)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn delete_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: WarehouseId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match run_blocking(services, move |s| s.inventory.delete_warehouse(id)).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(resp) => resp,
    }
}
