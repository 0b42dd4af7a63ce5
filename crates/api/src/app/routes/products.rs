use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use stockroom_core::ProductId;
use stockroom_inventory::{ProductDraft, ProductPatch};

use crate::app::errors;
use crate::app::routes::{parse_id, run_blocking};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/:id/total-quantity", get(get_total_quantity))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match run_blocking(services, move |s| s.inventory.list_products()).await {
        Ok(products) => (StatusCode::OK, Json(products)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match run_blocking(services, move |s| s.inventory.get_product(id)).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<ProductDraft>, JsonRejection>,
) -> axum::response::Response {
    let Json(draft) = match body {
        Ok(v) => v,
        Err(rejection) => return errors::body_rejection_to_response(rejection),
    };

    match run_blocking(services, move |s| s.inventory.create_product(draft)).await {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<ProductPatch>, JsonRejection>,
) -> axum::response::Response {
    let id: ProductId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(patch) = match body {
        Ok(v) => v,
        Err(rejection) => return errors::body_rejection_to_response(rejection),
    };

    match run_blocking(services, move |s| s.inventory.update_product(id, patch)).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match run_blocking(services, move |s| s.inventory.delete_product(id)).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(resp) => resp,
    }
}

pub async fn get_total_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match run_blocking(services, move |s| s.inventory.total_quantity(id)).await {
        Ok(total) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "productId": id,
                "totalQuantity": total,
            })),
        )
            .into_response(),
        Err(resp) => resp,
    }
}
