use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockroom_core::DomainError;
use stockroom_infra::ServiceError;
use stockroom_inventory::TransferError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Transfer(e) => transfer_error_to_response(e),
        ServiceError::Store(e) => {
            tracing::error!("inventory store failure: {e}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        DomainError::Validation(_) => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
        DomainError::InvalidId(_) => json_error(StatusCode::BAD_REQUEST, "invalid_id", message),
        DomainError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", message),
        DomainError::Conflict(_) => json_error(StatusCode::CONFLICT, "conflict", message),
        DomainError::InvariantViolation(_) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", message)
        }
    }
}

pub fn transfer_error_to_response(err: TransferError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        TransferError::InvalidTransfer(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_transfer", message)
        }
        TransferError::InsufficientStock { .. } => {
            json_error(StatusCode::BAD_REQUEST, "insufficient_stock", message)
        }
        TransferError::SourceNotFound { .. } => {
            json_error(StatusCode::NOT_FOUND, "source_not_found", message)
        }
        TransferError::TransferNotFound(_) => {
            json_error(StatusCode::NOT_FOUND, "transfer_not_found", message)
        }
        TransferError::ReversalFailed { .. } => {
            json_error(StatusCode::CONFLICT, "reversal_failed", message)
        }
    }
}

/// Malformed or mistyped request bodies.
pub fn body_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
