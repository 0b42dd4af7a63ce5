use serde::Deserialize;

use stockroom_inventory::{TransferError, TransferRequest};

// -------------------------
// Request DTOs
// -------------------------

/// Transfer body as sent by clients.
///
/// Numbers are signed so that zero or negative values reach validation and
/// come back as `invalid_transfer` instead of a decoding error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferRequest {
    pub product_id: i64,
    pub quantity: i64,
    pub sending_warehouse_id: i64,
    pub receiving_warehouse_id: i64,
}

impl CreateTransferRequest {
    pub fn into_request(self) -> Result<TransferRequest, TransferError> {
        TransferRequest::from_raw(
            self.product_id,
            self.quantity,
            self.sending_warehouse_id,
            self.receiving_warehouse_id,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_camel_case_body() {
        let body: CreateTransferRequest = serde_json::from_str(
            r#"{"productId":1,"quantity":4,"sendingWarehouseId":2,"receivingWarehouseId":3}"#,
        )
        .unwrap();

        let request = body.into_request().unwrap();
        assert_eq!(request.quantity, 4);
        assert_eq!(request.receiving_warehouse_id.get(), 3);
    }

    #[test]
    fn negative_quantity_is_an_invalid_transfer() {
        let body = CreateTransferRequest {
            product_id: 1,
            quantity: -1,
            sending_warehouse_id: 1,
            receiving_warehouse_id: 2,
        };
        assert!(matches!(
            body.into_request(),
            Err(TransferError::InvalidTransfer(_))
        ));
    }
}
