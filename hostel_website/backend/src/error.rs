use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use hostel_shared::InventoryError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error("invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("missing or invalid admin token")]
    Unauthorized,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Inventory(e) => match e {
                InventoryError::DuplicateRoomNumber(_)
                | InventoryError::RoomUnderMaintenance(_)
                | InventoryError::CapacityExceeded { .. }
                | InventoryError::Underflow { .. }
                | InventoryError::NonMonotonicTimestamp { .. } => StatusCode::CONFLICT,
                InventoryError::InvalidRoomNumber(_)
                | InventoryError::InvalidCapacity { .. }
                | InventoryError::InvalidPrice(_)
                | InventoryError::InvalidCount(_) => StatusCode::BAD_REQUEST,
                InventoryError::RoomNotFound(_) => StatusCode::NOT_FOUND,
                InventoryError::StorageError(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            ApiError::Validation(_) | ApiError::Malformed(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Inventory(InventoryError::StorageError(e)) = self {
            log::error!("storage failure: {}", e);
        }

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}
