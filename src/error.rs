use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::listings::RoomId;

#[derive(Error, Debug)]
pub enum RoomError {
    #[error("Room {0} not found")]
    RoomNotFound(RoomId),

    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Only the owner may modify room {0}")]
    NotOwner(RoomId),

    #[error("Room {0} has no coordinates")]
    MissingCoordinates(RoomId),

    #[error("Storage error: {0}")]
    Storage(#[from] rocksdb::Error),

    #[error("Encoding error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RoomError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        RoomError::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// Body of every non-2xx response, and of the "nothing to compare" recommendation.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Detail {
    pub detail: String,
}

impl ResponseError for RoomError {
    fn status_code(&self) -> StatusCode {
        match self {
            RoomError::RoomNotFound(_) => StatusCode::NOT_FOUND,
            RoomError::Validation { .. } | RoomError::MissingCoordinates(_) => {
                StatusCode::BAD_REQUEST
            }
            RoomError::NotOwner(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("request failed: {}", self);
        }
        HttpResponse::build(status).json(Detail {
            detail: self.to_string(),
        })
    }
}
