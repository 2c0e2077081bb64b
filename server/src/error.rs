//! Error types for the store and the backing file.

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Errors returned by `TodoStore` operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("todo not found")]
    NotFound,
    #[error("no todo ids left")]
    IdsExhausted,
}

/// JSON body sent with every error response produced by this crate.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        match self {
            StoreError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorBody {
                    error: "Todo not found",
                }),
            )
                .into_response(),
            StoreError::IdsExhausted => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "No todo ids left",
                }),
            )
                .into_response(),
        }
    }
}

/// Failures reading or writing the backing file. Never surfaced to clients.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid todo JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl PersistError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PersistError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
