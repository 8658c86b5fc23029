use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;
use validator::ValidationErrors;

pub enum ApiError {
    BadRequest(ValidationErrors),
    BadRequestReason(String),
    Conflict(String),
    InternalServerError,
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(errors) => {
                (StatusCode::BAD_REQUEST, Json(ValidationErrorRep::from(&errors))).into_response()
            }
            Self::BadRequestReason(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorRep { message })).into_response()
            }
            Self::Conflict(message) => {
                (StatusCode::CONFLICT, Json(ErrorRep { message })).into_response()
            }
            Self::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorRep {
                    message: "Internal server error.".to_owned(),
                }),
            )
                .into_response(),
            Self::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorRep { message })).into_response()
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::BadRequest(errors)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        error!(?error, "Received error.");

        Self::InternalServerError
    }
}

pub type ApiResponse<T> = Result<T, ApiError>;

#[derive(Serialize)]
pub struct ErrorRep {
    pub message: String,
}

/// A validation failure, listing the error codes for each invalid field.
#[derive(Serialize)]
pub struct ValidationErrorRep {
    pub message: String,
    pub fields: BTreeMap<&'static str, Vec<String>>,
}

impl From<&ValidationErrors> for ValidationErrorRep {
    fn from(errors: &ValidationErrors) -> Self {
        Self {
            message: "The request contains invalid fields.".to_owned(),
            fields: errors
                .field_errors()
                .into_iter()
                .map(|(field, errors)| {
                    (
                        field,
                        errors.iter().map(|error| error.code.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}
