use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use async_graphql::ErrorExtensions;
use serde_json::json;
use thiserror::Error;

/// Error contract shared by every failure path: a kind, a message and an
/// optional list of field-level messages. Resolvers surface it through the
/// GraphQL layer via [`ErrorExtensions`]; the upload endpoint surfaces it
/// through actix via [`ResponseError`].
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("{message}")]
    InvalidInput { message: String, data: Vec<String> },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Wrap accumulated validation messages into one 422 error.
    pub fn invalid_input(data: Vec<String>) -> Self {
        ApiError::InvalidInput {
            message: "Invalid input values".to_string(),
            data,
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            ApiError::InvalidInput { .. } => 422,
            ApiError::Unauthorized(..) => 401,
            ApiError::Forbidden(..) => 403,
            ApiError::NotFound(..) => 404,
            ApiError::Conflict(..) => 409,
            ApiError::Internal(..) => 500,
        }
    }

    pub fn data(&self) -> Option<&[String]> {
        match self {
            ApiError::InvalidInput { data, .. } => Some(data),
            _ => None,
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| {
            e.set("status", self.status() as i32);
            if let Some(data) = self.data() {
                e.set("data", data.to_vec());
            }
        })
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({
            "message": self.to_string(),
            "status": self.status(),
        });
        if let Some(data) = self.data() {
            body["data"] = json!(data);
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}
