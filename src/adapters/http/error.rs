//! Error responses
//!
//! Every failure leaves the API as an [`ExceptionDetails`] body. The status code is chosen in one
//! place, [`ApiError::classify`].

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::FieldErrors;
use crate::{
    commands,
    ports::{credit, customer},
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid fields: {0:?}")]
    InvalidFields(FieldErrors),

    #[error(transparent)]
    Command(#[from] commands::Error),
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        Self::InvalidFields(errors)
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ExceptionDetails {
    pub title: String,
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    /// Error kind, stable across messages
    pub exception: String,
    pub details: BTreeMap<String, String>,
}

impl ApiError {
    /// Status code and error kind for each failure
    pub fn classify(&self) -> (StatusCode, &'static str) {
        use commands::Error as E;

        match self {
            ApiError::InvalidFields(_) => (StatusCode::BAD_REQUEST, "InvalidFields"),
            ApiError::Command(err) => match err {
                E::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
                E::InvalidInstallmentDate => (StatusCode::BAD_REQUEST, "InvalidInstallmentDate"),
                E::AuthorizationMismatch => (StatusCode::BAD_REQUEST, "AuthorizationMismatch"),
                E::Customer(customer::Error::Conflict(_))
                | E::Credit(credit::Error::Conflict(_)) => (StatusCode::CONFLICT, "Conflict"),
                E::Credit(credit::Error::InvalidTerms(_)) => {
                    (StatusCode::BAD_REQUEST, "InvalidCreditTerms")
                }
                E::Credit(credit::Error::MissingCustomer(_)) => (StatusCode::NOT_FOUND, "NotFound"),
                E::Customer(customer::Error::Adapter(_)) | E::Credit(credit::Error::Adapter(_)) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "InternalError")
                }
            },
        }
    }
}

fn title(status: StatusCode) -> String {
    format!(
        "{}! Consult the documentation",
        status.canonical_reason().unwrap_or("Error")
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, exception) = self.classify();

        let details = match self {
            ApiError::InvalidFields(errors) => errors.into_inner(),
            ApiError::Command(err) if status.is_server_error() => {
                tracing::error!(error = %err, "request failed");
                BTreeMap::from([("cause".to_string(), "internal error".to_string())])
            }
            ApiError::Command(err) => {
                tracing::debug!(error = %err, exception, "request rejected");
                let cause = match err {
                    commands::Error::Customer(customer::Error::Conflict(detail))
                    | commands::Error::Credit(credit::Error::InvalidTerms(detail)) => detail,
                    other => other.to_string(),
                };
                BTreeMap::from([("cause".to_string(), cause)])
            }
        };

        let body = ExceptionDetails {
            title: title(status),
            timestamp: Utc::now(),
            status: status.as_u16(),
            exception: exception.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
