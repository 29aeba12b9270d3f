//! Error types for the deliverability service.
//!
//! Lookup and probe errors are recovered inside the validation layer and never
//! reach a caller. Only [`RequestError`] crosses the HTTP boundary.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Invalid or missing environment configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{var} has an invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to read disposable domain list '{path}': {source}")]
    DisposableList {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to initialise DNS resolver: {0}")]
    Resolver(String),
}

/// Why a single DNS lookup did not produce records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The name resolved but carried no records of the requested type (or NXDOMAIN).
    #[error("no records found")]
    NoRecords,

    #[error("lookup timed out")]
    Timeout,

    #[error("resolver error: {0}")]
    Resolver(String),
}

/// Errors rejected at the request boundary, before or around the pipeline.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Email is required")]
    MissingEmail,

    #[error("Emails array is required")]
    MissingEmails,

    #[error("Too many emails: at most {max} per request")]
    TooManyEmails { max: usize },

    #[error("timeoutMs must be between 1 and {max}")]
    InvalidTimeout { max: u64 },

    #[error("timeoutMs must be greater than 0")]
    ZeroTimeout,

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("{0}")]
    Internal(String),
}

/// JSON body returned for every rejected request.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl ResponseError for RequestError {
    fn status_code(&self) -> StatusCode {
        match self {
            RequestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}
