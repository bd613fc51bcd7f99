//! Mapping transport failures onto [`AtriumError`].
//!
//! HTTP statuses and GraphQL error codes are turned into the variants the
//! view engine classifies, so that lost authorization, missing records and
//! conflicts keep their meaning all the way to the notifier.

use std::fmt;

use crate::error::{AtriumError, GraphQlError};

use super::graphql::ErrorExtensions;

/// A non-success HTTP response from the API.
#[derive(Debug)]
pub struct ApiError {
    pub status: Option<reqwest::StatusCode>,
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(message: impl Into<String>, status: reqwest::StatusCode) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<ApiError> for AtriumError {
    fn from(err: ApiError) -> Self {
        let Some(status) = err.status else {
            return AtriumError::Api(err.message);
        };
        match status.as_u16() {
            401 => AtriumError::Unauthorized(401),
            403 => AtriumError::Forbidden(err.message),
            404 => AtriumError::NotFound(err.message),
            409 => AtriumError::Conflict(err.message),
            code => AtriumError::Status {
                status: code,
                message: err.message,
            },
        }
    }
}

/// Transport failures without a response are network errors.
pub fn transport_error(err: reqwest::Error) -> AtriumError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        AtriumError::Network(err.to_string())
    } else {
        AtriumError::Http(err)
    }
}

/// Flatten cynic's GraphQL errors, keeping code and path.
pub fn graphql_errors(
    errors: Vec<cynic::GraphQlError<ErrorExtensions>>,
    partial_data: bool,
) -> AtriumError {
    let errors = errors
        .into_iter()
        .map(|e| {
            let code = e.extensions.and_then(|ext| ext.code);
            let path = e.path.map(|p| {
                p.iter()
                    .map(|segment| match segment {
                        cynic::GraphQlErrorPathSegment::Field(name) => name.clone(),
                        cynic::GraphQlErrorPathSegment::Index(idx) => idx.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".")
            });
            GraphQlError {
                message: e.message,
                code,
                path,
            }
        })
        .collect();

    AtriumError::GraphQlErrors {
        errors,
        partial_data,
    }
}
