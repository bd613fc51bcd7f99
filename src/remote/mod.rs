//! GraphQL transport for the ERP API.
//!
//! Every call carries the session's bearer token. Failures come back as
//! classified [`AtriumError`]s; nothing is retried here, so a failed fetch
//! stays failed until the view asks again.
//!
//! # Security Note - Logging
//!
//! The Authorization header is built from a [`RedactedHeader`], which formats
//! as `[REDACTED]`, so the token never reaches logs through `Debug` output.

mod companies;
mod customers;
pub mod error;
pub mod graphql;

use std::fmt;

use reqwest::{Client, header};
use tracing::{debug, trace};
use url::Url;

use crate::error::{AtriumError, Result};
use crate::session::SessionHandle;

use error::{ApiError, graphql_errors, transport_error};
use graphql::{ErrorExtensions, GraphQlResponse};

pub use companies::CompanySource;
pub use customers::CustomerSource;

/// Wrapper for sensitive header values that redacts the value when formatted.
struct RedactedHeader {
    value: String,
}

impl RedactedHeader {
    fn bearer(token: &str) -> Self {
        Self {
            value: format!("Bearer {token}"),
        }
    }

    fn as_header_value(&self) -> Result<header::HeaderValue> {
        let mut value = header::HeaderValue::from_str(&self.value)
            .map_err(|_| AtriumError::Other("session token is not a valid header value".into()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Display for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Debug for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedactedHeader")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Authenticated GraphQL client shared by the entity sources.
pub struct GraphQlClient {
    http: Client,
    endpoint: Url,
    session: SessionHandle,
}

impl GraphQlClient {
    pub fn new(http: Client, endpoint: Url, session: SessionHandle) -> Self {
        Self {
            http,
            endpoint,
            session,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Execute a GraphQL operation (query or mutation).
    ///
    /// Without a session this fails with `NotLoggedIn` before any request is
    /// made.
    pub async fn execute<ResponseData, Vars>(
        &self,
        operation: cynic::Operation<ResponseData, Vars>,
    ) -> Result<ResponseData>
    where
        ResponseData: serde::de::DeserializeOwned + 'static,
        Vars: serde::Serialize + Sync,
    {
        let token = self.session.bearer().ok_or(AtriumError::NotLoggedIn)?;
        let auth_header = RedactedHeader::bearer(&token);
        trace!(authorization = %auth_header, endpoint = %self.endpoint, "graphql request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(header::AUTHORIZATION, auth_header.as_header_value()?)
            .header(
                header::CONTENT_TYPE,
                header::HeaderValue::from_static("application/json"),
            )
            .json(&operation)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "graphql request rejected");
            return Err(ApiError::with_status(failure_message(&body, status), status).into());
        }

        let result: GraphQlResponse<ResponseData, ErrorExtensions> = serde_json::from_str(&body)?;

        // Handle GraphQL errors - preserve individual error details
        if let Some(errors) = result.errors
            && !errors.is_empty()
        {
            let partial_data = result.data.is_some();
            return Err(graphql_errors(errors, partial_data));
        }

        result
            .data
            .ok_or_else(|| ApiError::new("No data in GraphQL response").into())
    }
}

/// First GraphQL error message in a failed response body, else the status.
fn failure_message(body: &str, status: reqwest::StatusCode) -> String {
    serde_json::from_str::<GraphQlResponse<serde_json::Value, ErrorExtensions>>(body)
        .ok()
        .and_then(|r| r.errors)
        .and_then(|errors| errors.into_iter().next())
        .map(|e| e.message)
        .unwrap_or_else(|| format!("HTTP {status}"))
}
