use std::fmt;

use thiserror::Error;

/// A single GraphQL error returned by the API, with the fields we surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQlError {
    pub message: String,
    pub code: Option<String>,
    pub path: Option<String>,
}

impl fmt::Display for GraphQlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{code}] {}", self.message)?,
            None => write!(f, "{}", self.message)?,
        }
        if let Some(path) = &self.path {
            write!(f, " (at {path})")?;
        }
        Ok(())
    }
}

fn join_graphql_errors(errors: &[GraphQlError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum AtriumError {
    #[error("not authorized (HTTP {0})")]
    Unauthorized(u16),

    #[error("{0}")]
    Forbidden(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("API error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    #[error("API error: {0}")]
    Api(String),

    #[error("GraphQL errors: {}", join_graphql_errors(errors))]
    GraphQlErrors {
        errors: Vec<GraphQlError>,
        partial_data: bool,
    },

    #[error("login failed: {0}")]
    LoginFailed(String),

    #[error("not logged in, run `atrium login` first")]
    NotLoggedIn,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("view has shut down")]
    ViewClosed,

    /// A failure the view already surfaced through the notifier
    #[error("{0}")]
    Reported(ErrorInfo),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AtriumError>;

/// Failure classes the view engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transport failure; surfaced, never retried automatically
    Network,
    /// The caller lost authorization; also tears the session down
    Authorization,
    /// Rejected locally before submission
    Validation,
    NotFound,
    Conflict,
    /// Any other failure reported by the remote
    Api,
    /// Configuration, IO and serialization failures on this side
    Local,
}

impl ErrorKind {
    /// Classify an HTTP status code returned by the API.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => ErrorKind::Authorization,
            404 => ErrorKind::NotFound,
            409 => ErrorKind::Conflict,
            _ => ErrorKind::Api,
        }
    }

    /// Classify a GraphQL error extension code.
    pub fn from_graphql_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "UNAUTHENTICATED" | "FORBIDDEN" | "UNAUTHORIZED" => Some(ErrorKind::Authorization),
            "NOT_FOUND" => Some(ErrorKind::NotFound),
            "CONFLICT" => Some(ErrorKind::Conflict),
            "BAD_USER_INPUT" => Some(ErrorKind::Validation),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Network => "network",
            ErrorKind::Authorization => "authorization",
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Api => "api",
            ErrorKind::Local => "local",
        };
        write!(f, "{name}")
    }
}

impl AtriumError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AtriumError::Unauthorized(_) | AtriumError::Forbidden(_) | AtriumError::NotLoggedIn => {
                ErrorKind::Authorization
            }
            AtriumError::NotFound(_) => ErrorKind::NotFound,
            AtriumError::Conflict(_) => ErrorKind::Conflict,
            AtriumError::Validation(_) => ErrorKind::Validation,
            AtriumError::Network(_) => ErrorKind::Network,
            AtriumError::Status { status, .. } => ErrorKind::from_status(*status),
            AtriumError::Api(_) | AtriumError::LoginFailed(_) => ErrorKind::Api,
            AtriumError::GraphQlErrors { errors, .. } => errors
                .iter()
                .filter_map(|e| e.code.as_deref().and_then(ErrorKind::from_graphql_code))
                .next()
                .unwrap_or(ErrorKind::Api),
            AtriumError::Reported(info) => info.kind,
            AtriumError::Http(err) => {
                if let Some(status) = err.status() {
                    ErrorKind::from_status(status.as_u16())
                } else if err.is_timeout() || err.is_connect() || err.is_request() {
                    ErrorKind::Network
                } else {
                    ErrorKind::Api
                }
            }
            AtriumError::Config(_)
            | AtriumError::ViewClosed
            | AtriumError::Io(_)
            | AtriumError::YamlParse(_)
            | AtriumError::Json(_)
            | AtriumError::Url(_)
            | AtriumError::Other(_) => ErrorKind::Local,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            AtriumError::Unauthorized(status) => Some(*status),
            AtriumError::Forbidden(_) => Some(403),
            AtriumError::Status { status, .. } => Some(*status),
            AtriumError::Reported(info) => info.status,
            AtriumError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_authorization(&self) -> bool {
        self.kind() == ErrorKind::Authorization
    }

    /// Whether the user has already been shown this failure.
    pub fn is_reported(&self) -> bool {
        matches!(self, AtriumError::Reported(_))
    }
}

/// Cloneable snapshot of a failure, as stored in view and mutation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
    pub status: Option<u16>,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_authorization(&self) -> bool {
        self.kind == ErrorKind::Authorization
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<&AtriumError> for ErrorInfo {
    fn from(err: &AtriumError) -> Self {
        ErrorInfo {
            kind: err.kind(),
            message: err.to_string(),
            status: err.status(),
        }
    }
}

impl From<AtriumError> for ErrorInfo {
    fn from(err: AtriumError) -> Self {
        match err {
            AtriumError::Reported(info) => info,
            other => ErrorInfo::from(&other),
        }
    }
}
