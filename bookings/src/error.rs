//! Error types and HTTP response conversion

use std::fmt;
use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the booking site
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Requested template is not in the active cache
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// A page or layout file failed to parse
    #[error("Failed to compile template {}: {source}", path.display())]
    TemplateCompile {
        /// File that failed to parse
        path: PathBuf,
        /// Parser error
        #[source]
        source: Box<minijinja::Error>,
    },

    /// A compiled template failed while executing against its data
    #[error("Failed to render template {name}: {source}")]
    TemplateRender {
        /// Template that failed
        name: String,
        /// Execution error
        #[source]
        source: Box<minijinja::Error>,
    },

    /// An expected session entry was missing
    #[error("Session value absent: {0}")]
    SessionValueAbsent(String),

    /// Session store failure or a value of the wrong type
    #[error("Session error: {0}")]
    Session(String),

    /// Writing rendered output failed (usually a disconnected client)
    #[error("Failed to write rendered output: {0}")]
    OutputWrite(#[source] std::io::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap a template parse failure with the file it came from
    pub fn template_compile(path: impl Into<PathBuf>, source: minijinja::Error) -> Self {
        Self::TemplateCompile {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Wrap a template execution failure with the template name
    pub fn template_render(name: impl Into<String>, source: minijinja::Error) -> Self {
        Self::TemplateRender {
            name: name.into(),
            source: Box::new(source),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Optional error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// HTTP status code
    pub status: u16,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
            status: status.as_u16(),
        }
    }

    /// Create error response with a code
    pub fn with_code(
        status: StatusCode,
        code: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            code: Some(code.into()),
            status: status.as_u16(),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

fn server_error(code: &str, message: &str) -> (StatusCode, ErrorResponse) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorResponse::with_code(StatusCode::INTERNAL_SERVER_ERROR, code, message),
    )
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            Error::Config(e) => {
                tracing::error!("Configuration error: {}", e);
                server_error("CONFIG_ERROR", "Internal server error")
            }

            Error::TemplateNotFound(name) => {
                tracing::error!(template = %name, "Template not found in cache");
                server_error("TEMPLATE_NOT_FOUND", "Internal server error")
            }

            Error::TemplateCompile { path, source } => {
                tracing::error!(path = %path.display(), "Template compile error: {}", source);
                server_error("TEMPLATE_COMPILE_ERROR", "Internal server error")
            }

            Error::TemplateRender { name, source } => {
                tracing::error!(template = %name, "Template render error: {}", source);
                server_error("TEMPLATE_RENDER_ERROR", "Internal server error")
            }

            Error::SessionValueAbsent(key) => {
                tracing::error!(key = %key, "Session value absent");
                server_error("SESSION_VALUE_ABSENT", "Internal server error")
            }

            Error::Session(msg) => {
                tracing::error!("Session error: {}", msg);
                server_error("SESSION_ERROR", "Session operation failed")
            }

            Error::OutputWrite(e) => {
                tracing::warn!("Abandoning response, output write failed: {}", e);
                server_error("OUTPUT_WRITE_ERROR", "Internal server error")
            }

            Error::Io(e) => {
                tracing::error!("I/O error: {}", e);
                server_error("IO_ERROR", "I/O operation failed")
            }

            Error::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                server_error("INTERNAL_ERROR", "Internal server error")
            }
        };

        (status, Json(error_response)).into_response()
    }
}

// Manual From implementations for boxed errors
impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<tower_sessions::session::Error> for Error {
    fn from(err: tower_sessions::session::Error) -> Self {
        Error::Session(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new(StatusCode::NOT_FOUND, "Page not found");
        assert_eq!(err.status, 404);
        assert_eq!(err.error, "Page not found");
        assert!(err.code.is_none());
    }

    #[test]
    fn test_error_response_with_code() {
        let err = ErrorResponse::with_code(
            StatusCode::BAD_REQUEST,
            "INVALID_EMAIL",
            "Email format is invalid",
        );
        assert_eq!(err.status, 400);
        assert_eq!(err.error, "Email format is invalid");
        assert_eq!(err.code, Some("INVALID_EMAIL".to_string()));
    }

    #[test]
    fn test_template_not_found_is_server_error() {
        let response = Error::TemplateNotFound("missing.page.tmpl".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_session_errors_are_server_errors() {
        let response = Error::Session("store unavailable".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = Error::SessionValueAbsent("reservation".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_template_not_found_message_names_template() {
        let err = Error::TemplateNotFound("nope.page.tmpl".to_string());
        assert_eq!(err.to_string(), "Template not found: nope.page.tmpl");
    }
}
