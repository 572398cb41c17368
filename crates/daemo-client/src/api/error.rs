use std::path::PathBuf;

use thiserror::Error;

use super::transport::HttpMethod;

#[derive(Error, Debug)]
pub enum DaemoError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Credential file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Authentication failed: {message}")]
    Authentication {
        message: String,
        #[source]
        source: Option<Box<DaemoError>>,
    },

    #[error("{method} {url} failed with status {status_code}: {body}")]
    Api {
        status_code: u16,
        method: HttpMethod,
        url: String,
        body: String,
    },

    #[error("Invalid response from {url}: {message}")]
    Protocol { url: String, message: String },

    #[error("Invalid argument: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Credential file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DaemoError>;

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl DaemoError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(
        status: reqwest::StatusCode,
        method: HttpMethod,
        url: &str,
        body: &str,
    ) -> Self {
        DaemoError::Api {
            status_code: status.as_u16(),
            method,
            url: url.to_string(),
            body: Self::truncate_body(body),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        DaemoError::Authentication {
            message: message.into(),
            source: None,
        }
    }

    pub fn protocol(url: &str, message: impl Into<String>) -> Self {
        DaemoError::Protocol {
            url: url.to_string(),
            message: message.into(),
        }
    }

    /// HTTP status carried by an `Api` error, looking through a failed refresh.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            DaemoError::Api { status_code, .. } => Some(*status_code),
            DaemoError::Authentication {
                source: Some(source),
                ..
            } => source.status_code(),
            _ => None,
        }
    }
}
