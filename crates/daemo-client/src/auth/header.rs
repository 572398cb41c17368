use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use super::credentials::Credentials;
use crate::api::{DaemoError, Result};

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Headers sent on every authenticated call, derived from the access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeader {
    authorization: String,
}

impl AuthHeader {
    pub fn from_credentials(credentials: &Credentials) -> Result<Self> {
        Ok(Self::from_token(credentials.access_token()?))
    }

    pub fn from_token(access_token: &str) -> Self {
        Self {
            authorization: format!("Bearer {}", access_token),
        }
    }

    pub fn authorization(&self) -> &str {
        &self.authorization
    }

    /// Header names and values, in the order they are sent.
    pub fn pairs(&self) -> [(&'static str, &str); 2] {
        [
            ("Content-Type", CONTENT_TYPE_JSON),
            ("Authorization", self.authorization.as_str()),
        ]
    }

    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let mut headers = json_headers();
        let value = HeaderValue::from_str(&self.authorization).map_err(|_| {
            DaemoError::authentication("access token contains characters not allowed in a header")
        })?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}

/// Content type only, for unauthenticated calls such as the token endpoint.
pub fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
    headers
}
