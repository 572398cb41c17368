use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::credentials::{CredentialStore, Credentials};
use super::header::{json_headers, AuthHeader};
use crate::api::{DaemoError, Result, Transport};

/// Path of the OAuth2 token endpoint, relative to the base URL.
const TOKEN_PATH: &str = "/api/oauth2-ng/token/";

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

/// Mints new access tokens with the refresh-token grant.
#[derive(Debug, Clone)]
pub struct TokenManager {
    transport: Transport,
    token_url: String,
}

impl TokenManager {
    pub fn new(transport: Transport, base_url: &str) -> Self {
        Self {
            transport,
            token_url: format!("{}{}", base_url.trim_end_matches('/'), TOKEN_PATH),
        }
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// On success `credentials.access_token` is replaced, as is
    /// `refresh_token` when the server rotates it. On failure the credentials
    /// are left untouched.
    pub async fn refresh(&self, credentials: &mut Credentials) -> Result<()> {
        let request = RefreshRequest {
            grant_type: "refresh_token",
            client_id: credentials.client_id()?,
            refresh_token: credentials.refresh_token()?,
        };
        debug!(url = %self.token_url, "Refreshing access token");

        let value = self
            .transport
            .post(&self.token_url, &request, &json_headers())
            .await
            .map_err(|e| {
                warn!(error = %e, "Token refresh request failed");
                DaemoError::Authentication {
                    message: "token refresh request failed".to_string(),
                    source: Some(Box::new(e)),
                }
            })?;

        let response: TokenResponse = serde_json::from_value(value).map_err(|e| {
            DaemoError::authentication(format!("unexpected token response: {}", e))
        })?;
        let access_token = response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DaemoError::authentication("token response has no access_token"))?;
        AuthHeader::from_token(&access_token).to_header_map()?;

        credentials.access_token = Some(access_token);
        if let Some(rotated) = response.refresh_token.filter(|t| !t.is_empty()) {
            debug!("Refresh token rotated");
            credentials.refresh_token = Some(rotated);
        }

        info!("Access token refreshed");
        Ok(())
    }

    /// Refresh, then write the updated credentials back to `location`.
    pub async fn refresh_and_save(
        &self,
        credentials: &mut Credentials,
        location: Option<&Path>,
    ) -> Result<()> {
        self.refresh(credentials).await?;
        CredentialStore::save(credentials, location)
    }
}
