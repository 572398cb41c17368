use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::api::{DaemoError, Result};

/// Requester credentials as stored in the credential file.
///
/// Loading accepts any JSON value for the known fields. Strings are kept,
/// numbers are kept in their string form (`"client_id": 123` reads as
/// `"123"`), and anything else counts as absent. The accessors fail with an
/// authentication error when a call needs a field that is absent. Keys this
/// client does not know about are kept and written back on save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: Some(client_id.into()),
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
            ..Default::default()
        }
    }

    pub fn client_id(&self) -> Result<&str> {
        required(&self.client_id, "client_id")
    }

    pub fn access_token(&self) -> Result<&str> {
        required(&self.access_token, "access_token")
    }

    pub fn refresh_token(&self) -> Result<&str> {
        required(&self.refresh_token, "refresh_token")
    }
}

/// Deserialize a credential field without rejecting non-string JSON
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn required<'a>(field: &'a Option<String>, name: &str) -> Result<&'a str> {
    match field.as_deref() {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(DaemoError::authentication(format!(
            "credentials are missing '{}'",
            name
        ))),
    }
}

/// Reads and rewrites the JSON credential file.
pub struct CredentialStore;

impl CredentialStore {
    /// Load credentials from an existing file.
    pub fn load(location: Option<&Path>) -> Result<Credentials> {
        let path = Self::existing(location)?;
        let contents = fs::read_to_string(path)?;
        let credentials = serde_json::from_str(&contents).map_err(|e| {
            DaemoError::Configuration(format!(
                "failed to parse credential file {}: {}",
                path.display(),
                e
            ))
        })?;
        debug!(path = %path.display(), "Loaded credentials");
        Ok(credentials)
    }

    /// Overwrite an existing credential file. Never creates a new one.
    pub fn save(credentials: &Credentials, location: Option<&Path>) -> Result<()> {
        let path = Self::existing(location)?;
        let contents = serde_json::to_string_pretty(credentials).map_err(|e| {
            DaemoError::Configuration(format!("failed to serialize credentials: {}", e))
        })?;
        fs::write(path, contents)?;

        // Owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }

        info!(path = %path.display(), "Saved credentials");
        Ok(())
    }

    fn existing(location: Option<&Path>) -> Result<&Path> {
        let path = location.ok_or_else(|| {
            DaemoError::Configuration("no credential file specified".to_string())
        })?;
        if !path.exists() {
            return Err(DaemoError::NotFound(path.to_path_buf()));
        }
        Ok(path)
    }
}
