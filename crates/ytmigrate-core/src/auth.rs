//! OAuth credential acquisition for the two account identities.
//!
//! Each identity (source, destination) has its own token cache file so
//! the two accounts never share credentials. The provider here is
//! non-interactive: it consumes a previously seeded token cache and
//! refreshes expired access tokens over HTTP. Seeding the cache (the
//! browser consent flow) happens out of band.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::AuthError;

/// Tokens expiring within this window are refreshed eagerly.
const EXPIRY_SLACK_SECS: u64 = 60;

/// A usable access credential for one identity.
#[derive(Debug, Clone)]
pub struct Credential {
    access_token: String,
}

impl Credential {
    /// Build a credential from a raw access token.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    /// The raw access token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

/// Source of credentials for a named identity.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialProvider {
    /// Obtain a usable credential backed by `token_cache`.
    ///
    /// `label` names the identity in diagnostics ("source account",
    /// "destination account").
    ///
    /// # Errors
    ///
    /// Fails if the cache is missing, unreadable, or cannot be
    /// refreshed. Credential failure is fatal; no run starts without
    /// both credentials.
    fn obtain(&self, token_cache: &Path, label: &str) -> Result<Credential, AuthError>;
}

/// OAuth installed-app client configuration, as exported by the API
/// console.
#[derive(Debug, Deserialize)]
struct ClientSecrets {
    installed: InstalledClient,
}

#[derive(Debug, Deserialize)]
struct InstalledClient {
    client_id: String,
    client_secret: String,
    token_uri: String,
}

/// Persisted token state for one identity.
#[derive(Debug, Serialize, Deserialize)]
struct CachedToken {
    access_token: String,
    refresh_token: Option<String>,
    /// Unix timestamp after which `access_token` is stale.
    expires_at: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: Option<u64>,
}

/// Non-interactive OAuth provider refreshing tokens against the
/// authorization server.
#[derive(Debug)]
pub struct OauthTokenProvider {
    client: InstalledClient,
    http: reqwest::blocking::Client,
}

impl OauthTokenProvider {
    /// Load the client configuration from `client_secrets_path`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingClientSecrets`] if the file does not
    /// exist, and [`AuthError::TokenUnavailable`] if it cannot be
    /// parsed.
    pub fn new(client_secrets_path: &Path) -> Result<Self, AuthError> {
        if !client_secrets_path.exists() {
            return Err(AuthError::MissingClientSecrets {
                path: client_secrets_path.to_path_buf(),
            });
        }

        let raw = fs::read_to_string(client_secrets_path).map_err(|e| {
            AuthError::TokenUnavailable {
                label: "client".to_string(),
                reason: format!("cannot read client secrets: {e}"),
            }
        })?;
        let secrets: ClientSecrets =
            serde_json::from_str(&raw).map_err(|e| AuthError::TokenUnavailable {
                label: "client".to_string(),
                reason: format!("malformed client secrets: {e}"),
            })?;

        Ok(Self {
            client: secrets.installed,
            http: reqwest::blocking::Client::new(),
        })
    }

    fn read_cache(token_cache: &Path, label: &str) -> Result<CachedToken, AuthError> {
        let raw = fs::read_to_string(token_cache).map_err(|e| AuthError::TokenUnavailable {
            label: label.to_string(),
            reason: format!(
                "token cache {} unreadable ({e}); run the authorization flow first",
                token_cache.display()
            ),
        })?;
        serde_json::from_str(&raw).map_err(|e| AuthError::TokenUnavailable {
            label: label.to_string(),
            reason: format!("malformed token cache: {e}"),
        })
    }

    fn write_cache(token_cache: &Path, token: &CachedToken, label: &str) -> Result<(), AuthError> {
        let raw = serde_json::to_string_pretty(token).map_err(|e| AuthError::RefreshFailed {
            label: label.to_string(),
            reason: format!("cannot serialize token cache: {e}"),
        })?;
        fs::write(token_cache, raw).map_err(|e| AuthError::RefreshFailed {
            label: label.to_string(),
            reason: format!("cannot persist token cache: {e}"),
        })
    }

    fn now_unix() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    fn refresh(&self, token: &CachedToken, label: &str) -> Result<CachedToken, AuthError> {
        let refresh_token =
            token
                .refresh_token
                .as_deref()
                .ok_or_else(|| AuthError::TokenUnavailable {
                    label: label.to_string(),
                    reason: "access token expired and no refresh token is cached".to_string(),
                })?;

        debug!(label, "refreshing expired access token");
        let response = self
            .http
            .post(&self.client.token_uri)
            .form(&[
                ("client_id", self.client.client_id.as_str()),
                ("client_secret", self.client.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .map_err(|e| AuthError::RefreshFailed {
                label: label.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(AuthError::RefreshFailed {
                label: label.to_string(),
                reason: format!("authorization server returned {status}: {body}"),
            });
        }

        let refreshed: RefreshResponse =
            response.json().map_err(|e| AuthError::RefreshFailed {
                label: label.to_string(),
                reason: format!("malformed refresh response: {e}"),
            })?;

        Ok(CachedToken {
            access_token: refreshed.access_token,
            refresh_token: token.refresh_token.clone(),
            expires_at: refreshed.expires_in.map(|secs| Self::now_unix() + secs),
        })
    }
}

impl CredentialProvider for OauthTokenProvider {
    fn obtain(&self, token_cache: &Path, label: &str) -> Result<Credential, AuthError> {
        let cached = Self::read_cache(token_cache, label)?;

        let stale = cached
            .expires_at
            .is_some_and(|at| at <= Self::now_unix() + EXPIRY_SLACK_SECS);

        if !stale {
            debug!(label, "using cached access token");
            return Ok(Credential::new(cached.access_token));
        }

        let refreshed = self.refresh(&cached, label)?;
        Self::write_cache(token_cache, &refreshed, label)?;
        info!(label, "refreshed and persisted access token");
        Ok(Credential::new(refreshed.access_token))
    }
}

/// Default token cache path for one identity under `config_dir`.
#[must_use]
pub fn token_cache_path(config_dir: &Path, identity: &str) -> PathBuf {
    config_dir.join(format!("token-{identity}.json"))
}
