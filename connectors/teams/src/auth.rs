use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration as StdDuration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::AuthError;

pub const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Refresh this long before the provider-reported expiry.
const EXPIRY_MARGIN_SECS: i64 = 300;
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;
pub const DEFAULT_TOKEN_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Source of bearer tokens for outbound Graph calls.
///
/// Callers ask for a token on every request; implementations own any caching.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_bearer_token(&self) -> Result<String, AuthError>;
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
    error: Option<String>,
    error_description: Option<String>,
}

impl TokenResponse {
    fn error_message(&self) -> String {
        self.error_description
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// App-only Entra ID authentication (OAuth2 client credentials grant).
pub struct ClientCredentialsAuth {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
    timeout: StdDuration,
    cached: Mutex<Option<CachedToken>>,
}

impl ClientCredentialsAuth {
    /// `authority` is e.g. `https://login.microsoftonline.com/{tenant}`.
    pub fn new(authority: &str, client_id: String, client_secret: String) -> Self {
        Self {
            client: Client::new(),
            token_url: format!("{}/oauth2/v2.0/token", authority.trim_end_matches('/')),
            client_id,
            client_secret,
            scope: GRAPH_SCOPE.to_string(),
            timeout: DEFAULT_TOKEN_TIMEOUT,
            cached: Mutex::new(None),
        }
    }

    /// Bounds the whole token request, including reading the body.
    pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
        self.timeout = timeout;
        self
    }

    fn unreachable(&self, err: reqwest::Error) -> AuthError {
        if err.is_timeout() {
            AuthError::Unreachable(format!(
                "token request timed out after {}ms",
                self.timeout.as_millis()
            ))
        } else {
            AuthError::Unreachable(err.to_string())
        }
    }

    async fn acquire_token(&self) -> Result<CachedToken, AuthError> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(AuthError::Config(
                "client id and client secret are required".to_string(),
            ));
        }

        debug!("Requesting Graph token from {}", self.token_url);

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", self.scope.as_str()),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.unreachable(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.unreachable(e))?;

        let token_response: TokenResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(AuthError::Rejected {
                    status: status.as_u16(),
                    message: body,
                })
            }
            Err(e) => return Err(AuthError::InvalidResponse(e.to_string())),
        };

        if !status.is_success() {
            warn!("Graph token request failed with HTTP {}", status);
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message: token_response.error_message(),
            });
        }

        let expires_in = token_response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        let access_token = match token_response.access_token {
            Some(token) if !token.is_empty() => token,
            _ => {
                return Err(AuthError::InvalidResponse(format!(
                    "no access_token in response: {}",
                    token_response.error_message()
                )))
            }
        };

        info!("Acquired Graph token (expires in {}s)", expires_in);

        Ok(CachedToken {
            access_token,
            expires_at: Utc::now() + Duration::seconds(expires_in),
        })
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsAuth {
    async fn get_bearer_token(&self) -> Result<String, AuthError> {
        // Held across the request so concurrent callers share one refresh.
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.access_token.clone());
            }
            debug!("Cached Graph token expired, refreshing");
        }

        let token = self.acquire_token().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }
}
