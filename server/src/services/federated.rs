//! Federated login collaborator: code exchange and profile fetch.
//!
//! DESIGN
//! ======
//! The provider handshake lives behind [`FederatedExchange`]; the callback
//! route only consumes `code -> profile`. On success it establishes an
//! authenticated session through the same promote path as local login, so
//! from the session protocol's perspective federated login is just another
//! producer of "session became authenticated".

use async_trait::async_trait;

/// Provider configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct FederatedConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorize_endpoint: String,
    pub token_endpoint: String,
    pub profile_endpoint: String,
}

impl FederatedConfig {
    /// Load from `FEDERATED_*` variables. Returns `None` if any required
    /// variable is missing (federated login will be disabled).
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let client_id = std::env::var("FEDERATED_CLIENT_ID").ok()?;
        let client_secret = std::env::var("FEDERATED_CLIENT_SECRET").ok()?;
        let redirect_uri = std::env::var("FEDERATED_REDIRECT_URI").ok()?;
        let authorize_endpoint = std::env::var("FEDERATED_AUTHORIZE_ENDPOINT").ok()?;
        let token_endpoint = std::env::var("FEDERATED_TOKEN_ENDPOINT").ok()?;
        let profile_endpoint = std::env::var("FEDERATED_PROFILE_ENDPOINT").ok()?;
        Some(Self {
            client_id,
            client_secret,
            redirect_uri,
            authorize_endpoint,
            token_endpoint,
            profile_endpoint,
        })
    }

    /// Build the provider authorization URL, carrying the anti-forgery state.
    #[must_use]
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope=openid%20email%20profile&state={state}",
            self.authorize_endpoint, self.client_id, self.redirect_uri
        )
    }
}

/// Identity the provider vouches for.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct FederatedProfile {
    pub name: String,
    pub email: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FederatedError {
    #[error("token exchange failed: {0}")]
    TokenExchange(String),
    #[error("profile fetch failed: {0}")]
    ProfileFetch(String),
}

/// Seam for the provider handshake so tests can substitute a stub.
#[async_trait]
pub trait FederatedExchange: Send + Sync {
    /// Exchange an authorization code for the profile it represents.
    async fn exchange_code(&self, code: &str) -> Result<FederatedProfile, FederatedError>;
}

#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Real HTTP implementation of the provider handshake.
pub struct HttpFederatedExchange {
    config: FederatedConfig,
    http: reqwest::Client,
}

impl HttpFederatedExchange {
    #[must_use]
    pub fn new(config: FederatedConfig) -> Self {
        Self { config, http: reqwest::Client::new() }
    }
}

#[async_trait]
impl FederatedExchange for HttpFederatedExchange {
    async fn exchange_code(&self, code: &str) -> Result<FederatedProfile, FederatedError> {
        let resp = self
            .http
            .post(&self.config.token_endpoint)
            .header("Accept", "application/json")
            .json(&serde_json::json!({
                "client_id": self.config.client_id,
                "client_secret": self.config.client_secret,
                "code": code,
                "grant_type": "authorization_code",
                "redirect_uri": self.config.redirect_uri,
            }))
            .send()
            .await
            .map_err(|e| FederatedError::TokenExchange(e.to_string()))?;

        let body = resp
            .text()
            .await
            .map_err(|e| FederatedError::TokenExchange(e.to_string()))?;
        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|_| FederatedError::TokenExchange(format!("unexpected response: {body}")))?;

        let resp = self
            .http
            .get(&self.config.profile_endpoint)
            .header("Authorization", format!("Bearer {}", token.access_token))
            .send()
            .await
            .map_err(|e| FederatedError::ProfileFetch(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(FederatedError::ProfileFetch(format!("{status}: {body}")));
        }

        resp.json::<FederatedProfile>()
            .await
            .map_err(|e| FederatedError::ProfileFetch(e.to_string()))
    }
}

#[cfg(test)]
#[path = "federated_test.rs"]
mod tests;
