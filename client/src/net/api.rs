//! CSRF-aware request pipeline.
//!
//! ARCHITECTURE
//! ============
//! Wraps a reqwest client whose cookie jar plays the browser's role: the
//! HttpOnly session cookie travels automatically and is never touched by
//! code here. The script-readable `XSRF-TOKEN` cookie is read out of the
//! jar, URL-decoded, and echoed as the `X-XSRF-TOKEN` header on every
//! request. Before the first state-changing call the pipeline primes the
//! cookie via the idempotent priming endpoint.
//!
//! Every server response may refresh the CSRF cookie through ordinary
//! Set-Cookie handling, independent of the logical payload.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::state::auth::CurrentUserSource;

use super::error::{ApiError, decode_error};
use super::types::{LoginPayload, MessageBody, RegisterPayload, User, UserEnvelope};

const CSRF_COOKIE: &str = "XSRF-TOKEN";
const CSRF_HEADER: &str = "X-XSRF-TOKEN";

fn hex_pair(hi: u8, lo: u8) -> Option<u8> {
    let hi = (hi as char).to_digit(16)?;
    let lo = (lo as char).to_digit(16)?;
    u8::try_from(hi * 16 + lo).ok()
}

/// Undo cookie-value percent-encoding before the value is echoed as a
/// header. Malformed escapes pass through untouched.
pub(crate) fn percent_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Some(byte) = hex_pair(bytes[i + 1], bytes[i + 2]) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).unwrap_or_else(|_| value.to_owned())
}

/// Pull one cookie's raw value out of a `Cookie:` header string.
pub(crate) fn cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then(|| v.to_owned())
    })
}

fn transport(err: &reqwest::Error) -> ApiError {
    ApiError::Transport { message: err.to_string() }
}

async fn expect_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let status = resp.status();
    let bytes = resp.bytes().await.map_err(|e| transport(&e))?;
    if status.is_success() {
        serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::Transport { message: format!("malformed response body: {e}") })
    } else {
        Err(decode_error(status, &bytes))
    }
}

/// HTTP client for the auth API with double-submit CSRF handling built in.
#[derive(Debug)]
pub struct CsrfAwareClient {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base_url: Url,
}

impl CsrfAwareClient {
    /// # Errors
    ///
    /// `Transport` if the base URL is unusable or the client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url: Url = base_url
            .parse()
            .map_err(|e| ApiError::Transport { message: format!("invalid base url: {e}") })?;
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .build()
            .map_err(|e| transport(&e))?;
        Ok(Self { http, jar, base_url })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::Transport { message: format!("invalid path {path:?}: {e}") })
    }

    /// Current CSRF token from the jar, decoded and ready for the header.
    /// `None` until the cookie has been primed.
    #[must_use]
    pub fn csrf_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base_url)?;
        let header = header.to_str().ok()?;
        cookie_value(header, CSRF_COOKIE).map(|raw| percent_decode(&raw))
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let req = match self.csrf_token() {
            Some(token) => req.header(CSRF_HEADER, token),
            None => req,
        };
        req.send().await.map_err(|e| transport(&e))
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<reqwest::Response, ApiError> {
        if self.csrf_token().is_none() {
            self.prime_csrf().await?;
        }
        self.send(self.http.post(self.url(path)?).json(body)).await
    }

    /// `GET /api/csrf-cookie`. Idempotent; the only side effect is the
    /// cookie pair landing in the jar.
    ///
    /// # Errors
    ///
    /// Normalized [`ApiError`] if the endpoint is unreachable or unhappy.
    pub async fn prime_csrf(&self) -> Result<(), ApiError> {
        let resp = self.send(self.http.get(self.url("/api/csrf-cookie")?)).await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let bytes = resp.bytes().await.map_err(|e| transport(&e))?;
        Err(decode_error(status, &bytes))
    }

    /// # Errors
    ///
    /// `Validation` with the field map, or `Internal`/`Transport`.
    pub async fn register(&self, payload: &RegisterPayload) -> Result<User, ApiError> {
        let resp = self.post_json("/api/register", payload).await?;
        let envelope: UserEnvelope = expect_json(resp).await?;
        Ok(envelope.user)
    }

    /// # Errors
    ///
    /// `InvalidCredentials` when nothing matches; the message never says
    /// which field was wrong.
    pub async fn login(&self, payload: &LoginPayload) -> Result<User, ApiError> {
        let resp = self.post_json("/api/login", payload).await?;
        match expect_json::<UserEnvelope>(resp).await {
            Ok(envelope) => Ok(envelope.user),
            // A 401 on this route can only mean bad credentials.
            Err(ApiError::SessionExpired { message }) => Err(ApiError::InvalidCredentials { message }),
            Err(err) => Err(err),
        }
    }

    /// # Errors
    ///
    /// `SessionExpired` when called without an authenticated session.
    pub async fn logout(&self) -> Result<String, ApiError> {
        let resp = self.post_json("/api/logout", &serde_json::json!({})).await?;
        let body: MessageBody = expect_json(resp).await?;
        Ok(body.message)
    }

    /// `GET /api/user`. `Ok(None)` for an anonymous session; not logged in
    /// is a normal outcome, not a fault.
    ///
    /// # Errors
    ///
    /// Normalized [`ApiError`] for anything other than 2xx/401.
    pub async fn current_user(&self) -> Result<Option<User>, ApiError> {
        let resp = self.send(self.http.get(self.url("/api/user")?)).await?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        let user: User = expect_json(resp).await?;
        Ok(Some(user))
    }
}

#[async_trait]
impl CurrentUserSource for CsrfAwareClient {
    async fn fetch_current_user(&self) -> Option<User> {
        match self.current_user().await {
            Ok(user) => user,
            Err(err) => {
                tracing::debug!(error = %err, "current-user resolution failed");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
