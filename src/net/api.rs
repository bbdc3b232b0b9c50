//! Identity provider client.
//!
//! Client-side (csr): real HTTP calls via `gloo-net`, with credentials
//! included and the anti-forgery header attached to unsafe requests.
//! Elsewhere: every call returns [`ApiError::Unavailable`].
//!
//! ERROR HANDLING
//! ==============
//! Only transport problems (network, timeout, unreadable body) are errors.
//! HTTP error statuses come back as ordinary responses so the caller decides
//! what a 400 or 401 means.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use async_trait::async_trait;

use super::types::{ApiError, ApiResponse, Credentials, Registration};
use crate::config::ClientConfig;

pub const CSRF_ENDPOINT: &str = "accounts/csrf/";
pub const USERINFO_ENDPOINT: &str = "accounts/userinfo/";
pub const LOGIN_ENDPOINT: &str = "accounts/login/";
pub const REGISTER_ENDPOINT: &str = "accounts/register/";
pub const LOGOUT_ENDPOINT: &str = "accounts/logout/";

/// The four identity operations the session store consumes.
///
/// Futures are `?Send`: browser fetches are bound to the UI thread.
#[async_trait(?Send)]
pub trait IdentityClient {
    /// Ask the server to set the anti-forgery cookie. Optional for
    /// implementations that don't need it.
    async fn prime_csrf(&self) -> Result<(), ApiError> {
        Ok(())
    }

    async fn get_identity(&self) -> Result<ApiResponse, ApiError>;

    async fn login(&self, credentials: &Credentials) -> Result<ApiResponse, ApiError>;

    async fn register(&self, registration: &Registration) -> Result<ApiResponse, ApiError>;

    async fn logout(&self) -> Result<ApiResponse, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Get,
    Post,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

fn timeout_millis(ms: u64) -> u32 {
    u32::try_from(ms).unwrap_or(u32::MAX)
}

/// Browser implementation of [`IdentityClient`] against the accounts API.
#[derive(Debug, Clone)]
pub struct HttpIdentityClient {
    config: ClientConfig,
}

impl HttpIdentityClient {
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn send(&self, method: Method, path: &str, body: Option<serde_json::Value>) -> Result<ApiResponse, ApiError> {
        request(&self.config, method, &self.config.endpoint(path), body).await
    }
}

/// GET a static asset (outside the API base) and return its body text.
///
/// # Errors
///
/// Transport failures, or [`ApiError::Decode`] carrying the status when the
/// asset is not served with 2xx.
pub async fn fetch_static_text(config: &ClientConfig, url: &str) -> Result<String, ApiError> {
    let resp = request(config, Method::Get, url, None).await?;
    if !resp.is_success() {
        return Err(ApiError::Decode(format!("{url} returned status {}", resp.status)));
    }
    Ok(match resp.body {
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    })
}

#[cfg(feature = "csr")]
async fn request(
    config: &ClientConfig,
    method: Method,
    url: &str,
    body: Option<serde_json::Value>,
) -> Result<ApiResponse, ApiError> {
    use futures::future::{Either, select};
    use gloo_net::http::Request;

    use crate::util::browser::{Browser, WebBrowser};

    let mut builder = match method {
        Method::Get => Request::get(url),
        Method::Post => Request::post(url),
    }
    .credentials(web_sys::RequestCredentials::Include);

    let cookies = WebBrowser.cookies().unwrap_or_default();
    if let Some((header, token)) = super::csrf::anti_forgery_header(config, method.as_str(), &cookies) {
        builder = builder.header(&header, &token);
    }

    let request = match body {
        Some(json) => builder.json(&json),
        None => builder.build(),
    }
    .map_err(|e| ApiError::Network(e.to_string()))?;

    let send = request.send();
    let timeout = gloo_timers::future::TimeoutFuture::new(timeout_millis(config.request_timeout_ms));
    futures::pin_mut!(send, timeout);
    let resp = match select(send, timeout).await {
        Either::Left((result, _)) => result.map_err(|e| ApiError::Network(e.to_string()))?,
        Either::Right(_) => {
            return Err(ApiError::Timeout { after_ms: config.request_timeout_ms });
        }
    };

    let status = resp.status();
    let text = resp.text().await.map_err(|e| ApiError::Decode(e.to_string()))?;
    Ok(ApiResponse::from_text(status, &text))
}

#[cfg(not(feature = "csr"))]
async fn request(
    config: &ClientConfig,
    method: Method,
    url: &str,
    body: Option<serde_json::Value>,
) -> Result<ApiResponse, ApiError> {
    let _ = (method.as_str(), url, body, timeout_millis(config.request_timeout_ms));
    Err(ApiError::Unavailable)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait(?Send)]
impl IdentityClient for HttpIdentityClient {
    async fn prime_csrf(&self) -> Result<(), ApiError> {
        self.send(Method::Get, CSRF_ENDPOINT, None).await.map(|_| ())
    }

    async fn get_identity(&self) -> Result<ApiResponse, ApiError> {
        self.send(Method::Get, USERINFO_ENDPOINT, None).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<ApiResponse, ApiError> {
        self.send(Method::Post, LOGIN_ENDPOINT, Some(to_json(credentials)?)).await
    }

    async fn register(&self, registration: &Registration) -> Result<ApiResponse, ApiError> {
        self.send(Method::Post, REGISTER_ENDPOINT, Some(to_json(registration)?)).await
    }

    async fn logout(&self) -> Result<ApiResponse, ApiError> {
        self.send(Method::Post, LOGOUT_ENDPOINT, None).await
    }
}
