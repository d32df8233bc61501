//! HTTP client for the HomeAccess REST API with a consistent timeout, bearer
//! authentication and error handling. Every feature client goes through
//! [`ApiClient`] so request setup is never duplicated. The bearer token is
//! held as a secret and must never be logged.

mod error;

pub use error::ApiError;

use crate::{config::AppConfig, APP_USER_AGENT};
use reqwest::{multipart::Form, Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

/// Shared API client. Cloning is cheap and keeps the same connection pool,
/// so background tasks (status polling) take their own clone.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<SecretString>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Builds a client from the resolved configuration.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the base URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        Self::with_base_url(&config.api_base_url, config.timeout)
    }

    /// Builds a client against an explicit base URL.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the base URL is invalid or the HTTP
    /// client cannot be built.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url.trim())
            .map_err(|err| ApiError::Config(format!("Invalid API URL {base_url}: {err}")))?;

        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(ApiError::Config(format!(
                    "Unsupported API URL scheme: {scheme}"
                )))
            }
        }

        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replaces the bearer token attached to subsequent requests.
    pub fn set_token(&mut self, token: Option<SecretString>) {
        self.token = token;
    }

    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Fetches JSON from `path`.
    ///
    /// # Errors
    /// Returns an `ApiError` on transport failure, non-2xx status or an
    /// undecodable body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(reqwest::Method::GET, path)).await?;
        handle_json_response(response).await
    }

    /// Fetches JSON from `path` with URL-encoded query parameters.
    ///
    /// # Errors
    /// Returns an `ApiError` on transport failure, non-2xx status or an
    /// undecodable body.
    pub async fn get_json_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(reqwest::Method::GET, path).query(query);
        let response = self.send(builder).await?;
        handle_json_response(response).await
    }

    /// Fetches a plain-text body, used for WireGuard configuration files.
    ///
    /// # Errors
    /// Returns an `ApiError` on transport failure or non-2xx status.
    pub async fn get_text(&self, path: &str) -> Result<String, ApiError> {
        let response = self.send(self.request(reqwest::Method::GET, path)).await?;
        if response.status().is_success() {
            response
                .text()
                .await
                .map_err(|err| ApiError::Parse(format!("Failed to read response: {err}")))
        } else {
            Err(http_error(response).await)
        }
    }

    /// Posts JSON and parses a JSON response.
    ///
    /// # Errors
    /// Returns an `ApiError` on transport failure, non-2xx status or an
    /// undecodable body.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(reqwest::Method::POST, path).json(body);
        let response = self.send(builder).await?;
        handle_json_response(response).await
    }

    /// Posts JSON and ignores whatever body comes back.
    ///
    /// # Errors
    /// Returns an `ApiError` on transport failure or non-2xx status.
    pub async fn post_json_empty<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let builder = self.request(reqwest::Method::POST, path).json(body);
        let response = self.send(builder).await?;
        handle_empty_response(response).await
    }

    /// Sends a partial update and parses the updated resource.
    ///
    /// # Errors
    /// Returns an `ApiError` on transport failure, non-2xx status or an
    /// undecodable body.
    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(reqwest::Method::PATCH, path).json(body);
        let response = self.send(builder).await?;
        handle_json_response(response).await
    }

    /// Deletes a resource; the backend answers 204.
    ///
    /// # Errors
    /// Returns an `ApiError` on transport failure or non-2xx status.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self.send(self.request(reqwest::Method::DELETE, path)).await?;
        handle_empty_response(response).await
    }

    /// Posts a multipart form, used by the contact form.
    ///
    /// # Errors
    /// Returns an `ApiError` on transport failure or non-2xx status.
    pub async fn post_multipart(&self, path: &str, form: Form) -> Result<(), ApiError> {
        let builder = self.request(reqwest::Method::POST, path).multipart(form);
        let response = self.send(builder).await?;
        handle_empty_response(response).await
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = build_url_with_base(&self.base_url, path);
        debug!("{} {}", method, url);

        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        builder.send().await.map_err(map_request_error)
    }
}

/// Joins the base URL and a path with exactly one slash between them.
/// Trailing slashes on the path are kept (`/tunnels/` differs from `/tunnels`).
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Maps transport errors into user-facing variants with timeout detection.
fn map_request_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        ApiError::Serialization(format!("Failed to build request: {err}"))
    } else {
        ApiError::Network(format!("Unable to reach the server: {err}"))
    }
}

async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if response.status().is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Parse(format!("Failed to decode response: {err}")))
    } else {
        Err(http_error(response).await)
    }
}

async fn handle_empty_response(response: Response) -> Result<(), ApiError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(http_error(response).await)
    }
}

async fn http_error(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    ApiError::Http {
        status,
        detail: extract_detail(&body),
        message: sanitize_body(&body),
    }
}

/// Pulls the conventional `detail` string out of an error body. Validation
/// errors carry a list there instead and yield `None`.
fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")?
        .as_str()
        .map(str::trim)
        .filter(|detail| !detail.is_empty())
        .map(ToString::to_string)
}

/// Trims and truncates error bodies for user-facing messages.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
