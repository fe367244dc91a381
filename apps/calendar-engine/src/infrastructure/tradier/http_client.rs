//! HTTP client wrapper for the Tradier REST API.
//!
//! Requests are sent once; failures propagate to the caller.

use std::time::Instant;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;

use super::api_types::TradierErrorResponse;
use super::config::TradierConfig;
use super::error::TradierError;
use crate::infrastructure::telemetry::record_api_request;

/// HTTP client for the Tradier API.
#[derive(Clone)]
pub struct TradierHttpClient {
    client: Client,
    access_token: String,
    base_url: String,
}

impl std::fmt::Debug for TradierHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradierHttpClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl TradierHttpClient {
    /// Create a new HTTP client from config.
    pub fn new(config: &TradierConfig) -> Result<Self, TradierError> {
        if config.access_token.trim().is_empty() {
            return Err(TradierError::AuthenticationFailed {
                message: "access token is empty".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TradierError::Http(e.to_string()))?;

        Ok(Self {
            client,
            access_token: config.access_token.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET with query parameters.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, TradierError> {
        self.request(Method::GET, path, query, None).await
    }

    /// POST a form.
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T, TradierError> {
        self.request(Method::POST, path, &[], Some(form)).await
    }

    /// PUT a form.
    pub async fn put_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T, TradierError> {
        self.request(Method::PUT, path, &[], Some(form)).await
    }

    /// DELETE.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, TradierError> {
        self.request(Method::DELETE, path, &[], None).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        form: Option<&[(String, String)]>,
    ) -> Result<T, TradierError> {
        let url = format!("{}{path}", self.base_url);
        let endpoint = endpoint_label(path);
        let started = Instant::now();

        let mut request = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(&self.access_token)
            .header(ACCEPT, "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(form) = form {
            request = request.form(form);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                record_api_request(endpoint, "error", started.elapsed().as_secs_f64());
                tracing::warn!(method = %method, path, error = %e, "Tradier request failed");
                return Err(TradierError::Network(e.to_string()));
            }
        };

        let status = response.status();
        record_api_request(endpoint, status.as_str(), started.elapsed().as_secs_f64());

        if status.is_success() {
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let text = response
                .text()
                .await
                .map_err(|e| TradierError::Network(e.to_string()))?;
            if let Some(content_type) = content_type.filter(|ct| !ct.contains("json")) {
                return Err(TradierError::UnexpectedContentType { content_type });
            }
            let body = if text.trim().is_empty() { "{}" } else { &text };
            return serde_json::from_str(body).map_err(|e| TradierError::JsonParse(e.to_string()));
        }

        let error_body = response.text().await.unwrap_or_default();
        let message = error_message(status, &error_body);
        tracing::warn!(
            method = %method,
            path,
            status = status.as_u16(),
            message = %message,
            "Tradier API error"
        );
        Err(status_error(status, message))
    }
}

/// Message from an error body: JSON `error`, `message`, `fault.faultstring`
/// or `errors.error`, else the raw text, else the status line.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<TradierErrorResponse>(body)
        .ok()
        .and_then(TradierErrorResponse::into_message)
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| format!("API Error: {status}"))
}

fn status_error(status: StatusCode, message: String) -> TradierError {
    match status.as_u16() {
        401 | 403 => TradierError::AuthenticationFailed { message },
        404 => TradierError::NotFound { message },
        429 => TradierError::RateLimited,
        code => TradierError::Api {
            status: code,
            message,
        },
    }
}

/// Metrics label for a request path, without account or order ids.
fn endpoint_label(path: &str) -> &'static str {
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    match segments.as_slice() {
        ["v1", "markets", "options", "expirations"] => "expirations",
        ["v1", "markets", "options", "strikes"] => "strikes",
        ["v1", "markets", "options", "chains"] => "chains",
        ["v1", "markets", "options", "lookup"] => "lookup",
        ["v1", "markets", "quotes"] => "quotes",
        ["v1", "markets", "events", "session"] => "market_session",
        ["v1", "accounts", "events", "session"] => "account_session",
        ["v1", "user", "profile"] => "profile",
        ["v1", "accounts"] => "accounts",
        ["v1", "accounts", _, "positions"] => "positions",
        ["v1", "accounts", _, "balances"] => "balances",
        ["v1", "accounts", _, "orders", ..] => "orders",
        _ => "other",
    }
}
