//! Blocking client for the Honeycomb REST API.
//!
//! Wraps `reqwest::blocking` with the team header, rate-limit handling
//! (`429` + `Retry-After`) and a small retry loop for transport errors.

use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::Method;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::types::{ApiErrorBody, AuthInfo, Column, Dataset, DatasetUpdate};
use crate::error::{CleanerError, Result};
use crate::utils::format_duration;

pub const DEFAULT_API_URL: &str = "https://api.honeycomb.io";
const TEAM_HEADER: &str = "X-Honeycomb-Team";
const PROTECTED_MARKER: &str = "delete protected";

/// How requests are retried when the API pushes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per request, including the first one.
    pub max_attempts: u32,
    /// Pause between attempts after a transport error.
    pub transport_backoff: Duration,
    /// Wait used on `429` when `Retry-After` is missing or unreadable.
    pub fallback_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            transport_backoff: Duration::from_secs(1),
            fallback_wait: Duration::from_secs(60),
        }
    }
}

/// How a dataset deletion went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetDeletion {
    Deleted,
    /// The first attempt hit deletion protection, which was turned off
    /// before the retry succeeded.
    DeletedAfterUnprotect,
}

pub struct HoneycombClient {
    http: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl HoneycombClient {
    pub fn builder(api_key: &str) -> HoneycombClientBuilder {
        HoneycombClientBuilder {
            api_key: api_key.to_string(),
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Team and environment the API key belongs to.
    pub fn environment_info(&self) -> Result<AuthInfo> {
        let response = self.send(Method::GET, "/1/auth", None::<&()>)?;
        let response = expect_success(response)?;
        Ok(response.json()?)
    }

    pub fn list_datasets(&self) -> Result<Vec<Dataset>> {
        let response = self.send(Method::GET, "/1/datasets", None::<&()>)?;
        let response = expect_success(response)?;
        let datasets: Vec<Dataset> = response.json()?;
        debug!(count = datasets.len(), "fetched datasets");
        Ok(datasets)
    }

    pub fn list_columns(&self, dataset_slug: &str) -> Result<Vec<Column>> {
        let path = format!("/1/columns/{}", urlencoding::encode(dataset_slug));
        let response = self.send(Method::GET, &path, None::<&()>)?;
        let response = expect_success(response)?;
        let columns: Vec<Column> = response.json()?;
        debug!(dataset = dataset_slug, count = columns.len(), "fetched columns");
        Ok(columns)
    }

    pub fn delete_column(&self, dataset_slug: &str, column_id: &str) -> Result<()> {
        let path = format!(
            "/1/columns/{}/{}",
            urlencoding::encode(dataset_slug),
            urlencoding::encode(column_id)
        );
        let response = self.send(Method::DELETE, &path, None::<&()>)?;
        expect_success(response)?;
        info!(dataset = dataset_slug, column = column_id, "deleted column");
        Ok(())
    }

    pub fn disable_deletion_protection(&self, dataset_slug: &str) -> Result<()> {
        let path = dataset_path(dataset_slug);
        let response = self.send(Method::PUT, &path, Some(&DatasetUpdate::unprotect()))?;
        expect_success(response).map_err(|err| match err {
            CleanerError::Api { status, message } => CleanerError::Api {
                status,
                message: format!("could not disable deletion protection: {message}"),
            },
            other => other,
        })?;
        info!(dataset = dataset_slug, "disabled deletion protection");
        Ok(())
    }

    /// Delete a dataset.
    ///
    /// With `disable_protection`, a `409` caused by deletion protection turns
    /// the protection off and retries the delete once.
    pub fn delete_dataset(
        &self,
        dataset_slug: &str,
        disable_protection: bool,
    ) -> Result<DatasetDeletion> {
        let path = dataset_path(dataset_slug);
        let response = self.send(Method::DELETE, &path, None::<&()>)?;
        let status = response.status();
        if status.is_success() {
            info!(dataset = dataset_slug, "deleted dataset");
            return Ok(DatasetDeletion::Deleted);
        }

        let body = response.text().unwrap_or_default();
        if status == StatusCode::CONFLICT && disable_protection && mentions_protection(&body) {
            info!(dataset = dataset_slug, "deletion protection detected, disabling");
            self.disable_deletion_protection(dataset_slug)?;
            let retry = self.send(Method::DELETE, &path, None::<&()>)?;
            expect_success(retry)?;
            info!(dataset = dataset_slug, "deleted dataset after disabling protection");
            return Ok(DatasetDeletion::DeletedAfterUnprotect);
        }

        Err(api_error(status, &body))
    }

    fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response> {
        let url = format!("{}{path}", self.base_url);
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            debug!(%method, %url, attempt, "sending request");
            let mut request = self.http.request(method.clone(), &url);
            if let Some(body) = body {
                request = request.json(body);
            }

            match request.send() {
                Ok(response)
                    if response.status() == StatusCode::TOO_MANY_REQUESTS
                        && attempt < max_attempts =>
                {
                    let header = response
                        .headers()
                        .get(RETRY_AFTER)
                        .and_then(|value| value.to_str().ok());
                    let wait = retry_after_wait(header, Utc::now(), self.retry.fallback_wait);
                    warn!(
                        %url,
                        retry_after = header.unwrap_or("<none>"),
                        "rate limited, waiting {} before retrying",
                        format_duration(wait.as_secs())
                    );
                    thread::sleep(wait);
                }
                Ok(response) => return Ok(response),
                Err(err) if attempt < max_attempts => {
                    warn!(%url, error = %err, "request failed, retrying");
                    thread::sleep(self.retry.transport_backoff);
                }
                Err(err) => return Err(err.into()),
            }
            attempt += 1;
        }
    }
}

pub struct HoneycombClientBuilder {
    api_key: String,
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl HoneycombClientBuilder {
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn build(self) -> Result<HoneycombClient> {
        if self.api_key.trim().is_empty() {
            return Err(CleanerError::MissingApiKey);
        }

        let mut key = HeaderValue::from_str(self.api_key.trim())
            .map_err(|err| CleanerError::Config(format!("invalid API key: {err}")))?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(TEAM_HEADER, key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout.max(Duration::from_secs(1)))
            .build()
            .map_err(|err| CleanerError::Config(format!("http client: {err}")))?;

        Ok(HoneycombClient {
            http,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            retry: self.retry,
        })
    }
}

fn dataset_path(slug: &str) -> String {
    format!("/1/datasets/{}", urlencoding::encode(slug))
}

fn expect_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(api_error(status, &body))
}

fn api_error(status: StatusCode, body: &str) -> CleanerError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            let raw = body.trim();
            if raw.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                raw.to_string()
            }
        });
    CleanerError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Whether an error body says the dataset is protected from deletion.
#[must_use]
pub fn mentions_protection(body: &str) -> bool {
    body.to_lowercase().contains(PROTECTED_MARKER)
}

/// How long to wait after a `429`.
///
/// `Retry-After` is either delay-seconds or an HTTP date; dates already in
/// the past yield no wait. Anything else falls back to `fallback`.
#[must_use]
pub fn retry_after_wait(header: Option<&str>, now: DateTime<Utc>, fallback: Duration) -> Duration {
    let Some(raw) = header.map(str::trim).filter(|value| !value.is_empty()) else {
        warn!("rate limited without a Retry-After header");
        return fallback;
    };

    if raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return raw.parse::<u64>().map_or(fallback, Duration::from_secs);
    }

    match DateTime::parse_from_rfc2822(raw) {
        Ok(when) => (when.with_timezone(&Utc) - now)
            .to_std()
            .unwrap_or(Duration::ZERO),
        Err(err) => {
            warn!(retry_after = raw, error = %err, "unreadable Retry-After header");
            fallback
        }
    }
}
