//! Shared helpers for integration tests: mock API fixtures and clients
//! pointed at an `httpmock` server.

#![allow(dead_code)]

use std::time::Duration;

use chrono::Utc;
use honeycomb_cleaner::api::{HoneycombClient, RetryPolicy};
use httpmock::prelude::*;
use serde_json::{Value, json};

pub const API_KEY: &str = "test_api_key";
pub const STALE: &str = "2020-01-01T00:00:00Z";

/// RFC 3339 timestamp `days` days ago.
pub fn days_ago(days: i64) -> String {
    (Utc::now() - chrono::Duration::days(days)).to_rfc3339()
}

/// Retries without real waiting.
pub fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        transport_backoff: Duration::ZERO,
        fallback_wait: Duration::ZERO,
    }
}

pub fn client_for(server: &MockServer) -> HoneycombClient {
    HoneycombClient::builder(API_KEY)
        .base_url(server.base_url())
        .timeout(Duration::from_secs(5))
        .retry(fast_retry(3))
        .build()
        .expect("build client")
}

pub fn dataset(name: &str, last_written_at: Option<&str>) -> Value {
    json!({
        "name": name,
        "slug": name,
        "created_at": "2019-06-01T12:00:00Z",
        "last_written_at": last_written_at,
    })
}

pub fn column(id: &str, key_name: &str, last_written: Option<&str>) -> Value {
    json!({
        "id": id,
        "key_name": key_name,
        "type": "string",
        "hidden": false,
        "created_at": "2019-06-01T12:00:00Z",
        "last_written": last_written,
    })
}

pub fn mock_auth(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/1/auth");
        then.status(200).json_body(json!({
            "environment": {"name": "Production", "slug": "production"},
            "team": {"name": "My Team", "slug": "my-team"},
        }));
    });
}

pub fn mock_datasets(server: &MockServer, datasets: Value) {
    server.mock(|when, then| {
        when.method(GET).path("/1/datasets");
        then.status(200).json_body(datasets);
    });
}
