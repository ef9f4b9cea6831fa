//! Honeycomb REST API access.

pub mod client;
pub mod types;

pub use client::{
    DEFAULT_API_URL, DatasetDeletion, HoneycombClient, HoneycombClientBuilder, RetryPolicy,
};
pub use types::{AuthInfo, Column, Dataset, NamedRef};
