//! Records returned by the Honeycomb REST API.
//!
//! Only the fields the cleaner reads are modelled; everything else in the
//! payloads is ignored.

use serde::{Deserialize, Serialize};

/// A dataset from `GET /1/datasets`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_written_at: Option<String>,
    #[serde(default)]
    pub settings: Option<DatasetSettings>,
}

impl Dataset {
    /// Name for display, falling back when the API returned none.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Unknown"
        } else {
            &self.name
        }
    }

    #[must_use]
    pub fn is_delete_protected(&self) -> bool {
        self.settings
            .as_ref()
            .and_then(|settings| settings.delete_protected)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSettings {
    #[serde(default)]
    pub delete_protected: Option<bool>,
}

/// A column from `GET /1/columns/{dataset}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub key_name: String,
    #[serde(rename = "type", default)]
    pub column_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub last_written: Option<String>,
}

impl Column {
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.key_name.is_empty() {
            "Unknown"
        } else {
            &self.key_name
        }
    }

    #[must_use]
    pub fn display_type(&self) -> &str {
        match self.column_type.as_deref() {
            Some(kind) if !kind.is_empty() => kind,
            _ => "unknown",
        }
    }
}

/// Name and slug pair used for teams and environments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default = "unknown_name")]
    pub name: String,
    #[serde(default = "unknown_slug")]
    pub slug: String,
}

impl Default for NamedRef {
    fn default() -> Self {
        Self {
            name: unknown_name(),
            slug: unknown_slug(),
        }
    }
}

fn unknown_name() -> String {
    "Unknown".to_string()
}

fn unknown_slug() -> String {
    "unknown".to_string()
}

/// Response of `GET /1/auth`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfo {
    #[serde(default)]
    pub environment: NamedRef,
    #[serde(default)]
    pub team: NamedRef,
}

/// Error envelope used by the API on failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `PUT /1/datasets/{slug}` when flipping deletion protection.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetUpdate {
    pub settings: DatasetSettings,
}

impl DatasetUpdate {
    #[must_use]
    pub const fn unprotect() -> Self {
        Self {
            settings: DatasetSettings {
                delete_protected: Some(false),
            },
        }
    }
}
