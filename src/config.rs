//! JSON configuration for a sync run.
//!
//! The file is a flat object. Keys are checked for presence only; every absent
//! required key is reported at once. Any scalar value is read as text.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use crate::graph::GraphEndpoints;

/// Keys every config file must define.
pub const REQUIRED_CONFIG_KEYS: [&str; 6] = [
    "tenant_name",
    "client_id",
    "client_secret",
    "grant_type",
    "scope",
    "site_name",
];

/// Errors raised while loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Config path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a JSON object of the expected shape.
    #[error("failed to parse config JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// The top-level JSON value is not an object.
    #[error("config must be a JSON object")]
    NotAnObject,

    /// One or more required keys are absent.
    #[error("config is missing required keys: {}", .0.join(", "))]
    MissingKeys(Vec<&'static str>),

    /// An endpoint override is not an absolute URL.
    #[error("invalid URL for `{key}`: {value}")]
    InvalidUrl {
        /// Config key holding the URL.
        key: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Settings for one sync run.
#[derive(Clone, Deserialize)]
pub struct SharePointConfig {
    /// Azure AD tenant (name or id) used in the token URL.
    #[serde(deserialize_with = "scalar_string")]
    pub tenant_name: String,
    /// Application (client) id.
    #[serde(deserialize_with = "scalar_string")]
    pub client_id: String,
    /// Application secret.
    #[serde(deserialize_with = "scalar_string")]
    pub client_secret: String,
    /// OAuth2 grant type, normally `client_credentials`.
    #[serde(deserialize_with = "scalar_string")]
    pub grant_type: String,
    /// Requested scope, normally `https://graph.microsoft.com/.default`.
    #[serde(deserialize_with = "scalar_string")]
    pub scope: String,
    /// Display name of the SharePoint site.
    #[serde(deserialize_with = "scalar_string")]
    pub site_name: String,
    /// Name of the document library to sync with.
    #[serde(default, deserialize_with = "optional_scalar_string")]
    pub document_library: Option<String>,
    /// Identity platform host override.
    #[serde(default, deserialize_with = "optional_scalar_string")]
    pub login_base_url: Option<String>,
    /// Graph API base URL override.
    #[serde(default, deserialize_with = "optional_scalar_string")]
    pub graph_base_url: Option<String>,
}

impl fmt::Debug for SharePointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharePointConfig")
            .field("tenant_name", &self.tenant_name)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("grant_type", &self.grant_type)
            .field("scope", &self.scope)
            .field("site_name", &self.site_name)
            .field("document_library", &self.document_library)
            .field("login_base_url", &self.login_base_url)
            .field("graph_base_url", &self.graph_base_url)
            .finish()
    }
}

impl SharePointConfig {
    /// Parses config JSON, checking required keys before deserializing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the text is not a JSON object, when
    /// required keys are absent, or when an endpoint override is not a URL.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(text).map_err(ConfigError::Parse)?;
        let Value::Object(map) = value else {
            return Err(ConfigError::NotAnObject);
        };
        check_required_keys(&map)?;
        let config: Self =
            serde_json::from_value(Value::Object(map)).map_err(ConfigError::Parse)?;
        config.endpoints()?;
        Ok(config)
    }

    /// Resolves the login and Graph endpoints, applying overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] when an override does not parse.
    pub fn endpoints(&self) -> Result<GraphEndpoints, ConfigError> {
        let mut endpoints = GraphEndpoints::default();
        if let Some(login) = &self.login_base_url {
            endpoints.login_base_url = validated_url("login_base_url", login)?;
        }
        if let Some(graph) = &self.graph_base_url {
            endpoints.graph_base_url = validated_url("graph_base_url", graph)?;
        }
        Ok(endpoints)
    }
}

/// Loads and validates a config file.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] when the file cannot be read, otherwise the
/// errors of [`SharePointConfig::from_json_str`].
pub fn load_config(path: &Path) -> Result<SharePointConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    SharePointConfig::from_json_str(&text)
}

/// Reads any JSON scalar as text; `null` reads as an empty string.
fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Null => Ok(String::new()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Array(_) | Value::Object(_) => Err(serde::de::Error::custom(
            "expected a string, number or boolean",
        )),
    }
}

fn optional_scalar_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        other => scalar_string(other).map(Some).map_err(serde::de::Error::custom),
    }
}

fn check_required_keys(map: &Map<String, Value>) -> Result<(), ConfigError> {
    let missing: Vec<&'static str> = REQUIRED_CONFIG_KEYS
        .iter()
        .copied()
        .filter(|key| !map.contains_key(*key))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::MissingKeys(missing))
    }
}

fn validated_url(key: &'static str, value: &str) -> Result<String, ConfigError> {
    Url::parse(value).map_err(|_| ConfigError::InvalidUrl {
        key,
        value: value.to_string(),
    })?;
    Ok(value.trim_end_matches('/').to_string())
}
