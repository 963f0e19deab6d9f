//! Error types for the Graph client.
//!
//! Graph error responses are mapped by status code onto a fixed set of
//! variants; each carries the raw response body. Lookups that succeed at the
//! HTTP level but find no matching entity produce the `*NotFound` variants.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by [`SharePointClient`](super::SharePointClient) operations.
#[derive(Debug, Error)]
pub enum SharePointError {
    /// HTTP 400.
    #[error("bad request (HTTP 400) from {url}: {body}")]
    BadRequest {
        /// Endpoint that rejected the request.
        url: String,
        /// Raw response body.
        body: String,
    },

    /// HTTP 401.
    #[error("invalid authentication token (HTTP 401) from {url}: {body}")]
    InvalidAuthenticationToken {
        /// Endpoint that rejected the request.
        url: String,
        /// Raw response body.
        body: String,
    },

    /// HTTP 403.
    #[error("forbidden (HTTP 403) from {url}: {body}")]
    Forbidden {
        /// Endpoint that rejected the request.
        url: String,
        /// Raw response body.
        body: String,
    },

    /// HTTP 404.
    #[error("not found (HTTP 404) from {url}: {body}")]
    NotFound {
        /// Endpoint that rejected the request.
        url: String,
        /// Raw response body.
        body: String,
    },

    /// HTTP 409.
    #[error("conflict (HTTP 409) from {url}: {body}")]
    Conflict {
        /// Endpoint that rejected the request.
        url: String,
        /// Raw response body.
        body: String,
    },

    /// HTTP 500.
    #[error("internal service error (HTTP 500) from {url}: {body}")]
    InternalServiceError {
        /// Endpoint that rejected the request.
        url: String,
        /// Raw response body.
        body: String,
    },

    /// Any other non-success status.
    #[error("HTTP {status} from {url}: {body}")]
    Http {
        /// Endpoint that rejected the request.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// No site in the listing carries the requested name.
    #[error("couldn't find site '{site_name}' in sharepoint")]
    SiteNotFound {
        /// Name that was searched for.
        site_name: String,
    },

    /// A site fetched by path lacks its `id` or `webUrl`.
    #[error("couldn't get site id or web url for site path '{site_path}'")]
    SiteDetailsMissing {
        /// Server-relative site path that was requested.
        site_path: String,
    },

    /// No drive of the site matches the requested name or web URL.
    #[error("couldn't find document library '{library}' for site '{site_id}'")]
    DriveNotFound {
        /// Site that was searched.
        site_id: String,
        /// Library name or web URL that was searched for.
        library: String,
    },

    /// No list of the site carries the requested name.
    #[error("couldn't find list '{list_name}' in site '{site_id}'")]
    ListNotFound {
        /// Site that was searched.
        site_id: String,
        /// List name that was searched for.
        list_name: String,
    },

    /// No item in the drive root carries the requested file name.
    #[error("couldn't find file '{file_name}' in drive '{drive_id}' of site '{site_id}'")]
    FileNotFound {
        /// Site that was searched.
        site_id: String,
        /// Drive that was searched.
        drive_id: String,
        /// File name that was searched for.
        file_name: String,
    },

    /// The item at the requested path is not a downloadable file.
    #[error("couldn't find file '{item_path}' in sharepoint")]
    ItemPathNotFound {
        /// Drive-relative path that was requested.
        item_path: String,
    },

    /// A successful response lacked a field the caller depends on.
    #[error("response from {url} is missing field `{field}`")]
    MissingField {
        /// Endpoint that produced the response.
        url: String,
        /// Name of the absent field.
        field: &'static str,
    },

    /// Neither an existing item id nor a parent id was supplied for an upload.
    #[error("could not find item id or parent id for uploading file")]
    MissingUploadTarget,

    /// Upload payload exceeds the simple-upload limit.
    #[error("payload of {size} bytes exceeds the {limit} byte simple upload limit")]
    PayloadTooLarge {
        /// Payload size in bytes.
        size: usize,
        /// Maximum accepted size in bytes.
        limit: usize,
    },

    /// Network-level failure (DNS, connection refused, TLS, broken stream).
    #[error("network error calling {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// A success response body was not the JSON shape expected.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        /// Endpoint that produced the response.
        url: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A `lastModifiedDateTime` value did not match the Graph timestamp format.
    #[error("invalid timestamp '{value}': {source}")]
    InvalidTimestamp {
        /// The raw timestamp text.
        value: String,
        /// The underlying parse error.
        #[source]
        source: chrono::ParseError,
    },

    /// The config carries an unusable endpoint override.
    #[error("invalid client configuration: {0}")]
    Config(#[source] crate::config::ConfigError),

    /// The HTTP session could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// Local file system failure while writing a download.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl SharePointError {
    /// Maps an error response onto its variant.
    ///
    /// 400, 401, 403, 404, 409 and 500 have dedicated variants; every other
    /// status becomes [`SharePointError::Http`].
    pub fn from_status(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        let url = url.into();
        let body = body.into();
        match status {
            400 => Self::BadRequest { url, body },
            401 => Self::InvalidAuthenticationToken { url, body },
            403 => Self::Forbidden { url, body },
            404 => Self::NotFound { url, body },
            409 => Self::Conflict { url, body },
            500 => Self::InternalServiceError { url, body },
            _ => Self::Http { url, status, body },
        }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a decode error from a serde_json error.
    pub fn decode(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }

    /// Creates a missing-field error.
    pub fn missing_field(url: impl Into<String>, field: &'static str) -> Self {
        Self::MissingField {
            url: url.into(),
            field,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns the HTTP status for errors built from a Graph response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest { .. } => Some(400),
            Self::InvalidAuthenticationToken { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Conflict { .. } => Some(409),
            Self::InternalServiceError { .. } => Some(500),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body for errors built from a Graph response.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::BadRequest { body, .. }
            | Self::InvalidAuthenticationToken { body, .. }
            | Self::Forbidden { body, .. }
            | Self::NotFound { body, .. }
            | Self::Conflict { body, .. }
            | Self::InternalServiceError { body, .. }
            | Self::Http { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const URL: &str = "https://graph.microsoft.com/v1.0/sites";

    #[test]
    fn test_from_status_maps_known_codes() {
        assert!(matches!(
            SharePointError::from_status(URL, 400, "{}"),
            SharePointError::BadRequest { .. }
        ));
        assert!(matches!(
            SharePointError::from_status(URL, 401, "{}"),
            SharePointError::InvalidAuthenticationToken { .. }
        ));
        assert!(matches!(
            SharePointError::from_status(URL, 403, "{}"),
            SharePointError::Forbidden { .. }
        ));
        assert!(matches!(
            SharePointError::from_status(URL, 404, "{}"),
            SharePointError::NotFound { .. }
        ));
        assert!(matches!(
            SharePointError::from_status(URL, 409, "{}"),
            SharePointError::Conflict { .. }
        ));
        assert!(matches!(
            SharePointError::from_status(URL, 500, "{}"),
            SharePointError::InternalServiceError { .. }
        ));
    }

    #[test]
    fn test_from_status_unknown_code_is_generic() {
        let error = SharePointError::from_status(URL, 503, "busy");
        match error {
            SharePointError::Http { status, ref body, .. } => {
                assert_eq!(status, 503);
                assert_eq!(body, "busy");
            }
            other => panic!("Expected Http error, got: {other:?}"),
        }
    }

    #[test]
    fn test_status_and_body_round_trip_through_accessors() {
        let body = r#"{"error":{"code":"itemNotFound"}}"#;
        let error = SharePointError::from_status(URL, 404, body);
        assert_eq!(error.status(), Some(404));
        assert_eq!(error.body(), Some(body));
    }

    #[test]
    fn test_display_carries_raw_body() {
        let error = SharePointError::from_status(URL, 409, r#"{"error":"nameAlreadyExists"}"#);
        let msg = error.to_string();
        assert!(msg.contains("409"), "Expected status in: {msg}");
        assert!(msg.contains("nameAlreadyExists"), "Expected body in: {msg}");
    }

    #[test]
    fn test_lookup_errors_have_no_status() {
        let error = SharePointError::SiteNotFound {
            site_name: "Finance".to_string(),
        };
        assert_eq!(error.status(), None);
        assert_eq!(error.body(), None);
        assert!(error.to_string().contains("'Finance'"));
    }

    #[test]
    fn test_io_display_includes_path() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = SharePointError::io(PathBuf::from("/tmp/report.xlsx"), io_error);
        let msg = error.to_string();
        assert!(msg.contains("/tmp/report.xlsx"), "Expected path in: {msg}");
    }

    #[test]
    fn test_payload_too_large_display() {
        let error = SharePointError::PayloadTooLarge {
            size: 5_000_000,
            limit: 4_194_304,
        };
        let msg = error.to_string();
        assert!(msg.contains("5000000"), "Expected size in: {msg}");
        assert!(msg.contains("4194304"), "Expected limit in: {msg}");
    }
}
