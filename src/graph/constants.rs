//! Constants for the Graph client (endpoints, retry caps, transfer sizes).

/// Default Microsoft identity platform host.
pub const DEFAULT_LOGIN_BASE_URL: &str = "https://login.microsoftonline.com";

/// Default Graph API base URL.
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// HTTP connect timeout (30 seconds). No overall request timeout is set.
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Attempts allowed for capped lookups before the mapped error is raised.
pub const LOOKUP_MAX_ATTEMPTS: u32 = 4;

/// Chunk size used when writing downloads to disk.
pub const DOWNLOAD_CHUNK_SIZE: usize = 1024;

/// Largest payload accepted by the simple upload endpoint (4 MiB).
pub const SIMPLE_UPLOAD_MAX_BYTES: usize = 4 * 1024 * 1024;

/// Timestamp format Graph uses for `lastModifiedDateTime`.
pub const GRAPH_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
