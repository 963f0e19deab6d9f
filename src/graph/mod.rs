//! Microsoft Graph client for SharePoint document libraries.
//!
//! # Features
//!
//! - Client-credentials token acquisition, renewed reactively on failure
//! - Site, drive, item and list lookups by name
//! - Streamed downloads written in 1 KiB chunks with progress bars
//! - Simple (single request) uploads that replace or create files
//! - Status-code mapped errors carrying the raw response body
//!
//! # Retry behavior
//!
//! Site and drive lookups give up after four failed responses. Item listings,
//! list queries and downloads never give up. Uploads retry only on 401 and
//! network errors.
//!
//! # Example
//!
//! ```no_run
//! use sharepoint_sync_core::graph::SharePointClient;
//! use sharepoint_sync_core::load_config;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config(Path::new("sharepoint.json"))?;
//! let mut client = SharePointClient::connect(&config).await?;
//! let site = client.get_site_id("Finance").await?;
//! let drive = client.get_drives_id(&site.id, "Documents").await?;
//! let listing = client.get_file_and_folder_items(&site.id, &drive.id).await?;
//! for file in &listing.files {
//!     println!("{}", file.name);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod error;
mod lookup;
mod models;
mod retry;
mod transfer;

pub use client::{GraphEndpoints, SharePointClient};
pub use error::SharePointError;
pub use models::{
    DriveItem, DriveRef, FileDetails, FileDownload, ItemListing, ItemReference, SiteRef,
};
pub use retry::{RetryBudget, RetryDecision};
pub use transfer::{DownloadOutcome, UploadTarget};
