//! SharePoint Sync Core Library
//!
//! This library moves files between a local directory and a SharePoint
//! document library through Microsoft Graph, authenticating with an app
//! registration's client credentials.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - JSON config loading and validation
//! - [`graph`] - Graph client: token lifecycle, lookups, downloads, uploads
//! - [`sync`] - Whole-library download and upload runs

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod graph;
pub mod sync;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use config::{ConfigError, REQUIRED_CONFIG_KEYS, SharePointConfig, load_config};
pub use graph::{
    DriveItem, GraphEndpoints, ItemListing, RetryBudget, SharePointClient, SharePointError,
    UploadTarget,
};
pub use sync::{SyncError, SyncReport, download_files, upload_files};
