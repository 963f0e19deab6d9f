//! Remote → local.

use std::path::Path;

use tracing::{info, instrument, warn};

use super::{SyncError, SyncReport};
use crate::config::SharePointConfig;
use crate::graph::SharePointClient;

/// Downloads every file in the configured library's root into `download_path`.
///
/// Without a `document_library` in the config nothing is downloaded.
/// `download_path` is created if missing; existing files are overwritten.
///
/// # Errors
///
/// Returns [`SyncError`] when site or library resolution fails, when the
/// directory cannot be created, or when a listed file has no download URL.
#[instrument(skip(client, config), fields(site = %config.site_name))]
pub async fn download_files(
    client: &mut SharePointClient,
    config: &SharePointConfig,
    download_path: &Path,
) -> Result<SyncReport, SyncError> {
    let Some(library) = config.document_library.as_deref() else {
        warn!("no document_library configured; downloading from every library is not supported");
        return Ok(SyncReport::default());
    };

    let site = client.get_site_id(&config.site_name).await?;
    let drive = client.get_drives_id(&site.id, library).await?;
    let listing = client.get_file_and_folder_items(&site.id, &drive.id).await?;

    tokio::fs::create_dir_all(download_path)
        .await
        .map_err(|e| SyncError::io(download_path, e))?;

    let mut report = SyncReport::default();
    for file in &listing.files {
        let url = file
            .download_url
            .as_deref()
            .ok_or_else(|| SyncError::MissingDownloadUrl {
                name: file.name.clone(),
            })?;
        let file_path = download_path.join(&file.name);
        let outcome = client.download_file(url, &file_path, file.size).await;
        info!(path = %file_path.display(), bytes = outcome.bytes_written, "file downloaded");
        report.downloaded += 1;
        report.bytes += outcome.bytes_written;
    }
    Ok(report)
}
