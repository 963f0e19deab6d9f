//! Local → remote.

use std::path::Path;

use tracing::{debug, info, instrument, warn};

use super::{SyncError, SyncReport, local_file_names};
use crate::config::SharePointConfig;
use crate::graph::{ItemListing, SharePointClient, UploadTarget};

/// Folder id used when the library root is empty and no parent can be read
/// from the listing.
const ROOT_ITEM_ID: &str = "root";

/// Uploads every regular file in `upload_path` to the configured library's root.
///
/// A local file whose name matches a remote file replaces that file's
/// content; any other file is created next to the listed items. Without a
/// `document_library` in the config nothing is uploaded.
///
/// # Errors
///
/// Returns [`SyncError`] when the directory or a file cannot be read, or when
/// a Graph call fails.
#[instrument(skip(client, config), fields(site = %config.site_name))]
pub async fn upload_files(
    client: &mut SharePointClient,
    config: &SharePointConfig,
    upload_path: &Path,
) -> Result<SyncReport, SyncError> {
    let Some(library) = config.document_library.as_deref() else {
        warn!("no document_library configured; nothing to upload");
        return Ok(SyncReport::default());
    };

    let file_names = local_file_names(upload_path).await?;
    let site = client.get_site_id(&config.site_name).await?;
    let drive = client.get_drives_id(&site.id, library).await?;
    let listing = client.get_file_and_folder_items(&site.id, &drive.id).await?;
    let parent_id = parent_folder_id(&listing);
    debug!(parent_id = %parent_id, files = file_names.len(), "upload plan ready");

    let mut report = SyncReport::default();
    for file_name in file_names {
        let local_path = upload_path.join(&file_name);
        let data = tokio::fs::read(&local_path)
            .await
            .map_err(|e| SyncError::io(&local_path, e))?;
        let size = data.len() as u64;

        if let Some(existing) = listing.file_named(&file_name) {
            let target = UploadTarget::Replace {
                item_id: existing.id.clone(),
            };
            client.upload_file(&drive.id, data, &target).await?;
            info!(path = %local_path.display(), "existing file replaced");
            report.replaced += 1;
        } else {
            let target = UploadTarget::Create {
                parent_id: parent_id.clone(),
                filename: file_name,
            };
            client.upload_file(&drive.id, data, &target).await?;
            info!(path = %local_path.display(), "new file uploaded");
            report.created += 1;
        }
        report.bytes += size;
    }
    Ok(report)
}

/// Parent folder of the listed root items, falling back to the drive root.
fn parent_folder_id(listing: &ItemListing) -> String {
    listing
        .files
        .iter()
        .chain(&listing.folders)
        .find_map(|item| item.parent_id())
        .unwrap_or(ROOT_ITEM_ID)
        .to_string()
}
