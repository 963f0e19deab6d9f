//! Site, drive, item and list lookups.
//!
//! Site and drive resolution use the capped [`RetryBudget::lookup`] budget.
//! Item listings and SharePoint lists retry until Graph answers 200.

use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::client::SharePointClient;
use super::constants::GRAPH_TIMESTAMP_FORMAT;
use super::error::SharePointError;
use super::models::{
    Collection, DriveEntry, DriveRef, FileDetails, FileDownload, ItemListing, SiteEntry, SiteRef,
    named_items,
};
use super::retry::RetryBudget;

impl SharePointClient {
    /// Finds a site by exact display name.
    ///
    /// # Errors
    ///
    /// Returns [`SharePointError::SiteNotFound`] when no site matches, or the
    /// status-mapped error after four failed responses.
    #[instrument(skip(self))]
    pub async fn get_site_id(&mut self, site_name: &str) -> Result<SiteRef, SharePointError> {
        let url = self.graph_url("/sites?$select=siteCollection,webUrl,id,name");
        let sites: Collection<SiteEntry> = self.get_json(&url, RetryBudget::lookup()).await?;

        let site = sites
            .value
            .into_iter()
            .find(|site| site.name.as_deref() == Some(site_name))
            .ok_or_else(|| SharePointError::SiteNotFound {
                site_name: site_name.to_string(),
            })?;
        let id = site
            .id
            .ok_or_else(|| SharePointError::missing_field(&url, "id"))?;
        debug!(site_id = %id, "site resolved");
        Ok(SiteRef {
            id,
            hostname: site.site_collection.and_then(|c| c.hostname),
            web_url: site.web_url,
        })
    }

    /// Fetches a site by host name and server-relative path.
    ///
    /// # Errors
    ///
    /// Returns [`SharePointError::SiteDetailsMissing`] when the site lacks an
    /// id or web URL, or the status-mapped error after four failed responses.
    #[instrument(skip(self))]
    pub async fn get_site_id_by_site_path(
        &mut self,
        hostname: &str,
        site_path: &str,
    ) -> Result<SiteRef, SharePointError> {
        let url = self.graph_url(&format!("/sites/{hostname}:/{site_path}"));
        let site: SiteEntry = self.get_json(&url, RetryBudget::lookup()).await?;
        match (site.id, site.web_url) {
            (Some(id), Some(web_url)) => Ok(SiteRef {
                id,
                hostname: Some(hostname.to_string()),
                web_url: Some(web_url),
            }),
            _ => Err(SharePointError::SiteDetailsMissing {
                site_path: site_path.to_string(),
            }),
        }
    }

    /// Finds a document library of a site by exact name.
    ///
    /// # Errors
    ///
    /// Returns [`SharePointError::DriveNotFound`] when no drive matches, or
    /// the status-mapped error after four failed responses.
    #[instrument(skip(self))]
    pub async fn get_drives_id(
        &mut self,
        site_id: &str,
        document_library: &str,
    ) -> Result<DriveRef, SharePointError> {
        let url = self.graph_url(&format!("/sites/{site_id}/drives"));
        let drives: Collection<DriveEntry> = self.get_json(&url, RetryBudget::lookup()).await?;

        let drive = drives
            .value
            .into_iter()
            .find(|drive| drive.name.as_deref() == Some(document_library))
            .ok_or_else(|| SharePointError::DriveNotFound {
                site_id: site_id.to_string(),
                library: document_library.to_string(),
            })?;
        let id = drive
            .id
            .ok_or_else(|| SharePointError::missing_field(&url, "id"))?;
        debug!(drive_id = %id, "document library resolved");
        Ok(DriveRef {
            id,
            web_url: drive.web_url,
        })
    }

    /// Finds a document library of a site by its (percent-decoded) web URL.
    ///
    /// # Errors
    ///
    /// Returns [`SharePointError::DriveNotFound`] when no drive matches, or
    /// the status-mapped error after four failed responses.
    #[instrument(skip(self))]
    pub async fn get_drives_id_by_web_url(
        &mut self,
        site_id: &str,
        web_url: &str,
    ) -> Result<String, SharePointError> {
        let url = self.graph_url(&format!("/sites/{site_id}/drives"));
        let drives: Collection<DriveEntry> = self.get_json(&url, RetryBudget::lookup()).await?;

        drives
            .value
            .into_iter()
            .filter(|drive| {
                drive.web_url.as_deref().is_some_and(|candidate| {
                    urlencoding::decode(candidate)
                        .map_or(candidate == web_url, |decoded| decoded == web_url)
                })
            })
            .find_map(|drive| drive.id)
            .ok_or_else(|| SharePointError::DriveNotFound {
                site_id: site_id.to_string(),
                library: web_url.to_string(),
            })
    }

    /// Lists the root children of a drive, split into files and folders.
    ///
    /// Retries until Graph answers 200.
    ///
    /// # Errors
    ///
    /// Returns an error only when token renewal fails or the listing cannot
    /// be decoded.
    #[instrument(skip(self))]
    pub async fn get_file_and_folder_items(
        &mut self,
        site_id: &str,
        drive_id: &str,
    ) -> Result<ItemListing, SharePointError> {
        let url = self.root_children_url(site_id, drive_id);
        let items: Collection<Value> = self.get_json(&url, RetryBudget::Unbounded).await?;
        let listing = ItemListing::partition(named_items(items.value, &url)?);
        debug!(
            files = listing.files.len(),
            folders = listing.folders.len(),
            "drive root listed"
        );
        Ok(listing)
    }

    /// Returns the download URL of a file in the drive root.
    ///
    /// With `last_updated`, the URL is returned only when the file was
    /// modified strictly after that instant; `Ok(None)` means the file exists
    /// but is not newer.
    ///
    /// # Errors
    ///
    /// Returns [`SharePointError::FileNotFound`] when no root item carries
    /// `file_name`.
    #[instrument(skip(self))]
    pub async fn get_drive_download_url(
        &mut self,
        site_id: &str,
        drive_id: &str,
        file_name: &str,
        last_updated: Option<NaiveDateTime>,
    ) -> Result<Option<String>, SharePointError> {
        let url = self.root_children_url(site_id, drive_id);
        let items: Collection<Value> = self.get_json(&url, RetryBudget::Unbounded).await?;

        let mut file_exists = false;
        for item in named_items(items.value, &url)?
            .into_iter()
            .filter(|item| item.name == file_name)
        {
            file_exists = true;
            if is_newer(item.last_modified_date_time.as_deref(), last_updated, &url)? {
                let download_url = item.download_url.ok_or_else(|| {
                    SharePointError::missing_field(&url, "@microsoft.graph.downloadUrl")
                })?;
                return Ok(Some(download_url));
            }
        }

        if file_exists {
            Ok(None)
        } else {
            Err(SharePointError::FileNotFound {
                site_id: site_id.to_string(),
                drive_id: drive_id.to_string(),
                file_name: file_name.to_string(),
            })
        }
    }

    /// Fetches a file by drive-relative path and returns its download URL
    /// with authoring details.
    ///
    /// The `last_updated` rule matches
    /// [`get_drive_download_url`](Self::get_drive_download_url).
    ///
    /// # Errors
    ///
    /// Returns [`SharePointError::ItemPathNotFound`] when the item has no
    /// download URL, or the status-mapped error after four failed responses.
    #[instrument(skip(self))]
    pub async fn get_drive_download_url_by_path(
        &mut self,
        drive_id: &str,
        item_path: &str,
        last_updated: Option<NaiveDateTime>,
    ) -> Result<Option<FileDownload>, SharePointError> {
        let url = self.graph_url(&format!("/drives/{drive_id}/root:/{item_path}"));
        let item: Value = self.get_json(&url, RetryBudget::lookup()).await?;

        let Some(download_url) = item
            .get("@microsoft.graph.downloadUrl")
            .and_then(Value::as_str)
        else {
            return Err(SharePointError::ItemPathNotFound {
                item_path: item_path.to_string(),
            });
        };

        let modified = item.get("lastModifiedDateTime").and_then(Value::as_str);
        if !is_newer(modified, last_updated, &url)? {
            return Ok(None);
        }
        Ok(Some(FileDownload {
            download_url: download_url.to_string(),
            details: FileDetails::from_item(&item),
        }))
    }

    /// Returns every list of a site, verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error only when token renewal fails or the response cannot
    /// be decoded.
    #[instrument(skip(self))]
    pub async fn get_lists(&mut self, site_id: &str) -> Result<Vec<Value>, SharePointError> {
        let url = self.graph_url(&format!("/sites/{site_id}/lists"));
        let lists: Collection<Value> = self.get_json(&url, RetryBudget::Unbounded).await?;
        info!(count = lists.value.len(), "received lists");
        Ok(lists.value)
    }

    /// Returns every item (with fields expanded) of the named list,
    /// following `@odata.nextLink` pages.
    ///
    /// # Errors
    ///
    /// Returns [`SharePointError::ListNotFound`] when the site has no list
    /// with that name.
    #[instrument(skip(self))]
    pub async fn get_items(
        &mut self,
        site_id: &str,
        list_name: &str,
    ) -> Result<Vec<Value>, SharePointError> {
        let lists = self.get_lists(site_id).await?;
        let list_id = lists
            .iter()
            .find(|list| list.get("name").and_then(Value::as_str) == Some(list_name))
            .and_then(|list| list.get("id").and_then(Value::as_str))
            .map(ToString::to_string)
            .ok_or_else(|| SharePointError::ListNotFound {
                site_id: site_id.to_string(),
                list_name: list_name.to_string(),
            })?;

        let mut next_url = Some(
            self.graph_url(&format!("/sites/{site_id}/lists/{list_id}/items?expand=fields")),
        );
        let mut items = Vec::new();
        while let Some(url) = next_url.take() {
            let page: Collection<Value> = self.get_json(&url, RetryBudget::Unbounded).await?;
            items.extend(page.value);
            next_url = page.next_link;
        }
        debug!(count = items.len(), "list items fetched");
        Ok(items)
    }

    fn root_children_url(&self, site_id: &str, drive_id: &str) -> String {
        self.graph_url(&format!("/sites/{site_id}/drives/{drive_id}/root/children"))
    }
}

/// Whether `modified` is strictly after `threshold`; always true without a threshold.
fn is_newer(
    modified: Option<&str>,
    threshold: Option<NaiveDateTime>,
    url: &str,
) -> Result<bool, SharePointError> {
    let Some(threshold) = threshold else {
        return Ok(true);
    };
    let modified =
        modified.ok_or_else(|| SharePointError::missing_field(url, "lastModifiedDateTime"))?;
    let parsed = NaiveDateTime::parse_from_str(modified, GRAPH_TIMESTAMP_FORMAT).map_err(
        |source| SharePointError::InvalidTimestamp {
            value: modified.to_string(),
            source,
        },
    )?;
    Ok(threshold < parsed)
}
