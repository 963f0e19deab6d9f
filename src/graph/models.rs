//! Wire models for Graph responses.
//!
//! Items keep every field Graph returns: the handful the sync needs are typed,
//! the rest sit untouched in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::SharePointError;

/// Token endpoint response for the client-credentials grant.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
}

/// Generic `{ "value": [...] }` collection envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Entry of the `/sites` listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SiteEntry {
    pub id: Option<String>,
    pub name: Option<String>,
    pub web_url: Option<String>,
    pub site_collection: Option<SiteCollection>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SiteCollection {
    pub hostname: Option<String>,
}

/// Entry of the `/sites/{id}/drives` listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DriveEntry {
    pub id: Option<String>,
    pub name: Option<String>,
    pub web_url: Option<String>,
}

/// A site resolved by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRef {
    /// Graph site id (`hostname,siteCollectionId,webId`).
    pub id: String,
    /// Host name of the owning site collection.
    pub hostname: Option<String>,
    /// Browser URL of the site.
    pub web_url: Option<String>,
}

/// A document library resolved by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveRef {
    /// Graph drive id.
    pub id: String,
    /// Browser URL of the library.
    pub web_url: Option<String>,
}

/// Reference to the folder that contains an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemReference {
    /// Id of the parent folder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Id of the drive the parent lives in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_id: Option<String>,
    /// Remaining reference fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A file or folder in a drive, as returned by Graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    /// Item id.
    pub id: String,
    /// Item name (file name for files).
    pub name: String,
    /// Size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Pre-authenticated, short-lived download URL (files only).
    #[serde(
        rename = "@microsoft.graph.downloadUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub download_url: Option<String>,
    /// Containing folder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_reference: Option<ItemReference>,
    /// File facet; present only for files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<Value>,
    /// Folder facet; present only for folders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<Value>,
    /// Last modification time, `YYYY-MM-DDTHH:MM:SSZ`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_date_time: Option<String>,
    /// Every other field of the item.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DriveItem {
    /// Whether the item carries a file facet.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.file.is_some()
    }

    /// Whether the item carries a folder facet.
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.folder.is_some()
    }

    /// Id of the containing folder, if Graph reported one.
    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_reference
            .as_ref()
            .and_then(|reference| reference.id.as_deref())
    }
}

/// Root children of a drive split by facet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemListing {
    /// Items with a `file` facet.
    pub files: Vec<DriveItem>,
    /// Items with a `folder` facet.
    pub folders: Vec<DriveItem>,
}

impl ItemListing {
    /// Splits raw items into files and folders; items with neither facet are dropped.
    #[must_use]
    pub fn partition(items: Vec<DriveItem>) -> Self {
        let mut listing = Self::default();
        for item in items {
            if item.is_file() {
                listing.files.push(item);
            } else if item.is_folder() {
                listing.folders.push(item);
            }
        }
        listing
    }

    /// Finds a file by exact name.
    #[must_use]
    pub fn file_named(&self, name: &str) -> Option<&DriveItem> {
        self.files.iter().find(|item| item.name == name)
    }
}

/// Decodes drive items, skipping entries that lack a `name` or `id`.
pub(crate) fn named_items(
    values: Vec<Value>,
    url: &str,
) -> Result<Vec<DriveItem>, SharePointError> {
    values
        .into_iter()
        .filter(|value| value.get("name").is_some() && value.get("id").is_some())
        .map(|value| serde_json::from_value(value).map_err(|e| SharePointError::decode(url, e)))
        .collect()
}

/// Authoring details of a file fetched by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDetails {
    /// `createdDateTime`.
    pub created: Option<String>,
    /// `lastModifiedDateTime`.
    pub modified: Option<String>,
    /// Display name of the creating user.
    pub created_by: Option<String>,
    /// Display name of the last modifying user.
    pub modified_by: Option<String>,
}

/// Download URL of a file fetched by path, with its authoring details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDownload {
    /// Pre-authenticated download URL.
    pub download_url: String,
    /// Creation and modification details.
    pub details: FileDetails,
}

impl FileDetails {
    pub(crate) fn from_item(item: &Value) -> Self {
        let text = |pointer: &str| {
            item.pointer(pointer)
                .and_then(Value::as_str)
                .map(ToString::to_string)
        };
        Self {
            created: text("/createdDateTime"),
            modified: text("/lastModifiedDateTime"),
            created_by: text("/createdBy/user/displayName"),
            modified_by: text("/lastModifiedBy/user/displayName"),
        }
    }
}
