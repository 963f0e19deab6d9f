//! Bulk download and upload between a local directory and a document library.
//!
//! Both directions resolve site → drive → root listing first. Only the drive
//! root is considered; folders are never descended into or uploaded.

mod download;
mod upload;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::graph::SharePointError;

pub use download::download_files;
pub use upload::upload_files;

/// Errors raised by a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A Graph call failed.
    #[error(transparent)]
    Graph(#[from] SharePointError),

    /// A listed file has no download URL.
    #[error("remote file '{name}' has no download URL")]
    MissingDownloadUrl {
        /// Remote file name.
        name: String,
    },

    /// A local file or directory could not be read or created.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Offending path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Counters for one sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Remote files written locally.
    pub downloaded: usize,
    /// Remote files whose content was replaced.
    pub replaced: usize,
    /// Remote files newly created.
    pub created: usize,
    /// Bytes moved in either direction.
    pub bytes: u64,
}

impl SyncReport {
    /// Total files transferred.
    #[must_use]
    pub fn total(&self) -> usize {
        self.downloaded + self.replaced + self.created
    }
}

/// Names of the regular files directly inside `dir`, sorted.
///
/// # Errors
///
/// Returns [`SyncError::Io`] when the directory cannot be read.
pub async fn local_file_names(dir: &Path) -> Result<Vec<String>, SyncError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| SyncError::io(dir, e))?;
    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| SyncError::io(dir, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| SyncError::io(entry.path(), e))?;
        if file_type.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_file_names_skips_directories_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("b.csv"), b"b").unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), b"a").unwrap();
        std::fs::create_dir(temp_dir.path().join("nested")).unwrap();

        let names = local_file_names(temp_dir.path()).await.unwrap();

        assert_eq!(names, vec!["a.txt".to_string(), "b.csv".to_string()]);
    }

    #[tokio::test]
    async fn test_local_file_names_missing_dir() {
        let err = local_file_names(Path::new("/nonexistent/upload"))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
    }

    #[test]
    fn test_report_total_sums_counters() {
        let report = SyncReport {
            downloaded: 2,
            replaced: 1,
            created: 3,
            bytes: 10,
        };
        assert_eq!(report.total(), 6);
    }
}
