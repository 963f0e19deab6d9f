//! File download and upload.
//!
//! Downloads stream a pre-authenticated URL to disk and retry every failure
//! forever. Uploads PUT the whole payload in one request (simple upload) and
//! renew the token on 401.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, error, info, instrument, warn};

use super::client::{SharePointClient, decode_json};
use super::constants::{DOWNLOAD_CHUNK_SIZE, SIMPLE_UPLOAD_MAX_BYTES};
use super::error::SharePointError;

/// Where an upload lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    /// Overwrite the content of an existing item.
    Replace {
        /// Id of the item to overwrite.
        item_id: String,
    },
    /// Create a new file inside a folder.
    Create {
        /// Id of the containing folder (`root` for the drive root).
        parent_id: String,
        /// Name of the new file.
        filename: String,
    },
}

impl UploadTarget {
    fn content_path(&self, drive_id: &str) -> Result<String, SharePointError> {
        match self {
            Self::Replace { item_id } if !item_id.is_empty() => {
                Ok(format!("/drives/{drive_id}/items/{item_id}/content"))
            }
            Self::Create {
                parent_id,
                filename,
            } if !parent_id.is_empty() && !filename.is_empty() => {
                let filename = urlencoding::encode(filename);
                Ok(format!(
                    "/drives/{drive_id}/items/{parent_id}:/{filename}:/content"
                ))
            }
            _ => Err(SharePointError::MissingUploadTarget),
        }
    }
}

/// Result of a completed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// Where the file was written.
    pub path: PathBuf,
    /// Bytes written by the successful attempt.
    pub bytes_written: u64,
    /// Attempts made, including the successful one.
    pub attempts: u64,
}

impl SharePointClient {
    /// Downloads `url` to `filename`, retrying until an attempt succeeds.
    ///
    /// `url` is a pre-authenticated `@microsoft.graph.downloadUrl`, so no
    /// bearer token is sent. `file_size` sizes the progress bar; without it
    /// the `Content-Length` header is used.
    ///
    /// Every failure (non-200 status, network error, write error) is logged
    /// and retried immediately. This call does not return until the file has
    /// been written.
    #[instrument(skip(self, url, filename), fields(path = %filename.display()))]
    pub async fn download_file(
        &self,
        url: &str,
        filename: &Path,
        file_size: Option<u64>,
    ) -> DownloadOutcome {
        let mut attempts = 0_u64;
        loop {
            attempts += 1;
            match self.try_download(url, filename, file_size).await {
                Ok(bytes_written) => {
                    debug!(attempts, bytes = bytes_written, "download complete");
                    return DownloadOutcome {
                        path: filename.to_path_buf(),
                        bytes_written,
                        attempts,
                    };
                }
                Err(e) => {
                    warn!(attempt = attempts, error = %e, "download failed, trying again");
                }
            }
        }
    }

    async fn try_download(
        &self,
        url: &str,
        filename: &Path,
        file_size: Option<u64>,
    ) -> Result<u64, SharePointError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SharePointError::network(url, e))?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(SharePointError::from_status(url, status, body));
        }

        let total_bytes = file_size.or_else(|| response.content_length());
        let progress = self.progress_bar(filename, total_bytes);

        let file = File::create(filename)
            .await
            .map_err(|e| SharePointError::io(filename, e))?;
        let result = stream_in_chunks(file, response, url, filename, &progress).await;
        if result.is_err() {
            debug!(path = %filename.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(filename).await;
            progress.abandon();
        } else {
            progress.finish();
        }
        result
    }

    fn progress_bar(&self, filename: &Path, total_bytes: Option<u64>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let message = filename.display().to_string();
        match total_bytes {
            Some(total) => {
                let bar = ProgressBar::new(total / DOWNLOAD_CHUNK_SIZE as u64);
                bar.set_style(
                    ProgressStyle::with_template("{msg} {bar:40} {pos}/{len} KB [{elapsed}]")
                        .unwrap_or_else(|_| ProgressStyle::default_bar()),
                );
                bar.with_message(message)
            }
            None => {
                let spinner = ProgressBar::new_spinner();
                spinner.set_style(
                    ProgressStyle::with_template("{spinner} {msg} {pos} KB")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                spinner.with_message(message)
            }
        }
    }

    /// Uploads `data` with a single PUT.
    ///
    /// A 401 renews the token and repeats the request; so does a network
    /// error, including one while reading the response body. 200 and 201
    /// return the created or updated item as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SharePointError::PayloadTooLarge`] above 4 MiB,
    /// [`SharePointError::MissingUploadTarget`] for empty ids, and the
    /// status-mapped error for any other status.
    #[instrument(skip(self, data), fields(bytes = data.len()))]
    pub async fn upload_file(
        &mut self,
        drive_id: &str,
        data: Vec<u8>,
        target: &UploadTarget,
    ) -> Result<Value, SharePointError> {
        if data.len() > SIMPLE_UPLOAD_MAX_BYTES {
            return Err(SharePointError::PayloadTooLarge {
                size: data.len(),
                limit: SIMPLE_UPLOAD_MAX_BYTES,
            });
        }
        let url = self.graph_url(&target.content_path(drive_id)?);

        loop {
            let sent = self
                .client
                .put(&url)
                .bearer_auth(self.access_token())
                .header(CONTENT_TYPE, "text/plain")
                .body(data.clone())
                .send()
                .await;

            let response = match sent {
                Ok(response) => response,
                Err(e) => {
                    error!(url = %url, error = %e, "connection error, trying to reconnect");
                    self.renew_access_token().await?;
                    continue;
                }
            };

            match response.status().as_u16() {
                200 | 201 => match response.bytes().await {
                    Ok(body) => {
                        info!("upload accepted");
                        return decode_json(&body, &url);
                    }
                    Err(e) => {
                        error!(
                            url = %url,
                            error = %e,
                            "connection dropped while reading body, trying to reconnect"
                        );
                        self.renew_access_token().await?;
                    }
                },
                401 => {
                    error!(status = 401, "upload rejected, trying to renew access token");
                    self.renew_access_token().await?;
                }
                status => {
                    error!(status, "upload failed");
                    let body = response.text().await.unwrap_or_default();
                    return Err(SharePointError::from_status(&url, status, body));
                }
            }
        }
    }
}

/// Writes the response body in fixed-size chunks, returning bytes written.
async fn stream_in_chunks(
    file: File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
    progress: &ProgressBar,
) -> Result<u64, SharePointError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| SharePointError::network(url, e))?;
        for piece in chunk.chunks(DOWNLOAD_CHUNK_SIZE) {
            writer
                .write_all(piece)
                .await
                .map_err(|e| SharePointError::io(file_path, e))?;
            bytes_written += piece.len() as u64;
            progress.set_position(bytes_written / DOWNLOAD_CHUNK_SIZE as u64);
        }
    }

    writer
        .flush()
        .await
        .map_err(|e| SharePointError::io(file_path, e))?;

    Ok(bytes_written)
}
