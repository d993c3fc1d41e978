use std::path::{Path, PathBuf};

use futures_util::stream::StreamExt;
use reqwest::{Client, StatusCode};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};

use self::progress::ProgressSender;

pub mod progress;

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with {status}")]
    Status { url: String, status: StatusCode },

    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{url}: received {actual} bytes but the server announced {expected}")]
    Incomplete {
        url: String,
        expected: u64,
        actual: u64,
    },

    #[error("{url}: received {actual} bytes, declared size is {declared}")]
    SizeMismatch {
        url: String,
        declared: u64,
        actual: u64,
    },
}

/// Byte counts of a running transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub downloaded: u64,
    /// `Content-Length` when the server sent one, the declared size otherwise.
    pub expected: Option<u64>,
}

/// Stream `url` into `path` and return the number of bytes written.
///
/// `declared_size` is only used for progress reporting when the response has no
/// `Content-Length`. A response shorter or longer than its `Content-Length` is an error.
pub async fn download_file(
    client: &Client,
    url: &str,
    path: &Path,
    declared_size: Option<u64>,
    sender: &dyn ProgressSender<TransferProgress>,
) -> Result<u64, DownloadError> {
    let io_error = |source: std::io::Error| DownloadError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await.map_err(io_error)?;
    }

    let res = client
        .get(url)
        .send()
        .await
        .map_err(|source| DownloadError::Request {
            url: url.to_owned(),
            source,
        })?;

    let status = res.status();
    if !status.is_success() {
        error!("{url} responded with {status}");
        return Err(DownloadError::Status {
            url: url.to_owned(),
            status,
        });
    }

    let content_length = res.content_length();
    let expected = content_length.or(declared_size);

    let mut file = tokio::fs::File::create(path).await.map_err(|err| {
        error!(
            "Error occurred during file creating\nPath: {}\nError: {}",
            path.to_string_lossy(),
            err
        );
        io_error(err)
    })?;

    let mut downloaded = 0u64;
    let mut stream = res.bytes_stream();

    while let Some(item) = stream.next().await {
        let chunk = item.map_err(|source| {
            error!("Error occurred during file downloading\nError: {}", source);
            DownloadError::Request {
                url: url.to_owned(),
                source,
            }
        })?;

        file.write_all(&chunk).await.map_err(|err| {
            error!("Error occurred during writing to file\nError: {}", err);
            io_error(err)
        })?;

        downloaded += chunk.len() as u64;
        sender
            .update(TransferProgress {
                downloaded,
                expected,
            })
            .await;
    }

    file.flush().await.map_err(io_error)?;

    if let Some(expected) = content_length {
        if expected != downloaded {
            return Err(DownloadError::Incomplete {
                url: url.to_owned(),
                expected,
                actual: downloaded,
            });
        }
    }

    debug!("Downloaded successfully {}", path.to_string_lossy());

    Ok(downloaded)
}
