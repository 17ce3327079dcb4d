//! Media download with skip-if-exists semantics.
//!
//! Files are streamed to `<name>.part` and renamed into place once fully
//! written, so an interrupted download never looks finished.

mod dedupe;

pub use dedupe::{dedupe, file_name_key};

use crate::error::{HarkError, Result};
use futures::StreamExt;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

const PARTIAL_SUFFIX: &str = ".part";

/// Result of fetching a media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    /// The file was already on disk.
    Cached(PathBuf),
    /// The file was downloaded now.
    Downloaded { path: PathBuf, bytes: u64 },
}

impl Fetched {
    pub fn path(&self) -> &Path {
        match self {
            Fetched::Cached(path) => path,
            Fetched::Downloaded { path, .. } => path,
        }
    }
}

/// Streams remote media into a download directory.
pub struct Downloader {
    client: reqwest::Client,
    dir: PathBuf,
}

impl Downloader {
    /// Create a downloader writing into `dir` (created if missing).
    pub fn new(client: reqwest::Client, dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { client, dir })
    }

    /// The download directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Names of completed files in the download directory.
    pub fn existing_files(&self) -> Result<HashSet<String>> {
        let mut names = HashSet::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(PARTIAL_SUFFIX) {
                names.insert(name);
            }
        }
        Ok(names)
    }

    /// Local path a media file with the given name is stored at.
    pub fn target_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Fetch `url` into the download directory unless it is already there.
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<Fetched> {
        let file_name = local_file_name(url)?;
        let target = self.target_path(file_name);

        if target.exists() {
            debug!("Using existing file {:?}", target);
            return Ok(Fetched::Cached(target));
        }

        let partial = partial_path(&target);
        match self.stream_to(url, &partial).await {
            Ok(bytes) => {
                tokio::fs::rename(&partial, &target).await.map_err(|e| {
                    HarkError::download(url, format!("could not move download into place: {}", e))
                })?;
                info!("Downloaded {} ({} bytes)", file_name, bytes);
                Ok(Fetched::Downloaded { path: target, bytes })
            }
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                    if cleanup.kind() != std::io::ErrorKind::NotFound {
                        warn!("Failed to remove partial download {:?}: {}", partial, cleanup);
                    }
                }
                Err(e)
            }
        }
    }

    async fn stream_to(&self, url: &str, partial: &Path) -> Result<u64> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HarkError::download(url, describe_request_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarkError::download(url, format!("server returned {}", status)));
        }

        let mut file = tokio::fs::File::create(partial).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| HarkError::download(url, describe_request_error(&e)))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        file.sync_all().await?;

        Ok(written)
    }
}

/// The filename a URL is stored under locally.
///
/// Rejects keys that cannot name a file inside the download directory.
pub fn local_file_name(url: &str) -> Result<&str> {
    let name = file_name_key(url);
    if name.is_empty() || name == "." || name == ".." || name.contains('\\') || name.contains('\0') {
        return Err(HarkError::download(url, "URL does not end in a usable filename"));
    }
    Ok(name)
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(PARTIAL_SUFFIX);
    target.with_file_name(name)
}

fn describe_request_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("timed out: {}", err)
    } else {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_downloads_and_then_skips() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/video/talk.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fake video bytes".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::new(reqwest::Client::new(), dir.path()).unwrap();
        let url = format!("{}/video/talk.mp4", server.uri());

        let first = downloader.fetch(&url).await.unwrap();
        assert!(matches!(first, Fetched::Downloaded { bytes: 16, .. }));
        assert_eq!(std::fs::read(first.path()).unwrap(), b"fake video bytes");

        let second = downloader.fetch(&url).await.unwrap();
        assert!(matches!(second, Fetched::Cached(_)));

        let existing = downloader.existing_files().unwrap();
        assert!(existing.contains("talk.mp4"));
        assert!(!dir.path().join("talk.mp4.part").exists());
    }

    #[tokio::test]
    async fn test_not_found_is_download_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::new(reqwest::Client::new(), dir.path()).unwrap();
        let url = format!("{}/missing.mp4", server.uri());

        let err = downloader.fetch(&url).await.unwrap_err();
        assert!(matches!(err, HarkError::DownloadFailed { ref reason, .. } if reason.contains("404")));
        assert!(!dir.path().join("missing.mp4").exists());
        assert!(!dir.path().join("missing.mp4.part").exists());
    }

    #[tokio::test]
    async fn test_stale_partial_file_is_not_a_download() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"complete".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("clip.mp4.part"), b"half").unwrap();

        let downloader = Downloader::new(reqwest::Client::new(), dir.path()).unwrap();
        assert!(downloader.existing_files().unwrap().is_empty());

        let fetched = downloader.fetch(&format!("{}/clip.mp4", server.uri())).await.unwrap();
        assert!(matches!(fetched, Fetched::Downloaded { .. }));
        assert_eq!(std::fs::read(dir.path().join("clip.mp4")).unwrap(), b"complete");
    }

    #[test]
    fn test_rejects_unusable_names() {
        assert!(local_file_name("https://host/dir/").is_err());
        assert!(local_file_name("https://host/..").is_err());
        assert_eq!(local_file_name("https://host/a/b.mp4").unwrap(), "b.mp4");
    }

    #[test]
    fn test_partial_path_appends_suffix() {
        let p = partial_path(Path::new("/tmp/x/video.mp4"));
        assert_eq!(p, PathBuf::from("/tmp/x/video.mp4.part"));
    }
}
