//! Fetching and unpacking host build archives.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use flate2::read::GzDecoder;
use tracing::debug;

use super::error::AcquisitionError;
use super::platform::ArchiveKind;

const ARCHIVE_TARGET: &str = "joyride_harness::host::archive";
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Streams a remote archive into a local sink.
pub trait ArchiveFetcher {
    /// Writes the body served at `url` into `sink`, returning the byte count.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError`] on transport, status or write failures.
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> Result<u64, AcquisitionError>;
}

impl<T: ArchiveFetcher + ?Sized> ArchiveFetcher for &T {
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> Result<u64, AcquisitionError> {
        (**self).fetch(url, sink)
    }
}

/// Blocking HTTPS fetcher backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Builds a fetcher with a harness user agent and a generous timeout.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::Client`] when the TLS backend cannot be
    /// initialised.
    pub fn new() -> Result<Self, AcquisitionError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("joyride-test/", env!("CARGO_PKG_VERSION")))
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(|source| AcquisitionError::Client { source })?;
        Ok(Self { client })
    }
}

impl ArchiveFetcher for HttpFetcher {
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> Result<u64, AcquisitionError> {
        let download_error = |source: reqwest::Error| AcquisitionError::Download {
            url: url.to_owned(),
            source,
        };
        let mut response = self
            .client
            .get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(download_error)?;
        let bytes = response.copy_to(sink).map_err(download_error)?;
        debug!(target: ARCHIVE_TARGET, url, bytes, "archive downloaded");
        Ok(bytes)
    }
}

/// Unpacks `archive` into `destination`, which must already exist.
///
/// # Errors
///
/// Returns [`AcquisitionError`] when the archive cannot be opened or decoded.
pub fn unpack(
    archive: &Path,
    kind: ArchiveKind,
    destination: &Path,
) -> Result<(), AcquisitionError> {
    let file = File::open(archive).map_err(|source| AcquisitionError::OpenArchive {
        path: archive.to_path_buf(),
        source,
    })?;
    match kind {
        ArchiveKind::TarGz => {
            let mut tarball = tar::Archive::new(GzDecoder::new(file));
            tarball.set_preserve_permissions(true);
            tarball
                .unpack(destination)
                .map_err(|source| AcquisitionError::UnpackTar {
                    path: archive.to_path_buf(),
                    source,
                })
        }
        ArchiveKind::Zip => zip::ZipArchive::new(file)
            .and_then(|mut zipped| zipped.extract(destination))
            .map_err(|source| AcquisitionError::UnpackZip {
                path: archive.to_path_buf(),
                source,
            }),
    }
}

/// Writes the fetched archive to `path`, flushing before returning.
pub(crate) fn download_to(
    fetcher: &dyn ArchiveFetcher,
    url: &str,
    path: &Path,
) -> Result<u64, AcquisitionError> {
    let write_error = |source: io::Error| AcquisitionError::WriteArchive {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::create(path).map_err(write_error)?;
    let bytes = fetcher.fetch(url, &mut file)?;
    file.flush().map_err(write_error)?;
    Ok(bytes)
}
