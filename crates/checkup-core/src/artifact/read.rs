use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::CheckupError;

/// Build artifact loaded for upload.
///
/// Holds the exact bytes sent to the service and a fingerprint that shows
/// up in the workflow log, so a run can be matched to the binary it shipped.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub path: PathBuf,

    /// Exact bytes read from disk.
    pub bytes: Vec<u8>,

    pub size_bytes: u64,

    /// Hex-encoded SHA-256 of `bytes`.
    pub sha256: String,
}

impl Artifact {
    pub fn summary(&self) -> String {
        format!(
            "{} ({} bytes, sha256 {})",
            self.path.display(),
            self.size_bytes,
            self.sha256
        )
    }
}

/// Read the full artifact into memory.
///
/// A missing file is reported as `ArtifactNotFound`; any other I/O failure
/// keeps its source error.
pub async fn read_artifact(path: &Path) -> Result<Artifact, CheckupError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            CheckupError::ArtifactNotFound(path.to_path_buf())
        } else {
            CheckupError::ArtifactRead {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let digest = Sha256::digest(&bytes);

    Ok(Artifact {
        path: path.to_path_buf(),
        size_bytes: bytes.len() as u64,
        bytes,
        sha256: hex::encode(digest),
    })
}
