//! # Crash Archive
//!
//! Content-addressed storage for inputs (and responses) that made the device
//! misbehave. Each artifact is named `<hex sha256>.crash`, so writing the
//! same bytes twice leaves exactly one file.

use crate::constants::CRASH_FILE_SUFFIX;
use crate::error::FuzzError;
use crate::logging::log_warn;
use crate::util::hex::encode_hex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A persisted crash artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashArtifact {
    /// Hex SHA-256 digest of the content.
    pub id: String,
    pub path: PathBuf,
    /// False when an artifact with this content already existed.
    pub newly_written: bool,
}

/// Writes crash artifacts into a pre-existing directory.
#[derive(Debug, Clone)]
pub struct CrashArchiver {
    dir: PathBuf,
}

/// Hex SHA-256 of `bytes`, the identity of an artifact.
pub fn artifact_id(bytes: &[u8]) -> String {
    encode_hex(&Sha256::digest(bytes))
}

impl CrashArchiver {
    /// Binds the archiver to `dir`, which must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, FuzzError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(FuzzError::ConfigurationError(format!(
                "Crashes directory {} does not exist",
                dir.display()
            )));
        }
        Ok(CrashArchiver { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an artifact with this content is (or would be) stored at.
    pub fn artifact_path(&self, bytes: &[u8]) -> PathBuf {
        self.dir
            .join(format!("{}{}", artifact_id(bytes), CRASH_FILE_SUFFIX))
    }

    /// Stores `bytes` under its content hash. An existing artifact with the
    /// same name and size is left as is; one with the wrong size (a write cut
    /// short by an earlier run) is replaced.
    ///
    /// The content is written to a temporary file in the archive directory
    /// and renamed into place, so `<sha256>.crash` only ever holds complete
    /// content.
    pub async fn archive(&self, bytes: &[u8]) -> Result<CrashArtifact, FuzzError> {
        let id = artifact_id(bytes);
        let path = self.dir.join(format!("{id}{CRASH_FILE_SUFFIX}"));
        let io_err =
            |e: std::io::Error| FuzzError::IoFailure(format!("{}: {e}", path.display()));

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.len() == bytes.len() as u64 => {
                return Ok(CrashArtifact {
                    id,
                    path,
                    newly_written: false,
                });
            }
            Ok(meta) => log_warn(&format!(
                "replacing truncated crash artifact {} ({} of {} bytes)",
                path.display(),
                meta.len(),
                bytes.len()
            )),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_err(e)),
        }

        let dir = self.dir.clone();
        let target = path.clone();
        let content = bytes.to_vec();
        tokio::task::spawn_blocking(move || write_atomically(&dir, &target, &content))
            .await
            .map_err(|e| FuzzError::IoFailure(format!("{}: {e}", path.display())))?
            .map_err(io_err)?;
        log_warn(&format!("wrote crash artifact {}", path.display()));

        Ok(CrashArtifact {
            id,
            path,
            newly_written: true,
        })
    }
}

/// Writes `content` to a temporary file in `dir` and renames it onto `target`.
/// The temporary file is removed if anything fails before the rename.
fn write_atomically(dir: &Path, target: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".partial-")
        .tempfile_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_artifact_id_known_digest() {
        assert_eq!(
            artifact_id(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_missing_directory_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("crashes");
        assert!(matches!(
            CrashArchiver::new(&missing),
            Err(FuzzError::ConfigurationError(_))
        ));
    }

    #[tokio::test]
    async fn test_archive_writes_named_file() {
        let dir = TempDir::new().unwrap();
        let archiver = CrashArchiver::new(dir.path()).unwrap();

        let artifact = archiver.archive(&[0xB5, 0x62, 0x06, 0x8A]).await.unwrap();
        assert!(artifact.newly_written);
        assert_eq!(artifact.path, archiver.artifact_path(&[0xB5, 0x62, 0x06, 0x8A]));
        assert!(artifact
            .path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with(".crash"));
        assert_eq!(
            std::fs::read(&artifact.path).unwrap(),
            vec![0xB5, 0x62, 0x06, 0x8A]
        );
    }

    #[tokio::test]
    async fn test_archive_removed_directory_is_io_failure() {
        let dir = TempDir::new().unwrap();
        let crashes = dir.path().join("crashes");
        std::fs::create_dir(&crashes).unwrap();
        let archiver = CrashArchiver::new(&crashes).unwrap();
        std::fs::remove_dir(&crashes).unwrap();

        assert!(matches!(
            archiver.archive(b"input").await,
            Err(FuzzError::IoFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_truncated_artifact_is_replaced() {
        let dir = TempDir::new().unwrap();
        let archiver = CrashArchiver::new(dir.path()).unwrap();
        let input = [0xB5, 0x62, 0x06, 0x8A, 0x09, 0x00];

        // Left behind by a run killed mid-write.
        let path = archiver.artifact_path(&input);
        std::fs::write(&path, &input[..2]).unwrap();

        let artifact = archiver.archive(&input).await.unwrap();
        assert!(artifact.newly_written);
        assert_eq!(std::fs::read(&path).unwrap(), input);

        let again = archiver.archive(&input).await.unwrap();
        assert!(!again.newly_written);
    }

    #[tokio::test]
    async fn test_no_temporary_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let archiver = CrashArchiver::new(dir.path()).unwrap();

        archiver.archive(b"first").await.unwrap();
        archiver.archive(b"second").await.unwrap();
        archiver.archive(b"first").await.unwrap();

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        let mut expected = vec![
            format!("{}.crash", artifact_id(b"first")),
            format!("{}.crash", artifact_id(b"second")),
        ];
        expected.sort();
        assert_eq!(names, expected);
    }
}
