//! # Corpus Directory
//!
//! Every regular file in the corpus directory is one candidate input, sent to
//! the device byte for byte. Entries are visited in filename order so that a
//! rerun over the same corpus replays the same sequence.

use crate::error::FuzzError;
use crate::logging::log_debug;
use std::path::{Path, PathBuf};

/// One corpus file. Its contents are loaded on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    pub name: String,
    pub path: PathBuf,
}

/// A loaded candidate input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusItem {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl CorpusEntry {
    pub async fn load(&self) -> Result<CorpusItem, FuzzError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| FuzzError::IoFailure(format!("{}: {e}", self.path.display())))?;
        Ok(CorpusItem {
            name: self.name.clone(),
            bytes,
        })
    }
}

/// Handle on an existing corpus directory.
#[derive(Debug, Clone)]
pub struct Corpus {
    dir: PathBuf,
}

impl Corpus {
    /// Binds to `dir`, which must already exist.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, FuzzError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(FuzzError::ConfigurationError(format!(
                "Corpus directory {} does not exist",
                dir.display()
            )));
        }
        Ok(Corpus { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Lists the regular files in the corpus, sorted by name.
    ///
    /// Symlinks to files count as files. Entries that vanish between listing
    /// and inspection, and dangling symlinks, are skipped.
    pub async fn entries(&self) -> Result<Vec<CorpusEntry>, FuzzError> {
        let dir_err =
            |e: std::io::Error| FuzzError::IoFailure(format!("{}: {e}", self.dir.display()));

        let mut read_dir = tokio::fs::read_dir(&self.dir).await.map_err(dir_err)?;
        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await.map_err(dir_err)? {
            let path = entry.path();
            let metadata = match tokio::fs::metadata(&path).await {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    log_debug(&format!("skipping {}: {e}", path.display()));
                    continue;
                }
                Err(e) => return Err(FuzzError::IoFailure(format!("{}: {e}", path.display()))),
            };
            if !metadata.is_file() {
                continue;
            }
            entries.push(CorpusEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_corpus() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Corpus::open(dir.path().join("corpus")),
            Err(FuzzError::ConfigurationError(_))
        ));
    }

    #[tokio::test]
    async fn test_entries_sorted_and_files_only() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.bin"), [0x02u8]).unwrap();
        std::fs::write(dir.path().join("a.bin"), [0x01u8]).unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let corpus = Corpus::open(dir.path()).unwrap();
        let entries = corpus.entries().await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.bin", "b.bin"]);

        let item = entries[1].load().await.unwrap();
        assert_eq!(item.bytes, vec![0x02]);
    }

    #[tokio::test]
    async fn test_empty_file_is_an_input() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("empty"), b"").unwrap();

        let entries = Corpus::open(dir.path()).unwrap().entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].load().await.unwrap().bytes.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dangling_symlink_is_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.bin"), [0x01u8]).unwrap();
        std::fs::write(dir.path().join("c.bin"), [0x03u8]).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("b.link")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("c.bin"), dir.path().join("d.link")).unwrap();

        let entries = Corpus::open(dir.path()).unwrap().entries().await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.bin", "c.bin", "d.link"]);
    }
}
