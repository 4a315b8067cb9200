//! Crash archive naming and deduplication.

use tempfile::TempDir;
use ubx_fuzz::campaign::{artifact_id, CrashArchiver};
use ubx_fuzz::constants::{UBX_ACK_ACK, UBX_ACK_NAK};

fn file_count(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn test_archive_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let archiver = CrashArchiver::new(dir.path()).unwrap();

    let first = archiver.archive(&UBX_ACK_ACK).await.unwrap();
    let second = archiver.archive(&UBX_ACK_ACK).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.path, second.path);
    assert!(first.newly_written);
    assert!(!second.newly_written);
    assert_eq!(file_count(dir.path()), 1);
    assert_eq!(std::fs::read(&first.path).unwrap(), UBX_ACK_ACK);
}

#[tokio::test]
async fn test_distinct_content_distinct_names() {
    let dir = TempDir::new().unwrap();
    let archiver = CrashArchiver::new(dir.path()).unwrap();

    // ACK-ACK and ACK-NAK differ in three bytes only.
    let ack = archiver.archive(&UBX_ACK_ACK).await.unwrap();
    let nak = archiver.archive(&UBX_ACK_NAK).await.unwrap();

    assert_ne!(ack.path, nak.path);
    assert_eq!(file_count(dir.path()), 2);
}

#[tokio::test]
async fn test_empty_input_is_archived() {
    let dir = TempDir::new().unwrap();
    let archiver = CrashArchiver::new(dir.path()).unwrap();

    let artifact = archiver.archive(&[]).await.unwrap();
    assert_eq!(
        artifact.path.file_name().unwrap().to_str().unwrap(),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855.crash"
    );
    assert!(std::fs::read(&artifact.path).unwrap().is_empty());
}

#[test]
fn test_artifact_id_is_lowercase_sha256_hex() {
    let id = artifact_id(b"abc");
    assert_eq!(
        id,
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_eq!(id.len(), 64);
}
