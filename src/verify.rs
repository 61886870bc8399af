use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;

use crate::error::{FetchError, Result};

/// Checks `file_path` against `expected_hash` and returns the computed digest.
pub fn verify_sha256(file_path: &Path, expected_hash: &str) -> Result<String> {
    log::info!("Verifying SHA256 for {:?}", file_path);

    let expected = expected_hash.trim();
    let actual = compute_sha256(file_path)?;

    if !actual.eq_ignore_ascii_case(expected) {
        log::warn!("SHA256 mismatch: expected {}, got {}", expected, actual);
        return Err(FetchError::ChecksumMismatch {
            expected: expected.to_ascii_lowercase(),
            actual,
        });
    }

    log::info!("SHA256 verified: {}", actual);
    Ok(actual)
}

/// Hashes the file in a streaming pass; model weights do not fit comfortably in memory.
pub fn compute_sha256(file_path: &Path) -> Result<String> {
    let mut file = fs::File::open(file_path)
        .map_err(|e| FetchError::io("Failed to open file for hash computation", e))?;

    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .map_err(|e| FetchError::io("Failed to read file for hash computation", e))?;

    Ok(hex::encode(hasher.finalize()))
}

/// Post-download check of the destination. Returns the file size.
pub fn check_destination(path: &Path, expected_size: Option<u64>) -> Result<u64> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => metadata,
        Ok(_) => return Err(FetchError::Missing(path.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(FetchError::Missing(path.to_path_buf()))
        }
        Err(e) => return Err(FetchError::io("Failed to stat destination file", e)),
    };

    check_length(path, metadata.len(), expected_size)
}

/// Rejects an empty body, or one whose length differs from `expected_size`.
/// `path` is only used in the error.
pub fn check_length(path: &Path, actual: u64, expected_size: Option<u64>) -> Result<u64> {
    if actual == 0 {
        return Err(FetchError::Empty(path.to_path_buf()));
    }

    match expected_size {
        Some(expected) if expected != actual => Err(FetchError::SizeMismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        }),
        _ => Ok(actual),
    }
}

pub fn is_sha256_hex(value: &str) -> bool {
    value.len() == 64 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    // sha256("hello world")
    const HELLO_SHA: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    fn write_file(dir: &Path, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn computes_known_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "a.bin", b"hello world");
        assert_eq!(compute_sha256(&path).unwrap(), HELLO_SHA);
    }

    #[test]
    fn verify_ignores_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "a.bin", b"hello world");
        assert_eq!(verify_sha256(&path, &HELLO_SHA.to_uppercase()).unwrap(), HELLO_SHA);
    }

    #[test]
    fn mismatch_reports_both_digests() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "a.bin", b"hello world");

        match verify_sha256(&path, &"0".repeat(64)).unwrap_err() {
            FetchError::ChecksumMismatch { expected, actual } => {
                assert_eq!(expected, "0".repeat(64));
                assert_eq!(actual, HELLO_SHA);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn length_check_needs_no_file() {
        let path = Path::new("models/m.gguf");
        assert_eq!(check_length(path, 5, None).unwrap(), 5);
        assert!(matches!(check_length(path, 0, None), Err(FetchError::Empty(_))));
        assert!(matches!(
            check_length(path, 5, Some(6)),
            Err(FetchError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = check_destination(&dir.path().join("nope.gguf"), None).unwrap_err();
        assert!(matches!(err, FetchError::Missing(_)));
    }

    #[test]
    fn directory_is_not_a_destination() {
        let dir = tempfile::tempdir().unwrap();
        let err = check_destination(dir.path(), None).unwrap_err();
        assert!(matches!(err, FetchError::Missing(_)));
    }

    #[test]
    fn empty_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "empty.gguf", b"");
        assert!(matches!(
            check_destination(&path, None).unwrap_err(),
            FetchError::Empty(_)
        ));
    }

    #[test]
    fn size_is_checked_when_known() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "m.gguf", b"0123456789");
        assert_eq!(check_destination(&path, Some(10)).unwrap(), 10);

        match check_destination(&path, Some(11)).unwrap_err() {
            FetchError::SizeMismatch { expected, actual, .. } => {
                assert_eq!((expected, actual), (11, 10));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn recognises_hex_digests() {
        assert!(is_sha256_hex(HELLO_SHA));
        assert!(is_sha256_hex(&HELLO_SHA.to_uppercase()));
        assert!(!is_sha256_hex("abc"));
        assert!(!is_sha256_hex(&"g".repeat(64)));
    }
}
