//! Hashing utilities for download integrity checks.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256, Sha512};

/// Digest algorithms accepted in bundled download metadata, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha512,
    Sha256,
}

impl HashAlgorithm {
    /// All supported algorithms in preference order.
    pub const ALL: [HashAlgorithm; 2] = [HashAlgorithm::Sha512, HashAlgorithm::Sha256];

    /// Key used for this algorithm in metadata files.
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha512 => "sha512",
            HashAlgorithm::Sha256 => "sha256",
        }
    }

    /// Hash a byte slice, returning lowercase hex.
    pub fn digest_bytes(&self, data: &[u8]) -> String {
        match self {
            HashAlgorithm::Sha512 => hex::encode(Sha512::digest(data)),
            HashAlgorithm::Sha256 => hex::encode(Sha256::digest(data)),
        }
    }

    /// Hash a file, returning lowercase hex.
    pub fn digest_file(&self, path: &Path) -> Result<String> {
        match self {
            HashAlgorithm::Sha512 => digest_file_with::<Sha512>(path),
            HashAlgorithm::Sha256 => digest_file_with::<Sha256>(path),
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute SHA256 hash of a byte slice.
pub fn sha256_bytes(data: &[u8]) -> String {
    HashAlgorithm::Sha256.digest_bytes(data)
}

/// Compute SHA256 hash of a file.
pub fn sha256_file(path: &Path) -> Result<String> {
    HashAlgorithm::Sha256.digest_file(path)
}

fn digest_file_with<D: Digest>(path: &Path) -> Result<String> {
    let file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut reader = BufReader::new(file);
    let mut hasher = D::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sha256_bytes() {
        assert_eq!(
            sha256_bytes(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_sha256_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.txt");
        std::fs::write(&path, "hello").unwrap();

        let hash = sha256_file(&path).unwrap();
        assert_eq!(
            hash,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_file_and_bytes_agree_for_sha512() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("blob.bin");
        let data = vec![7u8; 20_000];
        std::fs::write(&path, &data).unwrap();

        assert_eq!(
            HashAlgorithm::Sha512.digest_file(&path).unwrap(),
            HashAlgorithm::Sha512.digest_bytes(&data)
        );
    }
}
