//! SHA-256 content hashes
//!
//! Publish records store the hash of the content last sent to a target
//! (`sha256:<hex>`), which lets callers tell whether a document changed
//! since it was published without asking the remote.

use sha2::{Digest, Sha256};

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of document content.
///
/// Line endings are normalized to `\n` first so a document re-saved on
/// another platform is not reported as changed.
pub fn compute_content_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    if content.contains("\r\n") {
        hasher.update(content.replace("\r\n", "\n").as_bytes());
    } else {
        hasher.update(content.as_bytes());
    }
    format!("{}{:x}", PREFIX, hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_checksum_has_prefix() {
        let checksum = compute_content_checksum("# Title");
        assert!(checksum.starts_with("sha256:"));
    }

    #[test]
    fn content_checksum_known_value() {
        let checksum = compute_content_checksum("hello world");
        assert_eq!(
            checksum,
            "sha256:b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn crlf_and_lf_hash_the_same() {
        assert_eq!(
            compute_content_checksum("a\r\nb\r\n"),
            compute_content_checksum("a\nb\n")
        );
    }

    #[test]
    fn different_content_different_checksum() {
        assert_ne!(
            compute_content_checksum("draft"),
            compute_content_checksum("final")
        );
    }
}
