//! Content-integrity fingerprinting.

use sha2::{Digest, Sha256};

/// Algorithm name recorded alongside every fingerprint.
pub const FINGERPRINT_ALGORITHM: &str = "sha256";

/// Compute the content fingerprint: lowercase hex SHA-256 over the decoded
/// (post-decompression) bytes.
pub fn fingerprint(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
