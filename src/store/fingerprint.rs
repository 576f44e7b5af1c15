//! Content Fingerprinting
//!
//! SHA-256 fingerprints over file text, plus the stable snippet identifier
//! derived from (path, line range). Files that cannot be read as UTF-8
//! (missing, permission denied, binary) yield a null fingerprint; a null
//! is never considered "changed" relative to a previous null.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::constants::store::SNIPPET_ID_LEN;

/// SHA-256 hex digest of a file's text content; None if unreadable
pub fn file_fingerprint(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    Some(digest_hex(content.as_bytes()))
}

/// Stable identifier for a tracked (path, line range) pair
pub fn snippet_id(path: &str, lines: [u32; 2]) -> String {
    let seed = format!("{}:{}-{}", path, lines[0], lines[1]);
    let mut id = digest_hex(seed.as_bytes());
    id.truncate(SNIPPET_ID_LEN);
    id
}

/// Line count of a file, 0 when unreadable
pub fn line_count(path: &Path) -> u32 {
    std::fs::read_to_string(path)
        .map(|content| content.split('\n').count() as u32)
        .unwrap_or(0)
}

fn digest_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
