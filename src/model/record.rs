//! Core record types supplied by the scanning layer.
//!
//! A [`FileRecord`] is one scanned photo: an identifier, a reference to the
//! [`RootDirectory`] it was discovered under, a forward-slash relative path,
//! a 32-byte content digest, its size, and an optional capture timestamp.
//! Records are immutable with respect to their hash once set; all derived
//! structures in [`crate::analysis`] are pure functions of the record set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 32-byte content digest of a file's bytes.
///
/// The digest algorithm belongs to the scanning layer; this core only relies
/// on equality ("identical digest" is a proxy for "identical content").
pub type Hash = [u8; 32];

/// Convert a content hash to a lowercase hexadecimal string.
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    let mut hex = String::with_capacity(64);
    for byte in hash {
        use std::fmt::Write;
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

/// Stable identifier of a [`FileRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

/// Identifier of a [`RootDirectory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RootId(pub u64);

/// A top-level tracked folder; all record paths are relative to exactly one root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootDirectory {
    /// Root identifier.
    pub id: RootId,
    /// Absolute path, forward-slash separated, no trailing slash.
    pub path: String,
    /// Display name shown by the UI layer.
    pub display_name: String,
    /// Opaque access-capability token, interpreted only by the filesystem
    /// collaborator. Carried verbatim, never inspected here.
    pub access_token: String,
}

impl RootDirectory {
    /// Create a new root directory. A trailing slash on `path` is stripped so
    /// joined paths stay canonical.
    #[must_use]
    pub fn new(id: RootId, path: impl Into<String>, display_name: impl Into<String>) -> Self {
        let mut path = path.into();
        while path.len() > 1 && path.ends_with('/') {
            path.pop();
        }
        Self {
            id,
            path,
            display_name: display_name.into(),
            access_token: String::new(),
        }
    }

    /// Attach an opaque access token.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = token.into();
        self
    }
}

/// One scanned photo record.
///
/// Identity on disk is `(root, relative_path)`; the content hash is shared
/// across duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Stable record identifier.
    pub id: RecordId,
    /// Root directory this record was discovered under.
    pub root: RootId,
    /// Path relative to the root, forward-slash separated.
    pub relative_path: String,
    /// 32-byte content digest.
    pub hash: Hash,
    /// Size in bytes.
    pub size: u64,
    /// Optional capture timestamp extracted by the scanning layer.
    pub captured: Option<DateTime<Utc>>,
}

impl FileRecord {
    /// Create a new record without a capture timestamp.
    #[must_use]
    pub fn new(
        id: RecordId,
        root: RootId,
        relative_path: impl Into<String>,
        hash: Hash,
        size: u64,
    ) -> Self {
        Self {
            id,
            root,
            relative_path: relative_path.into(),
            hash,
            size,
            captured: None,
        }
    }

    /// Set the capture timestamp.
    #[must_use]
    pub fn with_captured(mut self, captured: DateTime<Utc>) -> Self {
        self.captured = Some(captured);
        self
    }

    /// File name component of the relative path.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }

    /// Directory component of the relative path, empty for records directly
    /// under their root.
    #[must_use]
    pub fn relative_dir(&self) -> &str {
        match self.relative_path.rfind('/') {
            Some(idx) => &self.relative_path[..idx],
            None => "",
        }
    }

    /// Content hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }
}
