//! Client-supplied blob names
//!
//! Only the final path component of a name is kept, so nothing a client
//! sends can address a file outside the storage root.

use std::fmt;
use std::path;

/// A filename reduced to its last path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobName {
    name: String,
    utf8: bool,
}

impl BlobName {
    /// Strip all directory components from `raw`.
    ///
    /// Separators are the platform's own (`/` on Unix, `/` and `\` on
    /// Windows) and trailing separators are ignored, so `dir/file/` becomes
    /// `file`. The result can still be unusable (`""`, `.` or `..`);
    /// backends reject those when touched.
    pub fn sanitize(raw: &str) -> Self {
        let trimmed = raw.trim_end_matches(path::is_separator);
        let base = match trimmed.rfind(path::is_separator) {
            Some(pos) => &trimmed[pos + 1..],
            None => trimmed,
        };
        Self {
            name: base.to_string(),
            utf8: true,
        }
    }

    /// Sanitize a name taken straight off the wire.
    ///
    /// A name that is not UTF-8 is kept only for display and is never
    /// usable, so two distinct byte sequences cannot collapse into the
    /// same stored file.
    pub fn from_bytes(raw: &[u8]) -> Self {
        match std::str::from_utf8(raw) {
            Ok(raw) => Self::sanitize(raw),
            Err(_) => Self {
                name: String::from_utf8_lossy(raw).into_owned(),
                utf8: false,
            },
        }
    }

    /// Whether the name can be used as a file in the storage root
    pub fn is_valid(&self) -> bool {
        self.utf8 && !matches!(self.name.as_str(), "" | "." | "..")
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for BlobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
