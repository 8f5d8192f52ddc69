use serde::{Deserialize, Serialize};

/// Represents a source location identified by file path and line number.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Location {
    /// The file path as reported upstream, possibly with directories.
    pub file: String,
    /// The line number within the file.
    pub line: u32,
}

impl Location {
    /// Creates a new location.
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Returns the final path segment of the file, accepting either `/` or
    /// `\` as a separator.
    pub fn file_name(&self) -> &str {
        match self.file.rfind(['/', '\\']) {
            Some(idx) => &self.file[idx + 1..],
            None => &self.file,
        }
    }
}
