//! Source locations of test declarations.

use std::fmt;
use std::panic::Location;

/// File and line where a test case or suite was declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Render the location the way report lines show it: `./<file>:<line>`.
    ///
    /// ## Notes
    /// - Absolute paths and paths already starting with `./` are not prefixed again.
    pub fn display_path(&self) -> String {
        if self.file.starts_with('/') || self.file.starts_with("./") {
            format!("{}:{}", self.file, self.line)
        } else {
            format!("./{}:{}", self.file, self.line)
        }
    }
}

impl From<&Location<'_>> for SourceLocation {
    fn from(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}
