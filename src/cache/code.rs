//! Resource code parsing
//!
//! A resource code is the numeric key shared by the cache directory and the
//! origin service. It is taken from the request path.

use std::fmt;

/// Numeric identifier of a cached image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceCode(u64);

impl ResourceCode {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Parse a code from a request path such as `/404`
    ///
    /// Strips one leading `/` and an optional `+`, then reads the leading
    /// run of ASCII digits. Anything after the digits is ignored, so `/12abc`
    /// yields 12. Returns `None` when there is no leading digit or the value
    /// overflows.
    pub fn from_path(path: &str) -> Option<Self> {
        let rest = path.strip_prefix('/').unwrap_or(path);
        let rest = rest.strip_prefix('+').unwrap_or(rest);
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());

        if digits_end == 0 {
            return None;
        }

        rest[..digits_end].parse::<u64>().ok().map(Self::new)
    }
}

impl fmt::Display for ResourceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
