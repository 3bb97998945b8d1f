//! Semantic version handling for the project manifest.
//!
//! Versions are parsed leniently: the manifest is hand-edited and older
//! projects carry values like `"1"`, `"2.x"` or `"1.2.3-beta"`. Each
//! component reads as its leading run of digits, and as `0` when it is
//! missing or has none.

use std::fmt;

/// A `major.minor.patch` version triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Create a version from its three components.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch }
    }

    /// Parse a version string from the leading digits of each component.
    ///
    /// Only the first three dot-separated components are read. A component
    /// without leading digits, or a missing one, reads as 0.
    ///
    /// ```
    /// use assetforge::version::Version;
    ///
    /// assert_eq!(Version::parse_lenient("1.2.9"), Version::new(1, 2, 9));
    /// assert_eq!(Version::parse_lenient("1"), Version::new(1, 0, 0));
    /// assert_eq!(Version::parse_lenient("2.x.7"), Version::new(2, 0, 7));
    /// assert_eq!(Version::parse_lenient("1.2.3-beta"), Version::new(1, 2, 3));
    /// ```
    pub fn parse_lenient(text: &str) -> Self {
        let mut parts = text.trim().split('.').map(parse_component);
        Self {
            major: parts.next().unwrap_or(0),
            minor: parts.next().unwrap_or(0),
            patch: parts.next().unwrap_or(0),
        }
    }

    /// Return the next patch release, leaving major and minor untouched.
    pub fn bump_patch(self) -> Self {
        Self { patch: self.patch.saturating_add(1), ..self }
    }
}

fn parse_component(part: &str) -> u64 {
    part.trim()
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u64, |acc, digit| acc.saturating_mul(10).saturating_add(u64::from(digit - b'0')))
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
