//! Value objects wrapping a single string.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A string value that compares by its underlying content.
///
/// Used for issue keys and for named values such as priority and resolution,
/// which the server reports as plain strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComparableString(String);

impl ComparableString {
    /// Wrap a string value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The underlying value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ComparableString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComparableString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ComparableString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for ComparableString {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ComparableString {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl AsRef<str> for ComparableString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
