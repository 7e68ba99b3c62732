//! Normalized provider identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maximum allowed length for a [`ProviderKey`].
const PROVIDER_KEY_MAX_LEN: usize = 64;

/// Errors from constructing a [`ProviderKey`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderKeyError {
    /// The input was empty or contained only whitespace.
    #[error("provider key cannot be empty or whitespace")]
    Empty,
    /// The normalized key contains characters other than `a-z`, `0-9` and `_`.
    #[error("provider key contains invalid characters (only a-z, 0-9 and _ allowed)")]
    InvalidCharacters,
    /// The normalized key starts with a digit.
    #[error("provider key cannot start with a digit")]
    LeadingDigit,
    /// The normalized key exceeds [`PROVIDER_KEY_MAX_LEN`] characters.
    #[error("provider key exceeds maximum length of {PROVIDER_KEY_MAX_LEN} characters")]
    TooLong,
}

/// A normalized, validated identifier for a cloud backend ("aws", "gcp",
/// "openstack_dev", …).
///
/// The key is the unique name under which a provider is registered and the
/// name a [`Credential`](https://docs.rs/strato-vault) is bound to, so two
/// spellings of the same backend must normalize to the same key.
///
/// Normalization rules:
/// - Leading/trailing whitespace is trimmed.
/// - The string is lowercased.
/// - Whitespace and hyphens are replaced with underscores.
/// - Consecutive underscores are collapsed to one.
/// - Leading/trailing underscores are stripped.
///
/// After normalization the key must:
/// - Be non-empty.
/// - Contain only `a-z`, `0-9` and `_`, and not start with a digit.
/// - Be at most 64 characters long.
///
/// # Examples
///
/// ```
/// use strato_core::ProviderKey;
///
/// let key: ProviderKey = "AWS".parse().unwrap();
/// assert_eq!(key.as_str(), "aws");
///
/// let key: ProviderKey = " OpenStack--Dev ".parse().unwrap();
/// assert_eq!(key.as_str(), "openstack_dev");
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderKey(String);

impl ProviderKey {
    /// Create a new `ProviderKey`, normalizing and validating the input.
    pub fn new(raw: &str) -> Result<Self, ProviderKeyError> {
        let normalized: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_whitespace() || c == '-' {
                    '_'
                } else {
                    c
                }
            })
            .collect();

        // Collapse consecutive underscores and strip leading/trailing ones.
        let collapsed = collapse_underscores(&normalized);

        if collapsed.is_empty() {
            return Err(ProviderKeyError::Empty);
        }
        if !collapsed
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
        {
            return Err(ProviderKeyError::InvalidCharacters);
        }
        if collapsed.as_bytes()[0].is_ascii_digit() {
            return Err(ProviderKeyError::LeadingDigit);
        }
        if collapsed.len() > PROVIDER_KEY_MAX_LEN {
            return Err(ProviderKeyError::TooLong);
        }

        Ok(Self(collapsed))
    }

    /// Return the inner string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Collapse runs of underscores and trim leading/trailing underscores.
fn collapse_underscores(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_underscore = true; // treat start as "previous was _" to skip leading
    for c in s.chars() {
        if c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }
    // Strip trailing underscore.
    if out.ends_with('_') {
        out.pop();
    }
    out
}

impl fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProviderKey {
    type Err = ProviderKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for ProviderKey {
    type Error = ProviderKeyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for ProviderKey {
    type Error = ProviderKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ProviderKey> for String {
    fn from(key: ProviderKey) -> Self {
        key.0
    }
}

impl AsRef<str> for ProviderKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn normalizes_case_and_separators() {
        assert_eq!(ProviderKey::new("AWS").unwrap().as_str(), "aws");
        assert_eq!(
            ProviderKey::new("Google Cloud").unwrap().as_str(),
            "google_cloud"
        );
        assert_eq!(
            ProviderKey::new(" OpenStack--Dev ").unwrap().as_str(),
            "openstack_dev"
        );
        assert_eq!(
            ProviderKey::new("__azure__gov__").unwrap().as_str(),
            "azure_gov"
        );
    }

    #[test]
    fn digits_allowed_but_not_leading() {
        assert_eq!(ProviderKey::new("ec2_like").unwrap().as_str(), "ec2_like");
        assert_eq!(
            ProviderKey::new("3cloud").unwrap_err(),
            ProviderKeyError::LeadingDigit
        );
    }

    #[test]
    fn rejects_empty_and_invalid() {
        assert_eq!(ProviderKey::new("   ").unwrap_err(), ProviderKeyError::Empty);
        assert_eq!(ProviderKey::new("___").unwrap_err(), ProviderKeyError::Empty);
        assert_eq!(
            ProviderKey::new("aws!prod").unwrap_err(),
            ProviderKeyError::InvalidCharacters
        );
    }

    #[test]
    fn rejects_overlong() {
        let raw = "a".repeat(65);
        assert_eq!(ProviderKey::new(&raw).unwrap_err(), ProviderKeyError::TooLong);
        let raw = "a".repeat(64);
        assert!(ProviderKey::new(&raw).is_ok());
    }

    #[test]
    fn serde_roundtrip_normalizes() {
        let key: ProviderKey = serde_json::from_str("\"AWS China\"").unwrap();
        assert_eq!(key.as_str(), "aws_china");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"aws_china\"");
    }
}
