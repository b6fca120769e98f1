//! Newtype wrappers for identifiers and wallet artifacts.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Identifier of a Task, as assigned by the task backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Create a new TaskId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// An account address supplied by the wallet provider.
///
/// Addresses are never generated locally. They are stored lowercase so that
/// two spellings of the same account (checksummed or not) compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse a `0x`-prefixed hex address.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, CoreError> {
        let raw = raw.as_ref().trim();
        let digits = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .ok_or_else(|| CoreError::InvalidAddress(raw.to_string()))?;

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidAddress(raw.to_string()));
        }

        Ok(Self(format!("0x{}", digits.to_ascii_lowercase())))
    }

    /// Get the inner string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for display, e.g. `0x1234…abcd`.
    pub fn short(&self) -> String {
        if self.0.len() > 10 {
            format!("{}…{}", &self.0[..6], &self.0[self.0.len() - 4..])
        } else {
            self.0.clone()
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        a.0
    }
}

/// An opaque signature string returned by the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Signature(String);

impl Signature {
    /// Wrap a provider-supplied signature. Empty strings are rejected.
    pub fn new(raw: impl Into<String>) -> Result<Self, CoreError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(CoreError::InvalidSignature("empty signature".to_string()));
        }
        Ok(Self(raw))
    }

    /// Get the inner string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Signature {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Signature> for String {
    fn from(s: Signature) -> Self {
        s.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        let id = TaskId::new("t42");
        assert_eq!(format!("{}", id), "t42");
    }

    #[test]
    fn test_address_is_lowercased() {
        let a = Address::parse("0xABCdef0123456789abcdef0123456789ABCDEF01").unwrap();
        let b = Address::parse("0xabcdef0123456789abcdef0123456789abcdef01").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "0xabcdef0123456789abcdef0123456789abcdef01");
    }

    #[test]
    fn test_address_rejects_garbage() {
        assert!(Address::parse("abc").is_err());
        assert!(Address::parse("0x").is_err());
        assert!(Address::parse("0xzz12").is_err());
    }

    #[test]
    fn test_address_short() {
        let a = Address::parse("0xabc0000000000000000000000000000000000123").unwrap();
        assert_eq!(a.short(), "0xabc0…0123");
    }

    #[test]
    fn test_address_deserialize_validates() {
        let ok: Result<Address, _> = serde_json::from_str("\"0xAB12\"");
        assert_eq!(ok.unwrap().as_str(), "0xab12");

        let bad: Result<Address, _> = serde_json::from_str("\"not-an-address\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_signature_rejects_empty() {
        assert!(Signature::new("").is_err());
        assert!(Signature::new("   ").is_err());
        assert_eq!(Signature::new("0xdead").unwrap().as_str(), "0xdead");
    }
}
