//! Storage keys.
//!
//! A key wraps exactly one raw scalar. Two key types that declare the same
//! [`RawKey`] kind can be converted into each other with
//! [`StorageKey::convert`], which is what lets engines with different key
//! types be composed and migrated between.

use crate::{Error, Result};
use std::fmt::{self, Debug};
use std::hash::Hash;

/// The scalar kinds a key may wrap.
///
/// Every raw kind has a reversible string form, used by engines that can
/// only address entries by text (file names, for instance).
pub trait RawKey: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    /// Renders the raw value as text.
    fn to_key_string(&self) -> String;

    /// Parses text produced by [`RawKey::to_key_string`].
    fn parse_key_string(s: &str) -> Result<Self>;
}

impl RawKey for String {
    fn to_key_string(&self) -> String {
        self.clone()
    }

    fn parse_key_string(s: &str) -> Result<Self> {
        Ok(s.to_string())
    }
}

impl RawKey for i64 {
    fn to_key_string(&self) -> String {
        self.to_string()
    }

    fn parse_key_string(s: &str) -> Result<Self> {
        s.parse()
            .map_err(|e| Error::InvalidKey(format!("{:?} is not an i64: {}", s, e)))
    }
}

impl RawKey for u64 {
    fn to_key_string(&self) -> String {
        self.to_string()
    }

    fn parse_key_string(s: &str) -> Result<Self> {
        s.parse()
            .map_err(|e| Error::InvalidKey(format!("{:?} is not a u64: {}", s, e)))
    }
}

/// An opaque, hashable identifier for one stored entry.
///
/// Equality of keys is equality of their raw values.
pub trait StorageKey: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    /// The scalar kind this key wraps.
    type Raw: RawKey;

    /// Builds a key from its raw value, applying this type's validation.
    fn from_raw(raw: Self::Raw) -> Result<Self>;

    /// The wrapped raw value.
    fn raw(&self) -> &Self::Raw;

    /// Builds a key of this type from a key of another type with the same
    /// raw kind. Fails with [`Error::InvalidKey`] when this type's
    /// validation rejects the raw value.
    fn convert<K>(other: &K) -> Result<Self>
    where
        K: StorageKey<Raw = Self::Raw>,
    {
        Self::from_raw(other.raw().clone())
    }
}

/// A string key accepting any value.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Creates a key from any string.
    pub fn new(value: impl Into<String>) -> Self {
        CacheKey(value.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl StorageKey for CacheKey {
    type Raw = String;

    fn from_raw(raw: String) -> Result<Self> {
        Ok(CacheKey(raw))
    }

    fn raw(&self) -> &String {
        &self.0
    }
}

impl Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey({:?})", self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(value: &str) -> Self {
        CacheKey::new(value)
    }
}

impl From<String> for CacheKey {
    fn from(value: String) -> Self {
        CacheKey(value)
    }
}

/// An integer key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntKey(i64);

impl IntKey {
    /// Creates a key from an integer.
    pub fn new(value: i64) -> Self {
        IntKey(value)
    }

    /// The wrapped integer.
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl StorageKey for IntKey {
    type Raw = i64;

    fn from_raw(raw: i64) -> Result<Self> {
        Ok(IntKey(raw))
    }

    fn raw(&self) -> &i64 {
        &self.0
    }
}

impl From<i64> for IntKey {
    fn from(value: i64) -> Self {
        IntKey(value)
    }
}

/// Maximum length of an [`Identifier`] in bytes
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// A validated string key: 1 to 128 characters from `[A-Za-z0-9_.-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    /// Validates and wraps a string.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        Self::from_raw(value.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_valid_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
    }
}

impl StorageKey for Identifier {
    type Raw = String;

    fn from_raw(raw: String) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::InvalidKey("identifier must not be empty".into()));
        }
        if raw.len() > MAX_IDENTIFIER_LEN {
            return Err(Error::InvalidKey(format!(
                "identifier is {} bytes, limit is {}",
                raw.len(),
                MAX_IDENTIFIER_LEN
            )));
        }
        if let Some(bad) = raw.chars().find(|c| !Self::is_valid_char(*c)) {
            return Err(Error::InvalidKey(format!(
                "identifier {:?} contains {:?}",
                raw, bad
            )));
        }
        Ok(Identifier(raw))
    }

    fn raw(&self) -> &String {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
