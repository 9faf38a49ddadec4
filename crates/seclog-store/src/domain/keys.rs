//! # Ledger Keys
//!
//! Typed keys for the two logical tables sharing the ledger's flat key space.
//!
//! ## Layout
//!
//! | Table | Typed key | Encoded bytes |
//! |-------|-----------|---------------|
//! | Records | `StateKey::Record(id)` | UTF-8 id |
//! | Composite (index) | `StateKey::Composite(key)` | `0x00 ns 0x00 p1 0x00 .. pn 0x00` |
//!
//! `0x00` is the smallest byte and may not appear inside an id, namespace or
//! part, so the encoding is lossless and sorts by namespace, then parts in
//! order. A record key can never start with `0x00`, which keeps the two
//! tables apart in a full range scan.

use super::errors::KeyError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator and composite-table marker.
pub const COMPOSITE_KEY_SEPARATOR: u8 = 0x00;

/// Identifier of a security record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Validate and wrap a caller-supplied id.
    pub fn parse(id: impl Into<String>) -> Result<Self, KeyError> {
        let id = id.into();
        if id.is_empty() {
            return Err(KeyError::EmptyRecordId);
        }
        if id.contains('\0') {
            return Err(KeyError::ReservedCharacter {
                component: "record id",
            });
        }
        Ok(Self(id))
    }

    /// Id derived from a UUID. Hyphenated UUIDs are always valid ids.
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid.hyphenated().to_string())
    }

    /// `{prefix}-{n:06}`. NUL characters are dropped from the prefix.
    pub(crate) fn from_sequence(prefix: &str, n: u64) -> Self {
        Self(format!("{}-{:06}", prefix.replace('\0', ""), n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RecordId {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

/// A namespaced multi-part key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompositeKey {
    namespace: String,
    parts: Vec<String>,
}

impl CompositeKey {
    /// Build a composite key, rejecting components that would break the
    /// encoding.
    pub fn new<S: AsRef<str>>(namespace: &str, parts: &[S]) -> Result<Self, KeyError> {
        if namespace.is_empty() {
            return Err(KeyError::EmptyNamespace);
        }
        if namespace.contains('\0') {
            return Err(KeyError::ReservedCharacter {
                component: "composite key namespace",
            });
        }
        let mut owned = Vec::with_capacity(parts.len());
        for part in parts {
            let part = part.as_ref();
            if part.contains('\0') {
                return Err(KeyError::ReservedCharacter {
                    component: "composite key part",
                });
            }
            owned.push(part.to_string());
        }
        Ok(Self {
            namespace: namespace.to_string(),
            parts: owned,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Split into `(namespace, parts)`.
    pub fn into_parts(self) -> (String, Vec<String>) {
        (self.namespace, self.parts)
    }

    /// Encode to ledger bytes.
    ///
    /// A key with fewer parts encodes to a byte prefix of every key that
    /// extends it, which is what partial-key scans rely on.
    pub fn encode(&self) -> Vec<u8> {
        let len = 2
            + self.namespace.len()
            + self.parts.iter().map(|p| p.len() + 1).sum::<usize>();
        let mut out = Vec::with_capacity(len);
        out.push(COMPOSITE_KEY_SEPARATOR);
        out.extend_from_slice(self.namespace.as_bytes());
        out.push(COMPOSITE_KEY_SEPARATOR);
        for part in &self.parts {
            out.extend_from_slice(part.as_bytes());
            out.push(COMPOSITE_KEY_SEPARATOR);
        }
        out
    }

    /// Decode ledger bytes produced by [`CompositeKey::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, KeyError> {
        let body = bytes
            .strip_prefix(&[COMPOSITE_KEY_SEPARATOR])
            .ok_or_else(|| KeyError::Malformed("missing composite marker".to_string()))?;
        let body = body
            .strip_suffix(&[COMPOSITE_KEY_SEPARATOR])
            .ok_or_else(|| KeyError::Malformed("missing trailing separator".to_string()))?;

        let mut components = body.split(|b| *b == COMPOSITE_KEY_SEPARATOR);
        let namespace = match components.next() {
            Some(ns) if !ns.is_empty() => to_utf8(ns)?,
            _ => return Err(KeyError::EmptyNamespace),
        };
        let parts = components.map(to_utf8).collect::<Result<Vec<_>, _>>()?;

        Ok(Self { namespace, parts })
    }
}

fn to_utf8(bytes: &[u8]) -> Result<String, KeyError> {
    String::from_utf8(bytes.to_vec()).map_err(|_| KeyError::InvalidUtf8)
}

/// A key in the ledger's flat key space, typed by logical table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StateKey {
    /// Primary record entry.
    Record(RecordId),
    /// Composite entry (secondary index).
    Composite(CompositeKey),
}

impl StateKey {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Record(id) => id.as_str().as_bytes().to_vec(),
            Self::Composite(key) => key.encode(),
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, KeyError> {
        match bytes.first() {
            None => Err(KeyError::EmptyRecordId),
            Some(&COMPOSITE_KEY_SEPARATOR) => CompositeKey::decode(bytes).map(Self::Composite),
            Some(_) => RecordId::parse(to_utf8(bytes)?).map(Self::Record),
        }
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record(_))
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record(id) => write!(f, "{}", id),
            Self::Composite(key) => {
                write!(f, "{}", key.namespace)?;
                for part in &key.parts {
                    write!(f, "/{}", part)?;
                }
                Ok(())
            }
        }
    }
}
