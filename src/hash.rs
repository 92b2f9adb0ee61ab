//! Deterministic parameter hashing using blake3.
//!
//! Two parameter sets that differ only in key order hash to the same
//! [`ParamSum`]. Objects are canonicalized recursively (keys sorted) and
//! serialized as compact JSON before hashing.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::Parameters;

/// A 256-bit parameter hash (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamSum([u8; 32]);

impl ParamSum {
    #[inline]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        let arr: [u8; 32] = bytes.try_into().ok()?;
        Some(Self(arr))
    }
}

impl fmt::Display for ParamSum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First 16 hex chars are enough to tell sums apart in logs
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl Serialize for ParamSum {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ParamSum {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid parameter hash `{s}`")))
    }
}

/// Hashing strategy for parameter sets and slugs.
///
/// Passed to the stores instead of being baked into the entities, so
/// every sum in one database is produced the same way.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterHasher;

impl ParameterHasher {
    pub const fn new() -> Self {
        Self
    }

    /// Hash a parameter map independent of its key order.
    pub fn hash(&self, params: &Parameters) -> ParamSum {
        let canonical = canonicalize_map(params);
        self.hash_bytes(canonical.to_string().as_bytes())
    }

    /// Hash an arbitrary string (used for slug uniqueness keys).
    pub fn hash_str(&self, s: &str) -> ParamSum {
        self.hash_bytes(s.as_bytes())
    }

    fn hash_bytes(&self, bytes: &[u8]) -> ParamSum {
        ParamSum::new(*blake3::hash(bytes).as_bytes())
    }
}

fn canonicalize_map(map: &Parameters) -> Value {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    Value::Object(
        entries
            .into_iter()
            .map(|(k, v)| (k.clone(), canonicalize(v)))
            .collect(),
    )
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => canonicalize_map(map),
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
