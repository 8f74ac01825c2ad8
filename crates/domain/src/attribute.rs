//! Attribute map: the sole unit of exchange with the appliance.
//!
//! The appliance reports and accepts state only as string-valued attributes.
//! Typed reads go through the codecs in [`codec`]; attribute names follow the
//! conventions in [`keys`].

pub mod codec;
pub mod keys;

use std::collections::HashMap;
use std::collections::hash_map;

use serde::{Deserialize, Serialize};

use crate::code::WireCode;
use crate::error::DecodeError;

/// Attribute name → raw attribute value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeMap(HashMap<String, String>);

impl AttributeMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a flat JSON object of string values.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Snapshot`] when `json` is not such an object.
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(json).map_err(DecodeError::Snapshot)
    }

    /// Raw value of `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Set `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Overlay `other` on top of this map; keys in `other` win.
    pub fn merge(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Boolean attribute; `None` when absent or not a boolean token.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(codec::decode_bool)
    }

    /// Integer attribute; `Ok(None)` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Malformed`] when the value is not an integer.
    pub fn get_int(&self, key: &str) -> Result<Option<i64>, DecodeError> {
        self.get(key)
            .map(|raw| {
                codec::decode_int(raw).ok_or_else(|| DecodeError::Malformed {
                    key: key.to_string(),
                    value: raw.to_string(),
                })
            })
            .transpose()
    }

    /// Temperature attribute in °C; `Ok(None)` when absent or reported as `0`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Malformed`] when the value is not an integer.
    pub fn get_tenths(&self, key: &str) -> Result<Option<f64>, DecodeError> {
        Ok(self.get_int(key)?.and_then(codec::decode_tenths))
    }

    /// Enumeration attribute decoded through its code table.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Missing`] when absent and
    /// [`DecodeError::UnknownCode`] when the code is not in the table.
    pub fn get_coded<T: WireCode>(&self, key: &str) -> Result<T, DecodeError> {
        let raw = self.get(key).ok_or_else(|| DecodeError::Missing {
            key: key.to_string(),
        })?;
        T::from_code(raw)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for AttributeMap {
    type Item = (String, String);
    type IntoIter = hash_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
