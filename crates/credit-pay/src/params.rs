//! Request parameters and their canonical serialization.
//!
//! Parameters are kept in a [`BTreeMap`], so iteration is already sorted by
//! key (byte-wise, which for UTF-8 is the same as code-point order). The
//! canonical string is `k1=v1&k2=v2&...` with no escaping.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::SIGNATURE_FIELD;
use crate::error::CreditPayError;

/// A scalar parameter value.
///
/// Only integers and strings are modeled; the gateway coerces amounts with
/// `to_i`, so fractional numbers never take part in a signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Str(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(n) => write!(f, "{n}"),
            ParamValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Int(n)
    }
}

impl From<i32> for ParamValue {
    fn from(n: i32) -> Self {
        ParamValue::Int(i64::from(n))
    }
}

impl From<u32> for ParamValue {
    fn from(n: u32) -> Self {
        ParamValue::Int(i64::from(n))
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

/// The parameters covered by a signature (everything except `signature`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignParams(BTreeMap<String, ParamValue>);

impl SignParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a parameter. Returns the previous value, if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Option<ParamValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in canonical (sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The exact string that gets signed: `k1=v1&k2=v2`, sorted by key.
    pub fn canonical_string(&self) -> String {
        let mut out = String::new();
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                out.push('&');
            }
            out.push_str(key);
            out.push('=');
            out.push_str(&value.to_string());
        }
        out
    }

    /// Reject params whose canonical string would not parse back to the same map:
    /// a `signature` key, or a `&`/`=` inside any key or value.
    ///
    /// Signing does not call this; the gateway client does before sending.
    pub fn check_unambiguous(&self) -> Result<(), CreditPayError> {
        if self.0.contains_key(SIGNATURE_FIELD) {
            return Err(CreditPayError::AmbiguousParams(format!(
                "params must not contain the `{SIGNATURE_FIELD}` field"
            )));
        }
        for (key, value) in &self.0 {
            if key.is_empty() || key.contains(['&', '=']) {
                return Err(CreditPayError::AmbiguousParams(format!(
                    "invalid key `{key}`"
                )));
            }
            if let ParamValue::Str(s) = value {
                if s.contains(['&', '=']) {
                    return Err(CreditPayError::AmbiguousParams(format!(
                        "value of `{key}` contains `&` or `=`"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl<K, V> FromIterator<(K, V)> for SignParams
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
