//! Present-vs-absent wrapper for partial updates
//!
//! JSON bodies for update requests may omit a field entirely ("leave it
//! alone") or supply it, possibly as `null` ("clear it"). `Option<T>` can
//! only encode one of those, so patch structs use `Patch<T>` instead:
//! a missing key deserializes to [`Patch::Keep`] via `#[serde(default)]`,
//! while any supplied value (including `null` when `T` is an `Option`)
//! deserializes to [`Patch::Set`].

use serde::{Deserialize, Deserializer};

/// A field in a partial update: either left untouched or set to a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// The field was not supplied; keep the stored value.
    #[default]
    Keep,
    /// The field was supplied; overwrite the stored value.
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Patch::Set(_))
    }

    /// Borrowed view of the supplied value, if any.
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Keep => None,
            Patch::Set(value) => Some(value),
        }
    }
}

impl<T> From<T> for Patch<T> {
    fn from(value: T) -> Self {
        Patch::Set(value)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Patch::Set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default)]
        name: Patch<String>,
        #[serde(default)]
        description: Patch<Option<String>>,
    }

    #[test]
    fn test_missing_key_is_keep() {
        let body: Body = serde_json::from_str("{}").unwrap();
        assert_eq!(body.name, Patch::Keep);
        assert_eq!(body.description, Patch::Keep);
    }

    #[test]
    fn test_supplied_value_is_set() {
        let body: Body = serde_json::from_str(r#"{"name": "Acme"}"#).unwrap();
        assert_eq!(body.name, Patch::Set("Acme".to_string()));
    }

    #[test]
    fn test_explicit_null_is_set_none() {
        let body: Body = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(body.description, Patch::Set(None));
    }
}
