use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// The `aud` claim of an ID token.
///
/// Providers send either a bare string or a list of strings. Both decode to
/// a non-empty ordered list, and a single audience encodes back to a bare
/// string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audience(Vec<String>);

impl Audience {
    /// Returns `None` if `values` is empty.
    pub fn new(values: Vec<String>) -> Option<Self> {
        (!values.is_empty()).then_some(Self(values))
    }

    /// Audience consisting of a single value.
    pub fn single<S: Into<String>>(value: S) -> Self {
        Self(vec![value.into()])
    }

    pub fn contains(&self, audience: &str) -> bool {
        self.0.iter().any(|a| a == audience)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Serialize for Audience {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.as_slice() {
            [single] => serializer.serialize_str(single),
            many => many.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Audience {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            One(String),
            Many(Vec<String>),
        }

        let values = match Wire::deserialize(deserializer)? {
            Wire::One(value) => vec![value],
            Wire::Many(values) => values,
        };
        Self::new(values).ok_or_else(|| de::Error::custom("audience must not be empty"))
    }
}
