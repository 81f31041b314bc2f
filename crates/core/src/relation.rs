//! # Embedded relation normalization
//!
//! The backend's query layer returns a to-one embedded relation in more than
//! one shape: a bare object, `null`, a missing key, or an array holding zero
//! or one rows. [`Related`] folds all of those into a single sum type at the
//! decode boundary so nothing past it deals with the ambiguity.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

use crate::errors::CoachError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Related<T> {
    NotFound,
    Single(T),
}

impl<T> Default for Related<T> {
    fn default() -> Self {
        Related::NotFound
    }
}

impl<T> Related<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Related::Single(_))
    }

    pub fn as_ref(&self) -> Related<&T> {
        match self {
            Related::NotFound => Related::NotFound,
            Related::Single(value) => Related::Single(value),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Related<U> {
        match self {
            Related::NotFound => Related::NotFound,
            Related::Single(value) => Related::Single(f(value)),
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Related::NotFound => None,
            Related::Single(value) => Some(value),
        }
    }

    /// Turns a missing relation into a `NotFound` error naming `what`.
    pub fn ok_or_not_found(self, what: &str) -> Result<T, CoachError> {
        self.into_option()
            .ok_or_else(|| CoachError::NotFound(format!("{} not found", what)))
    }
}

impl<T> From<Option<T>> for Related<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Related::Single(value),
            None => Related::NotFound,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Shape<T> {
    Many(Vec<T>),
    One(T),
}

impl<'de, T> Deserialize<'de> for Related<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Shape<T>>::deserialize(deserializer)? {
            None => Ok(Related::NotFound),
            Some(Shape::One(value)) => Ok(Related::Single(value)),
            Some(Shape::Many(mut rows)) => match rows.len() {
                0 => Ok(Related::NotFound),
                1 => Ok(Related::Single(rows.remove(0))),
                n => Err(D::Error::custom(format!(
                    "expected at most one related row, got {}",
                    n
                ))),
            },
        }
    }
}

impl<T> Serialize for Related<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Related::NotFound => serializer.serialize_none(),
            Related::Single(value) => serializer.serialize_some(value),
        }
    }
}
