use serde::{Deserialize, Deserializer};
use strum::Display;

mod comment;
mod student;
mod tag;
mod work;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Work,
    Comment,
    Tag,
    Student,
}

pub use comment::*;
pub use student::*;
pub use tag::*;
pub use work::*;

/// The API sends `null` for empty collections on some endpoints.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
