//! Job identifiers.
//!
//! A [`JobId`] names the scratch directory a conversion works in, so it must
//! be unique among in-flight jobs and safe to use as a single path component.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Identifier of a conversion job.
///
/// Callers usually derive it from the chat update that triggered the
/// conversion (a numeric update id); [`JobId::generate`] covers callers with
/// nothing to derive from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId(String);

impl JobId {
    /// Validate and wrap a caller-supplied identifier.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::validation("job id must not be empty"));
        }
        if id == "." || id == ".." {
            return Err(Error::validation(format!("job id '{id}' is reserved")));
        }
        if id.contains(['/', '\\', '\0']) {
            return Err(Error::validation(format!(
                "job id '{id}' must be a single path component"
            )));
        }
        Ok(Self(id))
    }

    /// Create a new random ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for JobId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for JobId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.0
    }
}

impl From<i64> for JobId {
    fn from(update_id: i64) -> Self {
        Self(update_id.to_string())
    }
}

impl From<u64> for JobId {
    fn from(update_id: u64) -> Self {
        Self(update_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_render_as_decimal() {
        assert_eq!(JobId::from(123_456_i64).as_str(), "123456");
        assert_eq!(JobId::from(-7_i64).to_string(), "-7");
        assert_eq!(JobId::from(42_u64).to_string(), "42");
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = JobId::generate();
        let b = JobId::generate();
        assert_ne!(a, b);
        assert!(JobId::new(a.as_str()).is_ok());
    }

    #[test]
    fn rejects_path_like_ids() {
        assert!(JobId::new("").is_err());
        assert!(JobId::new(".").is_err());
        assert!(JobId::new("..").is_err());
        assert!(JobId::new("a/b").is_err());
        assert!(JobId::new("..\\evil").is_err());
        assert!("sticker-1".parse::<JobId>().is_ok());
    }

    #[test]
    fn serde_round_trip_validates() {
        let id = JobId::new("update-99").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"update-99\"");
        let back: JobId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<JobId>("\"../etc\"").is_err());
    }
}
