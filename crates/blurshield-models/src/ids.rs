//! Identifiers for uploaded videos.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ModelError, ModelResult};

/// A video identifier, always a v4 UUID assigned at upload time.
///
/// Wrapping `Uuid` rather than passing bare strings keeps malformed IDs
/// from ever reaching a filesystem path or a detection job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(Uuid);

impl VideoId {
    /// Generate a fresh identifier for a newly uploaded video.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier from a path segment or request body. Requires
    /// the exact lowercase hyphenated form
    /// (`[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}`) —
    /// uppercase hex, braced, and `urn:uuid:` forms that `Uuid::parse_str`
    /// would otherwise accept are rejected here.
    pub fn parse(raw: &str) -> ModelResult<Self> {
        if !is_canonical_hyphenated(raw) {
            return Err(ModelError::InvalidVideoId(raw.to_string()));
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| ModelError::InvalidVideoId(raw.to_string()))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

/// `^[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}$`, checked
/// by hand so we don't pull in a regex dependency for one fixed pattern.
fn is_canonical_hyphenated(raw: &str) -> bool {
    const GROUP_LENGTHS: [usize; 5] = [8, 4, 4, 4, 12];

    let groups: Vec<&str> = raw.split('-').collect();
    if groups.len() != GROUP_LENGTHS.len() {
        return false;
    }
    groups.iter().zip(GROUP_LENGTHS).all(|(group, expected_len)| {
        group.len() == expected_len
            && group.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    })
}

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrips_through_display() {
        let id = VideoId::new();
        let parsed = VideoId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(VideoId::parse("not-a-uuid").is_err());
        assert!(VideoId::parse("../../etc/passwd").is_err());
    }

    #[test]
    fn parse_rejects_non_canonical_forms_uuid_parse_str_would_accept() {
        let id = VideoId::new();
        let uppercase = id.to_string().to_uppercase();
        let braced = format!("{{{id}}}");
        let urn = format!("urn:uuid:{id}");

        assert!(VideoId::parse(&uppercase).is_err());
        assert!(VideoId::parse(&braced).is_err());
        assert!(VideoId::parse(&urn).is_err());
    }
}
