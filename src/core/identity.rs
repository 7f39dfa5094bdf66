//! Identity atoms.
//!
//! PrizeId: stable catalog key for one prize
//! ParticipantId: client self-identification (nickname, session id, ...)
//! RecordId: audit record identifier

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{CoreError, InvalidId};

/// Alphabet for prize ids: lowercase alphanumeric plus `-` and `_`.
///
/// Ids are authored by operators in config files, so the charset is kept
/// small enough to survive CSV export and URL embedding unquoted.
const PRIZE_ID_CHARS: &str = "abcdefghijklmnopqrstuvwxyz0123456789-_";

/// Prize identifier - opaque, unique, stable across catalog edits.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrizeId(String);

impl PrizeId {
    /// Parse and validate a prize id string.
    pub fn parse(s: impl Into<String>) -> Result<Self, CoreError> {
        let s = s.into();
        if s.is_empty() {
            return Err(InvalidId::Prize {
                raw: s,
                reason: "empty".into(),
            }
            .into());
        }
        if let Some(bad) = s.chars().find(|c| !PRIZE_ID_CHARS.contains(*c)) {
            return Err(InvalidId::Prize {
                raw: s.clone(),
                reason: format!("character `{bad}` not allowed"),
            }
            .into());
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PrizeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrizeId({:?})", self.0)
    }
}

impl fmt::Display for PrizeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Participant identifier - non-empty string.
///
/// Clients name themselves. No validation beyond non-empty; the engine
/// never interprets it, only records it.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(s: impl Into<String>) -> Result<Self, CoreError> {
        let s = s.into();
        if s.is_empty() {
            Err(InvalidId::Participant {
                raw: s,
                reason: "empty".into(),
            }
            .into())
        } else {
            Ok(Self(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParticipantId({:?})", self.0)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Audit record identifier - UUID v4.
///
/// Only the coordinator generates new ones (pub(crate)).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Uuid::parse_str(s).map(Self).map_err(|e| {
            InvalidId::Record {
                raw: s.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Generate a fresh record id.
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prize_id_accepts_operator_style_ids() {
        for raw in ["grand", "tier-b_gift", "coupon2"] {
            assert!(PrizeId::parse(raw).is_ok(), "{raw} should parse");
        }
    }

    #[test]
    fn prize_id_rejects_empty_and_bad_chars() {
        assert!(PrizeId::parse("").is_err());
        assert!(PrizeId::parse("Grand").is_err());
        assert!(PrizeId::parse("a b").is_err());
    }

    #[test]
    fn participant_id_rejects_empty_only() {
        assert!(ParticipantId::new("").is_err());
        assert!(ParticipantId::new("Kaylee 🎁").is_ok());
    }

    #[test]
    fn record_id_roundtrips() {
        let id = RecordId::generate();
        let parsed = RecordId::parse(&id.to_string()).expect("parse");
        assert_eq!(id, parsed);
    }
}
