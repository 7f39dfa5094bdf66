//! Audit records: one append-only entry per successful draw.

use serde::{Deserialize, Serialize};

use super::identity::{ParticipantId, PrizeId, RecordId};
use super::prize::{Prize, Tier};
use super::time::WallClock;

/// Immutable record of a successful award.
///
/// Display fields are captured at award time so later catalog edits never
/// rewrite history. Records are only ever created by a committed draw and
/// only ever deleted by an administrative full reset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub id: RecordId,
    pub participant: ParticipantId,
    pub prize_id: PrizeId,
    pub tier: Tier,
    pub title: String,
    pub description: String,
    pub at: WallClock,
}

impl DrawRecord {
    /// Snapshot an awarded prize for the ledger.
    pub(crate) fn for_award(participant: ParticipantId, prize: &Prize) -> Self {
        Self {
            id: RecordId::generate(),
            participant,
            prize_id: prize.id.clone(),
            tier: prize.tier,
            title: prize.title.clone(),
            description: prize.description.clone(),
            at: WallClock::now(),
        }
    }
}
