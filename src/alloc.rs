//! Weighted prize selection.
//!
//! Pure and side-effect free: given a catalog snapshot, the draw count and
//! an RNG, pick one candidate. Fully deterministic for a fixed snapshot
//! and RNG, which is what makes the selection testable. The coordinator
//! may call this several times per logical draw when it loses a stock race.

use rand::Rng;

use crate::core::{CatalogSnapshot, Prize, PrizeId};

/// Outcome of one selection pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Allocation {
    Picked(PrizeId),
    /// No prize has remaining stock. The caller must treat this as the
    /// terminal "nothing left to award" state, never as an error.
    Exhausted,
}

/// Select one prize from the in-stock, tier-eligible candidates.
///
/// Candidates are walked in catalog order with the standard subtract-the-
/// weight scan, so the winner is reproducible for a given snapshot and
/// random value. Tier A is excluded while `draw_count` is below
/// `unlock_threshold`, unless that would leave zero candidates, in which
/// case the gated tier stays drawable rather than deadlocking the draw
/// (the confirmed terminal policy; see DESIGN.md).
pub fn select<R: Rng + ?Sized>(
    snapshot: &CatalogSnapshot,
    draw_count: u64,
    unlock_threshold: u64,
    rng: &mut R,
) -> Allocation {
    let in_stock: Vec<&Prize> = snapshot.in_stock().collect();
    if in_stock.is_empty() {
        return Allocation::Exhausted;
    }

    let candidates = if draw_count < unlock_threshold {
        let ungated: Vec<&Prize> = in_stock
            .iter()
            .copied()
            .filter(|p| !p.tier.is_gated())
            .collect();
        if ungated.is_empty() { in_stock } else { ungated }
    } else {
        in_stock
    };

    let total_weight: f64 = candidates.iter().map(|p| p.weight).sum();
    if total_weight > 0.0 {
        let mut r = rng.random_range(0.0..total_weight);
        for prize in &candidates {
            if r < prize.weight {
                return Allocation::Picked(prize.id.clone());
            }
            r -= prize.weight;
        }
    }

    // Zero total weight, or r landed on the boundary through accumulated
    // rounding: take the last candidate rather than failing.
    let last = candidates
        .last()
        .expect("candidates checked non-empty above");
    Allocation::Picked(last.id.clone())
}
