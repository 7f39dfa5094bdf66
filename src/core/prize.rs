//! Prize definitions and catalog snapshots.
//!
//! A Prize has immutable identity and mutable stock; a CatalogSnapshot is
//! the immutable point-in-time view the allocation algorithm consumes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{CoreError, InvalidCatalog, InvalidPrize, InvalidTier};
use super::identity::PrizeId;

/// Ordinal rarity class. A is rarest and gated behind the unlock threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    A,
    B,
    C,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::A => "A",
            Tier::B => "B",
            Tier::C => "C",
        }
    }

    /// The gated tier is suppressed until the unlock threshold is reached.
    pub fn is_gated(self) -> bool {
        matches!(self, Tier::A)
    }
}

impl FromStr for Tier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Tier::A),
            "B" => Ok(Tier::B),
            "C" => Ok(Tier::C),
            _ => Err(InvalidTier { raw: s.to_string() }.into()),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One prize line in the catalog.
///
/// `current_stock` only ever decreases during normal operation, by exactly
/// one per successful award, and never below zero (enforced by the store's
/// conditional decrement; `u32` makes underflow unrepresentable).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prize {
    pub id: PrizeId,
    pub tier: Tier,
    /// Relative draw probability among in-stock candidates. Not required
    /// to sum to 100 across the catalog.
    pub weight: f64,
    /// Initial capacity; informational once the draw opens.
    pub total_stock: u32,
    pub current_stock: u32,
    pub title: String,
    pub description: String,
}

impl Prize {
    /// Build a validated prize at full stock.
    pub fn new(
        id: PrizeId,
        tier: Tier,
        weight: f64,
        total_stock: u32,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let prize = Self {
            id,
            tier,
            weight,
            total_stock,
            current_stock: total_stock,
            title: title.into(),
            description: description.into(),
        };
        prize.validate()?;
        Ok(prize)
    }

    pub fn in_stock(&self) -> bool {
        self.current_stock > 0
    }

    /// Check the per-prize invariants. Runs on every construction and
    /// edit path; a failure past those paths is a programming error.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(InvalidPrize {
                id: self.id.to_string(),
                reason: format!("weight {} must be finite and >= 0", self.weight),
            }
            .into());
        }
        if self.current_stock > self.total_stock {
            return Err(InvalidPrize {
                id: self.id.to_string(),
                reason: format!(
                    "current_stock {} exceeds total_stock {}",
                    self.current_stock, self.total_stock
                ),
            }
            .into());
        }
        Ok(())
    }
}

/// Immutable point-in-time view of the whole catalog.
///
/// Internally consistent: a snapshot never exposes a partially applied
/// update. `version` increases on every catalog mutation and lets callers
/// tell refreshed snapshots apart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub version: u64,
    pub prizes: Vec<Prize>,
}

impl CatalogSnapshot {
    pub fn new(version: u64, prizes: Vec<Prize>) -> Self {
        Self { version, prizes }
    }

    pub fn get(&self, id: &PrizeId) -> Option<&Prize> {
        self.prizes.iter().find(|p| &p.id == id)
    }

    /// Prizes with remaining stock, in stable catalog order.
    pub fn in_stock(&self) -> impl Iterator<Item = &Prize> {
        self.prizes.iter().filter(|p| p.in_stock())
    }

    pub fn exhausted(&self) -> bool {
        self.prizes.iter().all(|p| !p.in_stock())
    }
}

/// Validate a full prize list before it becomes a catalog: per-prize
/// invariants plus id uniqueness.
pub fn validate_catalog(prizes: &[Prize]) -> Result<(), CoreError> {
    for prize in prizes {
        prize.validate()?;
    }
    for (i, prize) in prizes.iter().enumerate() {
        if prizes[..i].iter().any(|p| p.id == prize.id) {
            return Err(InvalidCatalog {
                reason: format!("duplicate prize id `{}`", prize.id),
            }
            .into());
        }
    }
    Ok(())
}
