//! Operator-facing catalog administration.
//!
//! Edits are strongly typed and validated before they reach the store:
//! unknown ids, negative or non-finite weights and stock above capacity
//! are rejected outright instead of letting arbitrary field mutation
//! corrupt the catalog. Every accepted change lands as one atomic catalog
//! swap and is published to subscribed sessions.

use crate::config::Config;
use crate::core::{CoreError, InvalidCatalog, Prize, PrizeId, validate_catalog};
use crate::store::Store;
use crate::{Error, Result};

/// One validated edit to a single prize. `None` fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PrizeEdit {
    pub weight: Option<f64>,
    /// Restock: sets both `total_stock` and `current_stock`.
    pub stock: Option<u32>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Apply an edit to one prize; returns the new catalog version.
///
/// Admin edits race in-flight draws by design: the swap is atomic, and a
/// draw that committed against the old catalog simply stands.
pub fn update_prize<S: Store>(store: &S, id: &PrizeId, edit: &PrizeEdit) -> Result<u64> {
    let snapshot = store.catalog().map_err(Error::from)?;
    let mut prizes = snapshot.prizes;
    let prize = prizes
        .iter_mut()
        .find(|p| &p.id == id)
        .ok_or_else(|| unknown_prize(id))?;

    if let Some(weight) = edit.weight {
        prize.weight = weight;
    }
    if let Some(stock) = edit.stock {
        prize.total_stock = stock;
        prize.current_stock = stock;
    }
    if let Some(title) = &edit.title {
        prize.title = title.clone();
    }
    if let Some(description) = &edit.description {
        prize.description = description.clone();
    }
    prize.validate()?;

    let version = store.replace_catalog(prizes).map_err(Error::from)?;
    tracing::info!(prize = %id, version, "catalog edit applied");
    Ok(version)
}

/// Swap in a whole new catalog; returns the new version.
pub fn replace_catalog<S: Store>(store: &S, prizes: Vec<Prize>) -> Result<u64> {
    validate_catalog(&prizes)?;
    let version = store.replace_catalog(prizes).map_err(Error::from)?;
    tracing::info!(version, "catalog replaced");
    Ok(version)
}

/// Full reset: configured default catalog back in, draw count zeroed,
/// ledger cleared. Idempotent; atomic from the caller's point of view.
/// A draw racing the reset loses its conditional decrement and retries
/// against the reset state.
pub fn reset_all<S: Store>(store: &S, config: &Config) -> Result<()> {
    let prizes = config.default_prizes()?;
    store.reset(prizes).map_err(Error::from)?;
    tracing::info!("catalog, draw count and ledger reset to defaults");
    Ok(())
}

fn unknown_prize(id: &PrizeId) -> Error {
    Error::Core(CoreError::InvalidCatalog(InvalidCatalog {
        reason: format!("no prize with id `{id}`"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Tier;
    use crate::store::MemoryStore;

    fn store() -> MemoryStore {
        let config = Config::default();
        MemoryStore::new(config.default_prizes().unwrap())
    }

    #[test]
    fn edit_updates_weight_and_restocks() {
        let store = store();
        let id = PrizeId::parse("lucky-gift").unwrap();
        let edit = PrizeEdit {
            weight: Some(15.0),
            stock: Some(30),
            ..PrizeEdit::default()
        };
        update_prize(&store, &id, &edit).expect("edit");

        let snapshot = store.catalog().unwrap();
        let prize = snapshot.get(&id).unwrap();
        assert_eq!(prize.weight, 15.0);
        assert_eq!(prize.total_stock, 30);
        assert_eq!(prize.current_stock, 30);
    }

    #[test]
    fn edit_rejects_unknown_id_and_bad_weight() {
        let store = store();
        let missing = PrizeId::parse("nope").unwrap();
        assert!(update_prize(&store, &missing, &PrizeEdit::default()).is_err());

        let id = PrizeId::parse("lucky-gift").unwrap();
        let before = store.catalog().unwrap();
        let edit = PrizeEdit {
            weight: Some(f64::INFINITY),
            ..PrizeEdit::default()
        };
        assert!(update_prize(&store, &id, &edit).is_err());
        // Rejected edit leaves the catalog untouched.
        assert_eq!(store.catalog().unwrap(), before);
    }

    #[test]
    fn replace_rejects_duplicate_ids() {
        let store = store();
        let dup = vec![
            Prize::new(PrizeId::parse("x").unwrap(), Tier::C, 1.0, 1, "x", "").unwrap(),
            Prize::new(PrizeId::parse("x").unwrap(), Tier::B, 1.0, 1, "x", "").unwrap(),
        ];
        assert!(replace_catalog(&store, dup).is_err());
    }
}
