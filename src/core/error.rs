//! Core capability errors (parsing, validation, catalog invariants).
//!
//! These are bounded and stable: core errors represent domain/refusal
//! states, not library implementation details.

use thiserror::Error;

use crate::error::{Effect, Transience};

/// Invalid identifier.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum InvalidId {
    #[error("prize id `{raw}` is invalid: {reason}")]
    Prize { raw: String, reason: String },
    #[error("participant id `{raw}` is invalid: {reason}")]
    Participant { raw: String, reason: String },
    #[error("record id `{raw}` is invalid: {reason}")]
    Record { raw: String, reason: String },
}

/// Invalid tier string.
#[derive(Debug, Error, Clone)]
#[error("tier `{raw}` is invalid: expected A, B or C")]
pub struct InvalidTier {
    pub raw: String,
}

/// A prize definition that violates a catalog invariant.
///
/// Never producible by normal operation: every construction and edit path
/// validates first. Observing one of these means a programming error.
#[derive(Debug, Error, Clone)]
#[error("prize `{id}` is invalid: {reason}")]
pub struct InvalidPrize {
    pub id: String,
    pub reason: String,
}

/// A whole-catalog invariant violation (e.g. duplicate prize ids).
#[derive(Debug, Error, Clone)]
#[error("catalog is invalid: {reason}")]
pub struct InvalidCatalog {
    pub reason: String,
}

/// Canonical error enum for core capability.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum CoreError {
    #[error(transparent)]
    InvalidId(#[from] InvalidId),
    #[error(transparent)]
    InvalidTier(#[from] InvalidTier),
    #[error(transparent)]
    InvalidPrize(#[from] InvalidPrize),
    #[error(transparent)]
    InvalidCatalog(#[from] InvalidCatalog),
}

impl CoreError {
    pub fn transience(&self) -> Transience {
        // Core errors are pure domain/input failures.
        Transience::Permanent
    }

    pub fn effect(&self) -> Effect {
        Effect::None
    }
}
