//! Policy constants that shape assignment and scoring.
//!
//! # Responsibility
//! - Map skill levels to per-day task quotas.
//! - Map assessment scores to skill levels.
//!
//! # Invariants
//! - Policies are pure lookups with no side effects.
//! - Policy values come from configuration; defaults match the product rules.

pub mod quota;
pub mod scoring;
