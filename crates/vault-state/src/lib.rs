//! Ledger Vault State - Replica stores and reconciliation
//!
//! This crate implements:
//! - The `KeyData` store capability
//! - An in-memory replica
//! - The equal-version tie-break policy
//! - Planning and execution of reconciliation between two replicas

pub mod policy;
pub mod reconcile;
pub mod store;

pub use policy::*;
pub use reconcile::*;
pub use store::*;
