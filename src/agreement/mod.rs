//! Oral Messages agreement core, OM(m)
//!
//! A commander broadcasts an order, every lieutenant relays what it heard
//! over `m + 1` rounds, and each general reduces the values it collected to
//! one decision by bottom-up majority over the relay path tree.
//!
//! ## Structure
//! - `types.rs` - Orders, relay paths, ledger records
//! - `tree.rs` - Relay path tree, built once per `(n, m)`
//! - `ledger.rs` / `participant.rs` - Per-general state
//! - `relay.rs` - One round of message relay
//! - `decision.rs` - Majority aggregation
//! - `traits.rs` - Corruption strategy trait
//! - `strategies/` - Traitor behaviours
//! - `reference.rs` - Recursive evaluation for cross-checking
//! - `tests.rs` - Protocol-level tests

// Re-export public API
pub use error::{AgreementError, AgreementResult, ConfigError};
pub use traits::CorruptionStrategy;
pub use types::{
    Delivery, FaultPolicy, Message, ParticipantId, PathRecord, RelayPath, COMMANDER,
};

pub mod decision;
pub mod ledger;
pub mod participant;
pub mod reference;
pub mod relay;
pub mod strategies;
pub mod tree;

pub use decision::decide;
pub use participant::Participant;
pub use reference::ReferenceEvaluator;
pub use relay::relay;
pub use strategies::StrategyKind;
pub use tree::PathTree;


// Internal modules
mod error;
mod traits;
mod types;
