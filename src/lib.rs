//! Oral Messages Byzantine agreement, OM(m)
//!
//! - `agreement` - path tree, relay, majority aggregation, traitor strategies
//! - `config` - simulation configuration from code or environment
//! - `simulation` - round driver, runners, outcome reporting
//! - `logger` - tracing subscriber setup

pub mod agreement;
pub mod config;
pub mod logger;
pub mod simulation;

pub use agreement::{AgreementError, AgreementResult, Message, PathTree, RelayPath};
pub use config::SimulationConfig;
pub use simulation::{Outcome, Simulation};
