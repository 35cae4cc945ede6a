//! Traitor corruption strategies

pub mod fixed;
pub mod parity;

pub use fixed::{AlwaysFlip, ConstantLie, Honest};
pub use parity::ParityFlip;

use crate::agreement::traits::CorruptionStrategy;
use crate::agreement::types::Message;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Named strategies selectable from configuration
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Flip the value for even-numbered recipients
    #[default]
    Parity,
    AlwaysFlip,
    /// Always send the given order
    Constant(Message),
    Honest,
}

impl StrategyKind {
    pub fn build(self) -> Arc<dyn CorruptionStrategy> {
        match self {
            StrategyKind::Parity => Arc::new(ParityFlip),
            StrategyKind::AlwaysFlip => Arc::new(AlwaysFlip),
            StrategyKind::Constant(value) => Arc::new(ConstantLie::new(value)),
            StrategyKind::Honest => Arc::new(Honest),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Parity => write!(f, "parity"),
            StrategyKind::AlwaysFlip => write!(f, "always-flip"),
            StrategyKind::Constant(value) => write!(f, "constant-{}", value),
            StrategyKind::Honest => write!(f, "honest"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase().replace('_', "-");
        match name.as_str() {
            "parity" => Ok(StrategyKind::Parity),
            "always-flip" | "flip" => Ok(StrategyKind::AlwaysFlip),
            "honest" => Ok(StrategyKind::Honest),
            other => match other.strip_prefix("constant-") {
                Some(value) => Ok(StrategyKind::Constant(value.parse()?)),
                None => Err(format!("unknown corruption strategy '{}'", other)),
            },
        }
    }
}
