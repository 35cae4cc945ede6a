//! Simulation configuration
//!
//! Built programmatically or read from the environment (a `.env` file is
//! honoured). Everything is checked by [`SimulationConfig::validate`] before
//! any round runs; nothing is clamped silently.

use crate::agreement::{ConfigError, FaultPolicy, Message, ParticipantId, StrategyKind, COMMANDER};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;
use tracing::warn;

pub const ENV_GENERALS: &str = "OM_GENERALS";
pub const ENV_TOLERANCE: &str = "OM_TOLERANCE";
pub const ENV_TRAITORS: &str = "OM_TRAITORS";
pub const ENV_ORDER: &str = "OM_ORDER";
pub const ENV_STRATEGY: &str = "OM_STRATEGY";
pub const ENV_FAULT_POLICY: &str = "OM_FAULT_POLICY";
pub const ENV_CONCURRENT: &str = "OM_CONCURRENT";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Total number of generals, commander included
    pub generals: usize,
    /// Number of traitors the run is built to tolerate, `m`
    pub tolerance: usize,
    pub traitors: BTreeSet<ParticipantId>,
    /// Commander's original order
    pub order: Message,
    pub strategy: StrategyKind,
    pub fault_policy: FaultPolicy,
    /// Relay each round's senders in parallel
    pub concurrent: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig::new(7, 2).with_traitors([5, 6])
    }
}

impl SimulationConfig {
    pub fn new(generals: usize, tolerance: usize) -> Self {
        SimulationConfig {
            generals,
            tolerance,
            traitors: BTreeSet::new(),
            order: Message::Attack,
            strategy: StrategyKind::default(),
            fault_policy: FaultPolicy::default(),
            concurrent: false,
        }
    }

    pub fn with_traitors<I>(mut self, traitors: I) -> Self
    where
        I: IntoIterator<Item = ParticipantId>,
    {
        self.traitors = traitors.into_iter().collect();
        self
    }

    pub fn with_order(mut self, order: Message) -> Self {
        self.order = order;
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.fault_policy = policy;
        self
    }

    pub fn with_concurrency(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// Read the configuration from process environment variables, loading
    /// `.env` first. Unset variables fall back to [`Default`].
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SimulationConfig::default();

        let traitors = match lookup(ENV_TRAITORS) {
            Some(raw) => parse_id_list(ENV_TRAITORS, &raw)?,
            None => defaults.traitors.clone(),
        };

        Ok(SimulationConfig {
            generals: parse_var(&lookup, ENV_GENERALS, defaults.generals)?,
            tolerance: parse_var(&lookup, ENV_TOLERANCE, defaults.tolerance)?,
            traitors,
            order: parse_var(&lookup, ENV_ORDER, defaults.order)?,
            strategy: parse_var(&lookup, ENV_STRATEGY, defaults.strategy)?,
            fault_policy: parse_var(&lookup, ENV_FAULT_POLICY, defaults.fault_policy)?,
            concurrent: parse_var(&lookup, ENV_CONCURRENT, defaults.concurrent)?,
        })
    }

    /// Reject configurations the algorithm cannot run with.
    ///
    /// Configurations that run but lose the agreement guarantee (more
    /// traitors than tolerated, fewer than `3m + 1` generals) are accepted
    /// with a warning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generals < 1 {
            return Err(ConfigError::new(
                "generals",
                "at least one general (the commander) is required",
            ));
        }

        let max_tolerance = self.generals.saturating_sub(2);
        if self.tolerance > max_tolerance {
            return Err(ConfigError::new(
                "tolerance",
                format!(
                    "{} generals tolerate at most {} traitors, got {}",
                    self.generals, max_tolerance, self.tolerance
                ),
            ));
        }

        for &id in &self.traitors {
            if id == COMMANDER {
                return Err(ConfigError::new(
                    "traitors",
                    "the commander cannot be a traitor in this variant",
                ));
            }
            if id >= self.generals {
                return Err(ConfigError::new(
                    "traitors",
                    format!("traitor id {} is out of range 1..{}", id, self.generals),
                ));
            }
        }

        if self.traitors.len() > self.tolerance {
            warn!(
                traitors = self.traitors.len(),
                tolerance = self.tolerance,
                "More traitors than tolerated, agreement is not guaranteed"
            );
        }
        if self.tolerance > 0 && self.generals < 3 * self.tolerance + 1 {
            warn!(
                generals = self.generals,
                tolerance = self.tolerance,
                "Fewer than 3m+1 generals, agreement is not guaranteed"
            );
        }

        Ok(())
    }

    /// Lieutenants that are not traitors
    pub fn loyal_lieutenants(&self) -> Vec<ParticipantId> {
        (1..self.generals)
            .filter(|id| !self.traitors.contains(id))
            .collect()
    }

    pub fn is_traitor(&self, id: ParticipantId) -> bool {
        self.traitors.contains(&id)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::new(key, format!("cannot parse '{}': {}", raw, e))),
        _ => Ok(default),
    }
}

fn parse_id_list(key: &str, raw: &str) -> Result<BTreeSet<ParticipantId>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<ParticipantId>()
                .map_err(|e| ConfigError::new(key, format!("cannot parse id '{}': {}", part, e)))
        })
        .collect()
}
