//! Simulation driver
//!
//! Owns one run of OM(m): validates the configuration, builds the path tree
//! once, creates the generals, drives the relay rounds strictly in order
//! and finally collects every general's decision.
//!
//! ## Structure
//! - `runners.rs` - Sequential and concurrent runners behind a common trait
//! - `report.rs` - Run outcome, agreement checks, printing
//! - `tests.rs` - End-to-end scenarios

pub use report::{print_outcome, print_runner_comparison, Outcome};
pub use runners::{compare_runners, runner_for, AgreementRunner, ConcurrentRunner, SequentialRunner};

pub mod report;
pub mod runners;

#[cfg(test)]
#[path = "tests.rs"]
mod tests;

use crate::agreement::relay::{deliver, outgoing};
use crate::agreement::{
    decide, relay, AgreementError, AgreementResult, CorruptionStrategy, Message, Participant,
    ParticipantId, PathTree, ReferenceEvaluator,
};
use crate::config::SimulationConfig;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info};

pub struct Simulation {
    config: SimulationConfig,
    tree: Arc<PathTree>,
    participants: Arc<Vec<Participant>>,
    strategy: Arc<dyn CorruptionStrategy>,
    next_round: usize,
}

impl Simulation {
    /// Create a simulation using the strategy named in `config`
    pub fn new(config: SimulationConfig) -> AgreementResult<Self> {
        let strategy = config.strategy.build();
        Self::with_strategy(config, strategy)
    }

    /// Create a simulation with a custom traitor strategy
    pub fn with_strategy(
        config: SimulationConfig,
        strategy: Arc<dyn CorruptionStrategy>,
    ) -> AgreementResult<Self> {
        config.validate()?;

        let tree = Arc::new(PathTree::build(config.generals, config.tolerance));
        let participants = (0..config.generals)
            .map(|id| Participant::new(id, config.is_traitor(id), config.order))
            .collect();

        info!(
            generals = config.generals,
            tolerance = config.tolerance,
            traitors = ?config.traitors,
            order = %config.order,
            strategy = strategy.name(),
            paths = tree.len(),
            "Simulation created"
        );

        Ok(Simulation {
            config,
            tree,
            participants: Arc::new(participants),
            strategy,
            next_round: 0,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn tree(&self) -> &Arc<PathTree> {
        &self.tree
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(id)
    }

    pub fn strategy(&self) -> &Arc<dyn CorruptionStrategy> {
        &self.strategy
    }

    /// Next round to relay
    pub fn next_round(&self) -> usize {
        self.next_round
    }

    /// Whether every round has been relayed
    pub fn is_complete(&self) -> bool {
        self.next_round >= self.tree.depth()
    }

    fn check_round(&self, round: usize) -> AgreementResult<()> {
        if round != self.next_round || self.is_complete() {
            return Err(AgreementError::RoundOutOfOrder {
                expected: self.next_round,
                requested: round,
            });
        }
        Ok(())
    }

    /// Relay `round` for every general, one after another. Returns the
    /// number of values delivered.
    pub fn run_round(&mut self, round: usize) -> AgreementResult<usize> {
        self.check_round(round)?;

        let mut delivered = 0;
        for sender in self.participants.iter() {
            delivered += relay(
                round,
                sender,
                &self.participants,
                &self.tree,
                self.strategy.as_ref(),
            )?;
        }

        self.next_round += 1;
        debug!(round, delivered, "Round complete");
        Ok(delivered)
    }

    /// Relay `round` with one task per sender. All tasks finish before this
    /// returns, so the next round sees every delivery.
    pub async fn run_round_concurrent(&mut self, round: usize) -> AgreementResult<usize> {
        self.check_round(round)?;

        let mut tasks = JoinSet::new();
        for id in 0..self.participants.len() {
            let participants = Arc::clone(&self.participants);
            let tree = Arc::clone(&self.tree);
            let strategy = Arc::clone(&self.strategy);
            tasks.spawn(async move {
                let deliveries = outgoing(round, &participants[id], &tree, strategy.as_ref())?;
                let count = deliveries.len();
                deliver(deliveries, &participants)?;
                Ok::<usize, AgreementError>(count)
            });
        }

        let mut delivered = 0;
        while let Some(joined) = tasks.join_next().await {
            delivered += joined??;
        }

        self.next_round += 1;
        debug!(round, delivered, "Round complete (concurrent)");
        Ok(delivered)
    }

    /// Relay every remaining round in order
    pub fn run_all_rounds(&mut self) -> AgreementResult<()> {
        while !self.is_complete() {
            self.run_round(self.next_round)?;
        }
        Ok(())
    }

    pub async fn run_all_rounds_concurrent(&mut self) -> AgreementResult<()> {
        while !self.is_complete() {
            self.run_round_concurrent(self.next_round).await?;
        }
        Ok(())
    }

    /// Decision of every general. Lieutenants aggregate their ledgers; the
    /// commander reports its original order.
    pub fn decisions(&self) -> AgreementResult<BTreeMap<ParticipantId, Message>> {
        if !self.is_complete() {
            return Err(AgreementError::RoundsIncomplete {
                completed: self.next_round,
                required: self.tree.depth(),
            });
        }

        let mut decisions = BTreeMap::new();
        for participant in self.participants.iter() {
            let decision = decide(participant, &self.tree, self.config.fault_policy)?;
            debug!(
                general = participant.id(),
                traitor = participant.is_traitor(),
                decision = %decision,
                "Decided"
            );
            decisions.insert(participant.id(), decision);
        }
        Ok(decisions)
    }

    /// Decisions computed recursively without the tree, for cross-checking
    pub fn reference_decisions(&self) -> BTreeMap<ParticipantId, Message> {
        ReferenceEvaluator::new(
            self.config.generals,
            self.config.tolerance,
            &self.config.traitors,
            self.config.order,
            self.strategy.as_ref(),
        )
        .decisions()
    }
}
