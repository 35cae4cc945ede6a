//! Runners that execute a whole simulation

use crate::agreement::AgreementResult;
use crate::config::SimulationConfig;
use crate::simulation::{Outcome, Simulation};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

#[async_trait]
pub trait AgreementRunner: Send + Sync {
    /// Run every round for `config` and collect the decisions
    async fn run(&self, config: &SimulationConfig) -> AgreementResult<Outcome>;

    /// Get the runner name
    fn name(&self) -> &str;
}

/// Relays every sender of a round in turn on the calling task
pub struct SequentialRunner;

#[async_trait]
impl AgreementRunner for SequentialRunner {
    async fn run(&self, config: &SimulationConfig) -> AgreementResult<Outcome> {
        let start = Instant::now();
        let mut simulation = Simulation::new(config.clone())?;
        simulation.run_all_rounds()?;
        let decisions = simulation.decisions()?;
        let elapsed = start.elapsed().as_millis() as u64;

        let outcome = Outcome::new(self.name(), config, decisions, elapsed);
        log_finished(&outcome);
        Ok(outcome)
    }

    fn name(&self) -> &str {
        "Sequential"
    }
}

/// Relays the senders of a round on separate tokio tasks and waits for all
/// of them before starting the next round
pub struct ConcurrentRunner;

#[async_trait]
impl AgreementRunner for ConcurrentRunner {
    async fn run(&self, config: &SimulationConfig) -> AgreementResult<Outcome> {
        let start = Instant::now();
        let mut simulation = Simulation::new(config.clone())?;
        simulation.run_all_rounds_concurrent().await?;
        let decisions = simulation.decisions()?;
        let elapsed = start.elapsed().as_millis() as u64;

        let outcome = Outcome::new(self.name(), config, decisions, elapsed);
        log_finished(&outcome);
        Ok(outcome)
    }

    fn name(&self) -> &str {
        "Concurrent"
    }
}

/// The runner `config` asks for
pub fn runner_for(config: &SimulationConfig) -> Arc<dyn AgreementRunner> {
    if config.concurrent {
        Arc::new(ConcurrentRunner)
    } else {
        Arc::new(SequentialRunner)
    }
}

/// Run the same configuration through each runner
pub async fn compare_runners(
    config: &SimulationConfig,
    runners: Vec<Arc<dyn AgreementRunner>>,
) -> Vec<AgreementResult<Outcome>> {
    let mut outcomes = Vec::with_capacity(runners.len());
    for runner in runners {
        outcomes.push(runner.run(config).await);
    }
    outcomes
}

fn log_finished(outcome: &Outcome) {
    crate::log_with_context!(
        info,
        runner = %outcome.runner,
        agreement = outcome.agreement,
        validity = outcome.validity,
        elapsed_ms = outcome.elapsed_ms,
        "Simulation finished"
    );
}
