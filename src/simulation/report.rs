//! Run outcome and reporting

use crate::agreement::{Message, ParticipantId, COMMANDER};
use crate::config::SimulationConfig;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub runner: String,
    pub generals: usize,
    pub tolerance: usize,
    pub traitors: Vec<ParticipantId>,
    pub order: Message,
    pub strategy: String,
    pub decisions: BTreeMap<ParticipantId, Message>,
    pub loyal_lieutenants: Vec<ParticipantId>,
    /// Every loyal lieutenant decided the same order
    pub agreement: bool,
    /// Every loyal lieutenant decided the commander's order
    pub validity: bool,
    pub elapsed_ms: u64,
    pub completed_at: i64,
}

impl Outcome {
    pub fn new(
        runner: &str,
        config: &SimulationConfig,
        decisions: BTreeMap<ParticipantId, Message>,
        elapsed_ms: u64,
    ) -> Self {
        let loyal_lieutenants = config.loyal_lieutenants();
        let loyal: Vec<Message> = loyal_lieutenants
            .iter()
            .filter_map(|id| decisions.get(id).copied())
            .collect();
        let agreement = loyal.windows(2).all(|pair| pair[0] == pair[1]);
        let validity = loyal.iter().all(|decision| *decision == config.order);

        Outcome {
            runner: runner.to_string(),
            generals: config.generals,
            tolerance: config.tolerance,
            traitors: config.traitors.iter().copied().collect(),
            order: config.order,
            strategy: config.strategy.to_string(),
            decisions,
            loyal_lieutenants,
            agreement,
            validity,
            elapsed_ms,
            completed_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn decision(&self, id: ParticipantId) -> Option<Message> {
        self.decisions.get(&id).copied()
    }

    /// The order loyal lieutenants agreed on, if they agreed
    pub fn agreed_order(&self) -> Option<Message> {
        if !self.agreement {
            return None;
        }
        match self.loyal_lieutenants.first() {
            Some(id) => self.decision(*id),
            None => Some(self.order),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Print one line per general followed by a summary
pub fn print_outcome(outcome: &Outcome) {
    println!("\n{}", "=".repeat(60));
    println!(
        "  OM({}) with {} generals - {}",
        outcome.tolerance, outcome.generals, outcome.runner
    );
    println!("{}", "=".repeat(60));

    for (id, decision) in &outcome.decisions {
        let role = if *id == COMMANDER {
            "commander"
        } else if outcome.traitors.contains(id) {
            "traitor"
        } else {
            "loyal"
        };
        println!("General {}: {} ({})", id, decision, role);
    }

    println!("{}", "-".repeat(60));
    println!("Strategy:  {}", outcome.strategy);
    println!("Agreement: {}", if outcome.agreement { "Yes" } else { "No" });
    println!("Validity:  {}", if outcome.validity { "Yes" } else { "No" });
    println!("Time (ms): {}", outcome.elapsed_ms);
    println!("{}", "=".repeat(60));
    println!();
}

/// Print outcomes of several runners side by side
pub fn print_runner_comparison(outcomes: &[Outcome]) {
    println!("\n{}", "=".repeat(100));
    println!("  Runner Comparison");
    println!("{}", "=".repeat(100));
    println!();
    println!(
        "{:<20} | {:<10} | {:<10} | {:<10} | {:<40}",
        "Runner", "Agreement", "Validity", "Time (ms)", "Decisions"
    );
    println!("{}", "-".repeat(100));

    for outcome in outcomes {
        let decisions: Vec<String> = outcome
            .decisions
            .iter()
            .map(|(id, decision)| format!("{}:{}", id, decision))
            .collect();
        println!(
            "{:<20} | {:<10} | {:<10} | {:<10} | {}",
            outcome.runner,
            if outcome.agreement { "Yes" } else { "No" },
            if outcome.validity { "Yes" } else { "No" },
            outcome.elapsed_ms,
            decisions.join(" ")
        );
    }

    println!("{}", "=".repeat(100));
    println!();
}
