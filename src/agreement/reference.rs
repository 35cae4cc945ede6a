//! Recursive reference evaluation
//!
//! Computes the same decisions as relay + aggregation straight from the
//! delivery rule, with no path tree indexes and no ledgers. Exponential in
//! `m`, so only meant for cross-checking small runs.

use crate::agreement::decision::majority;
use crate::agreement::traits::CorruptionStrategy;
use crate::agreement::types::{Message, ParticipantId, RelayPath, COMMANDER};
use std::collections::{BTreeMap, BTreeSet};

pub struct ReferenceEvaluator<'a> {
    generals: usize,
    tolerance: usize,
    traitors: &'a BTreeSet<ParticipantId>,
    order: Message,
    strategy: &'a dyn CorruptionStrategy,
}

impl<'a> ReferenceEvaluator<'a> {
    pub fn new(
        generals: usize,
        tolerance: usize,
        traitors: &'a BTreeSet<ParticipantId>,
        order: Message,
        strategy: &'a dyn CorruptionStrategy,
    ) -> Self {
        Self {
            generals,
            tolerance,
            traitors,
            order,
            strategy,
        }
    }

    /// Value `recipient` receives along `path`
    fn received(&self, recipient: ParticipantId, path: &RelayPath) -> Message {
        let sender = path.sender();
        let value = match path.parent() {
            Some(parent) => self.received(sender, &parent),
            None => self.order,
        };
        if self.traitors.contains(&sender) {
            self.strategy.corrupt(sender, recipient, value)
        } else {
            value
        }
    }

    /// Value `participant` settles on for `path`
    fn value(&self, participant: ParticipantId, path: &RelayPath) -> Message {
        if path.round() >= self.tolerance {
            return self.received(participant, path);
        }
        let eligible: Vec<ParticipantId> =
            (1..self.generals).filter(|id| !path.contains(*id)).collect();
        let outputs = eligible
            .iter()
            .map(|id| self.value(participant, &path.child(*id)));
        majority(outputs, eligible.len())
    }

    /// Decision of every general, the commander included
    pub fn decisions(&self) -> BTreeMap<ParticipantId, Message> {
        let mut decisions = BTreeMap::new();
        decisions.insert(COMMANDER, self.order);
        for id in 1..self.generals {
            decisions.insert(id, self.value(id, &RelayPath::root()));
        }
        decisions
    }
}
