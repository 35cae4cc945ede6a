//! One round of oral message relay
//!
//! A relay is split in two halves so that senders of the same round can run
//! in parallel: [`outgoing`] only reads the sender's own ledger, [`deliver`]
//! only writes recipients' ledgers. Paths of one round are disjoint per
//! sender, so deliveries from different senders never collide.

use crate::agreement::error::{AgreementError, AgreementResult};
use crate::agreement::participant::Participant;
use crate::agreement::traits::CorruptionStrategy;
use crate::agreement::tree::PathTree;
use crate::agreement::types::{Delivery, ParticipantId};
use tracing::debug;

/// Every value `sender` forwards in `round`.
///
/// Each path the sender transmits this round extends a path it received in
/// the previous round (or the commander's original order in round 0). The
/// value goes to every lieutenant, the sender included, so each relayer
/// keeps a copy of what it forwarded.
pub fn outgoing(
    round: usize,
    sender: &Participant,
    tree: &PathTree,
    strategy: &dyn CorruptionStrategy,
) -> AgreementResult<Vec<Delivery>> {
    let paths = tree.paths_for(round, sender.id());
    if paths.is_empty() {
        return Ok(Vec::new());
    }

    let lieutenants = tree.generals().saturating_sub(1);
    let mut deliveries = Vec::with_capacity(paths.len() * lieutenants);
    let ledger = sender.ledger();

    for path in paths {
        let parent = path.parent();
        let value = ledger.received_at(parent.as_ref()).ok_or_else(|| {
            AgreementError::MissingParentRecord {
                participant: sender.id(),
                path: path.clone(),
            }
        })?;

        for recipient in 1..tree.generals() {
            let forwarded = if sender.is_traitor() {
                strategy.corrupt(sender.id(), recipient, value)
            } else {
                value
            };
            deliveries.push(Delivery {
                recipient,
                path: path.clone(),
                value: forwarded,
            });
        }
    }

    Ok(deliveries)
}

/// Write deliveries into their recipients' ledgers
pub fn deliver(deliveries: Vec<Delivery>, participants: &[Participant]) -> AgreementResult<()> {
    for delivery in deliveries {
        let recipient = lookup(participants, delivery.recipient)?;
        recipient.receive(delivery.path, delivery.value);
    }
    Ok(())
}

/// Run `sender`'s part of `round`: forward along every path it owns this
/// round to all lieutenants. Returns the number of values delivered.
pub fn relay(
    round: usize,
    sender: &Participant,
    participants: &[Participant],
    tree: &PathTree,
    strategy: &dyn CorruptionStrategy,
) -> AgreementResult<usize> {
    let deliveries = outgoing(round, sender, tree, strategy)?;
    let count = deliveries.len();
    deliver(deliveries, participants)?;

    if count > 0 {
        debug!(
            round,
            sender = sender.id(),
            traitor = sender.is_traitor(),
            deliveries = count,
            "Relayed"
        );
    }
    Ok(count)
}

fn lookup(participants: &[Participant], id: ParticipantId) -> AgreementResult<&Participant> {
    participants
        .get(id)
        .filter(|p| p.id() == id)
        .ok_or(AgreementError::UnknownParticipant(id))
}
