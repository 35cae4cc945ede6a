//! A general taking part in the agreement

use crate::agreement::ledger::Ledger;
use crate::agreement::types::{Message, ParticipantId, PathRecord, RelayPath, COMMANDER};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A general with its own ledger.
///
/// The ledger sits behind a lock because other participants deliver into it
/// while this participant relays from it. Only the owner reads it to relay
/// or decide.
#[derive(Debug)]
pub struct Participant {
    id: ParticipantId,
    traitor: bool,
    order: Message,
    ledger: RwLock<Ledger>,
}

impl Participant {
    pub fn new(id: ParticipantId, traitor: bool, order: Message) -> Self {
        Participant {
            id,
            traitor,
            order,
            ledger: RwLock::new(Ledger::new(order)),
        }
    }

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn is_traitor(&self) -> bool {
        self.traitor
    }

    pub fn is_commander(&self) -> bool {
        self.id == COMMANDER
    }

    /// The commander's original order, as seeded into every ledger
    pub fn order(&self) -> Message {
        self.order
    }

    /// Record a value delivered along `path`
    pub fn receive(&self, path: RelayPath, value: Message) {
        let previous = self
            .ledger
            .write()
            .insert(path.clone(), PathRecord::received(value));
        if previous.is_some() {
            tracing::warn!(participant = self.id, path = %path, "Path delivered twice");
        }
    }

    pub fn record(&self, path: &RelayPath) -> Option<PathRecord> {
        self.ledger.read().get(path).copied()
    }

    pub fn ledger(&self) -> RwLockReadGuard<'_, Ledger> {
        self.ledger.read()
    }

    pub(crate) fn ledger_mut(&self) -> RwLockWriteGuard<'_, Ledger> {
        self.ledger.write()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_creation() {
        let commander = Participant::new(0, false, Message::Attack);
        assert!(commander.is_commander());
        assert!(!commander.is_traitor());

        let traitor = Participant::new(3, true, Message::Attack);
        assert!(!traitor.is_commander());
        assert!(traitor.is_traitor());
        assert_eq!(traitor.order(), Message::Attack);
        assert!(traitor.ledger().is_empty());
    }

    #[test]
    fn test_receive_records_value_with_undecided_output() {
        let lieutenant = Participant::new(1, false, Message::Attack);
        let path = RelayPath::root();
        lieutenant.receive(path.clone(), Message::Retreat);

        let record = lieutenant.record(&path).unwrap();
        assert_eq!(record.input, Message::Retreat);
        assert_eq!(record.output, None);
    }
}
