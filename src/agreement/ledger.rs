//! Per-participant record of values received along each relay path

use crate::agreement::types::{Message, PathRecord, RelayPath};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Ledger {
    /// Commander's original order, the parent value of the root path
    root: PathRecord,
    records: HashMap<RelayPath, PathRecord>,
}

impl Ledger {
    pub fn new(order: Message) -> Self {
        Ledger {
            root: PathRecord {
                input: order,
                output: Some(Message::Retreat),
            },
            records: HashMap::new(),
        }
    }

    pub fn root(&self) -> &PathRecord {
        &self.root
    }

    pub fn get(&self, path: &RelayPath) -> Option<&PathRecord> {
        self.records.get(path)
    }

    /// Value received at `parent`, or the original order when `parent` is
    /// `None`
    pub fn received_at(&self, parent: Option<&RelayPath>) -> Option<Message> {
        match parent {
            None => Some(self.root.input),
            Some(path) => self.records.get(path).map(|record| record.input),
        }
    }

    /// Store a delivered record. Returns the record previously held for the
    /// same path, if any.
    pub fn insert(&mut self, path: RelayPath, record: PathRecord) -> Option<PathRecord> {
        self.records.insert(path, record)
    }

    /// Set the aggregated value of an existing record. Returns `false` when
    /// no record exists for `path`.
    pub fn set_output(&mut self, path: &RelayPath, output: Message) -> bool {
        match self.records.get_mut(path) {
            Some(record) => {
                record.output = Some(output);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RelayPath, &PathRecord)> {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ledger_holds_only_the_root_entry() {
        let ledger = Ledger::new(Message::Attack);
        assert!(ledger.is_empty());
        assert_eq!(ledger.root().input, Message::Attack);
        assert_eq!(ledger.root().output, Some(Message::Retreat));
        assert_eq!(ledger.received_at(None), Some(Message::Attack));
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut ledger = Ledger::new(Message::Attack);
        let path = RelayPath::root().child(2);

        assert_eq!(ledger.received_at(Some(&path)), None);
        assert!(ledger
            .insert(path.clone(), PathRecord::received(Message::Retreat))
            .is_none());
        assert_eq!(ledger.received_at(Some(&path)), Some(Message::Retreat));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_set_output_requires_existing_record() {
        let mut ledger = Ledger::new(Message::Attack);
        let path = RelayPath::root();

        assert!(!ledger.set_output(&path, Message::Attack));
        ledger.insert(path.clone(), PathRecord::received(Message::Attack));
        assert!(ledger.set_output(&path, Message::Attack));
        assert_eq!(ledger.get(&path).unwrap().output, Some(Message::Attack));
    }
}
