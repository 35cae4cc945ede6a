//! Relay path tree
//!
//! The tree enumerates every route a value can take over `m + 1` rounds
//! among `n` generals. It depends only on `(n, m)`, is built once before
//! any round runs, and is shared read-only between all participants.

use crate::agreement::types::{ParticipantId, RelayPath};
use std::collections::{BTreeMap, HashMap};

/// Round -> sender -> paths that sender transmits in that round
pub type RoundIndex = BTreeMap<usize, BTreeMap<ParticipantId, Vec<RelayPath>>>;

/// Path -> immediate children, in ascending order of the appended id
pub type ChildIndex = HashMap<RelayPath, Vec<RelayPath>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTree {
    generals: usize,
    tolerance: usize,
    rounds: RoundIndex,
    children: ChildIndex,
}

impl PathTree {
    /// Build the complete tree for `generals` participants tolerating
    /// `tolerance` traitors.
    pub fn build(generals: usize, tolerance: usize) -> Self {
        let mut tree = PathTree {
            generals,
            tolerance,
            rounds: RoundIndex::new(),
            children: ChildIndex::new(),
        };
        let eligible = vec![true; generals.max(1)];
        tree.expand(RelayPath::root(), 0, eligible);

        tracing::debug!(
            generals,
            tolerance,
            paths = tree.len(),
            leaves = tree.leaf_count(),
            "Path tree built"
        );
        tree
    }

    fn expand(&mut self, path: RelayPath, round: usize, mut eligible: Vec<bool>) {
        let holder = path.sender();
        eligible[holder] = false;

        self.rounds
            .entry(round)
            .or_default()
            .entry(holder)
            .or_default()
            .push(path.clone());

        if round >= self.tolerance {
            return;
        }

        let next: Vec<ParticipantId> = eligible
            .iter()
            .enumerate()
            .filter_map(|(id, &open)| open.then_some(id))
            .collect();

        let mut kids = Vec::with_capacity(next.len());
        for id in next {
            let child = path.child(id);
            self.expand(child.clone(), round + 1, eligible.clone());
            kids.push(child);
        }
        if !kids.is_empty() {
            self.children.insert(path, kids);
        }
    }

    pub fn generals(&self) -> usize {
        self.generals
    }

    pub fn tolerance(&self) -> usize {
        self.tolerance
    }

    /// Number of rounds, `m + 1`
    pub fn depth(&self) -> usize {
        self.tolerance + 1
    }

    /// Paths `sender` transmits in `round`
    pub fn paths_for(&self, round: usize, sender: ParticipantId) -> &[RelayPath] {
        self.rounds
            .get(&round)
            .and_then(|by_sender| by_sender.get(&sender))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All paths of a round, grouped by ascending sender id
    pub fn paths_in_round(&self, round: usize) -> impl Iterator<Item = &RelayPath> {
        self.rounds
            .get(&round)
            .into_iter()
            .flat_map(|by_sender| by_sender.values())
            .flatten()
    }

    /// Immediate children of `path`, `None` for leaves and unknown paths
    pub fn children(&self, path: &RelayPath) -> Option<&[RelayPath]> {
        self.children.get(path).map(Vec::as_slice)
    }

    pub fn rounds(&self) -> &RoundIndex {
        &self.rounds
    }

    pub fn child_index(&self) -> &ChildIndex {
        &self.children
    }

    /// Number of paths in the deepest round
    pub fn leaf_count(&self) -> usize {
        self.paths_in_round(self.tolerance).count()
    }

    /// Total number of paths over all rounds
    pub fn len(&self) -> usize {
        self.rounds
            .values()
            .flat_map(|by_sender| by_sender.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, path: &RelayPath) -> bool {
        self.paths_for(path.round(), path.sender()).contains(path)
    }

    /// The path whose aggregated value is a lieutenant's decision
    pub fn decision_path(&self) -> RelayPath {
        debug_assert!(self.contains(&RelayPath::root()));
        RelayPath::root()
    }
}
