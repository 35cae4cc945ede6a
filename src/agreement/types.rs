//! Agreement types and data structures

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Participant identifier. `0` is always the commander.
pub type ParticipantId = usize;

/// Identifier of the commander
pub const COMMANDER: ParticipantId = 0;

/// The two-valued order exchanged between generals
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Message {
    Attack,
    Retreat,
}

impl Message {
    /// The opposite order
    pub fn flipped(self) -> Self {
        match self {
            Message::Attack => Message::Retreat,
            Message::Retreat => Message::Attack,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Attack => write!(f, "attack"),
            Message::Retreat => write!(f, "retreat"),
        }
    }
}

impl FromStr for Message {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attack" => Ok(Message::Attack),
            "retreat" => Ok(Message::Retreat),
            other => Err(format!("unknown order '{}' (expected attack or retreat)", other)),
        }
    }
}

/// Chain of senders a value travelled through, starting at the commander.
///
/// The last id is the participant that sent the value in the round the path
/// belongs to, so a path delivered in round `r` holds `r + 1` ids. Ids never
/// repeat within a path.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelayPath(Vec<ParticipantId>);

impl RelayPath {
    /// The path of the commander's own broadcast
    pub fn root() -> Self {
        RelayPath(vec![COMMANDER])
    }

    /// Build a path from explicit ids. Returns `None` when the ids do not
    /// start at the commander or contain a repeated id.
    pub fn from_ids(ids: &[ParticipantId]) -> Option<Self> {
        if ids.first() != Some(&COMMANDER) {
            return None;
        }
        let distinct = ids
            .iter()
            .enumerate()
            .all(|(i, id)| !ids[..i].contains(id));
        distinct.then(|| RelayPath(ids.to_vec()))
    }

    /// Path extended by one more sender
    pub fn child(&self, id: ParticipantId) -> Self {
        let mut ids = Vec::with_capacity(self.0.len() + 1);
        ids.extend_from_slice(&self.0);
        ids.push(id);
        RelayPath(ids)
    }

    /// Path with its last sender removed. `None` for the root path, whose
    /// parent is the commander's original value.
    pub fn parent(&self) -> Option<Self> {
        if self.0.len() <= 1 {
            return None;
        }
        Some(RelayPath(self.0[..self.0.len() - 1].to_vec()))
    }

    /// The participant that sends along this path
    pub fn sender(&self) -> ParticipantId {
        // Non-empty by construction
        self.0[self.0.len() - 1]
    }

    /// Round in which this path is transmitted
    pub fn round(&self) -> usize {
        self.0.len() - 1
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.0.contains(&id)
    }

    pub fn ids(&self) -> &[ParticipantId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RelayPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self.0.iter().map(|id| id.to_string()).collect();
        write!(f, "[{}]", ids.join("->"))
    }
}

/// What a participant holds for one relay path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathRecord {
    /// Value received along the path
    pub input: Message,
    /// Majority value, `None` until aggregation computes it
    pub output: Option<Message>,
}

impl PathRecord {
    pub fn received(input: Message) -> Self {
        PathRecord {
            input,
            output: None,
        }
    }

    /// Aggregated value, Retreat while still undecided
    pub fn decided(&self) -> Message {
        self.output.unwrap_or(Message::Retreat)
    }
}

/// One value travelling from a sender to a recipient along a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub recipient: ParticipantId,
    pub path: RelayPath,
    pub value: Message,
}

/// How aggregation reacts to records or tree entries that should exist but
/// do not.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FaultPolicy {
    /// Report the fault as an error
    #[default]
    Strict,
    /// Log the fault and fall back to Retreat
    Lenient,
}

impl FromStr for FaultPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(FaultPolicy::Strict),
            "lenient" => Ok(FaultPolicy::Lenient),
            other => Err(format!(
                "unknown fault policy '{}' (expected strict or lenient)",
                other
            )),
        }
    }
}

impl fmt::Display for FaultPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultPolicy::Strict => write!(f, "strict"),
            FaultPolicy::Lenient => write!(f, "lenient"),
        }
    }
}
