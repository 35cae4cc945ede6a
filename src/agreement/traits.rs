//! Traitor behaviour trait definition

use crate::agreement::types::{Message, ParticipantId};

/// Corruption strategy - decides what a traitor forwards
///
/// Loyal participants never consult the strategy. Implementations must be
/// pure so that a run is reproducible.
pub trait CorruptionStrategy: Send + Sync {
    /// Value a traitorous `sender` forwards to `recipient` in place of `value`
    fn corrupt(&self, sender: ParticipantId, recipient: ParticipantId, value: Message) -> Message;

    /// Get the strategy name
    fn name(&self) -> &str;
}
