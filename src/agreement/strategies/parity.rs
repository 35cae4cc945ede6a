//! Parity flip - the traitor lies to every even-numbered recipient

use crate::agreement::traits::CorruptionStrategy;
use crate::agreement::types::{Message, ParticipantId};

/// Flips the forwarded value when the recipient id is even, whatever the
/// path or round. Odd recipients get the value unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParityFlip;

impl CorruptionStrategy for ParityFlip {
    fn corrupt(&self, _sender: ParticipantId, recipient: ParticipantId, value: Message) -> Message {
        if recipient % 2 == 0 {
            value.flipped()
        } else {
            value
        }
    }

    fn name(&self) -> &str {
        "Parity Flip"
    }
}
