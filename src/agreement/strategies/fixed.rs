//! Strategies that ignore who receives the value

use crate::agreement::traits::CorruptionStrategy;
use crate::agreement::types::{Message, ParticipantId};

/// Always forwards the opposite of what was received
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFlip;

impl CorruptionStrategy for AlwaysFlip {
    fn corrupt(&self, _sender: ParticipantId, _recipient: ParticipantId, value: Message) -> Message {
        value.flipped()
    }

    fn name(&self) -> &str {
        "Always Flip"
    }
}

/// Forwards one fixed order regardless of the value received
#[derive(Debug, Clone, Copy)]
pub struct ConstantLie {
    value: Message,
}

impl ConstantLie {
    pub fn new(value: Message) -> Self {
        Self { value }
    }
}

impl CorruptionStrategy for ConstantLie {
    fn corrupt(&self, _sender: ParticipantId, _recipient: ParticipantId, _value: Message) -> Message {
        self.value
    }

    fn name(&self) -> &str {
        "Constant Lie"
    }
}

/// A traitor that behaves loyally, useful as a baseline
#[derive(Debug, Clone, Copy, Default)]
pub struct Honest;

impl CorruptionStrategy for Honest {
    fn corrupt(&self, _sender: ParticipantId, _recipient: ParticipantId, value: Message) -> Message {
        value
    }

    fn name(&self) -> &str {
        "Honest"
    }
}
