use crate::actor::ActorId;
use crate::library::{InteractionId, SequenceId};

/// One target's live cursor through a sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceInstance {
    pub(crate) sequence: SequenceId,
    pub(crate) step: usize,
    pub(crate) interaction: InteractionId,
    pub(crate) elapsed: f32,
}

impl SequenceInstance {
    pub(crate) fn new(sequence: SequenceId, first: InteractionId) -> Self {
        Self {
            sequence,
            step: 0,
            interaction: first,
            elapsed: 0.0,
        }
    }

    pub fn sequence(&self) -> SequenceId {
        self.sequence
    }

    /// Index of the current step within the sequence
    pub fn step(&self) -> usize {
        self.step
    }

    /// Interaction the current step runs
    pub fn interaction(&self) -> InteractionId {
        self.interaction
    }

    /// Seconds spent in the current step
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

/// A registered target and its instances, in creation order
#[derive(Debug, Clone)]
pub struct TargetRecord {
    pub(crate) actor: ActorId,
    pub(crate) instances: Vec<SequenceInstance>,
}

impl TargetRecord {
    pub(crate) fn new(actor: ActorId) -> Self {
        Self {
            actor,
            instances: Vec::new(),
        }
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    pub fn instances(&self) -> &[SequenceInstance] {
        &self.instances
    }

    /// Is `sequence` currently instantiated for this target?
    pub fn is_active(&self, sequence: SequenceId) -> bool {
        self.instances.iter().any(|inst| inst.sequence == sequence)
    }
}
