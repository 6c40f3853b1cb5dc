//! Interaction and sequence definition types
//!
//! Definitions are the authored side of a machine: what interactions exist,
//! which actions each runs, and how interactions chain into sequences. They
//! are loaded from TOML and resolved into a [`Library`](crate::Library)
//! before the machine starts.

use serde::{Deserialize, Serialize};

use cadence_types::MachineSettings;

// ═══════════════════════════════════════════════════════════════════════════
// Sequences
// ═══════════════════════════════════════════════════════════════════════════

/// What starts a sequence on a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhenToStart {
    /// Started by a start-interaction call on the target
    #[default]
    OnSequenceStart,
    /// Started when the referenced interaction starts on the same target
    OnReferencedInteractionStart,
    /// Started when the referenced interaction ends on the same target
    OnReferencedInteractionEnd,
}

impl WhenToStart {
    pub fn is_referenced(self) -> bool {
        !matches!(self, Self::OnSequenceStart)
    }
}

/// An ordered chain of interactions with its trigger rule
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SequenceDefinition {
    #[serde(default)]
    pub when: WhenToStart,

    /// Interaction name the trigger listens to (referenced rules only)
    #[serde(default)]
    pub referenced: String,

    /// Interaction names, run one after another
    #[serde(default)]
    pub steps: Vec<String>,
}

impl SequenceDefinition {
    /// A sequence started directly by start-interaction calls
    pub fn on_start<S: Into<String>>(steps: impl IntoIterator<Item = S>) -> Self {
        Self {
            when: WhenToStart::OnSequenceStart,
            referenced: String::new(),
            steps: steps.into_iter().map(Into::into).collect(),
        }
    }

    /// A sequence started by another interaction starting or ending
    pub fn triggered<S: Into<String>>(
        when: WhenToStart,
        referenced: impl Into<String>,
        steps: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            when,
            referenced: referenced.into(),
            steps: steps.into_iter().map(Into::into).collect(),
        }
    }

    /// Does this sequence fire when `name` hits the `rule` transition?
    pub fn listens_to(&self, rule: WhenToStart, name: &str) -> bool {
        self.when == rule && self.when.is_referenced() && self.referenced == name
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Interactions
// ═══════════════════════════════════════════════════════════════════════════

/// Authored form of an interaction. Actions stay as raw tables until the
/// [`ActionRegistry`](crate::actions::ActionRegistry) builds them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InteractionDefinition {
    /// Unique name sequences refer to
    pub name: String,

    /// Seconds the interaction lasts before it ends
    #[serde(default)]
    pub duration: f32,

    // ─── Actions ────────────────────────────────────────────────────────────
    /// Paired actions, started with the interaction and ended with it
    #[serde(default)]
    pub start_end: Vec<toml::Table>,

    #[serde(default)]
    pub start: Vec<toml::Table>,

    /// Run every variable-rate tick
    #[serde(default)]
    pub tick: Vec<toml::Table>,

    /// Run every fixed-rate tick
    #[serde(default)]
    pub fixed_tick: Vec<toml::Table>,

    #[serde(default)]
    pub end: Vec<toml::Table>,
}

// ═══════════════════════════════════════════════════════════════════════════
// Config File Structure
// ═══════════════════════════════════════════════════════════════════════════

/// Root structure of a machine file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MachineConfig {
    #[serde(default)]
    pub settings: MachineSettings,

    #[serde(default, rename = "interaction")]
    pub interactions: Vec<InteractionDefinition>,

    #[serde(default, rename = "sequence")]
    pub sequences: Vec<SequenceDefinition>,
}
