//! Machine-wide behavior settings.
//!
//! These are the knobs a designer picks once per machine: how targets get
//! collected, when interaction starts on its own, who it starts on, when a
//! target is retired, and what a second start call on a busy target does.

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════
// Sides
// ═══════════════════════════════════════════════════════════════════════════

/// Which of the two actors an action applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSide {
    /// The machine's owner (the actor calling into the target)
    Caller,
    /// The actor the interaction runs against
    #[default]
    Target,
}

impl TargetSide {
    /// Pick the value belonging to this side
    ///
    /// ```
    /// use cadence_types::TargetSide;
    /// assert_eq!(TargetSide::Caller.pick(1, 2), 1);
    /// assert_eq!(TargetSide::Target.pick(1, 2), 2);
    /// ```
    pub fn pick<T>(self, caller: T, target: T) -> T {
        match self {
            Self::Caller => caller,
            Self::Target => target,
        }
    }

    /// The opposite side
    pub fn other(self) -> Self {
        match self {
            Self::Caller => Self::Target,
            Self::Target => Self::Caller,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Policies
// ═══════════════════════════════════════════════════════════════════════════

/// When the machine starts interaction on its own after a target enters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartDispatch {
    /// Only explicit start calls start interaction
    #[default]
    Never,
    /// Every enter event dispatches
    OnEnter,
    /// Dispatch once the registered caller count equals the target count
    WhenCallersMatchTargets,
}

/// Who an automatic dispatch starts interaction on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    /// Every registered target
    #[default]
    AllTargets,
    /// Only the most recently registered target
    MostRecentTarget,
    /// Every target except the most recently registered one
    AllButMostRecentTarget,
    /// The machine's owner as the sole target
    OwnerOnly,
}

/// What retires a target's sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalMode {
    /// Steps end when their duration runs out; a target retires when its
    /// last sequence finishes
    #[default]
    AfterDuration,
    /// Steps never end by time; a target retires when it exits
    OnExit,
}

/// What a start call does on a target that already has running sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecallPolicy {
    /// Drop the call
    #[default]
    Ignore,
    /// Throw away running sequences (no end callbacks) and start fresh
    RestartInteraction,
    /// Replay the start of every auto-start sequence, creating the ones that
    /// are not running
    RecallFirstInteractionsWithoutRestarting,
    /// Replay the start of every running step, keeping its timer
    RecallCurrentInteractionsInSequenceWithoutRestarting,
    /// Replay the start of every running step and reset its timer
    RecallCurrentInteractionsInSequenceAndResetItsTime,
}

// ═══════════════════════════════════════════════════════════════════════════
// Settings
// ═══════════════════════════════════════════════════════════════════════════

/// Per-machine behavior settings (the `[settings]` table of a machine file)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MachineSettings {
    /// Register an actor as a target when it enters
    #[serde(default)]
    pub collect_targets_on_enter: bool,

    /// When an enter event starts interaction
    #[serde(default)]
    pub start_dispatch: StartDispatch,

    /// Who a dispatch starts interaction on
    #[serde(default)]
    pub audience: Audience,

    /// What retires targets
    #[serde(default)]
    pub removal: RemovalMode,

    /// What a repeated start call does
    #[serde(default)]
    pub recall: RecallPolicy,

    /// Run a step's own start procedure when a sequence advances into it.
    /// Off by default: only the first step of a sequence gets a start.
    #[serde(default)]
    pub start_steps_on_advance: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults_from_empty_table() {
        let settings: MachineSettings = toml::from_str("").unwrap();
        assert_eq!(settings, MachineSettings::default());
        assert_eq!(settings.recall, RecallPolicy::Ignore);
        assert_eq!(settings.removal, RemovalMode::AfterDuration);
        assert!(!settings.start_steps_on_advance);
    }

    #[test]
    fn test_parse_settings_toml() {
        let toml = r#"
collect_targets_on_enter = true
start_dispatch = "when_callers_match_targets"
audience = "all_but_most_recent_target"
removal = "on_exit"
recall = "recall_current_interactions_in_sequence_and_reset_its_time"
"#;
        let settings: MachineSettings = toml::from_str(toml).unwrap();
        assert!(settings.collect_targets_on_enter);
        assert_eq!(settings.start_dispatch, StartDispatch::WhenCallersMatchTargets);
        assert_eq!(settings.audience, Audience::AllButMostRecentTarget);
        assert_eq!(settings.removal, RemovalMode::OnExit);
        assert_eq!(
            settings.recall,
            RecallPolicy::RecallCurrentInteractionsInSequenceAndResetItsTime
        );
    }

    #[test]
    fn test_side_other() {
        assert_eq!(TargetSide::Caller.other(), TargetSide::Target);
        assert_eq!(TargetSide::Target.other(), TargetSide::Caller);
    }
}
