//! Resolved interaction library
//!
//! The library is what a machine runs from: every named interaction with
//! its built actions, a name index, and every sequence with its step names
//! resolved to interaction ids. Problems found while resolving are kept as
//! [`ConfigIssue`]s and logged; none of them stop the machine from running.

use hashbrown::HashMap;
use thiserror::Error;

use crate::actions::ActionRegistry;
use crate::definitions::{InteractionDefinition, SequenceDefinition, WhenToStart};
use crate::interaction::{Interaction, NamedInteraction};

/// Index of an interaction in its library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InteractionId(pub(crate) usize);

impl InteractionId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a sequence in its library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SequenceId(pub(crate) usize);

impl SequenceId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Non-fatal configuration problems
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigIssue {
    #[error(
        "duplicate interaction name `{name}` (definitions #{first} and #{duplicate}); the first one is used"
    )]
    DuplicateName {
        name: String,
        first: usize,
        duplicate: usize,
    },

    #[error("sequence #{sequence} refers to unknown interaction `{name}`; step dropped")]
    UnresolvedStep { sequence: usize, name: String },

    #[error("sequence #{sequence} has no usable steps and will never start")]
    EmptySequence { sequence: usize },

    #[error("sequence #{sequence} listens to unknown interaction `{name}` and will never start")]
    UnknownReference { sequence: usize, name: String },

    #[error("interaction `{name}` has invalid duration {duration}; using 0")]
    InvalidDuration { name: String, duration: f32 },

    #[error("interaction `{interaction}` {list} action #{index} skipped: {message}")]
    InvalidAction {
        interaction: String,
        list: &'static str,
        index: usize,
        message: String,
    },
}

/// A sequence definition with its steps resolved
#[derive(Debug, Clone)]
pub struct ResolvedSequence {
    definition: SequenceDefinition,
    steps: Vec<InteractionId>,
}

impl ResolvedSequence {
    pub fn definition(&self) -> &SequenceDefinition {
        &self.definition
    }

    pub fn when(&self) -> WhenToStart {
        self.definition.when
    }

    /// Resolved steps, unresolved names already dropped
    pub fn steps(&self) -> &[InteractionId] {
        &self.steps
    }

    /// Disabled sequences (no resolvable steps) are never instantiated
    pub fn is_enabled(&self) -> bool {
        !self.steps.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct Library {
    interactions: Vec<NamedInteraction>,
    by_name: HashMap<String, InteractionId>,
    sequences: Vec<ResolvedSequence>,
    issues: Vec<ConfigIssue>,
}

impl Library {
    /// Resolve already-built interactions and sequence definitions
    pub fn new(interactions: Vec<NamedInteraction>, sequences: Vec<SequenceDefinition>) -> Self {
        Self::resolve(interactions, sequences, Vec::new())
    }

    /// Build every action through `registry`, then resolve.
    /// Actions that fail to build are reported and left out.
    pub fn from_definitions(
        definitions: Vec<InteractionDefinition>,
        sequences: Vec<SequenceDefinition>,
        registry: &ActionRegistry,
    ) -> Self {
        let mut issues = Vec::new();
        let interactions = definitions
            .into_iter()
            .map(|def| build_interaction(def, registry, &mut issues))
            .collect();
        Self::resolve(interactions, sequences, issues)
    }

    fn resolve(
        mut interactions: Vec<NamedInteraction>,
        sequences: Vec<SequenceDefinition>,
        mut issues: Vec<ConfigIssue>,
    ) -> Self {
        let mut by_name: HashMap<String, InteractionId> = HashMap::new();

        for (index, named) in interactions.iter_mut().enumerate() {
            let duration = named.interaction.duration;
            if duration.is_nan() || duration < 0.0 {
                issues.push(ConfigIssue::InvalidDuration {
                    name: named.name.clone(),
                    duration,
                });
                named.interaction.duration = 0.0;
            }

            match by_name.get(&named.name) {
                Some(first) => issues.push(ConfigIssue::DuplicateName {
                    name: named.name.clone(),
                    first: first.0,
                    duplicate: index,
                }),
                None => {
                    by_name.insert(named.name.clone(), InteractionId(index));
                }
            }
        }

        let sequences = sequences
            .into_iter()
            .enumerate()
            .map(|(index, definition)| {
                let mut steps = Vec::with_capacity(definition.steps.len());
                for name in &definition.steps {
                    match by_name.get(name) {
                        Some(&id) => steps.push(id),
                        None => issues.push(ConfigIssue::UnresolvedStep {
                            sequence: index,
                            name: name.clone(),
                        }),
                    }
                }

                if steps.is_empty() {
                    issues.push(ConfigIssue::EmptySequence { sequence: index });
                }
                if definition.when.is_referenced() && !by_name.contains_key(&definition.referenced)
                {
                    issues.push(ConfigIssue::UnknownReference {
                        sequence: index,
                        name: definition.referenced.clone(),
                    });
                }

                ResolvedSequence { definition, steps }
            })
            .collect();

        for issue in &issues {
            tracing::error!(%issue, "configuration issue");
        }

        Self {
            interactions,
            by_name,
            sequences,
            issues,
        }
    }

    pub fn interaction(&self, id: InteractionId) -> &NamedInteraction {
        &self.interactions[id.0]
    }

    pub(crate) fn interaction_mut(&mut self, id: InteractionId) -> &mut Interaction {
        &mut self.interactions[id.0].interaction
    }

    pub fn interactions(&self) -> &[NamedInteraction] {
        &self.interactions
    }

    /// Look up an interaction by name (first definition wins on duplicates)
    pub fn find(&self, name: &str) -> Option<InteractionId> {
        self.by_name.get(name).copied()
    }

    pub fn sequence(&self, id: SequenceId) -> &ResolvedSequence {
        &self.sequences[id.0]
    }

    pub fn sequences(&self) -> impl Iterator<Item = (SequenceId, &ResolvedSequence)> {
        self.sequences
            .iter()
            .enumerate()
            .map(|(index, seq)| (SequenceId(index), seq))
    }

    pub fn issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Enabled sequences started by start-interaction calls, in authored order
    pub(crate) fn auto_start_sequences(&self) -> Vec<SequenceId> {
        self.sequences()
            .filter(|(_, seq)| seq.is_enabled() && seq.when() == WhenToStart::OnSequenceStart)
            .map(|(id, _)| id)
            .collect()
    }

    /// Enabled sequences listening for `name` under `rule`, in authored order
    pub(crate) fn listeners(&self, rule: WhenToStart, name: &str) -> Vec<SequenceId> {
        self.sequences()
            .filter(|(_, seq)| seq.is_enabled() && seq.definition.listens_to(rule, name))
            .map(|(id, _)| id)
            .collect()
    }
}

fn build_interaction(
    def: InteractionDefinition,
    registry: &ActionRegistry,
    issues: &mut Vec<ConfigIssue>,
) -> NamedInteraction {
    let mut interaction = Interaction::new(def.duration);

    let mut report = |list: &'static str, index: usize, message: String| {
        issues.push(ConfigIssue::InvalidAction {
            interaction: def.name.clone(),
            list,
            index,
            message,
        });
    };

    for (index, table) in def.start_end.iter().enumerate() {
        match registry.build_start_end(table) {
            Ok(action) => interaction.start_end.push(action),
            Err(e) => report("start_end", index, e.to_string()),
        }
    }

    let lists = [
        ("start", &def.start, &mut interaction.start),
        ("tick", &def.tick, &mut interaction.tick),
        ("fixed_tick", &def.fixed_tick, &mut interaction.fixed_tick),
        ("end", &def.end, &mut interaction.end),
    ];
    for (list, tables, built) in lists {
        for (index, table) in tables.iter().enumerate() {
            match registry.build_interact(table) {
                Ok(action) => built.push(action),
                Err(e) => report(list, index, e.to_string()),
            }
        }
    }

    NamedInteraction::new(def.name, interaction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, duration: f32) -> NamedInteraction {
        NamedInteraction::new(name, Interaction::new(duration))
    }

    #[test]
    fn test_duplicate_names_flagged_first_wins() {
        let library = Library::new(
            vec![named("hit", 1.0), named("hit", 2.0), named("fade", 0.5)],
            vec![SequenceDefinition::on_start(["hit", "fade"])],
        );

        assert_eq!(
            library.issues(),
            &[ConfigIssue::DuplicateName {
                name: "hit".to_string(),
                first: 0,
                duplicate: 1,
            }]
        );
        let hit = library.find("hit").unwrap();
        assert_eq!(hit.index(), 0);
        assert_eq!(library.interaction(hit).interaction.duration, 1.0);
        assert!(library.sequence(SequenceId(0)).is_enabled());
    }

    #[test]
    fn test_unresolved_steps_dropped() {
        let library = Library::new(
            vec![named("a", 1.0), named("b", 1.0)],
            vec![SequenceDefinition::on_start(["a", "missing", "b"])],
        );

        let seq = library.sequence(SequenceId(0));
        assert_eq!(seq.steps(), &[InteractionId(0), InteractionId(1)]);
        assert!(matches!(
            &library.issues()[0],
            ConfigIssue::UnresolvedStep { sequence: 0, name } if name == "missing"
        ));
    }

    #[test]
    fn test_sequence_without_steps_is_disabled() {
        let library = Library::new(
            vec![named("a", 1.0)],
            vec![
                SequenceDefinition::on_start(["nope"]),
                SequenceDefinition::on_start(["a"]),
            ],
        );

        assert!(!library.sequence(SequenceId(0)).is_enabled());
        assert!(library.issues().contains(&ConfigIssue::EmptySequence { sequence: 0 }));
        assert_eq!(library.auto_start_sequences(), vec![SequenceId(1)]);
    }

    #[test]
    fn test_unknown_reference_flagged() {
        let library = Library::new(
            vec![named("a", 1.0)],
            vec![SequenceDefinition::triggered(
                WhenToStart::OnReferencedInteractionEnd,
                "ghost",
                ["a"],
            )],
        );
        assert!(library.issues().contains(&ConfigIssue::UnknownReference {
            sequence: 0,
            name: "ghost".to_string(),
        }));
    }

    #[test]
    fn test_invalid_duration_clamped() {
        let library = Library::new(vec![named("a", -3.0)], vec![]);
        assert_eq!(library.interactions()[0].interaction.duration, 0.0);
        assert_eq!(library.issues().len(), 1);
    }

    #[test]
    fn test_listeners_filter_by_rule_and_name() {
        let library = Library::new(
            vec![named("a", 1.0), named("b", 1.0)],
            vec![
                SequenceDefinition::on_start(["a"]),
                SequenceDefinition::triggered(WhenToStart::OnReferencedInteractionStart, "a", ["b"]),
                SequenceDefinition::triggered(WhenToStart::OnReferencedInteractionEnd, "a", ["b"]),
            ],
        );

        assert_eq!(
            library.listeners(WhenToStart::OnReferencedInteractionStart, "a"),
            vec![SequenceId(1)]
        );
        assert_eq!(
            library.listeners(WhenToStart::OnReferencedInteractionEnd, "a"),
            vec![SequenceId(2)]
        );
        assert!(library.listeners(WhenToStart::OnReferencedInteractionEnd, "b").is_empty());
    }

    #[test]
    fn test_bad_actions_reported_and_skipped() {
        let start: toml::Table = toml::from_str(r#"type = "play_sound""#).unwrap();
        let tick: toml::Table = toml::from_str(r#"type = "event""#).unwrap();
        let fine: toml::Table = toml::from_str("type = \"event\"\nname = \"boom\"").unwrap();
        let def = InteractionDefinition {
            name: "noisy".to_string(),
            duration: 1.0,
            start: vec![start, fine.clone()],
            tick: vec![tick],
            end: vec![fine],
            ..InteractionDefinition::default()
        };

        let library = Library::from_definitions(vec![def], vec![], &ActionRegistry::default());
        let built = &library.interactions()[0].interaction;
        assert_eq!(built.start.len(), 1);
        assert!(built.tick.is_empty());
        assert_eq!(built.end.len(), 1);
        assert_eq!(library.issues().len(), 2);
        assert!(matches!(
            &library.issues()[0],
            ConfigIssue::InvalidAction { list: "start", index: 0, .. }
        ));
    }
}
