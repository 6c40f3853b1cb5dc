//! Interaction machine
//!
//! The machine keeps, per registered target, the set of sequence instances
//! currently running on it. Driver calls start sequences, advance them with
//! the variable-rate tick and let them retire when their last step ends.
//! Interactions starting or ending on a target can start further sequences
//! on that same target.
//!
//! Everything runs on the caller's thread inside `&mut self` methods.
//! Targets are visited in registration order and instances in creation
//! order; instances appended while a target is being ticked wait for the
//! next tick.

mod instance;


pub use instance::{SequenceInstance, TargetRecord};

use cadence_types::{Audience, MachineSettings, RecallPolicy, RemovalMode, StartDispatch};

use crate::actor::ActorId;
use crate::definitions::WhenToStart;
use crate::host::Host;
use crate::library::{InteractionId, Library, SequenceId};

/// Per-target sequence scheduler driving a [`Library`] through a [`Host`]
pub struct InteractionMachine<H: Host> {
    owner: ActorId,
    settings: MachineSettings,
    library: Library,
    host: H,

    // ─── Registration ───────────────────────────────────────────────────────
    callers: Vec<ActorId>,
    /// Registration order; the last entry is the most recent target
    targets: Vec<TargetRecord>,
}

impl<H: Host> InteractionMachine<H> {
    pub fn new(owner: ActorId, settings: MachineSettings, library: Library, host: H) -> Self {
        tracing::debug!(
            %owner,
            interactions = library.interactions().len(),
            sequences = library.sequences().count(),
            "interaction machine created"
        );
        Self {
            owner,
            settings,
            library,
            host,
            callers: Vec::new(),
            targets: Vec::new(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════

    pub fn owner(&self) -> ActorId {
        self.owner
    }

    pub fn settings(&self) -> &MachineSettings {
        &self.settings
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Registered targets in registration order
    pub fn targets(&self) -> &[TargetRecord] {
        &self.targets
    }

    pub fn is_registered(&self, actor: ActorId) -> bool {
        self.find_target(actor).is_some()
    }

    /// Instances running on `actor`; empty when it is not registered
    pub fn instances(&self, actor: ActorId) -> &[SequenceInstance] {
        self.find_target(actor)
            .map(|index| self.targets[index].instances())
            .unwrap_or(&[])
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    pub fn caller_count(&self) -> usize {
        self.callers.len()
    }

    fn find_target(&self, actor: ActorId) -> Option<usize> {
        self.targets.iter().position(|record| record.actor == actor)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Registration
    // ═══════════════════════════════════════════════════════════════════════

    /// Register `actor` as a target. Already registered targets keep their
    /// place and their instances.
    pub fn add_target(&mut self, actor: ActorId) {
        self.ensure_target(actor);
    }

    fn ensure_target(&mut self, actor: ActorId) -> usize {
        if let Some(index) = self.find_target(actor) {
            return index;
        }
        tracing::trace!(target_actor = %actor, "target registered");
        self.targets.push(TargetRecord::new(actor));
        self.targets.len() - 1
    }

    /// Drop the target and its instances without running any end actions
    pub fn remove_target(&mut self, actor: ActorId) {
        if let Some(index) = self.find_target(actor) {
            self.targets.remove(index);
            tracing::trace!(target_actor = %actor, "target removed");
        }
    }

    /// End every instance running on the target, then drop it.
    /// No end triggers fire.
    pub fn end_target(&mut self, actor: ActorId) {
        let Some(index) = self.find_target(actor) else {
            return;
        };
        let record = self.targets.remove(index);
        for instance in &record.instances {
            self.end_procedure(instance.interaction, actor);
        }
        tracing::debug!(
            target_actor = %actor,
            ended = record.instances.len(),
            "target ended"
        );
    }

    pub fn remove_all_targets(&mut self) {
        self.targets.clear();
    }

    /// End every running interaction on every target without advancing
    /// or triggering anything, then drop all targets.
    pub fn end_all_state(&mut self) {
        let targets = std::mem::take(&mut self.targets);
        for record in &targets {
            for instance in &record.instances {
                self.end_procedure(instance.interaction, record.actor);
            }
        }
        if !targets.is_empty() {
            tracing::debug!(targets = targets.len(), "all state ended");
        }
    }

    pub fn register_caller(&mut self, caller: ActorId) {
        if !self.callers.contains(&caller) {
            self.callers.push(caller);
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Starting
    // ═══════════════════════════════════════════════════════════════════════

    /// Start interaction on `target`, registering it first if needed.
    /// A target with running instances is handled by the recall policy.
    pub fn start_interaction(&mut self, target: ActorId) {
        let index = self.ensure_target(target);
        self.start_on(index);
    }

    pub fn start_interaction_with_all_targets(&mut self) {
        for index in 0..self.targets.len() {
            self.start_on(index);
        }
    }

    pub fn start_interaction_with_most_recent_target(&mut self) {
        if let Some(index) = self.targets.len().checked_sub(1) {
            self.start_on(index);
        }
    }

    pub fn start_interaction_with_all_but_most_recent_target(&mut self) {
        for index in 0..self.targets.len().saturating_sub(1) {
            self.start_on(index);
        }
    }

    /// Start interaction on the host's main reference actor, if it has one
    pub fn start_interaction_with_main_reference_target(&mut self) {
        match self.host.main_reference() {
            Some(actor) => self.start_interaction(actor),
            None => tracing::trace!("no main reference actor; start skipped"),
        }
    }

    pub fn start_interaction_with_owner(&mut self) {
        self.start_interaction(self.owner);
    }

    fn start_on(&mut self, index: usize) {
        if self.targets[index].instances.is_empty() {
            self.fresh_start(index);
            return;
        }

        let target = self.targets[index].actor;
        tracing::trace!(target_actor = %target, policy = ?self.settings.recall, "target recalled");

        match self.settings.recall {
            RecallPolicy::Ignore => {}
            RecallPolicy::RestartInteraction => {
                self.targets[index].instances.clear();
                self.fresh_start(index);
            }
            RecallPolicy::RecallFirstInteractionsWithoutRestarting => {
                for sequence in self.library.auto_start_sequences() {
                    let existing = self.targets[index]
                        .instances
                        .iter()
                        .find(|inst| inst.sequence == sequence)
                        .map(|inst| inst.interaction);
                    match existing {
                        Some(interaction) => self.start_procedure(interaction, target),
                        None => self.activate(index, sequence),
                    }
                }
            }
            RecallPolicy::RecallCurrentInteractionsInSequenceWithoutRestarting => {
                self.recall_current(index, false);
            }
            RecallPolicy::RecallCurrentInteractionsInSequenceAndResetItsTime => {
                self.recall_current(index, true);
            }
        }
    }

    /// Re-run the current step's start actions of every existing instance
    fn recall_current(&mut self, index: usize, reset_time: bool) {
        let target = self.targets[index].actor;
        let count = self.targets[index].instances.len();
        for i in 0..count {
            if reset_time {
                self.targets[index].instances[i].elapsed = 0.0;
            }
            let interaction = self.targets[index].instances[i].interaction;
            self.start_procedure(interaction, target);
        }
    }

    fn fresh_start(&mut self, index: usize) {
        for sequence in self.library.auto_start_sequences() {
            self.activate(index, sequence);
        }
    }

    /// Instantiate `sequence` on the target at its first step, run that
    /// step's start actions and let dependents react. No-op when the
    /// sequence is already running there.
    fn activate(&mut self, index: usize, sequence: SequenceId) {
        if self.targets[index].is_active(sequence) {
            return;
        }
        let Some(&first) = self.library.sequence(sequence).steps().first() else {
            return;
        };

        let target = self.targets[index].actor;
        self.targets[index]
            .instances
            .push(SequenceInstance::new(sequence, first));
        tracing::debug!(
            target_actor = %target,
            sequence = sequence.index(),
            interaction = %self.library.interaction(first).name,
            "sequence started"
        );

        self.start_procedure(first, target);
        self.fire_triggers(index, WhenToStart::OnReferencedInteractionStart, first);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Triggers
    // ═══════════════════════════════════════════════════════════════════════

    /// Start every idle sequence listening for `interaction` under `rule`.
    /// Each started sequence fires its own start triggers in turn; the
    /// one-instance-per-sequence rule bounds the recursion.
    fn fire_triggers(&mut self, index: usize, rule: WhenToStart, interaction: InteractionId) {
        let listeners = self
            .library
            .listeners(rule, &self.library.interaction(interaction).name);
        for sequence in listeners {
            self.activate(index, sequence);
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Ticks
    // ═══════════════════════════════════════════════════════════════════════

    /// Variable-rate tick: run tick actions and, when targets are removed
    /// after a duration, advance every instance by `dt` seconds.
    /// Negative or non-finite `dt` values are ignored.
    pub fn on_variable_tick(&mut self, dt: f32) {
        if !dt.is_finite() || dt < 0.0 {
            tracing::warn!(dt, "ignoring invalid tick length");
            return;
        }
        match self.settings.removal {
            RemovalMode::AfterDuration => self.advance(dt),
            RemovalMode::OnExit => self.run_tick_lists(false),
        }
    }

    /// Fixed-rate tick: run fixed-tick actions only
    pub fn on_fixed_tick(&mut self, _dt: f32) {
        self.run_tick_lists(true);
    }

    fn run_tick_lists(&mut self, fixed: bool) {
        for index in 0..self.targets.len() {
            let target = self.targets[index].actor;
            for i in 0..self.targets[index].instances.len() {
                let interaction = self.targets[index].instances[i].interaction;
                let host: &mut dyn Host = &mut self.host;
                let actions = self.library.interaction_mut(interaction);
                if fixed {
                    actions.run_fixed_tick(host, self.owner, target);
                } else {
                    actions.run_tick(host, self.owner, target);
                }
            }
        }
    }

    fn advance(&mut self, dt: f32) {
        let mut index = 0;
        while index < self.targets.len() {
            let target = self.targets[index].actor;
            // Instances appended by triggers below sit past `end`
            let mut end = self.targets[index].instances.len();
            let mut retired_any = false;
            let mut i = 0;

            while i < end {
                let instance = self.targets[index].instances[i];
                {
                    let host: &mut dyn Host = &mut self.host;
                    self.library
                        .interaction_mut(instance.interaction)
                        .run_tick(host, self.owner, target);
                }

                let elapsed = instance.elapsed + dt;
                let duration = self.library.interaction(instance.interaction).interaction.duration;
                if elapsed < duration {
                    self.targets[index].instances[i].elapsed = elapsed;
                    i += 1;
                    continue;
                }

                self.end_procedure(instance.interaction, target);
                self.fire_triggers(index, WhenToStart::OnReferencedInteractionEnd, instance.interaction);

                let next_step = instance.step + 1;
                let next = self
                    .library
                    .sequence(instance.sequence)
                    .steps()
                    .get(next_step)
                    .copied();

                match next {
                    Some(next) => {
                        let current = &mut self.targets[index].instances[i];
                        current.step = next_step;
                        current.interaction = next;
                        current.elapsed = 0.0;
                        tracing::trace!(
                            target_actor = %target,
                            sequence = instance.sequence.index(),
                            step = next_step,
                            interaction = %self.library.interaction(next).name,
                            "sequence advanced"
                        );

                        if self.settings.start_steps_on_advance {
                            self.start_procedure(next, target);
                        }
                        self.fire_triggers(index, WhenToStart::OnReferencedInteractionStart, next);
                        i += 1;
                    }
                    None => {
                        self.targets[index].instances.remove(i);
                        end -= 1;
                        retired_any = true;
                        tracing::debug!(
                            target_actor = %target,
                            sequence = instance.sequence.index(),
                            "sequence finished"
                        );
                    }
                }
            }

            // Targets still waiting for their first start stay registered
            if retired_any && self.targets[index].instances.is_empty() {
                self.targets.remove(index);
                tracing::debug!(target_actor = %target, "target retired");
            } else {
                index += 1;
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Events
    // ═══════════════════════════════════════════════════════════════════════

    /// An actor entered the owner's area
    pub fn on_target_enter(&mut self, actor: ActorId) {
        if self.settings.collect_targets_on_enter {
            self.add_target(actor);
        }

        let dispatch = match self.settings.start_dispatch {
            StartDispatch::Never => false,
            StartDispatch::OnEnter => true,
            StartDispatch::WhenCallersMatchTargets => self.callers.len() == self.targets.len(),
        };
        if dispatch {
            self.dispatch();
        }
    }

    /// An actor left the owner's area. Only exit-gated machines react.
    pub fn on_target_exit(&mut self, actor: ActorId) {
        if self.settings.removal == RemovalMode::OnExit {
            self.end_target(actor);
        }
    }

    fn dispatch(&mut self) {
        tracing::debug!(audience = ?self.settings.audience, "automatic start");
        match self.settings.audience {
            Audience::AllTargets => self.start_interaction_with_all_targets(),
            Audience::MostRecentTarget => self.start_interaction_with_most_recent_target(),
            Audience::AllButMostRecentTarget => {
                self.start_interaction_with_all_but_most_recent_target()
            }
            Audience::OwnerOnly => self.start_interaction_with_owner(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Procedures
    // ═══════════════════════════════════════════════════════════════════════

    fn start_procedure(&mut self, interaction: InteractionId, target: ActorId) {
        let host: &mut dyn Host = &mut self.host;
        self.library
            .interaction_mut(interaction)
            .run_start(host, self.owner, target);
    }

    fn end_procedure(&mut self, interaction: InteractionId, target: ActorId) {
        let host: &mut dyn Host = &mut self.host;
        self.library
            .interaction_mut(interaction)
            .run_end(host, self.owner, target);
    }
}

impl<H: Host> Drop for InteractionMachine<H> {
    fn drop(&mut self) {
        self.end_all_state();
    }
}

impl<H: Host> std::fmt::Debug for InteractionMachine<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionMachine")
            .field("owner", &self.owner)
            .field("settings", &self.settings)
            .field("callers", &self.callers)
            .field("targets", &self.targets)
            .finish_non_exhaustive()
    }
}
