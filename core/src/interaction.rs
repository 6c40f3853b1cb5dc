use crate::actions::{Interact, StartEndInteract};
use crate::actor::ActorId;
use crate::host::Host;

/// A timed bundle of actions.
///
/// Owned by the [`Library`](crate::Library) and shared by every sequence
/// instance that reaches it. The machine never changes an interaction after
/// it is built; only the actions' own internal state (a spawn pool, say)
/// moves.
#[derive(Debug, Default)]
pub struct Interaction {
    /// Seconds before the interaction ends, `>= 0`
    pub duration: f32,
    pub start_end: Vec<Box<dyn StartEndInteract>>,
    pub start: Vec<Box<dyn Interact>>,
    pub tick: Vec<Box<dyn Interact>>,
    pub fixed_tick: Vec<Box<dyn Interact>>,
    pub end: Vec<Box<dyn Interact>>,
}

impl Interaction {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    pub fn with_start_end(mut self, action: impl StartEndInteract + 'static) -> Self {
        self.start_end.push(Box::new(action));
        self
    }

    pub fn with_start(mut self, action: impl Interact + 'static) -> Self {
        self.start.push(Box::new(action));
        self
    }

    pub fn with_tick(mut self, action: impl Interact + 'static) -> Self {
        self.tick.push(Box::new(action));
        self
    }

    pub fn with_fixed_tick(mut self, action: impl Interact + 'static) -> Self {
        self.fixed_tick.push(Box::new(action));
        self
    }

    pub fn with_end(mut self, action: impl Interact + 'static) -> Self {
        self.end.push(Box::new(action));
        self
    }

    /// Start procedure: paired starts, then the start list
    pub(crate) fn run_start(&mut self, host: &mut dyn Host, caller: ActorId, target: ActorId) {
        for action in &mut self.start_end {
            action.start_interact(host, caller, target);
        }
        for action in &mut self.start {
            action.interact(host, caller, target);
        }
    }

    pub(crate) fn run_tick(&mut self, host: &mut dyn Host, caller: ActorId, target: ActorId) {
        for action in &mut self.tick {
            action.interact(host, caller, target);
        }
    }

    pub(crate) fn run_fixed_tick(&mut self, host: &mut dyn Host, caller: ActorId, target: ActorId) {
        for action in &mut self.fixed_tick {
            action.interact(host, caller, target);
        }
    }

    /// End procedure: paired ends, then the end list
    pub(crate) fn run_end(&mut self, host: &mut dyn Host, caller: ActorId, target: ActorId) {
        for action in &mut self.start_end {
            action.end_interact(host, caller, target);
        }
        for action in &mut self.end {
            action.interact(host, caller, target);
        }
    }
}

#[derive(Debug)]
pub struct NamedInteraction {
    pub name: String,
    pub interaction: Interaction,
}

impl NamedInteraction {
    pub fn new(name: impl Into<String>, interaction: Interaction) -> Self {
        Self {
            name: name.into(),
            interaction,
        }
    }
}
