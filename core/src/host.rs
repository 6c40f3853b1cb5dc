//! Host services the action primitives call into.
//!
//! The machine is embedded in a host simulation that owns physics, scene
//! graph, audio and so on. Each subsystem is reached through an optional
//! accessor on [`Host`]; an accessor returning `None` means the capability
//! is absent and actions that need it quietly do nothing. Per-actor absence
//! (an actor without a rigid body, without a gamepad, ...) is reported by
//! the service methods themselves returning `false` or `None`.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use cadence_types::{Quat, Vec2, Vec3};

use crate::actions::Interact;
use crate::actor::ActorId;

/// How a force is applied to a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceMode {
    /// Continuous force, scaled by the physics step
    #[default]
    Force,
    /// Instant change in momentum
    Impulse,
}

pub trait Physics {
    /// Returns `false` when the actor has no body
    fn add_force(&mut self, actor: ActorId, force: Vec2, mode: ForceMode) -> bool;

    /// Returns `false` when the actor has no body
    fn set_velocity(&mut self, actor: ActorId, velocity: Vec2) -> bool;
}

/// Scene graph: transforms, activation and instantiation
pub trait Scene {
    fn position(&self, actor: ActorId) -> Option<Vec3>;
    fn rotation(&self, actor: ActorId) -> Option<Quat>;
    fn set_position(&mut self, actor: ActorId, position: Vec3);
    fn set_rotation(&mut self, actor: ActorId, rotation: Quat);

    /// Reparent `child` under `parent`, keeping its world transform
    fn set_parent(&mut self, child: ActorId, parent: ActorId);

    fn set_active(&mut self, actor: ActorId, active: bool);

    /// Instantiate a prefab by name, `None` when the prefab is unknown
    fn instantiate(&mut self, prefab: &str) -> Option<ActorId>;

    fn destroy(&mut self, actor: ActorId);

    /// Toggle the actor's trail renderer (its own or the first in its
    /// children). Returns `false` when it has none.
    fn set_trail_enabled(&mut self, actor: ActorId, enabled: bool) -> bool;
}

pub trait Audio {
    fn play(&mut self, on: ActorId, sound: &str);
}

pub trait Animation {
    /// Set a bool parameter on the actor's animators (falling back to its
    /// children). Returns how many animators were touched.
    fn set_bool(&mut self, actor: ActorId, parameter: &str, value: bool) -> usize;
}

pub trait Rumble {
    /// Returns `false` when the actor has no gamepad
    fn set_motor_speeds(&mut self, actor: ActorId, low: f32, high: f32) -> bool;
}

pub trait Stats {
    /// Returns `false` when the actor has no stat counter
    fn offset(&mut self, actor: ActorId, stat: &str, amount: i32) -> bool;
}

pub trait Events {
    fn emit(&mut self, event: &str, subject: Option<ActorId>);
}

/// Everything the machine and its actions can reach in the host
pub trait Host {
    fn physics(&mut self) -> Option<&mut dyn Physics> {
        None
    }

    fn scene(&mut self) -> Option<&mut dyn Scene> {
        None
    }

    fn audio(&mut self) -> Option<&mut dyn Audio> {
        None
    }

    fn animation(&mut self) -> Option<&mut dyn Animation> {
        None
    }

    fn rumble(&mut self) -> Option<&mut dyn Rumble> {
        None
    }

    fn stats(&mut self) -> Option<&mut dyn Stats> {
        None
    }

    fn events(&mut self) -> Option<&mut dyn Events> {
        None
    }

    /// Actions attached directly to actors (used by the `forward` action)
    fn attachments(&mut self) -> Option<&mut Attachments> {
        None
    }

    /// Actor used by `start_interaction_with_main_reference_target`
    /// (typically the main camera)
    fn main_reference(&self) -> Option<ActorId> {
        None
    }
}

/// A host with no services at all
impl Host for () {}

// ═══════════════════════════════════════════════════════════════════════════
// Attachments
// ═══════════════════════════════════════════════════════════════════════════

/// Per-actor lists of actions, the equivalent of components on an actor
#[derive(Debug, Default)]
pub struct Attachments {
    by_actor: HashMap<ActorId, Vec<Box<dyn Interact>>>,
}

impl Attachments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, actor: ActorId, action: Box<dyn Interact>) {
        self.by_actor.entry(actor).or_default().push(action);
    }

    /// Remove and return every action attached to `actor`
    pub fn detach_all(&mut self, actor: ActorId) -> Vec<Box<dyn Interact>> {
        self.by_actor.remove(&actor).unwrap_or_default()
    }

    pub fn count(&self, actor: ActorId) -> usize {
        self.by_actor.get(&actor).map_or(0, Vec::len)
    }

    /// Take the actor's list out for the duration of a forward pass.
    /// While checked out the actor appears to have no attachments.
    pub(crate) fn check_out(&mut self, actor: ActorId) -> Vec<Box<dyn Interact>> {
        self.by_actor
            .get_mut(&actor)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Put a checked-out list back. Actions attached while it was out are
    /// kept after the original ones.
    pub(crate) fn check_in(&mut self, actor: ActorId, mut actions: Vec<Box<dyn Interact>>) {
        if actions.is_empty() && !self.by_actor.contains_key(&actor) {
            return;
        }
        let slot = self.by_actor.entry(actor).or_default();
        actions.append(slot);
        *slot = actions;
    }
}
