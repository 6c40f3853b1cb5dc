//! Action primitives
//!
//! An interaction is built from small actions. There are two shapes:
//! - [`Interact`]: a one-shot effect, used in the start, tick, fixed-tick
//!   and end lists of an interaction
//! - [`StartEndInteract`]: an effect that must be undone, started with the
//!   interaction's start procedure and stopped with its end procedure
//!
//! Actions are authored as TOML tables with a `type` key and turned into
//! boxed trait objects by the [`ActionRegistry`].
//!
//! ```text
//! [[interaction]]                       ActionRegistry
//! start = [{ type = "add_force", .. }] ───────────────▶ Box<dyn Interact>
//! ```

mod forward;
mod physics;
mod presentation;
mod registry;
mod rumble;
mod signals;
mod spawn;

use std::fmt;

use crate::actor::ActorId;
use crate::host::Host;

pub use forward::Forward;
pub use physics::{AddForce, SetVelocity, TargetedAddForce};
pub use presentation::{PlaySound, SetActive, SetAnimatorBool, Trail};
pub use registry::{
    ActionError, ActionRegistry, InteractFactory, StartEndFactory, interact_factory,
    start_end_factory,
};
pub use rumble::GamepadRumble;
pub use signals::{Event, StatOffset, TargetEvent};
pub use spawn::{Despawn, Spawn, SpawnPool, SpawnRotation};

/// A one-shot action run against a caller and a target
pub trait Interact: fmt::Debug {
    fn interact(&mut self, host: &mut dyn Host, caller: ActorId, target: ActorId);
}

/// A paired action: whatever `start_interact` begins, `end_interact` undoes
pub trait StartEndInteract: fmt::Debug {
    fn start_interact(&mut self, host: &mut dyn Host, caller: ActorId, target: ActorId);
    fn end_interact(&mut self, host: &mut dyn Host, caller: ActorId, target: ActorId);
}
