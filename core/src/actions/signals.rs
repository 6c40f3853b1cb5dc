//! Actions that talk to game logic rather than the engine: stat counters and
//! named events.

use serde::{Deserialize, Serialize};

use cadence_types::TargetSide;

use super::Interact;
use crate::actor::ActorId;
use crate::host::Host;

/// Add `amount` (may be negative) to a named stat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatOffset {
    #[serde(default)]
    pub who: TargetSide,
    pub stat: String,
    pub amount: i32,
}

impl Interact for StatOffset {
    fn interact(&mut self, host: &mut dyn Host, caller: ActorId, target: ActorId) {
        if let Some(stats) = host.stats() {
            stats.offset(self.who.pick(caller, target), &self.stat, self.amount);
        }
    }
}

/// Emit a named event with no subject
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
}

impl Interact for Event {
    fn interact(&mut self, host: &mut dyn Host, _caller: ActorId, _target: ActorId) {
        if let Some(events) = host.events() {
            events.emit(&self.name, None);
        }
    }
}

/// Emit a named event carrying one of the two actors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetEvent {
    pub name: String,
    #[serde(default)]
    pub who: TargetSide,
}

impl Interact for TargetEvent {
    fn interact(&mut self, host: &mut dyn Host, caller: ActorId, target: ActorId) {
        if let Some(events) = host.events() {
            events.emit(&self.name, Some(self.who.pick(caller, target)));
        }
    }
}
