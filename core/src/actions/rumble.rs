use serde::{Deserialize, Serialize};

use cadence_types::TargetSide;

use super::StartEndInteract;
use crate::actor::ActorId;
use crate::host::Host;

/// Spin the gamepad motors for as long as the interaction runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamepadRumble {
    #[serde(default)]
    pub who: TargetSide,
    #[serde(default)]
    pub low: f32,
    #[serde(default)]
    pub high: f32,
}

impl StartEndInteract for GamepadRumble {
    fn start_interact(&mut self, host: &mut dyn Host, caller: ActorId, target: ActorId) {
        if let Some(rumble) = host.rumble() {
            rumble.set_motor_speeds(self.who.pick(caller, target), self.low, self.high);
        }
    }

    fn end_interact(&mut self, host: &mut dyn Host, caller: ActorId, target: ActorId) {
        if let Some(rumble) = host.rumble() {
            rumble.set_motor_speeds(self.who.pick(caller, target), 0.0, 0.0);
        }
    }
}
