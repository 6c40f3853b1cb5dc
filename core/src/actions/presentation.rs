//! Audio, animation and visibility actions

use serde::{Deserialize, Serialize};

use cadence_types::TargetSide;

use super::Interact;
use crate::actor::ActorId;
use crate::host::Host;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaySound {
    #[serde(default)]
    pub who: TargetSide,
    pub sound: String,
}

impl Interact for PlaySound {
    fn interact(&mut self, host: &mut dyn Host, caller: ActorId, target: ActorId) {
        if let Some(audio) = host.audio() {
            audio.play(self.who.pick(caller, target), &self.sound);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetAnimatorBool {
    #[serde(default)]
    pub who: TargetSide,
    pub parameter: String,
    pub value: bool,
}

impl Interact for SetAnimatorBool {
    fn interact(&mut self, host: &mut dyn Host, caller: ActorId, target: ActorId) {
        let Some(animation) = host.animation() else {
            return;
        };
        let actor = self.who.pick(caller, target);
        let touched = animation.set_bool(actor, &self.parameter, self.value);
        tracing::trace!(%actor, parameter = %self.parameter, value = self.value, touched, "animator bool");
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetActive {
    #[serde(default)]
    pub who: TargetSide,
    pub active: bool,
}

impl Interact for SetActive {
    fn interact(&mut self, host: &mut dyn Host, caller: ActorId, target: ActorId) {
        if let Some(scene) = host.scene() {
            scene.set_active(self.who.pick(caller, target), self.active);
        }
    }
}

/// Enable or disable a trail renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trail {
    #[serde(default)]
    pub who: TargetSide,
    pub enabled: bool,
}

impl Interact for Trail {
    fn interact(&mut self, host: &mut dyn Host, caller: ActorId, target: ActorId) {
        if let Some(scene) = host.scene() {
            scene.set_trail_enabled(self.who.pick(caller, target), self.enabled);
        }
    }
}

#[cfg(test)]
mod tests {
    use cadence_types::{Quat, Vec3};

    use super::*;
    use crate::host::{Animation, Audio, Scene};

    const CALLER: ActorId = ActorId(1);
    const TARGET: ActorId = ActorId(2);

    /// Records every presentation call as a readable line
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        has_trail: bool,
    }

    impl Audio for Recorder {
        fn play(&mut self, on: ActorId, sound: &str) {
            self.calls.push(format!("play {sound} on {on}"));
        }
    }

    impl Animation for Recorder {
        fn set_bool(&mut self, actor: ActorId, parameter: &str, value: bool) -> usize {
            self.calls.push(format!("{parameter}={value} on {actor}"));
            1
        }
    }

    impl Scene for Recorder {
        fn position(&self, _actor: ActorId) -> Option<Vec3> {
            None
        }
        fn rotation(&self, _actor: ActorId) -> Option<Quat> {
            None
        }
        fn set_position(&mut self, _actor: ActorId, _position: Vec3) {}
        fn set_rotation(&mut self, _actor: ActorId, _rotation: Quat) {}
        fn set_parent(&mut self, _child: ActorId, _parent: ActorId) {}
        fn set_active(&mut self, actor: ActorId, active: bool) {
            self.calls.push(format!("active={active} on {actor}"));
        }
        fn instantiate(&mut self, _prefab: &str) -> Option<ActorId> {
            None
        }
        fn destroy(&mut self, _actor: ActorId) {}
        fn set_trail_enabled(&mut self, actor: ActorId, enabled: bool) -> bool {
            self.calls.push(format!("trail={enabled} on {actor}"));
            self.has_trail
        }
    }

    impl Host for Recorder {
        fn audio(&mut self) -> Option<&mut dyn Audio> {
            Some(self)
        }
        fn animation(&mut self) -> Option<&mut dyn Animation> {
            Some(self)
        }
        fn scene(&mut self) -> Option<&mut dyn Scene> {
            Some(self)
        }
    }

    #[test]
    fn test_play_sound_on_chosen_side() {
        let mut host = Recorder::default();
        PlaySound {
            who: TargetSide::Caller,
            sound: "spring".to_string(),
        }
        .interact(&mut host, CALLER, TARGET);

        assert_eq!(host.calls, vec!["play spring on actor#1"]);
    }

    #[test]
    fn test_set_animator_bool() {
        let mut host = Recorder::default();
        SetAnimatorBool {
            who: TargetSide::Target,
            parameter: "dashing".to_string(),
            value: true,
        }
        .interact(&mut host, CALLER, TARGET);

        assert_eq!(host.calls, vec!["dashing=true on actor#2"]);
    }

    #[test]
    fn test_set_active_and_trail() {
        let mut host = Recorder::default();
        SetActive {
            who: TargetSide::Target,
            active: false,
        }
        .interact(&mut host, CALLER, TARGET);
        Trail {
            who: TargetSide::Caller,
            enabled: true,
        }
        .interact(&mut host, CALLER, TARGET);

        assert_eq!(
            host.calls,
            vec!["active=false on actor#2", "trail=true on actor#1"]
        );
    }

    #[test]
    fn test_without_services_is_noop() {
        PlaySound {
            who: TargetSide::Target,
            sound: "x".to_string(),
        }
        .interact(&mut (), CALLER, TARGET);
        SetAnimatorBool {
            who: TargetSide::Target,
            parameter: "p".to_string(),
            value: true,
        }
        .interact(&mut (), CALLER, TARGET);
        SetActive {
            who: TargetSide::Target,
            active: true,
        }
        .interact(&mut (), CALLER, TARGET);
        Trail {
            who: TargetSide::Target,
            enabled: false,
        }
        .interact(&mut (), CALLER, TARGET);
    }
}
