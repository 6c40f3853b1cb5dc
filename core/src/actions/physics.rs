use serde::{Deserialize, Serialize};

use cadence_types::{TargetSide, Vec2};

use super::Interact;
use crate::actor::ActorId;
use crate::host::{ForceMode, Host};

/// Push one side with a fixed force vector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddForce {
    #[serde(default)]
    pub who: TargetSide,
    pub force: Vec2,
    #[serde(default)]
    pub mode: ForceMode,
}

impl Interact for AddForce {
    fn interact(&mut self, host: &mut dyn Host, caller: ActorId, target: ActorId) {
        let Some(physics) = host.physics() else {
            return;
        };
        physics.add_force(self.who.pick(caller, target), self.force, self.mode);
    }
}

/// Push one side along the line between caller and target.
///
/// `towards` names the actor the push points at: `caller` pushes along
/// target → caller, `target` along caller → target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetedAddForce {
    #[serde(default)]
    pub push: TargetSide,
    #[serde(default)]
    pub towards: TargetSide,
    #[serde(default)]
    pub mode: ForceMode,
    pub magnitude: f32,
}

impl Interact for TargetedAddForce {
    fn interact(&mut self, host: &mut dyn Host, caller: ActorId, target: ActorId) {
        let direction = {
            let Some(scene) = host.scene() else {
                return;
            };
            let to = self.towards.pick(caller, target);
            let from = self.towards.other().pick(caller, target);
            match (scene.position(to), scene.position(from)) {
                (Some(to), Some(from)) => (to - from).normalized(),
                _ => return,
            }
        };

        let Some(physics) = host.physics() else {
            return;
        };
        physics.add_force(
            self.push.pick(caller, target),
            direction.truncate() * self.magnitude,
            self.mode,
        );
    }
}

/// Overwrite one side's velocity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetVelocity {
    #[serde(default)]
    pub who: TargetSide,
    pub velocity: Vec2,
}

impl Interact for SetVelocity {
    fn interact(&mut self, host: &mut dyn Host, caller: ActorId, target: ActorId) {
        if let Some(physics) = host.physics() {
            physics.set_velocity(self.who.pick(caller, target), self.velocity);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use cadence_types::{Quat, Vec3};

    use super::*;
    use crate::host::{Physics, Scene};

    const CALLER: ActorId = ActorId(1);
    const TARGET: ActorId = ActorId(2);

    #[derive(Default)]
    struct FakeWorld {
        positions: HashMap<ActorId, Vec3>,
        forces: Vec<(ActorId, Vec2, ForceMode)>,
        velocities: Vec<(ActorId, Vec2)>,
    }

    impl Physics for FakeWorld {
        fn add_force(&mut self, actor: ActorId, force: Vec2, mode: ForceMode) -> bool {
            self.forces.push((actor, force, mode));
            true
        }
        fn set_velocity(&mut self, actor: ActorId, velocity: Vec2) -> bool {
            self.velocities.push((actor, velocity));
            true
        }
    }

    impl Scene for FakeWorld {
        fn position(&self, actor: ActorId) -> Option<Vec3> {
            self.positions.get(&actor).copied()
        }
        fn rotation(&self, _actor: ActorId) -> Option<Quat> {
            None
        }
        fn set_position(&mut self, _actor: ActorId, _position: Vec3) {}
        fn set_rotation(&mut self, _actor: ActorId, _rotation: Quat) {}
        fn set_parent(&mut self, _child: ActorId, _parent: ActorId) {}
        fn set_active(&mut self, _actor: ActorId, _active: bool) {}
        fn instantiate(&mut self, _prefab: &str) -> Option<ActorId> {
            None
        }
        fn destroy(&mut self, _actor: ActorId) {}
        fn set_trail_enabled(&mut self, _actor: ActorId, _enabled: bool) -> bool {
            false
        }
    }

    /// World with the caller at the origin and the target at (3, 4)
    #[derive(Default)]
    struct WorldHost {
        world: FakeWorld,
        no_scene: bool,
    }

    impl WorldHost {
        fn placed() -> Self {
            let mut host = Self::default();
            host.world.positions.insert(CALLER, Vec3::ZERO);
            host.world.positions.insert(TARGET, Vec3::new(3.0, 4.0, 0.0));
            host
        }
    }

    impl Host for WorldHost {
        fn physics(&mut self) -> Option<&mut dyn Physics> {
            Some(&mut self.world)
        }
        fn scene(&mut self) -> Option<&mut dyn Scene> {
            if self.no_scene {
                return None;
            }
            Some(&mut self.world)
        }
    }

    fn close(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn test_add_force_on_chosen_side() {
        let mut host = WorldHost::default();
        let mut action = AddForce {
            who: TargetSide::Caller,
            force: Vec2::new(0.0, 12.0),
            mode: ForceMode::Impulse,
        };
        action.interact(&mut host, CALLER, TARGET);

        assert_eq!(
            host.world.forces,
            vec![(CALLER, Vec2::new(0.0, 12.0), ForceMode::Impulse)]
        );
    }

    #[test]
    fn test_targeted_force_points_at_target() {
        let mut host = WorldHost::placed();
        let mut action = TargetedAddForce {
            push: TargetSide::Target,
            towards: TargetSide::Target,
            mode: ForceMode::Force,
            magnitude: 10.0,
        };
        action.interact(&mut host, CALLER, TARGET);

        let (actor, force, _) = host.world.forces[0];
        assert_eq!(actor, TARGET);
        assert!(close(force, Vec2::new(6.0, 8.0)), "{force:?}");
    }

    #[test]
    fn test_targeted_force_points_at_caller() {
        let mut host = WorldHost::placed();
        let mut action = TargetedAddForce {
            push: TargetSide::Caller,
            towards: TargetSide::Caller,
            mode: ForceMode::Impulse,
            magnitude: 5.0,
        };
        action.interact(&mut host, CALLER, TARGET);

        let (actor, force, mode) = host.world.forces[0];
        assert_eq!(actor, CALLER);
        assert_eq!(mode, ForceMode::Impulse);
        assert!(close(force, Vec2::new(-3.0, -4.0)), "{force:?}");
    }

    #[test]
    fn test_targeted_force_needs_positions_and_scene() {
        let mut action = TargetedAddForce {
            push: TargetSide::Target,
            towards: TargetSide::Target,
            mode: ForceMode::Force,
            magnitude: 1.0,
        };

        let mut unplaced = WorldHost::default();
        action.interact(&mut unplaced, CALLER, TARGET);
        assert!(unplaced.world.forces.is_empty());

        let mut blind = WorldHost::placed();
        blind.no_scene = true;
        action.interact(&mut blind, CALLER, TARGET);
        assert!(blind.world.forces.is_empty());
    }

    #[test]
    fn test_set_velocity() {
        let mut host = WorldHost::default();
        let mut action = SetVelocity {
            who: TargetSide::Target,
            velocity: Vec2::new(1.5, -2.0),
        };
        action.interact(&mut host, CALLER, TARGET);

        assert_eq!(host.world.velocities, vec![(TARGET, Vec2::new(1.5, -2.0))]);
    }

    #[test]
    fn test_without_physics_is_noop() {
        let mut action = AddForce {
            who: TargetSide::Target,
            force: Vec2::new(1.0, 0.0),
            mode: ForceMode::Force,
        };
        action.interact(&mut (), CALLER, TARGET);
        SetVelocity {
            who: TargetSide::Target,
            velocity: Vec2::ZERO,
        }
        .interact(&mut (), CALLER, TARGET);
    }
}
