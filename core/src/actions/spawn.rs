//! Spawning actions
//!
//! [`Spawn`] instantiates a fresh object every time it runs. [`SpawnPool`]
//! is the paired variant: objects spawned on start are put away on end and
//! reused by later starts instead of being instantiated again.

use serde::{Deserialize, Serialize};

use cadence_types::{Quat, TargetSide, Vec3};

use super::{Interact, StartEndInteract};
use crate::actor::ActorId;
use crate::host::{Host, Scene};

/// How a spawned object is rotated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnRotation {
    /// Copy the reference actor's rotation
    #[default]
    CopyReference,
    /// Face the reference actor
    LookAtReference,
}

/// What happens to pooled objects when the interaction ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Despawn {
    /// Deactivate them and keep them for reuse
    #[default]
    Deactivate,
    /// Destroy them and empty the pool
    Destroy,
    /// Leave them alone
    None,
}

fn all_axes() -> [bool; 3] {
    [true, true, true]
}

/// Rotate a freshly placed object according to `mode`
fn orient(
    scene: &mut dyn Scene,
    spawned: ActorId,
    mode: SpawnRotation,
    reference: ActorId,
    axes: [bool; 3],
) {
    match mode {
        SpawnRotation::CopyReference => {
            if let Some(rotation) = scene.rotation(reference) {
                scene.set_rotation(spawned, rotation);
            }
        }
        SpawnRotation::LookAtReference => {
            let Some(reference_pos) = scene.position(reference) else {
                return;
            };
            let spawned_pos = scene.position(spawned).unwrap_or(Vec3::ZERO);
            let [x, y, z] = axes;
            let forward = (reference_pos - spawned_pos).masked(x, y, z);
            scene.set_rotation(spawned, Quat::look_rotation(forward, Vec3::UP));
        }
    }
}

/// Instantiate a prefab at one side, rotated relative to a reference side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawn {
    pub prefab: String,
    #[serde(default)]
    pub at: TargetSide,
    #[serde(default)]
    pub rotation: SpawnRotation,
    #[serde(default)]
    pub rotation_reference: TargetSide,
}

impl Interact for Spawn {
    fn interact(&mut self, host: &mut dyn Host, caller: ActorId, target: ActorId) {
        let Some(scene) = host.scene() else {
            return;
        };
        let Some(spawned) = scene.instantiate(&self.prefab) else {
            return;
        };

        if let Some(position) = scene.position(self.at.pick(caller, target)) {
            scene.set_position(spawned, position);
        }
        orient(
            scene,
            spawned,
            self.rotation,
            self.rotation_reference.pick(caller, target),
            all_axes(),
        );
    }
}

/// Pooled spawn, paired with a despawn on end.
///
/// Each start takes the next pooled object after the currently active ones
/// and activates it, instantiating a new one only once every pooled object
/// is in use. The pool grows as needed and only shrinks on [`Despawn::Destroy`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnPool {
    pub prefab: String,
    #[serde(default)]
    pub at: TargetSide,
    /// Parent spawned objects under the `at` actor
    #[serde(default)]
    pub parent: bool,
    #[serde(default)]
    pub rotation: SpawnRotation,
    #[serde(default)]
    pub rotation_reference: TargetSide,
    /// Which axes of the look direction are used by `look_at_reference`
    #[serde(default = "all_axes")]
    pub look_axes: [bool; 3],
    #[serde(default)]
    pub on_end: Despawn,

    #[serde(skip)]
    pool: Vec<ActorId>,
    #[serde(skip)]
    active_count: usize,
}

impl SpawnPool {
    pub fn new(prefab: impl Into<String>) -> Self {
        Self {
            prefab: prefab.into(),
            at: TargetSide::default(),
            parent: false,
            rotation: SpawnRotation::default(),
            rotation_reference: TargetSide::default(),
            look_axes: all_axes(),
            on_end: Despawn::default(),
            pool: Vec::new(),
            active_count: 0,
        }
    }

    /// Every object this pool has spawned and still owns
    pub fn pooled(&self) -> &[ActorId] {
        &self.pool
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    fn acquire(&mut self, scene: &mut dyn Scene) -> Option<ActorId> {
        if self.active_count < self.pool.len() {
            let reused = self.pool[self.active_count];
            scene.set_active(reused, true);
            self.active_count += 1;
            return Some(reused);
        }

        let spawned = scene.instantiate(&self.prefab)?;
        self.pool.push(spawned);
        self.active_count += 1;
        Some(spawned)
    }
}

impl StartEndInteract for SpawnPool {
    fn start_interact(&mut self, host: &mut dyn Host, caller: ActorId, target: ActorId) {
        let Some(scene) = host.scene() else {
            return;
        };
        let Some(spawned) = self.acquire(scene) else {
            return;
        };

        let anchor = self.at.pick(caller, target);
        if let Some(position) = scene.position(anchor) {
            scene.set_position(spawned, position);
        }
        if self.parent {
            scene.set_parent(spawned, anchor);
        }
        orient(
            scene,
            spawned,
            self.rotation,
            self.rotation_reference.pick(caller, target),
            self.look_axes,
        );
    }

    fn end_interact(&mut self, host: &mut dyn Host, _caller: ActorId, _target: ActorId) {
        let Some(scene) = host.scene() else {
            return;
        };

        match self.on_end {
            Despawn::Deactivate => {
                for &spawned in &self.pool {
                    scene.set_active(spawned, false);
                }
                self.active_count = 0;
            }
            Despawn::Destroy => {
                for spawned in self.pool.drain(..) {
                    scene.destroy(spawned);
                }
                self.active_count = 0;
            }
            Despawn::None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[derive(Default)]
    struct FakeScene {
        next_id: u64,
        positions: HashMap<ActorId, Vec3>,
        rotations: HashMap<ActorId, Quat>,
        active: HashMap<ActorId, bool>,
        parents: HashMap<ActorId, ActorId>,
        instantiated: usize,
        destroyed: Vec<ActorId>,
    }

    impl Scene for FakeScene {
        fn position(&self, actor: ActorId) -> Option<Vec3> {
            self.positions.get(&actor).copied()
        }
        fn rotation(&self, actor: ActorId) -> Option<Quat> {
            self.rotations.get(&actor).copied()
        }
        fn set_position(&mut self, actor: ActorId, position: Vec3) {
            self.positions.insert(actor, position);
        }
        fn set_rotation(&mut self, actor: ActorId, rotation: Quat) {
            self.rotations.insert(actor, rotation);
        }
        fn set_parent(&mut self, child: ActorId, parent: ActorId) {
            self.parents.insert(child, parent);
        }
        fn set_active(&mut self, actor: ActorId, active: bool) {
            self.active.insert(actor, active);
        }
        fn instantiate(&mut self, _prefab: &str) -> Option<ActorId> {
            self.next_id += 1;
            self.instantiated += 1;
            let id = ActorId(1000 + self.next_id);
            self.active.insert(id, true);
            Some(id)
        }
        fn destroy(&mut self, actor: ActorId) {
            self.destroyed.push(actor);
        }
        fn set_trail_enabled(&mut self, _actor: ActorId, _enabled: bool) -> bool {
            false
        }
    }

    #[derive(Default)]
    struct SceneHost {
        scene: FakeScene,
    }

    impl Host for SceneHost {
        fn scene(&mut self) -> Option<&mut dyn Scene> {
            Some(&mut self.scene)
        }
    }

    const CALLER: ActorId = ActorId(1);
    const TARGET: ActorId = ActorId(2);

    fn host() -> SceneHost {
        let mut host = SceneHost::default();
        host.scene.positions.insert(CALLER, Vec3::new(0.0, 0.0, 0.0));
        host.scene.positions.insert(TARGET, Vec3::new(4.0, 0.0, 0.0));
        host
    }

    #[test]
    fn test_pool_reuses_deactivated_objects() {
        let mut host = host();
        let mut pool = SpawnPool::new("spark");

        pool.start_interact(&mut host, CALLER, TARGET);
        pool.start_interact(&mut host, CALLER, TARGET);
        assert_eq!(host.scene.instantiated, 2);
        assert_eq!(pool.active_count(), 2);

        pool.end_interact(&mut host, CALLER, TARGET);
        assert_eq!(pool.active_count(), 0);
        assert!(pool.pooled().iter().all(|id| !host.scene.active[id]));

        // Reuse in pool order, no new instantiation
        pool.start_interact(&mut host, CALLER, TARGET);
        assert_eq!(host.scene.instantiated, 2);
        let first = pool.pooled()[0];
        assert!(host.scene.active[&first]);
        assert!(!host.scene.active[&pool.pooled()[1]]);

        // Growing past the pool instantiates again
        pool.start_interact(&mut host, CALLER, TARGET);
        pool.start_interact(&mut host, CALLER, TARGET);
        assert_eq!(host.scene.instantiated, 3);
        assert_eq!(pool.pooled().len(), 3);
    }

    #[test]
    fn test_pool_destroy_empties_pool() {
        let mut host = host();
        let mut pool = SpawnPool::new("spark");
        pool.on_end = Despawn::Destroy;

        pool.start_interact(&mut host, CALLER, TARGET);
        pool.end_interact(&mut host, CALLER, TARGET);
        assert_eq!(host.scene.destroyed.len(), 1);
        assert!(pool.pooled().is_empty());

        pool.start_interact(&mut host, CALLER, TARGET);
        assert_eq!(host.scene.instantiated, 2);
    }

    #[test]
    fn test_pool_places_and_parents_at_anchor() {
        let mut host = host();
        let mut pool = SpawnPool::new("aura");
        pool.parent = true;

        pool.start_interact(&mut host, CALLER, TARGET);
        let spawned = pool.pooled()[0];
        assert_eq!(host.scene.positions[&spawned], Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(host.scene.parents[&spawned], TARGET);
    }

    #[test]
    fn test_spawn_looks_at_reference() {
        let mut host = host();
        let mut spawn = Spawn {
            prefab: "arrow".to_string(),
            at: TargetSide::Caller,
            rotation: SpawnRotation::LookAtReference,
            rotation_reference: TargetSide::Target,
        };

        spawn.interact(&mut host, CALLER, TARGET);
        let spawned = ActorId(1001);
        assert_eq!(host.scene.positions[&spawned], Vec3::ZERO);
        let expected = Quat::look_rotation(Vec3::new(1.0, 0.0, 0.0), Vec3::UP);
        assert_eq!(host.scene.rotations[&spawned], expected);
    }

    #[test]
    fn test_spawn_without_scene_is_noop() {
        let mut spawn = Spawn {
            prefab: "arrow".to_string(),
            at: TargetSide::Target,
            rotation: SpawnRotation::CopyReference,
            rotation_reference: TargetSide::Caller,
        };
        spawn.interact(&mut (), CALLER, TARGET);
    }
}
