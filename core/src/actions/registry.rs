//! Kind registry: maps the `type` key of an action table to a constructor.

use hashbrown::HashMap;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::{
    AddForce, Event, Forward, GamepadRumble, Interact, PlaySound, SetActive, SetAnimatorBool,
    SetVelocity, Spawn, SpawnPool, StartEndInteract, StatOffset, TargetEvent, TargetedAddForce,
    Trail,
};

pub type InteractFactory = fn(toml::Value) -> Result<Box<dyn Interact>, toml::de::Error>;
pub type StartEndFactory = fn(toml::Value) -> Result<Box<dyn StartEndInteract>, toml::de::Error>;

/// Errors building a single action from its table
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("action table has no string `type` key")]
    MissingKind,

    #[error("unknown action kind `{0}`")]
    UnknownKind(String),

    #[error("action kind `{kind}` cannot be used as {expected}")]
    WrongShape { kind: String, expected: &'static str },

    #[error("invalid `{kind}` action: {source}")]
    Invalid {
        kind: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Deserialize a table straight into `T` and box it
pub fn interact_factory<T>(value: toml::Value) -> Result<Box<dyn Interact>, toml::de::Error>
where
    T: Interact + DeserializeOwned + 'static,
{
    Ok(Box::new(value.try_into::<T>()?))
}

/// Deserialize a table straight into `T` and box it
pub fn start_end_factory<T>(value: toml::Value) -> Result<Box<dyn StartEndInteract>, toml::de::Error>
where
    T: StartEndInteract + DeserializeOwned + 'static,
{
    Ok(Box::new(value.try_into::<T>()?))
}

/// Registry of action kinds.
///
/// `ActionRegistry::default()` knows every built-in kind; hosts can add
/// their own with [`register_interact`](Self::register_interact) and
/// [`register_start_end`](Self::register_start_end). Registering an
/// existing kind replaces it.
#[derive(Debug, Clone)]
pub struct ActionRegistry {
    interact: HashMap<String, InteractFactory>,
    start_end: HashMap<String, StartEndFactory>,
}

impl Default for ActionRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();

        registry.register_interact("add_force", interact_factory::<AddForce>);
        registry.register_interact("targeted_add_force", interact_factory::<TargetedAddForce>);
        registry.register_interact("set_velocity", interact_factory::<SetVelocity>);
        registry.register_interact("play_sound", interact_factory::<PlaySound>);
        registry.register_interact("set_animator_bool", interact_factory::<SetAnimatorBool>);
        registry.register_interact("set_active", interact_factory::<SetActive>);
        registry.register_interact("trail", interact_factory::<Trail>);
        registry.register_interact("stat_offset", interact_factory::<StatOffset>);
        registry.register_interact("event", interact_factory::<Event>);
        registry.register_interact("target_event", interact_factory::<TargetEvent>);
        registry.register_interact("spawn", interact_factory::<Spawn>);
        registry.register_interact("forward", interact_factory::<Forward>);

        registry.register_start_end("spawn_pool", start_end_factory::<SpawnPool>);
        registry.register_start_end("gamepad_rumble", start_end_factory::<GamepadRumble>);

        registry
    }
}

impl ActionRegistry {
    /// A registry with no kinds at all
    pub fn empty() -> Self {
        Self {
            interact: HashMap::new(),
            start_end: HashMap::new(),
        }
    }

    pub fn register_interact(&mut self, kind: impl Into<String>, factory: InteractFactory) {
        self.interact.insert(kind.into(), factory);
    }

    pub fn register_start_end(&mut self, kind: impl Into<String>, factory: StartEndFactory) {
        self.start_end.insert(kind.into(), factory);
    }

    pub fn knows(&self, kind: &str) -> bool {
        self.interact.contains_key(kind) || self.start_end.contains_key(kind)
    }

    /// Build a one-shot action from its table
    pub fn build_interact(&self, table: &toml::Table) -> Result<Box<dyn Interact>, ActionError> {
        let kind = kind_of(table)?;
        let Some(factory) = self.interact.get(kind) else {
            return Err(self.missing(kind, "a one-shot action"));
        };
        factory(toml::Value::Table(table.clone())).map_err(|source| ActionError::Invalid {
            kind: kind.to_string(),
            source,
        })
    }

    /// Build a paired start/end action from its table
    pub fn build_start_end(
        &self,
        table: &toml::Table,
    ) -> Result<Box<dyn StartEndInteract>, ActionError> {
        let kind = kind_of(table)?;
        let Some(factory) = self.start_end.get(kind) else {
            return Err(self.missing(kind, "a start/end action"));
        };
        factory(toml::Value::Table(table.clone())).map_err(|source| ActionError::Invalid {
            kind: kind.to_string(),
            source,
        })
    }

    fn missing(&self, kind: &str, expected: &'static str) -> ActionError {
        if self.knows(kind) {
            ActionError::WrongShape {
                kind: kind.to_string(),
                expected,
            }
        } else {
            ActionError::UnknownKind(kind.to_string())
        }
    }
}

fn kind_of(table: &toml::Table) -> Result<&str, ActionError> {
    table
        .get("type")
        .and_then(toml::Value::as_str)
        .ok_or(ActionError::MissingKind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(src: &str) -> toml::Table {
        toml::from_str(src).unwrap()
    }

    #[test]
    fn test_builds_builtin_kinds() {
        let registry = ActionRegistry::default();

        let force = table(
            r#"
type = "add_force"
who = "caller"
force = [0.0, 4.0]
mode = "impulse"
"#,
        );
        assert!(registry.build_interact(&force).is_ok());

        let rumble = table(
            r#"
type = "gamepad_rumble"
low = 0.2
high = 0.9
"#,
        );
        assert!(registry.build_start_end(&rumble).is_ok());
    }

    #[test]
    fn test_rejects_unknown_and_misplaced_kinds() {
        let registry = ActionRegistry::default();

        let unknown = table(r#"type = "teleport""#);
        assert!(matches!(
            registry.build_interact(&unknown),
            Err(ActionError::UnknownKind(kind)) if kind == "teleport"
        ));

        let paired = table(r#"type = "gamepad_rumble""#);
        assert!(matches!(
            registry.build_interact(&paired),
            Err(ActionError::WrongShape { .. })
        ));

        let untyped = table(r#"who = "target""#);
        assert!(matches!(
            registry.build_interact(&untyped),
            Err(ActionError::MissingKind)
        ));
    }

    #[test]
    fn test_reports_invalid_fields() {
        let registry = ActionRegistry::default();
        let bad = table(
            r#"
type = "play_sound"
who = "nobody"
sound = "whoosh"
"#,
        );
        match registry.build_interact(&bad) {
            Err(ActionError::Invalid { kind, .. }) => assert_eq!(kind, "play_sound"),
            other => panic!("expected invalid action, got {other:?}"),
        }
    }

    #[test]
    fn test_custom_kind_registration() {
        #[derive(Debug, serde::Deserialize)]
        struct Nothing {}

        impl Interact for Nothing {
            fn interact(
                &mut self,
                _host: &mut dyn crate::host::Host,
                _caller: crate::actor::ActorId,
                _target: crate::actor::ActorId,
            ) {
            }
        }

        let mut registry = ActionRegistry::empty();
        assert!(!registry.knows("nothing"));
        registry.register_interact("nothing", interact_factory::<Nothing>);
        assert!(registry.build_interact(&table(r#"type = "nothing""#)).is_ok());
    }
}
