pub mod actions;
pub mod actor;
pub mod config;
pub mod definitions;
pub mod host;
pub mod interaction;
pub mod library;
pub mod machine;

// Re-exports for convenience
pub use actions::{ActionError, ActionRegistry, Interact, StartEndInteract};
pub use actor::ActorId;
pub use config::ConfigError;
pub use definitions::{InteractionDefinition, MachineConfig, SequenceDefinition, WhenToStart};
pub use host::{
    Animation, Attachments, Audio, Events, ForceMode, Host, Physics, Rumble, Scene, Stats,
};
pub use interaction::{Interaction, NamedInteraction};
pub use library::{ConfigIssue, InteractionId, Library, ResolvedSequence, SequenceId};
pub use machine::{InteractionMachine, SequenceInstance, TargetRecord};

pub use cadence_types::{
    Audience, MachineSettings, Quat, RecallPolicy, RemovalMode, StartDispatch, TargetSide, Vec2,
    Vec3,
};
