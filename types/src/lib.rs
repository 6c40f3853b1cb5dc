//! Shared configuration types for the cadence interaction machine.
//!
//! Everything here is plain data with serde derives so machine files,
//! the core scheduler and tooling agree on one vocabulary.

pub mod math;
pub mod settings;

pub use math::{Quat, Vec2, Vec3};
pub use settings::{Audience, MachineSettings, RecallPolicy, RemovalMode, StartDispatch, TargetSide};
