//! cadence-validate - Check a machine file and optionally dry-run it.
//!
//! Usage: cadence-validate <FILE> [--simulate SECS] [--dt SECS] [--targets N] [--allow-issues]
//!
//! Every configuration issue is printed. With `--simulate` the machine runs
//! against a host that logs each service call instead of touching a game.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use cadence_core::{
    ActionRegistry, ActorId, Animation, Attachments, Audio, Events, ForceMode, Host,
    InteractionMachine, Physics, Rumble, Scene, Stats, config,
};
use cadence_types::{Quat, Vec2, Vec3};
use clap::Parser;
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Validate an interaction machine file")]
struct Cli {
    /// Machine file (TOML)
    file: PathBuf,

    /// Run the machine for this many simulated seconds
    #[arg(long, value_name = "SECS")]
    simulate: Option<f32>,

    /// Tick length used by the simulation
    #[arg(long, value_name = "SECS", default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Number of synthetic targets to start
    #[arg(long, value_name = "N", default_value_t = 1)]
    targets: u64,

    /// Exit successfully even when configuration issues were found
    #[arg(long)]
    allow_issues: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tracing host - logs every service call
// ─────────────────────────────────────────────────────────────────────────────

const OWNER: ActorId = ActorId(0);
const CAMERA: ActorId = ActorId(u64::MAX);

struct TraceHost {
    positions: HashMap<ActorId, Vec3>,
    rotations: HashMap<ActorId, Quat>,
    next_spawn: u64,
    attachments: Attachments,
    calls: usize,
}

impl TraceHost {
    fn new() -> Self {
        Self {
            positions: HashMap::new(),
            rotations: HashMap::new(),
            next_spawn: 1_000_000,
            attachments: Attachments::new(),
            calls: 0,
        }
    }
}

impl Physics for TraceHost {
    fn add_force(&mut self, actor: ActorId, force: Vec2, mode: ForceMode) -> bool {
        self.calls += 1;
        tracing::info!(%actor, ?force, ?mode, "physics.add_force");
        true
    }

    fn set_velocity(&mut self, actor: ActorId, velocity: Vec2) -> bool {
        self.calls += 1;
        tracing::info!(%actor, ?velocity, "physics.set_velocity");
        true
    }
}

impl Scene for TraceHost {
    fn position(&self, actor: ActorId) -> Option<Vec3> {
        Some(self.positions.get(&actor).copied().unwrap_or(Vec3::ZERO))
    }

    fn rotation(&self, actor: ActorId) -> Option<Quat> {
        Some(self.rotations.get(&actor).copied().unwrap_or_default())
    }

    fn set_position(&mut self, actor: ActorId, position: Vec3) {
        self.calls += 1;
        tracing::info!(%actor, ?position, "scene.set_position");
        self.positions.insert(actor, position);
    }

    fn set_rotation(&mut self, actor: ActorId, rotation: Quat) {
        self.calls += 1;
        tracing::info!(%actor, ?rotation, "scene.set_rotation");
        self.rotations.insert(actor, rotation);
    }

    fn set_parent(&mut self, child: ActorId, parent: ActorId) {
        self.calls += 1;
        tracing::info!(%child, %parent, "scene.set_parent");
    }

    fn set_active(&mut self, actor: ActorId, active: bool) {
        self.calls += 1;
        tracing::info!(%actor, active, "scene.set_active");
    }

    fn instantiate(&mut self, prefab: &str) -> Option<ActorId> {
        self.calls += 1;
        let actor = ActorId(self.next_spawn);
        self.next_spawn += 1;
        tracing::info!(prefab, %actor, "scene.instantiate");
        Some(actor)
    }

    fn destroy(&mut self, actor: ActorId) {
        self.calls += 1;
        tracing::info!(%actor, "scene.destroy");
        self.positions.remove(&actor);
        self.rotations.remove(&actor);
    }

    fn set_trail_enabled(&mut self, actor: ActorId, enabled: bool) -> bool {
        self.calls += 1;
        tracing::info!(%actor, enabled, "scene.set_trail_enabled");
        true
    }
}

impl Audio for TraceHost {
    fn play(&mut self, on: ActorId, sound: &str) {
        self.calls += 1;
        tracing::info!(%on, sound, "audio.play");
    }
}

impl Animation for TraceHost {
    fn set_bool(&mut self, actor: ActorId, parameter: &str, value: bool) -> usize {
        self.calls += 1;
        tracing::info!(%actor, parameter, value, "animation.set_bool");
        1
    }
}

impl Rumble for TraceHost {
    fn set_motor_speeds(&mut self, actor: ActorId, low: f32, high: f32) -> bool {
        self.calls += 1;
        tracing::info!(%actor, low, high, "rumble.set_motor_speeds");
        true
    }
}

impl Stats for TraceHost {
    fn offset(&mut self, actor: ActorId, stat: &str, amount: i32) -> bool {
        self.calls += 1;
        tracing::info!(%actor, stat, amount, "stats.offset");
        true
    }
}

impl Events for TraceHost {
    fn emit(&mut self, event: &str, subject: Option<ActorId>) {
        self.calls += 1;
        tracing::info!(event, subject = ?subject, "events.emit");
    }
}

impl Host for TraceHost {
    fn physics(&mut self) -> Option<&mut dyn Physics> {
        Some(self)
    }

    fn scene(&mut self) -> Option<&mut dyn Scene> {
        Some(self)
    }

    fn audio(&mut self) -> Option<&mut dyn Audio> {
        Some(self)
    }

    fn animation(&mut self) -> Option<&mut dyn Animation> {
        Some(self)
    }

    fn rumble(&mut self) -> Option<&mut dyn Rumble> {
        Some(self)
    }

    fn stats(&mut self) -> Option<&mut dyn Stats> {
        Some(self)
    }

    fn events(&mut self) -> Option<&mut dyn Events> {
        Some(self)
    }

    fn attachments(&mut self) -> Option<&mut Attachments> {
        Some(&mut self.attachments)
    }

    fn main_reference(&self) -> Option<ActorId> {
        Some(CAMERA)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry point
// ─────────────────────────────────────────────────────────────────────────────

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let machine_file = match config::load_file(&cli.file) {
        Ok(file) => file,
        Err(e) => {
            tracing::error!(error = %e, "failed to load machine file");
            return ExitCode::from(2);
        }
    };

    let (settings, library) = machine_file.build(&ActionRegistry::default());

    println!(
        "{}: {} interactions, {} sequences",
        cli.file.display(),
        library.interactions().len(),
        library.sequences().count()
    );
    for issue in library.issues() {
        println!("  issue: {issue}");
    }
    let issues = library.issues().len();

    if let Some(budget) = cli.simulate {
        if cli.dt.is_nan() || cli.dt <= 0.0 {
            tracing::error!(dt = cli.dt, "--dt must be positive");
            return ExitCode::from(2);
        }
        simulate(
            InteractionMachine::new(OWNER, settings, library, TraceHost::new()),
            budget,
            cli.dt,
            cli.targets,
        );
    }

    if issues > 0 && !cli.allow_issues {
        println!("{issues} configuration issue(s)");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn simulate(mut machine: InteractionMachine<TraceHost>, budget: f32, dt: f32, targets: u64) {
    for raw in 1..=targets {
        machine.start_interaction(ActorId(raw));
    }

    let max_ticks = tick_budget(budget, dt);
    let mut ticks = 0u64;
    while ticks < max_ticks && machine.target_count() > 0 {
        machine.on_fixed_tick(dt);
        machine.on_variable_tick(dt);
        ticks += 1;
    }
    let elapsed = ticks as f64 * f64::from(dt);

    let still_running: usize = machine
        .targets()
        .iter()
        .map(|target| target.instances().len())
        .sum();
    println!(
        "simulated {elapsed:.3}s in {ticks} ticks: {} of {targets} target(s) still active, {still_running} instance(s) running, {} host call(s)",
        machine.target_count(),
        machine.host().calls,
    );

    machine.end_all_state();
}

/// Number of `dt` ticks needed to cover `budget` seconds
fn tick_budget(budget: f32, dt: f32) -> u64 {
    if budget.is_nan() || budget <= 0.0 {
        return 0;
    }
    // Float to int casts saturate, so an infinite budget runs until targets retire
    (f64::from(budget) / f64::from(dt)).ceil() as u64
}
