//! EVA Strut Simulation Core
//!
//! ECS-симуляция EVA strut на Bevy 0.16: EVA актор поднимает strut,
//! целится в part своего vessel, присоединяет и перерезает.
//!
//! HYBRID ARCHITECTURE:
//! - ECS = strut state machine, persistence, validity rules
//! - Host = physics (raycasts), scene graph, save file format, UI

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod components;
pub mod host;
pub mod logger;
pub mod physics;
pub mod spawn;
pub mod strut;

// Re-export базовых компонентов для удобства
pub use components::*;
pub use host::{AimInput, AnchorPreview, AnchorPreviewSink, ScreenMessage};
pub use logger::{init_logger, log, log_error, log_info, log_warning, LogLevel, LogPrinter};
pub use physics::{InjectedProbe, PhysicsProbe, ProbeFilter, ProbeHit, SphereProbe};
pub use strut::{
    SeverCause, StrutAction, StrutActionKind, StrutAttached, StrutConfig, StrutPhysics,
    StrutPlugin, StrutSaveNode, StrutSevered,
};

/// Главный plugin симуляции
pub struct SimulationPlugin {
    pub physics: StrutPhysics,
}

impl Default for SimulationPlugin {
    fn default() -> Self {
        Self {
            physics: StrutPhysics::Rapier,
        }
    }
}

impl SimulationPlugin {
    /// Без rapier: raycasts через InjectedProbe resource
    pub fn headless() -> Self {
        Self {
            physics: StrutPhysics::Injected,
        }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для validity check
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .add_plugins(StrutPlugin {
                physics: self.physics,
            });
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции (strut plugin с injected probe)
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .add_plugins(SimulationPlugin::headless());

    app
}
