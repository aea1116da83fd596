//! EVA strut module
//!
//! State machine: Detached → Attaching → Attached → Detached (cut из любого состояния).
//!
//! Host lifecycle → Bevy schedules:
//! - start-up → initialize_struts (Added<EvaStrut>)
//! - update → load, reconnection, actions, aiming (Update, chain)
//! - late update → track_attached_anchors (PostUpdate)
//! - fixed update → check_strut_validity (FixedUpdate)
//! - destroy → observer on_strut_removed

use bevy::prelude::*;

pub mod actions;
pub mod aim;
pub mod config;
pub mod events;
pub mod lifecycle;
pub mod persistence;
pub mod target;


pub use actions::{check_pickup, PickupRefusal};
pub use aim::{AimOutcome, AIM_SETTLE_TICKS, CURSOR_PROBE_DISTANCE, EVA_REACH};
pub use config::{canonical_skill, clamp_max_distance, clamp_min_level, StrutConfig, SKILL_ALLOW_LIST};
pub use events::{
    SeverCause, StrutAction, StrutActionKind, StrutAttached, StrutDropped, StrutSevered,
    StrutTargetLost, StrutTargetSet,
};
pub use lifecycle::StrutQuery;
pub use persistence::{
    snapshot_struts, LoadedSaveNode, PendingReconnect, ReconnectProgress, StrutLoadError,
    StrutSaveNode, RECONNECT_SETTLE_TICKS,
};
pub use target::{resolve_target, ResolveError};

use crate::components::{
    ActiveVessel, EvaStrut, GameScene, LinkedStrut, StrutAffordances, StrutAnchor, WorldReady,
};
use crate::host::{input, preview, AimInput, ScreenMessage};

/// Откуда берутся raycasts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StrutPhysics {
    /// bevy_rapier3d context (host с RapierPhysicsPlugin)
    #[default]
    Rapier,
    /// `InjectedProbe` resource
    Injected,
}

/// Strut Plugin
///
/// Порядок в Update:
/// 1. initialize_struts — sanitize config, linked module check
/// 2. reset_struts_in_editor — editor сцена
/// 3. apply_loaded_struts — save node → Pending target
/// 4. advance_reconnects — resolution после settle
/// 5. handle_strut_actions — pickup/cut/drop
/// 6. aim — two-phase raycast + attach
#[derive(Debug, Clone, Copy, Default)]
pub struct StrutPlugin {
    pub physics: StrutPhysics,
}

impl StrutPlugin {
    pub fn injected() -> Self {
        Self {
            physics: StrutPhysics::Injected,
        }
    }
}

impl Plugin for StrutPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<StrutAction>()
            .add_event::<StrutAttached>()
            .add_event::<StrutSevered>()
            .add_event::<StrutDropped>()
            .add_event::<StrutTargetSet>()
            .add_event::<StrutTargetLost>()
            .add_event::<ScreenMessage>();

        app.init_resource::<AimInput>()
            .init_resource::<ActiveVessel>()
            .init_resource::<GameScene>()
            .init_resource::<WorldReady>();

        app.register_type::<EvaStrut>()
            .register_type::<StrutAffordances>()
            .register_type::<LinkedStrut>()
            .register_type::<StrutAnchor>()
            .register_type::<StrutConfig>();

        app.add_systems(Startup, preview::report_anchor_preview);

        let strut_update = (
            lifecycle::initialize_struts,
            lifecycle::reset_struts_in_editor,
            persistence::apply_loaded_struts,
            persistence::advance_reconnects,
            actions::handle_strut_actions,
        )
            .chain();
        match self.physics {
            StrutPhysics::Rapier => {
                app.add_systems(Update, (strut_update, aim::aim_struts_rapier).chain());
            }
            StrutPhysics::Injected => {
                app.add_systems(Update, (strut_update, aim::aim_struts_injected).chain());
            }
        }

        app.add_systems(
            PostUpdate,
            (lifecycle::track_attached_anchors, input::clear_released).chain(),
        );
        app.add_systems(FixedUpdate, lifecycle::check_strut_validity);
        app.add_observer(lifecycle::on_strut_removed);
    }
}
