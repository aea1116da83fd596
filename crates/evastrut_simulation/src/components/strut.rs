//! EVA strut компоненты: attach state, target reference, geometry, linked module
//!
//! Архитектура:
//! - EvaStrut — единственный владелец state machine (Detached/Attaching/Attached)
//! - TargetRef — косвенная ссылка на target part (persistent id + lazy resolution)
//! - LinkedStrut — соседний модуль на той же part, зеркалит target set/lost

use bevy::prelude::*;

use crate::components::StrutAffordances;
use crate::strut::StrutConfig;

/// Состояние присоединения strut
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum StrutState {
    /// Strut свободен (или перерезан)
    #[default]
    Detached,
    /// EVA актор держит strut и целится
    Attaching,
    /// Strut соединяет две parts
    Attached,
}

/// Ссылка на target part
///
/// Никогда не держим "сырой" Entity без id: после load entity другие,
/// стабилен только flight_id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum TargetRef {
    #[default]
    Unset,
    /// Id прочитан из save, resolution ещё не выполнена
    Pending(u32),
    /// Живая part (только в Attached)
    Resolved { part: Entity, flight_id: u32 },
}

impl TargetRef {
    pub fn part(&self) -> Option<Entity> {
        match self {
            TargetRef::Resolved { part, .. } => Some(*part),
            _ => None,
        }
    }

    pub fn flight_id(&self) -> Option<u32> {
        match self {
            TargetRef::Unset => None,
            TargetRef::Pending(id) => Some(*id),
            TargetRef::Resolved { flight_id, .. } => Some(*flight_id),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, TargetRef::Resolved { .. })
    }
}

/// Геометрия strut в локальном пространстве самой strut part
///
/// Пересчитывается каждый кадр в Attaching, замораживается в Attached.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct StrutGeometry {
    pub direction: Vec3,
    pub target_position: Vec3,
    pub target_rotation: Quat,
}

impl Default for StrutGeometry {
    fn default() -> Self {
        Self::ZERO
    }
}

impl StrutGeometry {
    pub const ZERO: Self = Self {
        direction: Vec3::ZERO,
        target_position: Vec3::ZERO,
        target_rotation: Quat::IDENTITY,
    };

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

/// EVA strut attachment controller
///
/// LinkedStrut не required: без него strut удаляется на старте.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(StrutConfig, StrutAffordances, StrutAnchor)]
pub struct EvaStrut {
    pub state: StrutState,
    pub target: TargetRef,
    pub geometry: StrutGeometry,
    /// Тики с момента pickup (первые 5 пропускаем)
    pub wait_timer: u32,
    /// Load-time reconnection завершён (validity check включается только после)
    pub loaded: bool,
    /// Start-up инициализация выполнена
    pub initialized: bool,
    /// Длина strut в момент attach
    pub connection_distance: f32,
    /// Максимальная длина (= sanitized max_distance)
    pub max_length: f32,
    /// EVA vessel, который поднял strut
    pub eva: Option<Entity>,
    /// Jetpack bone этого EVA
    pub jetpack: Option<Entity>,
}

impl Default for EvaStrut {
    fn default() -> Self {
        Self {
            state: StrutState::Detached,
            target: TargetRef::Unset,
            geometry: StrutGeometry::ZERO,
            wait_timer: 0,
            loaded: false,
            initialized: false,
            connection_distance: 0.0,
            max_length: 0.0,
            eva: None,
            jetpack: None,
        }
    }
}

impl EvaStrut {
    pub fn is_attached(&self) -> bool {
        self.state == StrutState::Attached
    }

    pub fn is_attaching(&self) -> bool {
        self.state == StrutState::Attaching
    }

    /// Invariant: target resolved ⇔ Attached
    pub fn is_consistent(&self) -> bool {
        self.target.is_resolved() == self.is_attached()
    }
}

/// Linked strut module (joint) на той же part
///
/// Получает target set/lost нотификации от EvaStrut. Без него strut
/// не может работать — entity удаляется на старте.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct LinkedStrut {
    pub target: Option<Entity>,
}

impl LinkedStrut {
    pub fn on_target_set(&mut self, part: Entity) {
        self.target = Some(part);
    }

    pub fn on_target_lost(&mut self) {
        self.target = None;
    }
}

/// Anchor — дальний конец strut на target part
///
/// `local_offset` в пространстве target part (фиксируется при attach),
/// `world_position` обновляется в late update.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct StrutAnchor {
    pub local_offset: Vec3,
    pub world_position: Vec3,
}
