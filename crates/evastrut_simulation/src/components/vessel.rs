//! Vessel/part компоненты: принадлежность part к vessel, persistent id, активный vessel

use bevy::prelude::*;

/// Vessel — корабль или EVA актор (сам по себе тоже vessel)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Vessel {
    pub name: String,
    /// EVA актор (игрок вне корабля)
    pub is_eva: bool,
}

impl Vessel {
    pub fn ship(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_eva: false,
        }
    }

    pub fn eva(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_eva: true,
        }
    }
}

/// Part — физическая деталь vessel
///
/// `flight_id` — persistent identifier (стабилен между save/load),
/// `vessel` — текущий владелец (меняется при decouple/undock).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Part {
    pub flight_id: u32,
    pub vessel: Entity,
}

impl Part {
    pub fn new(flight_id: u32, vessel: Entity) -> Self {
        Self { flight_id, vessel }
    }
}

/// Vessel под управлением игрока (host заполняет при смене фокуса)
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveVessel(pub Option<Entity>);

impl ActiveVessel {
    pub fn get(&self) -> Option<Entity> {
        self.0
    }
}

/// Текущая сцена host'а
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GameScene {
    #[default]
    Flight,
    Editor,
    /// Space center, tracking station и прочие сцены без полёта
    Other,
}

impl GameScene {
    pub fn is_flight(&self) -> bool {
        matches!(self, GameScene::Flight)
    }
}

/// Host world закончил инициализацию (flight globals ready)
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldReady(pub bool);
