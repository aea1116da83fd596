//! Strut events
//!
//! Входящие: StrutAction (host UI → ECS).
//! Исходящие: attach/sever/drop + target set/lost нотификации linked module.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

/// Действие игрока над strut (клик по affordance)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrutAction {
    pub strut: Entity,
    pub kind: StrutActionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrutActionKind {
    Pickup,
    Cut,
    Drop,
}

impl StrutAction {
    pub fn pickup(strut: Entity) -> Self {
        Self { strut, kind: StrutActionKind::Pickup }
    }

    pub fn cut(strut: Entity) -> Self {
        Self { strut, kind: StrutActionKind::Cut }
    }

    pub fn drop(strut: Entity) -> Self {
        Self { strut, kind: StrutActionKind::Drop }
    }
}

/// Strut присоединён к target part
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct StrutAttached {
    pub strut: Entity,
    pub target: Entity,
    pub target_id: u32,
    pub length: f32,
}

/// Почему strut перерезан
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverCause {
    /// Игрок нажал cut
    Cut,
    /// Target part исчезла или ушла на другой vessel
    TargetLost,
    /// В save нет target id
    NotPersisted,
    /// Target id в save не парсится
    MalformedId,
    /// Target id не найден при reconnection
    TargetNotFound,
    /// Strut part уничтожена до attach
    Destroyed,
}

/// Strut перерезан (state → Detached, geometry обнулена)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrutSevered {
    pub strut: Entity,
    pub cause: SeverCause,
}

/// EVA бросил strut не присоединив
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrutDropped {
    pub strut: Entity,
}

/// Linked module: target установлен
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrutTargetSet {
    pub strut: Entity,
    pub target: Entity,
}

/// Linked module: target потерян
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrutTargetLost {
    pub strut: Entity,
}

/// Все исходящие события strut одним параметром
#[derive(SystemParam)]
pub struct StrutEvents<'w> {
    attached: EventWriter<'w, StrutAttached>,
    severed: EventWriter<'w, StrutSevered>,
    dropped: EventWriter<'w, StrutDropped>,
    target_set: EventWriter<'w, StrutTargetSet>,
    target_lost: EventWriter<'w, StrutTargetLost>,
}

impl StrutEvents<'_> {
    pub fn attached(&mut self, strut: Entity, target: Entity, target_id: u32, length: f32) {
        self.target_set.write(StrutTargetSet { strut, target });
        self.attached.write(StrutAttached {
            strut,
            target,
            target_id,
            length,
        });
    }

    pub fn severed(&mut self, strut: Entity, cause: SeverCause) {
        self.target_lost.write(StrutTargetLost { strut });
        self.severed.write(StrutSevered { strut, cause });
    }

    pub fn dropped(&mut self, strut: Entity) {
        self.target_lost.write(StrutTargetLost { strut });
        self.dropped.write(StrutDropped { strut });
    }
}
