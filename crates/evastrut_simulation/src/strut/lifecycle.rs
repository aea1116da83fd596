//! Strut lifecycle: attach/sever/drop + start-up, validity check, late update, destroy
//!
//! Все переходы state machine проходят через методы StrutQueryItem —
//! affordances, linked module и anchor меняются согласованно.

use bevy::ecs::query::QueryData;
use bevy::prelude::*;

use crate::components::{
    EvaStrut, GameScene, LinkedStrut, Part, StrutAffordances, StrutAnchor, StrutGeometry,
    StrutState, TargetRef,
};
use crate::strut::config::StrutConfig;
use crate::strut::events::{SeverCause, StrutEvents};
use crate::strut::persistence::LoadedSaveNode;

/// Всё, что меняет переход state machine
#[derive(QueryData)]
#[query_data(mutable)]
pub struct StrutQuery {
    pub entity: Entity,
    pub strut: &'static mut EvaStrut,
    pub affordances: &'static mut StrutAffordances,
    pub linked: Option<&'static mut LinkedStrut>,
    pub anchor: Option<&'static mut StrutAnchor>,
}

impl StrutQueryItem<'_> {
    /// Attach к target part
    ///
    /// `geometry.target_position` уже выставлена (aiming или save node).
    /// Возвращает длину strut.
    pub fn attach(
        &mut self,
        target: Entity,
        flight_id: u32,
        strut_transform: &GlobalTransform,
        target_transform: &GlobalTransform,
    ) -> f32 {
        let anchor_world = strut_transform.transform_point(self.strut.geometry.target_position);
        let length = (anchor_world - strut_transform.translation()).length();

        self.strut.target = TargetRef::Resolved {
            part: target,
            flight_id,
        };
        self.affordances.set_attached(length);
        if let Some(linked) = self.linked.as_mut() {
            linked.on_target_set(target);
        }
        if let Some(anchor) = self.anchor.as_mut() {
            anchor.local_offset = target_transform.affine().inverse().transform_point3(anchor_world);
            anchor.world_position = anchor_world;
        }

        self.strut.connection_distance = length;
        self.strut.state = StrutState::Attached;
        length
    }

    /// Sever: возврат в Detached из любого состояния
    pub fn sever(&mut self) {
        self.affordances.set_detached();
        if let Some(linked) = self.linked.as_mut() {
            linked.on_target_lost();
        }
        if let Some(anchor) = self.anchor.as_mut() {
            **anchor = StrutAnchor::default();
        }

        let strut = &mut self.strut;
        strut.target = TargetRef::Unset;
        strut.geometry = StrutGeometry::ZERO;
        strut.connection_distance = 0.0;
        strut.eva = None;
        strut.jetpack = None;
        strut.state = StrutState::Detached;
    }

    /// Drop: EVA бросил strut, geometry не трогаем
    pub fn drop_strut(&mut self) {
        self.affordances.set_detached();
        if let Some(linked) = self.linked.as_mut() {
            linked.on_target_lost();
        }

        let strut = &mut self.strut;
        strut.target = TargetRef::Unset;
        strut.eva = None;
        strut.jetpack = None;
        strut.state = StrutState::Detached;
    }

    /// Мировая позиция дальнего конца strut
    pub fn anchor_world(&self, strut_transform: &GlobalTransform) -> Vec3 {
        match self.anchor.as_ref() {
            Some(anchor) if self.strut.is_attached() => anchor.world_position,
            _ => strut_transform.transform_point(self.strut.geometry.target_position),
        }
    }
}

/// Start-up: sanitize config, проверка linked module
///
/// Strut без LinkedStrut не может работать — удаляем entity.
pub fn initialize_struts(
    mut commands: Commands,
    mut struts: Query<
        (Entity, &mut EvaStrut, &mut StrutConfig, Has<LinkedStrut>, Has<LoadedSaveNode>),
        Added<EvaStrut>,
    >,
) {
    for (entity, mut strut, mut config, has_linked, has_save) in struts.iter_mut() {
        config.sanitize();
        strut.max_length = config.max_distance;

        if !has_linked {
            crate::log_warning(&format!(
                "Error in detecting the linked strut module on {:?}; removing this object...",
                entity
            ));
            commands.entity(entity).despawn();
            continue;
        }

        strut.initialized = true;
        // Свежая part (не из save) — reconnection не нужен
        if !has_save {
            strut.loaded = true;
        }

        crate::log(&format!(
            "Strut {:?} initialized (skill: {:?}, min level: {}, max distance: {})",
            entity, config.use_skill, config.min_level, config.max_distance
        ));
    }
}

/// Editor сцена: aiming невозможен, Attaching сбрасываем
pub fn reset_struts_in_editor(scene: Res<GameScene>, mut struts: Query<StrutQuery>) {
    if *scene != GameScene::Editor {
        return;
    }

    for mut item in struts.iter_mut() {
        if item.strut.is_attaching() {
            item.drop_strut();
        }
    }
}

/// FixedUpdate: target исчез или ушёл на другой vessel → sever
pub fn check_strut_validity(
    mut struts: Query<(StrutQuery, Option<&Part>)>,
    parts: Query<&Part>,
    mut events: StrutEvents,
) {
    for (mut item, own_part) in struts.iter_mut() {
        if !item.strut.is_attached() || !item.strut.loaded {
            continue;
        }

        let own_vessel = own_part.map(|p| p.vessel);
        let target_vessel = item
            .strut
            .target
            .part()
            .and_then(|target| parts.get(target).ok())
            .map(|p| p.vessel);

        let still_valid = matches!((target_vessel, own_vessel), (Some(t), Some(o)) if t == o);
        if still_valid {
            continue;
        }

        crate::log_info(&format!(
            "Strut {:?} lost its target (target vessel {:?}, own vessel {:?}); severing",
            item.entity, target_vessel, own_vessel
        ));
        item.sever();
        events.severed(item.entity, SeverCause::TargetLost);
    }
}

/// Late update: anchor следует за target part
pub fn track_attached_anchors(
    mut struts: Query<(&EvaStrut, &mut StrutAnchor)>,
    transforms: Query<&GlobalTransform>,
) {
    for (strut, mut anchor) in struts.iter_mut() {
        if strut.state != StrutState::Attached {
            continue;
        }

        let Some(target) = strut.target.part() else {
            continue;
        };
        let Ok(target_transform) = transforms.get(target) else {
            continue;
        };

        let world_position = target_transform.transform_point(anchor.local_offset);
        if anchor.world_position != world_position {
            anchor.world_position = world_position;
        }
    }
}

/// Observer: strut part уничтожена
///
/// Не-Attached strut перерезаем, чтобы не осталось полу-присоединённой геометрии.
/// Strut, не прошедшая start-up (нет linked module), молча уходит.
pub fn on_strut_removed(
    trigger: Trigger<OnRemove, EvaStrut>,
    mut struts: Query<StrutQuery>,
    mut events: StrutEvents,
) {
    let entity = trigger.target();
    let Ok(mut item) = struts.get_mut(entity) else {
        return;
    };

    if !item.strut.initialized || item.strut.is_attached() {
        return;
    }

    item.sever();
    events.severed(entity, SeverCause::Destroyed);
}
