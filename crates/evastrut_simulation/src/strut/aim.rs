//! Aiming: two-phase raycast пока EVA держит strut
//!
//! Каждый кадр в Attaching (после 5 тиков settle):
//! 1. Луч камеры через курсор (20м) — ищем part под курсором
//! 2. Луч от origin strut в ту же точку (max_distance), собственные colliders исключены —
//!    точная точка поверхности и нормаль
//! 3. Кнопка отпущена и точка в пределах max_distance → attach
//!
//! Любой промах (пусто под курсором, чужой vessel, EVA, слишком далеко) —
//! один исход "no valid target": свободный конец следует за jetpack.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier3d::prelude::ReadRapierContext;

use crate::components::{ActiveVessel, GameScene, Part, StrutGeometry, Vessel};
use crate::host::{AimInput, AnchorPreview};
use crate::physics::{InjectedProbe, PhysicsProbe, ProbeError, ProbeFilter, ProbeHit, MASK_STRUT_PROBE};
use crate::strut::config::StrutConfig;
use crate::strut::events::StrutEvents;
use crate::strut::lifecycle::StrutQuery;
use crate::strut::target::{is_valid_target, owning_part};

/// Тики после pickup без aiming (мышь ещё "держит" клик pickup)
pub const AIM_SETTLE_TICKS: u32 = 5;

/// Дальность луча камеры
pub const CURSOR_PROBE_DISTANCE: f32 = 20.0;

/// EVA должен быть ближе этого к точке попадания
pub const EVA_REACH: f32 = 8.0;

/// Поворот, переводящий `from` в направление `to` (identity для нулевого `to`)
pub fn from_to_rotation(from: Vec3, to: Vec3) -> Quat {
    to.try_normalize()
        .map(|to| Quat::from_rotation_arc(from, to))
        .unwrap_or(Quat::IDENTITY)
}

/// Preview геометрия для точки попадания (локальное пространство strut)
pub fn geometry_for_hit(strut_transform: &GlobalTransform, hit: &ProbeHit) -> StrutGeometry {
    let inverse = strut_transform.affine().inverse();
    let local_point = inverse.transform_point3(hit.point);
    let local_normal = inverse.transform_vector3(hit.normal);

    StrutGeometry {
        direction: local_point.normalize_or_zero(),
        target_position: local_point,
        target_rotation: from_to_rotation(Vec3::X, local_normal),
    }
}

/// Свободный конец следует за jetpack
pub fn geometry_for_jetpack(strut_transform: &GlobalTransform, jetpack: Vec3) -> StrutGeometry {
    let inverse = strut_transform.affine().inverse();
    let local_point = inverse.transform_point3(jetpack);

    StrutGeometry {
        direction: local_point.normalize_or_zero(),
        target_position: local_point,
        target_rotation: from_to_rotation(Vec3::NEG_X, inverse.transform_vector3(jetpack)),
    }
}

/// Исход одного кадра aiming
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AimOutcome {
    /// Под курсором нет подходящей part
    NoValidTarget,
    /// Валидная part, ждём отпускания кнопки
    Tracking { part: Entity },
    /// Attach выполнен
    Attached { part: Entity, length: f32 },
}

/// Всё, что нужно aiming системе кроме probe
#[derive(SystemParam)]
pub struct AimWorld<'w, 's> {
    scene: Res<'w, GameScene>,
    input: Res<'w, AimInput>,
    active: Res<'w, ActiveVessel>,
    preview: Option<Res<'w, AnchorPreview>>,
    struts: Query<
        'w,
        's,
        (
            StrutQuery,
            &'static StrutConfig,
            &'static GlobalTransform,
            Option<&'static Part>,
        ),
    >,
    children: Query<'w, 's, &'static Children>,
    parts: Query<'w, 's, &'static Part>,
    parents: Query<'w, 's, &'static ChildOf>,
    vessels: Query<'w, 's, &'static Vessel>,
    transforms: Query<'w, 's, &'static GlobalTransform>,
    events: StrutEvents<'w>,
}

impl AimWorld<'_, '_> {
    pub fn any_attaching(&self) -> bool {
        self.struts.iter().any(|(item, ..)| item.strut.is_attaching())
    }

    /// Один кадр aiming для всех Attaching struts
    pub fn run(&mut self, probe: &dyn PhysicsProbe) {
        if !self.scene.is_flight() {
            return;
        }

        let AimWorld {
            input,
            active,
            preview,
            struts,
            children,
            parts,
            parents,
            vessels,
            transforms,
            events,
            ..
        } = self;
        let (children, parts, parents, vessels, transforms) =
            (&*children, &*parts, &*parents, &*vessels, &*transforms);

        for (mut item, config, strut_transform, own_part) in struts.iter_mut() {
            if !item.strut.is_attaching() {
                continue;
            }

            if item.strut.wait_timer < AIM_SETTLE_TICKS {
                item.strut.wait_timer += 1;
                continue;
            }

            let strut_position = strut_transform.translation();
            let max_distance = config.max_distance;
            let eva = item.strut.eva;
            let eva_position = eva.and_then(|e| transforms.get(e).ok()).map(|t| t.translation());
            let eva_is_active = eva.is_some() && eva == active.get();

            // checkDistance: EVA активен, EVA и strut достают до точки
            let within_reach = |hit: &ProbeHit| match eva_position {
                Some(eva_position) => {
                    eva_is_active
                        && eva_position.distance(hit.point) < EVA_REACH
                        && strut_position.distance(hit.point) < max_distance
                }
                None => false,
            };

            // Collider внутри самой strut (любой глубины) — не target
            let strut_entity = item.entity;
            let valid_part = |hit: &ProbeHit| {
                let own_vessel = own_part?.vessel;
                let (entity, part) = owning_part(hit.collider, parts, parents)?;
                (entity != strut_entity && is_valid_target(&part, own_vessel, vessels))
                    .then_some((entity, part))
            };

            let filter = ProbeFilter::layers(MASK_STRUT_PROBE);
            let cursor_hit = input.cursor_ray.and_then(|ray| {
                probe.cast_ray(ray.origin, ray.direction, CURSOR_PROBE_DISTANCE, &filter)
            });

            let strut_hit = cursor_hit
                .filter(|hit| within_reach(hit))
                .filter(|hit| valid_part(hit).is_some())
                .and_then(|hit| {
                    // Направление в пространстве strut → обратно в world (как делает host)
                    let local = strut_transform
                        .affine()
                        .inverse()
                        .transform_point3(hit.point)
                        .normalize_or_zero();
                    let direction =
                        Dir3::new(strut_transform.affine().transform_vector3(local)).ok()?;

                    let own_colliders =
                        std::iter::once(strut_entity).chain(children.iter_descendants(strut_entity));
                    let filter = ProbeFilter::layers(MASK_STRUT_PROBE).excluding(own_colliders);
                    probe.cast_ray(strut_position, direction, max_distance, &filter)
                })
                .filter(|hit| within_reach(hit))
                .and_then(|hit| valid_part(&hit).map(|target| (hit, target)));

            let outcome = match strut_hit {
                Some((hit, (part_entity, part))) => {
                    item.strut.geometry = geometry_for_hit(strut_transform, &hit);

                    let in_range = strut_position.distance(hit.point) < max_distance;
                    match transforms.get(part_entity) {
                        Ok(target_transform) if input.released && in_range => {
                            let length = item.attach(
                                part_entity,
                                part.flight_id,
                                strut_transform,
                                target_transform,
                            );
                            events.attached(item.entity, part_entity, part.flight_id, length);
                            AimOutcome::Attached {
                                part: part_entity,
                                length,
                            }
                        }
                        _ => AimOutcome::Tracking { part: part_entity },
                    }
                }
                None => {
                    item.strut.geometry = item
                        .strut
                        .jetpack
                        .and_then(|j| transforms.get(j).ok())
                        .map(|j| geometry_for_jetpack(strut_transform, j.translation()))
                        .unwrap_or(StrutGeometry::ZERO);
                    AimOutcome::NoValidTarget
                }
            };

            if let AimOutcome::Attached { part, length } = outcome {
                crate::log_info(&format!(
                    "Strut {:?} attached to {:?} (length {:.2})",
                    item.entity, part, length
                ));
                continue;
            }

            if let Some(preview) = preview.as_ref() {
                preview.preview(item.entity, &item.strut.geometry);
            }
        }
    }
}

/// Aiming через injected probe (headless, тесты, custom host)
pub fn aim_struts_injected(probe: Option<Res<InjectedProbe>>, mut aim: AimWorld) {
    if let Some(probe) = probe {
        aim.run(&*probe);
    }
}

/// Aiming через rapier context
pub fn aim_struts_rapier(rapier: ReadRapierContext, mut aim: AimWorld, mut reported: Local<bool>) {
    if !aim.any_attaching() {
        return;
    }

    match rapier.single() {
        Ok(context) => {
            *reported = false;
            aim.run(&context);
        }
        Err(_) => {
            if !*reported {
                crate::log_error(&format!("Strut aiming skipped: {}", ProbeError::ContextUnavailable));
                *reported = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_for_hit_in_strut_space() {
        let strut_transform = GlobalTransform::from_translation(Vec3::new(10.0, 0.0, 0.0));
        let hit = ProbeHit {
            collider: Entity::PLACEHOLDER,
            point: Vec3::new(10.0, 0.0, 5.0),
            normal: Vec3::NEG_Z,
            distance: 5.0,
        };

        let geometry = geometry_for_hit(&strut_transform, &hit);
        assert!((geometry.target_position - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-4);
        assert!((geometry.direction - Vec3::Z).length() < 1e-4);
        // X повернут в нормаль поверхности
        assert!((geometry.target_rotation * Vec3::X - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn test_geometry_respects_strut_rotation() {
        let strut_transform = GlobalTransform::from(
            Transform::from_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
        );
        let hit = ProbeHit {
            collider: Entity::PLACEHOLDER,
            point: Vec3::new(3.0, 0.0, 0.0),
            normal: Vec3::NEG_X,
            distance: 3.0,
        };

        let geometry = geometry_for_hit(&strut_transform, &hit);
        // Y+90°: world +X = local +Z
        assert!((geometry.target_position - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-4);
    }

    #[test]
    fn test_jetpack_geometry() {
        let geometry = geometry_for_jetpack(&GlobalTransform::IDENTITY, Vec3::new(0.0, 2.0, 0.0));
        assert!((geometry.direction - Vec3::Y).length() < 1e-4);
        assert!((geometry.target_rotation * Vec3::NEG_X - Vec3::Y).length() < 1e-4);
    }

    #[test]
    fn test_from_to_rotation_zero_is_identity() {
        assert_eq!(from_to_rotation(Vec3::X, Vec3::ZERO), Quat::IDENTITY);
    }
}
