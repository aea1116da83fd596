//! PhysicsProbe — raycast capability host'а
//!
//! Backends:
//! - `RapierContext` (bevy_rapier3d) — боевой вариант
//! - `InjectedProbe` — любой probe, вставленный как resource (headless, тесты)

use bevy::prelude::*;
use bevy_rapier3d::prelude::{CollisionGroups, Group, RapierContext};
use thiserror::Error;

/// Результат ray probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeHit {
    /// Collider, в который попал луч (part — он сам или его предок)
    pub collider: Entity,
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

/// Фильтр ray probe
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeFilter {
    /// Битовая маска слоёв (physics::layers)
    pub layers: u32,
    /// Colliders, которые луч игнорирует (собственная part strut)
    pub exclude: Vec<Entity>,
}

impl ProbeFilter {
    pub fn layers(layers: u32) -> Self {
        Self {
            layers,
            exclude: Vec::new(),
        }
    }

    pub fn excluding(mut self, colliders: impl IntoIterator<Item = Entity>) -> Self {
        self.exclude.extend(colliders);
        self
    }

    pub fn allows(&self, collider: Entity) -> bool {
        !self.exclude.contains(&collider)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("physics context unavailable")]
    ContextUnavailable,
}

/// Raycast против physics world host'а
pub trait PhysicsProbe {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Dir3,
        max_distance: f32,
        filter: &ProbeFilter,
    ) -> Option<ProbeHit>;
}

impl PhysicsProbe for RapierContext<'_> {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Dir3,
        max_distance: f32,
        filter: &ProbeFilter,
    ) -> Option<ProbeHit> {
        let groups = CollisionGroups::new(Group::ALL, Group::from_bits_truncate(filter.layers));
        let predicate = |collider: Entity| filter.allows(collider);
        let query_filter = bevy_rapier3d::prelude::QueryFilter::default()
            .groups(groups)
            .predicate(&predicate);

        let (collider, intersection) = self.cast_ray_and_get_normal(
            origin,
            direction.as_vec3(),
            max_distance,
            true,
            query_filter,
        )?;

        Some(ProbeHit {
            collider,
            point: intersection.point,
            normal: intersection.normal,
            distance: intersection.time_of_impact,
        })
    }
}

/// Probe, вставленный host'ом как resource
#[derive(Resource)]
pub struct InjectedProbe(pub Box<dyn PhysicsProbe + Send + Sync>);

impl InjectedProbe {
    pub fn new(probe: impl PhysicsProbe + Send + Sync + 'static) -> Self {
        Self(Box::new(probe))
    }
}

impl PhysicsProbe for InjectedProbe {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Dir3,
        max_distance: f32,
        filter: &ProbeFilter,
    ) -> Option<ProbeHit> {
        self.0.cast_ray(origin, direction, max_distance, filter)
    }
}

/// Сфера для SphereProbe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeSphere {
    pub collider: Entity,
    pub center: Vec3,
    pub radius: f32,
    pub layers: u32,
}

/// Простейший probe: статичный набор сфер
///
/// Headless сценарии и тесты, где rapier не подключён.
#[derive(Debug, Clone, Default)]
pub struct SphereProbe {
    pub spheres: Vec<ProbeSphere>,
}

impl SphereProbe {
    pub fn with_sphere(mut self, collider: Entity, center: Vec3, radius: f32, layers: u32) -> Self {
        self.spheres.push(ProbeSphere {
            collider,
            center,
            radius,
            layers,
        });
        self
    }

    fn intersect(sphere: &ProbeSphere, origin: Vec3, direction: Vec3) -> Option<f32> {
        let oc = origin - sphere.center;
        let b = oc.dot(direction);
        let c = oc.length_squared() - sphere.radius * sphere.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let near = -b - root;
        if near >= 0.0 {
            return Some(near);
        }
        // Origin внутри сферы
        let far = -b + root;
        (far >= 0.0).then_some(0.0)
    }
}

impl PhysicsProbe for SphereProbe {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Dir3,
        max_distance: f32,
        filter: &ProbeFilter,
    ) -> Option<ProbeHit> {
        let direction = direction.as_vec3();

        self.spheres
            .iter()
            .filter(|sphere| sphere.layers & filter.layers != 0)
            .filter(|sphere| filter.allows(sphere.collider))
            .filter_map(|sphere| {
                let distance = Self::intersect(sphere, origin, direction)?;
                (distance <= max_distance).then_some((sphere, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(sphere, distance)| {
                let point = origin + direction * distance;
                ProbeHit {
                    collider: sphere.collider,
                    point,
                    normal: (point - sphere.center).normalize_or_zero(),
                    distance,
                }
            })
    }
}
