//! Spawn helpers: vessel, part, EVA актор, strut part
//!
//! Host обычно спавнит всё сам; helpers для headless сценариев и тестов.
//! Transform задаём вместе с GlobalTransform — headless app без TransformPlugin.

use bevy::prelude::*;

use crate::components::{
    Crew, CrewMember, EvaStrut, JetpackBone, LinkedStrut, Part, StrutAffordances, StrutAnchor,
    Vessel,
};
use crate::strut::{LoadedSaveNode, StrutConfig, StrutSaveNode};

/// Высота jetpack над origin EVA
pub const JETPACK_OFFSET: Vec3 = Vec3::new(0.0, 0.6, -0.3);

fn placed(position: Vec3) -> (Transform, GlobalTransform) {
    (
        Transform::from_translation(position),
        GlobalTransform::from_translation(position),
    )
}

pub fn spawn_vessel(commands: &mut Commands, name: &str, position: Vec3) -> Entity {
    commands
        .spawn((Vessel::ship(name), Crew::default(), placed(position)))
        .id()
}

pub fn spawn_part(commands: &mut Commands, vessel: Entity, flight_id: u32, position: Vec3) -> Entity {
    commands
        .spawn((Part::new(flight_id, vessel), placed(position)))
        .id()
}

/// EVA актор (vessel с одним членом экипажа) + jetpack bone
pub fn spawn_eva(commands: &mut Commands, member: CrewMember, position: Vec3) -> Entity {
    let eva = commands
        .spawn((Vessel::eva(member.name.clone()), Crew::single(member), placed(position)))
        .id();

    commands.spawn((JetpackBone, ChildOf(eva), placed(position + JETPACK_OFFSET)));
    eva
}

/// Strut part со всеми модулями
pub fn spawn_strut(
    commands: &mut Commands,
    vessel: Entity,
    flight_id: u32,
    position: Vec3,
    config: StrutConfig,
) -> Entity {
    commands
        .spawn((
            EvaStrut::default(),
            config,
            StrutAffordances::default(),
            LinkedStrut::default(),
            StrutAnchor::default(),
            Part::new(flight_id, vessel),
            placed(position),
        ))
        .id()
}

/// Strut part, загруженная из save
pub fn spawn_loaded_strut(
    commands: &mut Commands,
    vessel: Entity,
    flight_id: u32,
    position: Vec3,
    config: StrutConfig,
    node: StrutSaveNode,
) -> Entity {
    let strut = spawn_strut(commands, vessel, flight_id, position, config);
    commands.entity(strut).insert(LoadedSaveNode(node));
    strut
}
