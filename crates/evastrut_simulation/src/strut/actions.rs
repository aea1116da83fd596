//! Player actions: pickup, cut, drop
//!
//! Pickup требует три предиката над активным vessel (solitary EVA, skill, level).
//! Каждый отказ показывается игроку через ScreenMessage.

use bevy::prelude::*;
use thiserror::Error;

use crate::components::{ActiveVessel, Crew, JetpackBone, StrutState, TargetRef, Vessel};
use crate::host::ScreenMessage;
use crate::strut::config::StrutConfig;
use crate::strut::events::{SeverCause, StrutAction, StrutActionKind, StrutEvents};
use crate::strut::lifecycle::StrutQuery;

/// EVA должен быть ближе этого к strut или её anchor чтобы перерезать
pub const CUT_REACH: f32 = 10.0;

/// Почему pickup отклонён (текст — сообщение игроку)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PickupRefusal {
    #[error("Current vessel is not an EVA kerbal...")]
    NotSolitaryEva,

    #[error("The kerbal must have the {0} to attach the EVA strut.")]
    MissingSkill(String),

    #[error("The kerbal must be above level {0} to attach the EVA strut.")]
    LevelTooLow(i32),
}

/// Активный vessel — EVA с ровно одним членом экипажа
pub fn is_solitary_eva(vessel: &Vessel, crew: Option<&Crew>) -> bool {
    vessel.is_eva && crew.map(|c| c.len() == 1).unwrap_or(false)
}

/// Пустой skill — подходит любой
pub fn has_required_skill(crew: &Crew, skill: &str) -> bool {
    if skill.is_empty() {
        return true;
    }
    crew.first().map(|m| m.has_effect(skill)).unwrap_or(false)
}

pub fn meets_min_level(crew: &Crew, min_level: i32) -> bool {
    if min_level <= 0 {
        return true;
    }
    crew.first()
        .map(|m| i32::from(m.experience_level) >= min_level)
        .unwrap_or(false)
}

/// Все три предиката pickup по порядку
pub fn check_pickup(
    vessel: &Vessel,
    crew: Option<&Crew>,
    config: &StrutConfig,
) -> Result<(), PickupRefusal> {
    let crew = match crew {
        Some(crew) if is_solitary_eva(vessel, Some(crew)) => crew,
        _ => return Err(PickupRefusal::NotSolitaryEva),
    };

    if !has_required_skill(crew, &config.use_skill) {
        return Err(PickupRefusal::MissingSkill(config.use_skill.clone()));
    }

    if !meets_min_level(crew, config.min_level) {
        return Err(PickupRefusal::LevelTooLow(config.min_level));
    }

    Ok(())
}

/// Первый потомок EVA vessel с JetpackBone
fn find_jetpack(
    eva: Entity,
    children: &Query<&Children>,
    bones: &Query<(), With<JetpackBone>>,
) -> Option<Entity> {
    children
        .iter_descendants(eva)
        .find(|descendant| bones.contains(*descendant))
}

/// Система: обработка StrutAction событий
pub fn handle_strut_actions(
    mut actions: EventReader<StrutAction>,
    active: Res<ActiveVessel>,
    vessels: Query<(&Vessel, Option<&Crew>, &GlobalTransform)>,
    children: Query<&Children>,
    bones: Query<(), With<JetpackBone>>,
    mut struts: Query<(StrutQuery, &StrutConfig, &GlobalTransform)>,
    mut messages: EventWriter<ScreenMessage>,
    mut events: StrutEvents,
) {
    for action in actions.read() {
        let Ok((mut item, config, strut_transform)) = struts.get_mut(action.strut) else {
            crate::log_warning(&format!(
                "StrutAction {:?}: strut entity {:?} not found",
                action.kind, action.strut
            ));
            continue;
        };

        // Выключенный affordance — действие недоступно игроку
        let enabled = match action.kind {
            StrutActionKind::Pickup => item.affordances.pickup.active,
            StrutActionKind::Cut => item.affordances.cut.active,
            StrutActionKind::Drop => item.affordances.drop.active,
        };
        if !enabled {
            crate::log(&format!(
                "StrutAction {:?} ignored: affordance disabled on {:?}",
                action.kind, action.strut
            ));
            continue;
        }

        match action.kind {
            StrutActionKind::Pickup => {
                if item.strut.state != StrutState::Detached
                    || matches!(item.strut.target, TargetRef::Pending(_))
                {
                    crate::log(&format!(
                        "Pickup ignored: strut {:?} is {:?}",
                        action.strut, item.strut.state
                    ));
                    continue;
                }

                let eva = active.get();
                let eva_vessel = eva.and_then(|e| vessels.get(e).ok());
                let refusal = match eva_vessel {
                    Some((vessel, crew, _)) => check_pickup(vessel, crew, config).err(),
                    None => Some(PickupRefusal::NotSolitaryEva),
                };
                if let Some(refusal) = refusal {
                    crate::log(&format!("Pickup refused: {}", refusal));
                    messages.write(ScreenMessage::upper_center(refusal.to_string()));
                    continue;
                }

                let Some(eva) = eva else {
                    continue;
                };
                let Some(jetpack) = find_jetpack(eva, &children, &bones) else {
                    crate::log(&format!("Pickup ignored: EVA {:?} has no jetpack bone", eva));
                    continue;
                };

                item.affordances.set_holding();
                item.strut.eva = Some(eva);
                item.strut.jetpack = Some(jetpack);
                item.strut.state = StrutState::Attaching;
                item.strut.wait_timer = 0;
                crate::log_info(&format!("Strut {:?} picked up by {:?}", action.strut, eva));
            }

            StrutActionKind::Cut => {
                if let Some((vessel, crew, eva_transform)) =
                    active.get().and_then(|e| vessels.get(e).ok())
                {
                    if vessel.is_eva {
                        if !is_solitary_eva(vessel, crew) {
                            continue;
                        }

                        let eva_position = eva_transform.translation();
                        let near_strut =
                            strut_transform.translation().distance(eva_position) < CUT_REACH;
                        let near_anchor =
                            item.anchor_world(strut_transform).distance(eva_position) < CUT_REACH;
                        if !near_strut && !near_anchor {
                            crate::log(&format!(
                                "Cut ignored: EVA too far from strut {:?}",
                                action.strut
                            ));
                            continue;
                        }
                    }
                }

                item.sever();
                events.severed(action.strut, SeverCause::Cut);
                crate::log_info(&format!("Strut {:?} cut", action.strut));
            }

            StrutActionKind::Drop => {
                item.drop_strut();
                events.dropped(action.strut);
                crate::log_info(&format!("Strut {:?} dropped", action.strut));
            }
        }
    }
}
