//! Save/load strut + load-time reconnection
//!
//! Save node хранит `TargetPartID` только когда strut Attached (или reconnection
//! ещё не завершён) + геометрию compound part. После load target ищется по
//! flight_id, но не сразу: ждём готовности host world и ещё 30 тиков settle.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::{EvaStrut, GameScene, Part, StrutGeometry, StrutState, TargetRef, WorldReady};
use crate::strut::events::{SeverCause, StrutEvents};
use crate::strut::lifecycle::StrutQuery;
use crate::strut::target::{resolve_target, ResolveError};

/// Тики ожидания после готовности world
pub const RECONNECT_SETTLE_TICKS: u32 = 30;

/// Persisted state strut part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrutSaveNode {
    #[serde(rename = "TargetPartID", default, skip_serializing_if = "Option::is_none")]
    pub target_part_id: Option<String>,
    #[serde(default)]
    pub direction: [f32; 3],
    #[serde(rename = "targetPosition", default)]
    pub target_position: [f32; 3],
    #[serde(rename = "targetRotation", default = "identity_rotation")]
    pub target_rotation: [f32; 4],
}

fn identity_rotation() -> [f32; 4] {
    Quat::IDENTITY.to_array()
}

impl Default for StrutSaveNode {
    fn default() -> Self {
        Self {
            target_part_id: None,
            direction: [0.0; 3],
            target_position: [0.0; 3],
            target_rotation: identity_rotation(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrutLoadError {
    #[error("malformed target part id {raw:?}: {source}")]
    MalformedTargetId {
        raw: String,
        source: std::num::ParseIntError,
    },
}

impl StrutSaveNode {
    /// Снимок strut для save
    pub fn capture(strut: &EvaStrut) -> Self {
        let target_part_id = match (strut.state, strut.target) {
            (StrutState::Attached, target) | (_, target @ TargetRef::Pending(_)) => {
                target.flight_id().map(|id| id.to_string())
            }
            _ => None,
        };

        Self {
            target_part_id,
            direction: strut.geometry.direction.to_array(),
            target_position: strut.geometry.target_position.to_array(),
            target_rotation: strut.geometry.target_rotation.to_array(),
        }
    }

    /// `Ok(None)` — strut не был присоединён
    pub fn target_id(&self) -> Result<Option<u32>, StrutLoadError> {
        let Some(raw) = self.target_part_id.as_deref() else {
            return Ok(None);
        };

        raw.trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|source| StrutLoadError::MalformedTargetId {
                raw: raw.to_string(),
                source,
            })
    }

    pub fn geometry(&self) -> StrutGeometry {
        let rotation = Quat::from_array(self.target_rotation);
        StrutGeometry {
            direction: Vec3::from_array(self.direction),
            target_position: Vec3::from_array(self.target_position),
            target_rotation: if rotation.is_normalized() { rotation } else { Quat::IDENTITY },
        }
    }
}

/// Save node, который host прочитал для этой part (вставляется до первого кадра)
#[derive(Component, Debug, Clone, PartialEq)]
pub struct LoadedSaveNode(pub StrutSaveNode);

/// Фаза reconnection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectPhase {
    /// Host world ещё не готов
    WaitingForWorld,
    /// Осталось тиков settle
    Settling { remaining: u32 },
}

/// Результат одного тика reconnection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectProgress {
    /// Повторить в следующем тике
    NotReady,
    Ready,
}

/// Незавершённый load-time reconnection (один на load)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingReconnect {
    pub phase: ReconnectPhase,
}

impl Default for PendingReconnect {
    fn default() -> Self {
        Self {
            phase: ReconnectPhase::WaitingForWorld,
        }
    }
}

impl PendingReconnect {
    /// Один тик: ждём (world ready ИЛИ strut started), затем 30 тиков settle
    pub fn poll(&mut self, world_ready: bool, strut_started: bool) -> ReconnectProgress {
        if self.phase == ReconnectPhase::WaitingForWorld {
            if !world_ready && !strut_started {
                return ReconnectProgress::NotReady;
            }
            self.phase = ReconnectPhase::Settling {
                remaining: RECONNECT_SETTLE_TICKS,
            };
        }

        match &mut self.phase {
            ReconnectPhase::Settling { remaining } if *remaining > 0 => {
                *remaining -= 1;
                ReconnectProgress::NotReady
            }
            _ => ReconnectProgress::Ready,
        }
    }
}

/// Система: применить save node (OnLoad)
pub fn apply_loaded_struts(
    mut commands: Commands,
    scene: Res<GameScene>,
    mut struts: Query<(StrutQuery, &LoadedSaveNode)>,
    mut events: StrutEvents,
) {
    for (mut item, node) in struts.iter_mut() {
        let entity = item.entity;
        commands.entity(entity).remove::<LoadedSaveNode>();

        if !scene.is_flight() {
            continue;
        }

        match node.0.target_id() {
            Ok(Some(flight_id)) => {
                item.strut.geometry = node.0.geometry();
                item.strut.target = TargetRef::Pending(flight_id);
                commands.entity(entity).insert(PendingReconnect::default());
                crate::log(&format!(
                    "Strut {:?} loaded with target {}; reconnecting",
                    entity, flight_id
                ));
            }
            Ok(None) => {
                item.sever();
                item.strut.loaded = true;
                events.severed(entity, SeverCause::NotPersisted);
            }
            Err(error) => {
                crate::log_error(&format!("Exception in assigning target part ID: {}", error));
                item.sever();
                item.strut.loaded = true;
                events.severed(entity, SeverCause::MalformedId);
            }
        }
    }
}

/// Система: шаг reconnection для каждой ожидающей strut
pub fn advance_reconnects(
    mut commands: Commands,
    world_ready: Res<WorldReady>,
    mut struts: Query<(StrutQuery, &mut PendingReconnect, Option<&Part>, &GlobalTransform)>,
    parts: Query<(Entity, &Part)>,
    transforms: Query<&GlobalTransform>,
    mut events: StrutEvents,
) {
    for (mut item, mut pending, own_part, strut_transform) in struts.iter_mut() {
        let entity = item.entity;
        if pending.poll(world_ready.0, item.strut.initialized) == ReconnectProgress::NotReady {
            continue;
        }

        commands.entity(entity).remove::<PendingReconnect>();
        item.strut.loaded = true;

        let Some(flight_id) = item.strut.target.flight_id() else {
            item.sever();
            events.severed(entity, SeverCause::TargetNotFound);
            continue;
        };

        let resolved = own_part
            .map(|p| p.vessel)
            .ok_or(ResolveError::NoVessel { strut: entity })
            .and_then(|vessel| resolve_target(parts.iter(), vessel, flight_id));

        let target = match resolved {
            Ok(target) => target,
            Err(error) => {
                crate::log_warning(&format!("Target part not found: {}", error));
                item.sever();
                events.severed(entity, SeverCause::TargetNotFound);
                continue;
            }
        };

        let target_transform = transforms.get(target).copied().unwrap_or_default();
        let length = item.attach(target, flight_id, strut_transform, &target_transform);
        events.attached(entity, target, flight_id, length);
        crate::log_info(&format!(
            "Strut {:?} reconnected to part {} (length {:.2})",
            entity, flight_id, length
        ));
    }
}

/// Save nodes всех struts, ключ — flight_id strut part (сортировка для детерминизма)
pub fn snapshot_struts(world: &mut World) -> Vec<(u32, StrutSaveNode)> {
    let mut query = world.query::<(&EvaStrut, &Part)>();
    let mut nodes: Vec<_> = query
        .iter(world)
        .map(|(strut, part)| (part.flight_id, StrutSaveNode::capture(strut)))
        .collect();

    nodes.sort_by_key(|(flight_id, _)| *flight_id);
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_detached_has_no_id() {
        let node = StrutSaveNode::capture(&EvaStrut::default());
        assert_eq!(node.target_part_id, None);
        assert_eq!(node.target_id(), Ok(None));
    }

    #[test]
    fn test_capture_attached_and_pending() {
        let attached = EvaStrut {
            state: StrutState::Attached,
            target: TargetRef::Resolved {
                part: Entity::PLACEHOLDER,
                flight_id: 4242,
            },
            ..default()
        };
        assert_eq!(StrutSaveNode::capture(&attached).target_part_id.as_deref(), Some("4242"));

        let pending = EvaStrut {
            target: TargetRef::Pending(17),
            ..default()
        };
        assert_eq!(StrutSaveNode::capture(&pending).target_id(), Ok(Some(17)));
    }

    #[test]
    fn test_malformed_id() {
        let node = StrutSaveNode {
            target_part_id: Some("not-a-number".into()),
            ..default()
        };
        assert!(matches!(
            node.target_id(),
            Err(StrutLoadError::MalformedTargetId { .. })
        ));

        let negative = StrutSaveNode {
            target_part_id: Some("-5".into()),
            ..default()
        };
        assert!(negative.target_id().is_err());

        let padded = StrutSaveNode {
            target_part_id: Some(" 12 ".into()),
            ..default()
        };
        assert_eq!(padded.target_id(), Ok(Some(12)));
    }

    #[test]
    fn test_reconnect_waits_for_world_then_settles() {
        let mut pending = PendingReconnect::default();

        for _ in 0..10 {
            assert_eq!(pending.poll(false, false), ReconnectProgress::NotReady);
        }
        assert_eq!(pending.phase, ReconnectPhase::WaitingForWorld);

        for _ in 0..RECONNECT_SETTLE_TICKS {
            assert_eq!(pending.poll(true, false), ReconnectProgress::NotReady);
        }
        assert_eq!(pending.poll(true, false), ReconnectProgress::Ready);
    }

    #[test]
    fn test_reconnect_starts_when_strut_started() {
        let mut pending = PendingReconnect::default();
        assert_eq!(pending.poll(false, true), ReconnectProgress::NotReady);
        assert_eq!(
            pending.phase,
            ReconnectPhase::Settling {
                remaining: RECONNECT_SETTLE_TICKS - 1
            }
        );
    }

    #[test]
    fn test_invalid_rotation_falls_back_to_identity() {
        let node = StrutSaveNode {
            target_rotation: [0.0, 0.0, 0.0, 0.0],
            ..default()
        };
        assert_eq!(node.geometry().target_rotation, Quat::IDENTITY);
    }
}
