//! Target resolution: persistent id → живая part, collider → владеющая part

use bevy::prelude::*;
use thiserror::Error;

use crate::components::{Part, Vessel};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("strut part {strut:?} is not on a vessel")]
    NoVessel { strut: Entity },

    #[error("target part {flight_id} not found on vessel {vessel:?}")]
    PartNotFound { flight_id: u32, vessel: Entity },
}

/// Линейный поиск part по flight_id среди parts данного vessel
pub fn resolve_target<'a>(
    parts: impl IntoIterator<Item = (Entity, &'a Part)>,
    vessel: Entity,
    flight_id: u32,
) -> Result<Entity, ResolveError> {
    parts
        .into_iter()
        .find(|(_, part)| part.vessel == vessel && part.flight_id == flight_id)
        .map(|(entity, _)| entity)
        .ok_or(ResolveError::PartNotFound { flight_id, vessel })
}

/// Part, которой принадлежит collider (сам collider или ближайший предок с Part)
pub fn owning_part(
    collider: Entity,
    parts: &Query<&Part>,
    parents: &Query<&ChildOf>,
) -> Option<(Entity, Part)> {
    let mut current = collider;
    loop {
        if let Ok(part) = parts.get(current) {
            return Some((current, *part));
        }
        current = parents.get(current).ok()?.parent();
    }
}

/// Part годится как target: тот же vessel что у strut и vessel не EVA
pub fn is_valid_target(part: &Part, strut_vessel: Entity, vessels: &Query<&Vessel>) -> bool {
    if part.vessel != strut_vessel {
        return false;
    }

    vessels
        .get(part.vessel)
        .map(|vessel| !vessel.is_eva)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_finds_part_on_same_vessel() {
        let vessel = Entity::from_raw(1);
        let other_vessel = Entity::from_raw(2);
        let parts = [
            (Entity::from_raw(10), Part::new(100, vessel)),
            (Entity::from_raw(11), Part::new(200, other_vessel)),
            (Entity::from_raw(12), Part::new(200, vessel)),
        ];

        let found = resolve_target(parts.iter().map(|(e, p)| (*e, p)), vessel, 200);
        assert_eq!(found, Ok(Entity::from_raw(12)));
    }

    #[test]
    fn test_resolve_not_found() {
        let vessel = Entity::from_raw(1);
        let parts = [(Entity::from_raw(10), Part::new(100, vessel))];

        let result = resolve_target(parts.iter().map(|(e, p)| (*e, p)), vessel, 999);
        assert_eq!(
            result,
            Err(ResolveError::PartNotFound { flight_id: 999, vessel })
        );
    }

    #[test]
    fn test_resolve_ignores_other_vessels() {
        let vessel = Entity::from_raw(1);
        let parts = [(Entity::from_raw(10), Part::new(100, Entity::from_raw(5)))];

        assert!(resolve_target(parts.iter().map(|(e, p)| (*e, p)), vessel, 100).is_err());
    }
}
