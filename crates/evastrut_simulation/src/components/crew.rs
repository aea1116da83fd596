//! Crew roster: навыки и уровень опыта экипажа, jetpack anchor EVA актора

use bevy::prelude::*;

/// Член экипажа (crew roster query)
#[derive(Debug, Clone, Default, PartialEq, Reflect)]
pub struct CrewMember {
    pub name: String,
    /// Skill effects профессии (например "RepairSkill", "AutopilotSkill")
    pub effects: Vec<String>,
    /// Уровень опыта 0..=5
    pub experience_level: u8,
}

impl CrewMember {
    pub fn new(name: impl Into<String>, effects: &[&str], experience_level: u8) -> Self {
        Self {
            name: name.into(),
            effects: effects.iter().map(|e| e.to_string()).collect(),
            experience_level,
        }
    }

    pub fn has_effect(&self, effect: &str) -> bool {
        self.effects.iter().any(|e| e == effect)
    }
}

/// Экипаж vessel
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct Crew {
    pub members: Vec<CrewMember>,
}

impl Crew {
    pub fn single(member: CrewMember) -> Self {
        Self {
            members: vec![member],
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn first(&self) -> Option<&CrewMember> {
        self.members.first()
    }
}

/// Marker: jetpack bone EVA актора
///
/// Свободный конец strut следует за этой точкой пока игрок целится.
/// Ищется среди потомков EVA vessel (Children hierarchy).
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct JetpackBone;
