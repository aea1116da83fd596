//! Author-tunable конфигурация strut (skill, min level, max distance)
//!
//! Значения из part config не доверяем: sanitize() вызывается один раз на старте.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Skill effects, которые можно требовать для работы со strut
pub const SKILL_ALLOW_LIST: [&str; 15] = [
    "AutopilotSkill",
    "ConverterSkill",
    "DrillSkill",
    "EnginePower",
    "ExternalExperimentSkill",
    "FuelUsage",
    "FullVesselControlSkill",
    "HeatProduction",
    "MaxThrottle",
    "PartScienceReturn",
    "RepairSkill",
    "ScienceResetSkill",
    "ScienceSkill",
    "SpecialExperimentSkill",
    "VesselScienceReturn",
];

pub const MIN_LEVEL_RANGE: (i32, i32) = (0, 5);
pub const MAX_DISTANCE_RANGE: (f32, f32) = (10.0, 500.0);

/// Канонический skill tag: член allow-list, alias профессии или пустая строка
pub fn canonical_skill(skill: &str) -> &'static str {
    if let Some(canonical) = SKILL_ALLOW_LIST.iter().find(|s| **s == skill) {
        return canonical;
    }

    match skill {
        "pilot" | "Pilot" => "AutopilotSkill",
        "engineer" | "Engineer" => "RepairSkill",
        "scientist" | "Scientist" => "ScienceSkill",
        _ => "",
    }
}

pub fn clamp_min_level(level: i32) -> u8 {
    level.clamp(MIN_LEVEL_RANGE.0, MIN_LEVEL_RANGE.1) as u8
}

/// NaN трактуем как минимум
pub fn clamp_max_distance(distance: f32) -> f32 {
    if distance.is_nan() {
        return MAX_DISTANCE_RANGE.0;
    }
    distance.clamp(MAX_DISTANCE_RANGE.0, MAX_DISTANCE_RANGE.1)
}

/// Конфиг strut part
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct StrutConfig {
    /// Требуемый skill effect (пусто = любой член экипажа)
    #[serde(rename = "useSkill")]
    pub use_skill: String,
    /// Минимальный уровень опыта
    #[serde(rename = "minLevel")]
    pub min_level: i32,
    /// Максимальная длина strut (метры)
    #[serde(rename = "maxDistance")]
    pub max_distance: f32,
}

impl Default for StrutConfig {
    fn default() -> Self {
        Self {
            use_skill: "RepairSkill".into(),
            min_level: 0,
            max_distance: 20.0,
        }
    }
}

impl StrutConfig {
    pub fn sanitize(&mut self) {
        self.use_skill = canonical_skill(&self.use_skill).to_string();
        self.min_level = clamp_min_level(self.min_level) as i32;
        self.max_distance = clamp_max_distance(self.max_distance);
    }

    pub fn sanitized(mut self) -> Self {
        self.sanitize();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list_members_pass_through() {
        for skill in SKILL_ALLOW_LIST {
            assert_eq!(canonical_skill(skill), skill);
        }
    }

    #[test]
    fn test_profession_aliases() {
        assert_eq!(canonical_skill("pilot"), "AutopilotSkill");
        assert_eq!(canonical_skill("Pilot"), "AutopilotSkill");
        assert_eq!(canonical_skill("engineer"), "RepairSkill");
        assert_eq!(canonical_skill("Engineer"), "RepairSkill");
        assert_eq!(canonical_skill("scientist"), "ScienceSkill");
        assert_eq!(canonical_skill("Scientist"), "ScienceSkill");
    }

    #[test]
    fn test_unknown_skill_is_cleared() {
        for input in ["", "PILOT", "repairskill", "Tourist", " RepairSkill", "RepairSkill "] {
            assert_eq!(canonical_skill(input), "", "input {:?}", input);
        }
    }

    #[test]
    fn test_canonical_skill_is_always_allowed_or_empty() {
        let inputs = ["pilot", "Engineer", "DrillSkill", "garbage", "Scientist", "x"];
        for input in inputs {
            let out = canonical_skill(input);
            assert!(out.is_empty() || SKILL_ALLOW_LIST.contains(&out));
        }
    }

    #[test]
    fn test_level_clamp() {
        assert_eq!(clamp_min_level(-3), 0);
        assert_eq!(clamp_min_level(0), 0);
        assert_eq!(clamp_min_level(3), 3);
        assert_eq!(clamp_min_level(99), 5);
        assert_eq!(clamp_min_level(i32::MIN), 0);
        assert_eq!(clamp_min_level(i32::MAX), 5);
    }

    #[test]
    fn test_distance_clamp() {
        assert_eq!(clamp_max_distance(0.0), 10.0);
        assert_eq!(clamp_max_distance(-50.0), 10.0);
        assert_eq!(clamp_max_distance(20.0), 20.0);
        assert_eq!(clamp_max_distance(1000.0), 500.0);
        assert_eq!(clamp_max_distance(f32::INFINITY), 500.0);
        assert_eq!(clamp_max_distance(f32::NEG_INFINITY), 10.0);
        assert_eq!(clamp_max_distance(f32::NAN), 10.0);
    }

    #[test]
    fn test_sanitize_config() {
        let config = StrutConfig {
            use_skill: "engineer".into(),
            min_level: 12,
            max_distance: 2.0,
        }
        .sanitized();

        assert_eq!(config.use_skill, "RepairSkill");
        assert_eq!(config.min_level, 5);
        assert_eq!(config.max_distance, 10.0);
    }
}
