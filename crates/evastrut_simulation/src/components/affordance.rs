//! Affordances: три интерактивных действия strut (pickup, cut, drop)
//!
//! Host UI показывает действие если `active` и игрок ближе `range`.

use bevy::prelude::*;

/// Дистанция действий по умолчанию (pickup, cut)
pub const DEFAULT_ACTION_RANGE: f32 = 4.0;

/// Дистанция drop (игрок уже держит strut)
pub const DROP_ACTION_RANGE: f32 = 10.0;

/// Запас к cut range поверх длины присоединённого strut
pub const CUT_RANGE_MARGIN: f32 = 10.0;

/// Одно toggleable действие
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct Affordance {
    pub label: String,
    pub active: bool,
    pub range: f32,
}

impl Affordance {
    pub fn new(label: impl Into<String>, active: bool, range: f32) -> Self {
        Self {
            label: label.into(),
            active,
            range,
        }
    }
}

/// Флаги активности (pickup, cut, drop) — для тестов и debug
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffordanceFlags {
    pub pickup: bool,
    pub cut: bool,
    pub drop: bool,
}

/// Все действия strut
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct StrutAffordances {
    pub pickup: Affordance,
    pub cut: Affordance,
    pub drop: Affordance,
}

impl Default for StrutAffordances {
    fn default() -> Self {
        Self {
            pickup: Affordance::new("Pickup EVA Strut", true, DEFAULT_ACTION_RANGE),
            cut: Affordance::new("Cut EVA Strut", false, DEFAULT_ACTION_RANGE),
            drop: Affordance::new("Drop EVA Strut", false, DROP_ACTION_RANGE),
        }
    }
}

impl StrutAffordances {
    pub fn flags(&self) -> AffordanceFlags {
        AffordanceFlags {
            pickup: self.pickup.active,
            cut: self.cut.active,
            drop: self.drop.active,
        }
    }

    /// Strut в руках у EVA
    pub fn set_holding(&mut self) {
        self.pickup.active = false;
        self.drop.active = true;
    }

    /// Strut присоединён: доступен только cut, на всю длину + запас
    pub fn set_attached(&mut self, connection_distance: f32) {
        self.drop.active = false;
        self.pickup.active = false;
        self.cut.active = true;
        self.cut.range = connection_distance + CUT_RANGE_MARGIN;
    }

    /// Strut свободен (sever/drop)
    pub fn set_detached(&mut self) {
        self.drop.active = false;
        self.pickup.active = true;
        self.cut.active = false;
        self.cut.range = DEFAULT_ACTION_RANGE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_affordances() {
        let affordances = StrutAffordances::default();
        assert_eq!(
            affordances.flags(),
            AffordanceFlags { pickup: true, cut: false, drop: false }
        );
        assert_eq!(affordances.cut.range, 4.0);
        assert_eq!(affordances.drop.range, 10.0);
    }

    #[test]
    fn test_attached_widens_cut_range() {
        let mut affordances = StrutAffordances::default();
        affordances.set_attached(12.5);
        assert_eq!(
            affordances.flags(),
            AffordanceFlags { pickup: false, cut: true, drop: false }
        );
        assert_eq!(affordances.cut.range, 22.5);

        affordances.set_detached();
        assert_eq!(affordances.cut.range, 4.0);
        assert!(affordances.pickup.active);
    }
}
