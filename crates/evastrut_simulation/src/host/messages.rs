//! On-screen messages (host UI surface)

use bevy::prelude::*;

/// Длительность сообщений strut (секунды)
pub const MESSAGE_DURATION: f32 = 6.0;

/// Позиция сообщения на экране
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenMessageStyle {
    UpperCenter,
}

/// Событие: показать сообщение игроку
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ScreenMessage {
    pub text: String,
    pub duration: f32,
    pub style: ScreenMessageStyle,
}

impl ScreenMessage {
    pub fn upper_center(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            duration: MESSAGE_DURATION,
            style: ScreenMessageStyle::UpperCenter,
        }
    }
}
