//! Aim input: луч камеры через курсор + отпускание кнопки мыши
//!
//! Host input bridge заполняет каждый кадр (Ray3d уже в world space).

use bevy::prelude::*;

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct AimInput {
    /// Луч от камеры через позицию курсора
    pub cursor_ray: Option<Ray3d>,
    /// Основная кнопка отпущена в этом кадре
    pub released: bool,
}

impl AimInput {
    /// Курсор наведён на точку `target` из камеры в `camera`
    pub fn looking_at(camera: Vec3, target: Vec3) -> Self {
        let cursor_ray = Dir3::new(target - camera)
            .ok()
            .map(|direction| Ray3d::new(camera, direction));
        Self {
            cursor_ray,
            released: false,
        }
    }

    pub fn with_release(mut self) -> Self {
        self.released = true;
        self
    }
}

/// Сброс "released" после кадра (кнопка отпускается один раз)
pub fn clear_released(mut input: ResMut<AimInput>) {
    if input.released {
        input.released = false;
    }
}
