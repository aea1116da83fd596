//! Anchor preview capability
//!
//! Пока игрок целится, host должен показывать где окажется дальний конец strut.
//! Host предоставляет это как capability (`AnchorPreviewSink`), вставленную
//! один раз при старте. Нет capability — логируем один раз, дальше no-op.

use bevy::prelude::*;

use crate::components::StrutGeometry;

/// Host extension point: показать anchor pose для strut
pub trait AnchorPreviewSink: Send + Sync {
    /// `tracking = true` — конец strut следует за pose каждый кадр
    fn track_anchor(&self, strut: Entity, tracking: bool, geometry: &StrutGeometry);
}

/// Resource с capability (None — host её не предоставил)
#[derive(Resource, Default)]
pub struct AnchorPreview {
    sink: Option<Box<dyn AnchorPreviewSink>>,
}

impl AnchorPreview {
    pub fn new(sink: impl AnchorPreviewSink + 'static) -> Self {
        Self {
            sink: Some(Box::new(sink)),
        }
    }

    pub fn unavailable() -> Self {
        Self { sink: None }
    }

    pub fn is_available(&self) -> bool {
        self.sink.is_some()
    }

    pub fn preview(&self, strut: Entity, geometry: &StrutGeometry) {
        if let Some(sink) = &self.sink {
            sink.track_anchor(strut, true, geometry);
        }
    }
}

/// Startup система: проверка capability (один раз за процесс)
pub fn report_anchor_preview(preview: Option<Res<AnchorPreview>>) {
    let available = preview.map(|p| p.is_available()).unwrap_or(false);
    if !available {
        crate::log_warning("Anchor preview capability not provided by host; strut previews disabled");
    }
}
