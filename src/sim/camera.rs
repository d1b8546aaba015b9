//! Horizontal follow camera

use serde::{Deserialize, Serialize};

use crate::lerp;
use crate::tuning::CameraTuning;

/// Scrolling offset into the level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Left edge of the viewport in level coordinates
    pub offset: f32,
    /// Fraction of the remaining distance covered per tick (1.0 = locked)
    pub smoothing: f32,
    pub viewport_width: f32,
    pub level_length: f32,
}

impl Camera {
    /// Camera already centered (and clamped) on `target_x`
    pub fn new(tuning: &CameraTuning, level_length: f32, target_x: f32) -> Self {
        let mut camera = Self {
            offset: 0.0,
            smoothing: tuning.smoothing,
            viewport_width: tuning.viewport_width,
            level_length,
        };
        camera.snap_to(target_x);
        camera
    }

    /// Largest offset that keeps the viewport inside the level
    pub fn max_offset(&self) -> f32 {
        (self.level_length - self.viewport_width).max(0.0)
    }

    /// Ease toward centering `target_x`, then clamp
    pub fn follow(&mut self, target_x: f32) {
        let desired = target_x - self.viewport_width / 2.0;
        self.offset = lerp(self.offset, desired, self.smoothing);
        self.clamp();
    }

    /// Jump straight to `target_x` (level load, respawn)
    pub fn snap_to(&mut self, target_x: f32) {
        self.offset = target_x - self.viewport_width / 2.0;
        self.clamp();
    }

    fn clamp(&mut self) {
        self.offset = self.offset.clamp(0.0, self.max_offset());
    }

    /// Convert a level x coordinate to screen space
    pub fn to_screen_x(&self, x: f32) -> f32 {
        x - self.offset
    }
}
