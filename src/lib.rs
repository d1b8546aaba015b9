//! Platform Sim - a deterministic 2D platformer simulation kernel
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, AI, level generation)
//! - `tuning`: Data-driven game balance
//! - `error`: Construction-time faults
//!
//! Rendering, audio and input devices live outside this crate. They read the
//! state and events the simulation exposes after each tick.

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, GeometryError, LevelError};
pub use tuning::{Difficulty, Tuning};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate. Every per-tick constant in `Tuning` assumes it.
    pub const SIM_HZ: u32 = 60;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / SIM_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Viewport dimensions
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Campaign shape
    pub const WORLD_COUNT: u32 = 8;
    pub const LEVELS_PER_WORLD: u32 = 5;

    /// Player box
    pub const PLAYER_WIDTH: f32 = 30.0;
    pub const PLAYER_HEIGHT: f32 = 50.0;

    /// Enemy box
    pub const ENEMY_WIDTH: f32 = 32.0;
    pub const ENEMY_HEIGHT: f32 = 32.0;

    /// Collectible box
    pub const COLLECTIBLE_SIZE: f32 = 20.0;

    /// Platform thickness
    pub const PLATFORM_THICKNESS: f32 = 20.0;
}

/// Converts wall-clock frame time into whole simulation ticks.
///
/// The kernel itself only ever advances in fixed ticks; this is the
/// presentation-side accumulator that decides how many to run per frame.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed elapsed seconds, get the number of ticks to run this frame
    pub fn advance(&mut self, elapsed_secs: f32) -> u32 {
        if !elapsed_secs.is_finite() || elapsed_secs <= 0.0 {
            return 0;
        }
        self.accumulator += elapsed_secs;

        let mut steps = 0;
        while self.accumulator >= consts::SIM_DT && steps < consts::MAX_SUBSTEPS {
            self.accumulator -= consts::SIM_DT;
            steps += 1;
        }

        // Drop the backlog once the cap is hit
        if steps == consts::MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(consts::SIM_DT);
        }
        steps
    }

    /// Fraction of a tick left in the accumulator (for render interpolation)
    pub fn alpha(&self) -> f32 {
        (self.accumulator / consts::SIM_DT).clamp(0.0, 1.0)
    }
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
