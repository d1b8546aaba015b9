//! Error types for level and entity construction
//!
//! Everything here is raised while building a level, never mid-tick

use thiserror::Error;

/// Invalid box geometry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Width or height is zero or negative
    #[error("box size must be positive, got {width}x{height}")]
    NonPositiveSize { width: f32, height: f32 },

    /// A coordinate or dimension is NaN or infinite
    #[error("box has non-finite geometry: pos=({x}, {y}) size=({width}, {height})")]
    NonFinite {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

/// Errors that can occur when generating or loading a level
#[derive(Debug, Error)]
pub enum LevelError {
    /// World and level indices are 1-based
    #[error("world and level indices start at 1, got {world}-{level}")]
    InvalidIndex { world: u32, level: u32 },

    /// A platform, enemy or collectible has bad geometry
    #[error("bad geometry in {what}: {source}")]
    Geometry {
        what: &'static str,
        #[source]
        source: GeometryError,
    },

    /// Two platforms in one descriptor overlap
    #[error("platforms {first} and {second} overlap")]
    OverlappingPlatforms { first: usize, second: usize },

    /// The descriptor has no platforms to stand on
    #[error("level has no platforms")]
    Empty,

    /// Tuning rejected before generation
    #[error("invalid tuning: {0}")]
    Tuning(#[from] ConfigError),
}

/// Errors that can occur when loading tuning data
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON parsing failed
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is outside its allowed range
    #[error("tuning field '{field}' {reason}")]
    OutOfRange { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn out_of_range(field: &'static str, reason: impl Into<String>) -> Self {
        Self::OutOfRange {
            field,
            reason: reason.into(),
        }
    }
}
