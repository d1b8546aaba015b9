//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one `tick` = 1/60 s)
//! - Seeded RNG only, and only during level generation
//! - Stable iteration order (platforms, enemies and pickups in ID order)
//! - No rendering or platform dependencies

pub mod camera;
pub mod collision;
pub mod enemy;
pub mod geom;
pub mod level;
pub mod noise;
pub mod player;
pub mod state;
pub mod tick;

pub use camera::Camera;
pub use collision::{StepReport, edge_sensor, has_support, step_body};
pub use geom::AxisBox;
pub use level::{CollectibleSpawn, EnemySpawn, LevelDescriptor, LevelGenerator, TerrainSample};
pub use noise::NoiseField;
pub use player::{DamageOutcome, apply_damage};
pub use state::{
    Behavior, Body, Collectible, CollectibleKind, DeathCause, Enemy, EnemyKind, EnemyState,
    GameEvent, GamePhase, MoveState, Platform, PlatformKind, Player, Projectile, Simulation, World,
};
pub use tick::{TickInput, tick};
