//! Data-driven game balance
//!
//! Every gameplay constant lives here, expressed per fixed 60 Hz tick.
//! Loaded from JSON so balance can change without a rebuild; missing fields
//! fall back to the defaults below.

use serde::{Deserialize, Serialize};

use crate::consts::SIM_HZ;
use crate::error::ConfigError;

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "med" | "medium" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Multiplier on enemy patrol speed
    pub fn enemy_speed_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.75,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.25,
        }
    }

    /// Health lost per hit
    pub fn damage(&self) -> i32 {
        match self {
            Difficulty::Easy => 5,
            Difficulty::Normal => 10,
            Difficulty::Hard => 20,
        }
    }

    /// How fast gaps widen per world
    pub fn gap_growth_per_world(&self) -> f32 {
        match self {
            Difficulty::Easy => 10.0,
            Difficulty::Normal => 20.0,
            Difficulty::Hard => 25.0,
        }
    }
}

/// Integration constants shared by every body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Downward acceleration per tick
    pub gravity: f32,
    /// Maximum downward speed
    pub terminal_velocity: f32,
    /// Horizontal speed clamp
    pub max_speed: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: 0.6,
            terminal_velocity: 12.0,
            max_speed: 7.0,
        }
    }
}

/// Player movement, jump assists and health
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub run_speed: f32,
    /// Upward speed applied by a jump (positive magnitude)
    pub jump_speed: f32,
    /// Upward speed applied by the air jump
    pub double_jump_speed: f32,
    /// Whether the air jump exists at all
    pub double_jump: bool,
    /// Rising speed kept when jump is released early
    pub jump_cut_speed: f32,
    pub jump_buffer_ticks: u32,
    pub coyote_ticks: u32,
    pub max_health: i32,
    pub damage: i32,
    pub invulnerable_ticks: u32,
    /// Upward speed after a stomp, smaller than a full jump
    pub stomp_bounce_speed: f32,
    pub max_powerup_tier: u8,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            run_speed: 6.0,
            jump_speed: 13.0,
            double_jump_speed: 10.0,
            double_jump: true,
            jump_cut_speed: 4.0,
            jump_buffer_ticks: 6,
            coyote_ticks: 6,
            max_health: 100,
            damage: 10,
            invulnerable_ticks: 60,
            stomp_bounce_speed: 6.5,
            max_powerup_tier: 2,
        }
    }
}

/// Enemy behaviour knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub base_speed: f32,
    pub speed_per_world: f32,
    /// Width of the forward edge sensor
    pub sensor_width: f32,
    pub jump_interval_ticks: u32,
    pub jump_speed: f32,
    pub shoot_interval_ticks: u32,
    /// Horizontal distance at which shooters open fire
    pub shoot_range: f32,
    pub projectile_speed: f32,
    pub projectile_ttl_ticks: u32,
    pub projectile_size: f32,
    pub stomp_score: u64,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            base_speed: 2.0,
            speed_per_world: 0.5,
            sensor_width: 4.0,
            jump_interval_ticks: 90,
            jump_speed: 10.0,
            shoot_interval_ticks: 120,
            shoot_range: 400.0,
            projectile_speed: 5.0,
            projectile_ttl_ticks: 180,
            projectile_size: 10.0,
            stomp_score: 100,
        }
    }
}

/// Procedural level layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorTuning {
    pub base_length: f32,
    pub length_per_world: f32,
    pub length_per_level: f32,

    // Terrain
    pub terrain_step: f32,
    pub terrain_base: f32,
    pub terrain_amplitude: f32,
    pub noise_scale: f32,
    pub octaves: u32,
    pub persistence: f32,
    pub lacunarity: f32,

    // Platform walk
    pub span_min: f32,
    pub span_max: f32,
    pub gap_min: f32,
    pub gap_max_base: f32,
    pub gap_max_per_world: f32,
    pub step_chance: f32,
    pub max_step: f32,
    /// Highest allowed platform top
    pub band_top: f32,
    /// Lowest allowed platform top
    pub band_bottom: f32,
    pub start_baseline: f32,
    pub moving_chance: f32,
    pub bounce_chance: f32,
    pub bounce_strength: f32,
    pub moving_speed_min: f32,
    pub moving_speed_max: f32,
    pub spawn_pad_width: f32,
    pub goal_pad_width: f32,

    // Enemies
    pub enemy_base_count: u32,
    pub enemies_per_world: u32,
    /// Spread of enemy x as a fraction of level length
    pub enemy_spread_base: f32,
    pub enemy_spread_per_world: f32,
    /// No enemies closer than this to the spawn point
    pub enemy_safe_zone: f32,

    // Collectibles
    pub collectible_count: u32,
    pub powerup_chance: f32,
    pub collectible_top: f32,
    pub collectible_bottom: f32,
}

impl Default for GeneratorTuning {
    fn default() -> Self {
        Self {
            base_length: 1500.0,
            length_per_world: 300.0,
            length_per_level: 150.0,

            terrain_step: 50.0,
            terrain_base: 450.0,
            terrain_amplitude: 100.0,
            noise_scale: 500.0,
            octaves: 6,
            persistence: 0.7,
            lacunarity: 2.3,

            span_min: 100.0,
            span_max: 200.0,
            gap_min: 50.0,
            gap_max_base: 100.0,
            gap_max_per_world: 20.0,
            step_chance: 0.3,
            max_step: 120.0,
            band_top: 200.0,
            band_bottom: 500.0,
            start_baseline: 500.0,
            moving_chance: 0.1,
            bounce_chance: 0.05,
            bounce_strength: 15.0,
            moving_speed_min: 1.0,
            moving_speed_max: 3.0,
            spawn_pad_width: 300.0,
            goal_pad_width: 240.0,

            enemy_base_count: 5,
            enemies_per_world: 2,
            enemy_spread_base: 0.1,
            enemy_spread_per_world: 0.05,
            enemy_safe_zone: 400.0,

            collectible_count: 10,
            powerup_chance: 0.1,
            collectible_top: 200.0,
            collectible_bottom: 400.0,
        }
    }
}

impl GeneratorTuning {
    /// Upper bound of the gap range for a world (widens with progression)
    pub fn gap_max(&self, world: u32) -> f32 {
        (self.gap_max_base + self.gap_max_per_world * world as f32).max(self.gap_min)
    }

    pub fn level_length(&self, world: u32, level: u32) -> f32 {
        self.base_length + self.length_per_world * world as f32 + self.length_per_level * level as f32
    }
}

/// Camera follow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    pub viewport_width: f32,
    /// 1.0 = hard lock on the target
    pub smoothing: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            viewport_width: crate::consts::SCREEN_WIDTH,
            smoothing: 0.1,
        }
    }
}

/// Scoring, lives and timers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesTuning {
    pub lives: u8,
    pub level_time_secs: u32,
    pub coin_score: u64,
    pub coin_heal: i32,
    pub powerup_score: u64,
    /// Width of the flag zone at the end of the level
    pub goal_zone: f32,
    pub time_bonus_per_sec: u64,
    /// Distance below the lowest platform band that counts as a fall death
    pub death_plane_margin: f32,
}

impl Default for RulesTuning {
    fn default() -> Self {
        Self {
            lives: 3,
            level_time_secs: 400,
            coin_score: 50,
            coin_heal: 10,
            powerup_score: 200,
            goal_zone: 40.0,
            time_bonus_per_sec: 10,
            death_plane_margin: 200.0,
        }
    }
}

impl RulesTuning {
    pub fn level_time_ticks(&self) -> u32 {
        self.level_time_secs.saturating_mul(SIM_HZ)
    }
}

/// Complete tuning set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub difficulty: Difficulty,
    pub physics: PhysicsTuning,
    pub player: PlayerTuning,
    pub enemy: EnemyTuning,
    pub generator: GeneratorTuning,
    pub camera: CameraTuning,
    pub rules: RulesTuning,
}

impl Tuning {
    /// Create tuning from a difficulty preset (applies preset defaults)
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        let mut tuning = Self::default();
        tuning.apply_difficulty(difficulty);
        tuning
    }

    /// Apply a difficulty preset (updates difficulty-dependent values)
    pub fn apply_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        let defaults = EnemyTuning::default();
        self.enemy.base_speed = defaults.base_speed * difficulty.enemy_speed_scale();
        self.enemy.speed_per_world = defaults.speed_per_world * difficulty.enemy_speed_scale();
        self.player.damage = difficulty.damage();
        self.generator.gap_max_per_world = difficulty.gap_growth_per_world();
    }

    /// Parse and validate tuning JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded tuning ({} difficulty)", tuning.difficulty.as_str());
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.physics;
        positive("physics.gravity", p.gravity)?;
        positive("physics.terminal_velocity", p.terminal_velocity)?;
        positive("physics.max_speed", p.max_speed)?;

        let pl = &self.player;
        positive("player.run_speed", pl.run_speed)?;
        positive("player.jump_speed", pl.jump_speed)?;
        positive("player.double_jump_speed", pl.double_jump_speed)?;
        positive("player.stomp_bounce_speed", pl.stomp_bounce_speed)?;
        if pl.stomp_bounce_speed >= pl.jump_speed {
            return Err(ConfigError::out_of_range(
                "player.stomp_bounce_speed",
                "must be smaller than player.jump_speed",
            ));
        }
        if pl.max_health <= 0 {
            return Err(ConfigError::out_of_range("player.max_health", "must be positive"));
        }

        non_negative("player.jump_cut_speed", pl.jump_cut_speed)?;

        let e = &self.enemy;
        positive("enemy.sensor_width", e.sensor_width)?;
        positive("enemy.projectile_size", e.projectile_size)?;
        positive("enemy.projectile_speed", e.projectile_speed)?;
        positive("enemy.jump_speed", e.jump_speed)?;
        non_negative("enemy.base_speed", e.base_speed)?;
        non_negative("enemy.speed_per_world", e.speed_per_world)?;
        non_negative("enemy.shoot_range", e.shoot_range)?;

        let g = &self.generator;
        if g.octaves == 0 {
            return Err(ConfigError::out_of_range("generator.octaves", "must be at least 1"));
        }
        positive("generator.base_length", g.base_length)?;
        non_negative("generator.length_per_world", g.length_per_world)?;
        non_negative("generator.length_per_level", g.length_per_level)?;
        positive("generator.terrain_step", g.terrain_step)?;
        finite("generator.terrain_base", g.terrain_base)?;
        finite("generator.terrain_amplitude", g.terrain_amplitude)?;
        positive("generator.noise_scale", g.noise_scale)?;
        positive("generator.persistence", g.persistence)?;
        positive("generator.lacunarity", g.lacunarity)?;
        positive("generator.span_min", g.span_min)?;
        ordered("generator.span_max", g.span_min, g.span_max)?;
        positive("generator.gap_min", g.gap_min)?;
        ordered("generator.gap_max_base", g.gap_min, g.gap_max_base)?;
        non_negative("generator.gap_max_per_world", g.gap_max_per_world)?;
        non_negative("generator.max_step", g.max_step)?;
        finite("generator.band_top", g.band_top)?;
        ordered("generator.band_bottom", g.band_top, g.band_bottom)?;
        finite("generator.start_baseline", g.start_baseline)?;
        positive("generator.bounce_strength", g.bounce_strength)?;
        non_negative("generator.moving_speed_min", g.moving_speed_min)?;
        ordered("generator.moving_speed_max", g.moving_speed_min, g.moving_speed_max)?;
        non_negative("generator.enemy_spread_base", g.enemy_spread_base)?;
        non_negative("generator.enemy_spread_per_world", g.enemy_spread_per_world)?;
        non_negative("generator.enemy_safe_zone", g.enemy_safe_zone)?;
        finite("generator.collectible_top", g.collectible_top)?;
        ordered("generator.collectible_bottom", g.collectible_top, g.collectible_bottom)?;
        positive("generator.spawn_pad_width", g.spawn_pad_width)?;
        positive("generator.goal_pad_width", g.goal_pad_width)?;
        probability("generator.step_chance", g.step_chance)?;
        probability("generator.moving_chance", g.moving_chance)?;
        probability("generator.bounce_chance", g.bounce_chance)?;
        probability("generator.powerup_chance", g.powerup_chance)?;

        let c = &self.camera;
        positive("camera.viewport_width", c.viewport_width)?;
        if !(c.smoothing > 0.0 && c.smoothing <= 1.0) {
            return Err(ConfigError::out_of_range(
                "camera.smoothing",
                format!("must be in (0, 1], got {}", c.smoothing),
            ));
        }

        non_negative("rules.goal_zone", self.rules.goal_zone)?;
        positive("rules.death_plane_margin", self.rules.death_plane_margin)?;
        if self.rules.lives == 0 {
            return Err(ConfigError::out_of_range("rules.lives", "must be at least 1"));
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::out_of_range(field, format!("must be positive, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::out_of_range(field, format!("must be >= 0, got {value}")))
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::out_of_range(field, format!("must be finite, got {value}")))
    }
}

/// `high` is finite and not below `low`
fn ordered(field: &'static str, low: f32, high: f32) -> Result<(), ConfigError> {
    if high.is_finite() && high >= low {
        Ok(())
    } else {
        Err(ConfigError::out_of_range(field, format!("must be >= {low}, got {high}")))
    }
}

fn probability(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::out_of_range(field, format!("must be in [0, 1], got {value}")))
    }
}
