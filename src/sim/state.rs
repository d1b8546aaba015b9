//! Game state and core simulation types
//!
//! Everything a presentation layer may read after a tick lives here. All of it
//! derives `Serialize` so snapshots and replays need no extra plumbing.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::geom::AxisBox;
use super::level::{CollectibleSpawn, EnemySpawn, LevelDescriptor, LevelGenerator, TerrainSample};
use crate::consts::{LEVELS_PER_WORLD, PLAYER_HEIGHT, PLAYER_WIDTH, WORLD_COUNT};
use crate::error::LevelError;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Goal reached, waiting for `advance_level`
    LevelComplete,
    /// Out of lives
    GameOver,
    /// Final level of the final world cleared
    Won,
}

/// Why a life was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Health,
    Fell,
    TimeUp,
}

/// Discrete notifications for sound and UI layers, drained once per tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PlayerJumped { double: bool },
    PlayerBounced { platform_id: u32 },
    PlayerDamaged { health: i32, powerup_tier: u8 },
    EnemyStomped { enemy_id: u32, score: u64 },
    CollectibleCollected { collectible_id: u32, kind: CollectibleKind },
    ProjectileFired { enemy_id: u32 },
    LifeLost { lives_left: u8, cause: DeathCause },
    PlayerRespawned,
    LevelComplete { world: u32, level: u32, time_bonus: u64 },
    GameOver { score: u64 },
    GameWon { score: u64 },
}

/// Platform behaviour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlatformKind {
    Static,
    /// Slides horizontally between `min_x` and `max_x` (left edge bounds)
    Moving {
        direction: f32,
        speed: f32,
        min_x: f32,
        max_x: f32,
    },
    /// Launches anything falling onto it instead of holding it
    Bounce { strength: f32 },
}

/// A solid platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: u32,
    pub bounds: AxisBox,
    pub kind: PlatformKind,
    /// Horizontal displacement applied during the current tick
    #[serde(default)]
    pub last_dx: f32,
}

impl Platform {
    pub fn new(id: u32, bounds: AxisBox, kind: PlatformKind) -> Self {
        Self {
            id,
            bounds,
            kind,
            last_dx: 0.0,
        }
    }

    /// Move a Moving platform one tick along its track
    pub fn advance(&mut self) {
        self.last_dx = 0.0;
        if let PlatformKind::Moving {
            ref mut direction,
            speed,
            min_x,
            max_x,
        } = self.kind
        {
            let before = self.bounds.left();
            let mut next = before + *direction * speed;
            if next <= min_x {
                next = min_x;
                *direction = 1.0;
            } else if next >= max_x {
                next = max_x;
                *direction = -1.0;
            }
            self.bounds.set_left(next);
            self.last_dx = next - before;
        }
    }

    /// Region this platform can ever occupy
    pub fn swept_bounds(&self) -> AxisBox {
        match self.kind {
            PlatformKind::Moving { min_x, max_x, .. } => AxisBox {
                pos: Vec2::new(min_x, self.bounds.top()),
                size: Vec2::new(max_x - min_x + self.bounds.width(), self.bounds.height()),
            },
            _ => self.bounds,
        }
    }

    /// Something can stand on it
    pub fn is_solid_ground(&self) -> bool {
        !matches!(self.kind, PlatformKind::Bounce { .. })
    }
}

/// Kinematic state shared by the player and enemies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub bounds: AxisBox,
    pub vel: Vec2,
    /// Set only when the last vertical pass produced a landing
    pub grounded: bool,
    /// -1.0 left, 1.0 right
    pub facing: f32,
}

impl Body {
    pub fn new(bounds: AxisBox) -> Self {
        Self {
            bounds,
            vel: Vec2::ZERO,
            grounded: false,
            facing: 1.0,
        }
    }
}

/// Player movement state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveState {
    Grounded,
    Airborne,
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub state: MoveState,
    /// Ticks a jump request stays live
    pub jump_buffer: u32,
    /// Ticks left to jump after walking off a ledge
    pub coyote: u32,
    pub double_jump_available: bool,
    /// Rising from a player jump; releasing jump cuts it short
    pub jump_cut_eligible: bool,
    pub health: i32,
    pub powerup_tier: u8,
    pub invulnerable_ticks: u32,
    /// Bottom-center respawn point
    pub spawn: Vec2,
}

impl Player {
    pub fn new(spawn: Vec2, max_health: i32) -> Result<Self, LevelError> {
        let bounds = AxisBox::from_bottom_center(spawn, PLAYER_WIDTH, PLAYER_HEIGHT)
            .map_err(|source| LevelError::Geometry {
                what: "player",
                source,
            })?;
        Ok(Self {
            body: Body::new(bounds),
            state: MoveState::Airborne,
            jump_buffer: 0,
            coyote: 0,
            double_jump_available: true,
            jump_cut_eligible: false,
            health: max_health,
            powerup_tier: 0,
            invulnerable_ticks: 0,
            spawn,
        })
    }

    pub fn bounds(&self) -> &AxisBox {
        &self.body.bounds
    }

    pub fn is_grounded(&self) -> bool {
        self.state == MoveState::Grounded
    }
}

/// Enemy archetype, as recorded in level descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Walker,
    Jumper,
    Shooter,
}

/// Per-kind behaviour data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behavior {
    /// Walk, turn at edges and walls
    Patrol,
    /// Patrol, plus a vertical hop whenever the timer runs out on the ground
    Hop { jump_timer: u32 },
    /// Stand still, fire at the player when the cooldown runs out
    Turret { cooldown: u32 },
}

impl Behavior {
    pub fn for_kind(kind: EnemyKind, tuning: &Tuning) -> Self {
        match kind {
            EnemyKind::Walker => Behavior::Patrol,
            EnemyKind::Jumper => Behavior::Hop {
                jump_timer: tuning.enemy.jump_interval_ticks,
            },
            EnemyKind::Shooter => Behavior::Turret {
                cooldown: tuning.enemy.shoot_interval_ticks,
            },
        }
    }
}

/// Enemy lifecycle; `Defeated` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyState {
    Active,
    Defeated,
}

/// An enemy. Defeated enemies stay in the list as tombstones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub behavior: Behavior,
    pub body: Body,
    /// Patrol direction, -1.0 or 1.0
    pub direction: f32,
    pub speed: f32,
    pub state: EnemyState,
}

impl Enemy {
    pub fn spawn(
        id: u32,
        spawn: &EnemySpawn,
        world_index: u32,
        tuning: &Tuning,
    ) -> Result<Self, LevelError> {
        let bounds = AxisBox::from_bottom_center(spawn.pos, spawn.size.x, spawn.size.y)
            .map_err(|source| LevelError::Geometry {
                what: "enemy",
                source,
            })?;
        let mut body = Body::new(bounds);
        body.facing = spawn.direction;
        let speed =
            tuning.enemy.base_speed + tuning.enemy.speed_per_world * world_index.saturating_sub(1) as f32;
        Ok(Self {
            id,
            kind: spawn.kind,
            behavior: Behavior::for_kind(spawn.kind, tuning),
            body,
            direction: spawn.direction,
            speed,
            state: EnemyState::Active,
        })
    }

    pub fn is_active(&self) -> bool {
        self.state == EnemyState::Active
    }

    /// Terminal transition; the enemy never collides or scores again
    pub fn defeat(&mut self) {
        self.state = EnemyState::Defeated;
        self.body.vel = Vec2::ZERO;
    }
}

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectibleKind {
    Coin,
    PowerUp,
}

/// A pickup; `collected` only ever goes false -> true
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub kind: CollectibleKind,
    pub bounds: AxisBox,
    pub collected: bool,
}

/// A shooter's bullet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub owner: u32,
    pub bounds: AxisBox,
    pub vel: Vec2,
    pub ttl_ticks: u32,
}

/// Mutable level contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub world_index: u32,
    pub level_index: u32,
    pub level_length: f32,
    /// Bottom-center player spawn point
    pub spawn: Vec2,
    /// Anything whose top passes below this has fallen out
    pub death_plane: f32,
    pub terrain: Vec<TerrainSample>,
    pub platforms: Vec<Platform>,
    pub enemies: Vec<Enemy>,
    pub collectibles: Vec<Collectible>,
    pub projectiles: Vec<Projectile>,
    next_id: u32,
}

impl World {
    /// Populate a world from a generated (or hand-built) level
    pub fn from_descriptor(desc: &LevelDescriptor, tuning: &Tuning) -> Result<Self, LevelError> {
        desc.validate()?;

        let mut next_id = desc.platforms.len() as u32 + 1;
        let mut alloc = || {
            let id = next_id;
            next_id += 1;
            id
        };

        let enemies = desc
            .enemies
            .iter()
            .map(|spawn| Enemy::spawn(alloc(), spawn, desc.world, tuning))
            .collect::<Result<Vec<_>, _>>()?;

        let collectibles = desc
            .collectibles
            .iter()
            .map(|spawn: &CollectibleSpawn| Collectible {
                id: alloc(),
                kind: spawn.kind,
                bounds: spawn.bounds,
                collected: false,
            })
            .collect();

        let lowest = desc
            .platforms
            .iter()
            .map(|p| p.bounds.bottom())
            .fold(f32::MIN, f32::max);

        Ok(Self {
            world_index: desc.world,
            level_index: desc.level,
            level_length: desc.length,
            spawn: desc.spawn,
            death_plane: lowest + tuning.rules.death_plane_margin,
            terrain: desc.terrain.clone(),
            platforms: desc.platforms.clone(),
            enemies,
            collectibles,
            projectiles: Vec::new(),
            next_id,
        })
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn active_enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.is_active())
    }

    pub fn remaining_collectibles(&self) -> usize {
        self.collectibles.iter().filter(|c| !c.collected).count()
    }

    /// X where the goal zone begins
    pub fn goal_x(&self, goal_zone: f32) -> f32 {
        self.level_length - goal_zone
    }
}

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub world: World,
    pub player: Player,
    pub camera: Camera,
    pub score: u64,
    pub coins: u32,
    pub lives: u8,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Level timer
    pub time_left_ticks: u32,
    /// Events raised during the last tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl Simulation {
    /// Start a run at world 1, level 1
    pub fn new(seed: u64, tuning: Tuning) -> Result<Self, LevelError> {
        Self::at_level(seed, 1, 1, tuning)
    }

    /// Start a run at a given level
    pub fn at_level(seed: u64, world: u32, level: u32, tuning: Tuning) -> Result<Self, LevelError> {
        let desc = LevelGenerator::new(&tuning).generate(seed, world, level)?;
        Self::from_descriptor(seed, &desc, tuning)
    }

    /// Start a run on a prepared level
    pub fn from_descriptor(
        seed: u64,
        desc: &LevelDescriptor,
        tuning: Tuning,
    ) -> Result<Self, LevelError> {
        tuning.validate()?;
        let world = World::from_descriptor(desc, &tuning)?;
        let player = Player::new(world.spawn, tuning.player.max_health)?;
        let camera = Camera::new(&tuning.camera, world.level_length, player.bounds().center_x());
        log::info!(
            "Run started: seed={} level {}-{} length={}",
            seed,
            world.world_index,
            world.level_index,
            world.level_length
        );
        Ok(Self {
            seed,
            world,
            player,
            camera,
            score: 0,
            coins: 0,
            lives: tuning.rules.lives,
            phase: GamePhase::Playing,
            time_ticks: 0,
            time_left_ticks: tuning.rules.level_time_ticks(),
            events: Vec::new(),
            tuning,
        })
    }

    /// Replace the level, keeping score, coins and lives
    pub fn load_level(&mut self, world: u32, level: u32) -> Result<(), LevelError> {
        let desc = LevelGenerator::new(&self.tuning).generate(self.seed, world, level)?;
        self.world = World::from_descriptor(&desc, &self.tuning)?;
        self.player = Player::new(self.world.spawn, self.tuning.player.max_health)?;
        self.camera = Camera::new(
            &self.tuning.camera,
            self.world.level_length,
            self.player.bounds().center_x(),
        );
        self.time_left_ticks = self.tuning.rules.level_time_ticks();
        self.phase = GamePhase::Playing;
        Ok(())
    }

    /// Move on after `LevelComplete`: next level, next world, or the win
    pub fn advance_level(&mut self) -> Result<(), LevelError> {
        if self.phase != GamePhase::LevelComplete {
            return Ok(());
        }
        let (world, level) = (self.world.world_index, self.world.level_index);
        let next = if level < LEVELS_PER_WORLD {
            Some((world, level + 1))
        } else if world < WORLD_COUNT {
            Some((world + 1, 1))
        } else {
            None
        };

        match next {
            Some((w, l)) => {
                log::info!("Advancing to level {}-{}", w, l);
                self.load_level(w, l)
            }
            None => {
                log::info!("All worlds cleared, final score {}", self.score);
                self.phase = GamePhase::Won;
                self.events.push(GameEvent::GameWon { score: self.score });
                Ok(())
            }
        }
    }

    /// Fresh run with the same seed and tuning
    pub fn restart(&mut self) -> Result<(), LevelError> {
        self.score = 0;
        self.coins = 0;
        self.lives = self.tuning.rules.lives;
        self.time_ticks = 0;
        self.events.clear();
        self.load_level(1, 1)
    }

    // Read-only views for presentation

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.world.platforms
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.world.enemies
    }

    pub fn collectibles(&self) -> &[Collectible] {
        &self.world.collectibles
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.world.projectiles
    }

    pub fn terrain(&self) -> &[TerrainSample] {
        &self.world.terrain
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Take the events raised by the last tick
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
