//! Procedural level generation
//!
//! `(seed, world, level)` fully determines a level: the RNG is a PCG stream
//! seeded from all three, and terrain comes from the seeded noise field.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geom::AxisBox;
use super::noise::NoiseField;
use super::state::{CollectibleKind, EnemyKind, Platform, PlatformKind};
use crate::consts::{COLLECTIBLE_SIZE, ENEMY_HEIGHT, ENEMY_WIDTH, PLATFORM_THICKNESS};
use crate::error::LevelError;
use crate::tuning::{GeneratorTuning, Tuning};

/// Terrain height at a horizontal position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainSample {
    pub x: f32,
    pub height: f32,
}

/// Where and what to spawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    /// Bottom-center, resting on a platform top
    pub pos: Vec2,
    pub size: Vec2,
    pub direction: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollectibleSpawn {
    pub kind: CollectibleKind,
    pub bounds: AxisBox,
}

/// Immutable level description, consumed by `World::from_descriptor`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDescriptor {
    pub seed: u64,
    pub world: u32,
    pub level: u32,
    pub length: f32,
    /// Bottom-center player spawn point
    pub spawn: Vec2,
    pub terrain: Vec<TerrainSample>,
    /// Left to right; first is the spawn pad, last is the goal pad
    pub platforms: Vec<Platform>,
    pub enemies: Vec<EnemySpawn>,
    pub collectibles: Vec<CollectibleSpawn>,
}

impl LevelDescriptor {
    /// Reject geometry the physics step cannot resolve sensibly
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.world == 0 || self.level == 0 {
            return Err(LevelError::InvalidIndex {
                world: self.world,
                level: self.level,
            });
        }
        if self.platforms.is_empty() {
            return Err(LevelError::Empty);
        }

        for p in &self.platforms {
            let b = p.bounds;
            AxisBox::new(b.left(), b.top(), b.width(), b.height())
                .map_err(|source| LevelError::Geometry {
                    what: "platform",
                    source,
                })?;
        }
        for c in &self.collectibles {
            let b = c.bounds;
            AxisBox::new(b.left(), b.top(), b.width(), b.height())
                .map_err(|source| LevelError::Geometry {
                    what: "collectible",
                    source,
                })?;
        }

        // Moving platforms are checked over their whole track
        for (i, a) in self.platforms.iter().enumerate() {
            let swept_a = a.swept_bounds();
            for (j, b) in self.platforms.iter().enumerate().skip(i + 1) {
                if swept_a.overlaps(&b.swept_bounds()) {
                    return Err(LevelError::OverlappingPlatforms {
                        first: i,
                        second: j,
                    });
                }
            }
        }
        Ok(())
    }

    /// Structural fingerprint for determinism checks
    pub fn same_layout(&self, other: &LevelDescriptor) -> bool {
        self.length == other.length
            && self.spawn == other.spawn
            && self.terrain == other.terrain
            && self.platforms.len() == other.platforms.len()
            && self
                .platforms
                .iter()
                .zip(&other.platforms)
                .all(|(a, b)| a.bounds == b.bounds && a.kind == b.kind)
            && self.enemies == other.enemies
            && self.collectibles == other.collectibles
    }
}

/// One platform slot produced by the left-to-right walk
struct Segment {
    x: f32,
    span: f32,
    top: f32,
    kind: SegmentKind,
    gap_before: f32,
    gap_after: f32,
}

#[derive(Clone, Copy, PartialEq)]
enum SegmentKind {
    Static,
    Moving,
    Bounce,
}

/// Builds levels from generator tuning
#[derive(Debug, Clone)]
pub struct LevelGenerator {
    tuning: Tuning,
}

impl LevelGenerator {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            tuning: tuning.clone(),
        }
    }

    /// Generate level `world-level` for a run seed
    pub fn generate(&self, seed: u64, world: u32, level: u32) -> Result<LevelDescriptor, LevelError> {
        if world == 0 || level == 0 {
            return Err(LevelError::InvalidIndex { world, level });
        }
        self.tuning.validate()?;
        let g = &self.tuning.generator;

        let level_seed = level_seed(seed, world, level);
        let mut rng = Pcg32::seed_from_u64(level_seed);
        let noise = NoiseField::new(level_seed, g.octaves, g.persistence, g.lacunarity);

        let length = g.level_length(world, level);
        let terrain = sample_terrain(&noise, g, world, length);
        let segments = walk_segments(&mut rng, &terrain, g, world, length);

        let mut platforms = Vec::with_capacity(segments.len());
        for (i, seg) in segments.iter().enumerate() {
            let bounds = AxisBox::new(seg.x, seg.top, seg.span, PLATFORM_THICKNESS).map_err(
                |source| LevelError::Geometry {
                    what: "platform",
                    source,
                },
            )?;
            let kind = match seg.kind {
                SegmentKind::Static => PlatformKind::Static,
                SegmentKind::Bounce => PlatformKind::Bounce {
                    strength: g.bounce_strength,
                },
                SegmentKind::Moving => {
                    // Half the smaller neighbouring gap, so tracks never meet
                    let travel = seg.gap_before.min(seg.gap_after) * 0.5 - 1.0;
                    let travel = travel.max(0.0);
                    PlatformKind::Moving {
                        direction: if rng.random::<bool>() { 1.0 } else { -1.0 },
                        speed: rng.random_range(g.moving_speed_min..=g.moving_speed_max),
                        min_x: seg.x - travel,
                        max_x: seg.x + travel,
                    }
                }
            };
            platforms.push(Platform::new(i as u32 + 1, bounds, kind));
        }

        let spawn_pad = &platforms[0].bounds;
        let spawn = Vec2::new(spawn_pad.left() + 100.0_f32.min(spawn_pad.width() / 2.0), spawn_pad.top());

        let enemies = place_enemies(&mut rng, &platforms, g, world, length);
        let collectibles = scatter_collectibles(&mut rng, g, length)?;

        log::info!(
            "Level {}-{} (seed {}): length={} platforms={} enemies={} collectibles={}",
            world,
            level,
            seed,
            length,
            platforms.len(),
            enemies.len(),
            collectibles.len()
        );

        let desc = LevelDescriptor {
            seed,
            world,
            level,
            length,
            spawn,
            terrain,
            platforms,
            enemies,
            collectibles,
        };
        desc.validate()?;
        Ok(desc)
    }
}

/// Mix run seed and level coordinates into one stream seed
fn level_seed(seed: u64, world: u32, level: u32) -> u64 {
    let coords = ((world as u64) << 32) | level as u64;
    seed.wrapping_mul(6364136223846793005)
        .wrapping_add(coords.wrapping_mul(2654435761))
}

fn sample_terrain(noise: &NoiseField, g: &GeneratorTuning, world: u32, length: f32) -> Vec<TerrainSample> {
    let count = (length / g.terrain_step).floor() as usize + 1;
    (0..count)
        .map(|i| {
            let x = i as f32 * g.terrain_step;
            let n = noise.sample(x / g.noise_scale + world as f32);
            TerrainSample {
                x,
                height: g.terrain_base + n * g.terrain_amplitude,
            }
        })
        .collect()
}

/// Terrain height under `x` (nearest sample at or before it)
fn terrain_at(terrain: &[TerrainSample], step: f32, x: f32) -> f32 {
    let idx = ((x / step).floor().max(0.0) as usize).min(terrain.len().saturating_sub(1));
    terrain.get(idx).map(|s| s.height).unwrap_or(0.0)
}

/// Walk left to right laying spans and gaps; spawn pad first, goal pad last
fn walk_segments(
    rng: &mut Pcg32,
    terrain: &[TerrainSample],
    g: &GeneratorTuning,
    world: u32,
    length: f32,
) -> Vec<Segment> {
    let gap_max = g.gap_max(world);
    let goal_width = g.goal_pad_width.min(length / 4.0);
    let mut baseline = g.start_baseline.clamp(g.band_top, g.band_bottom);

    let spawn_width = g.spawn_pad_width.min(length - goal_width - g.gap_min).max(1.0);
    let mut segments = vec![Segment {
        x: 0.0,
        span: spawn_width,
        top: baseline,
        kind: SegmentKind::Static,
        gap_before: 0.0,
        gap_after: 0.0,
    }];

    let mut x = spawn_width;
    let mut gap = rng.random_range(g.gap_min..=gap_max);

    loop {
        let span = rng.random_range(g.span_min..=g.span_max);
        let next_gap = rng.random_range(g.gap_min..=gap_max);
        let start = x + gap;
        // Leave room for this span, the gap after it, and the goal pad
        if start + span + next_gap + goal_width > length {
            break;
        }

        if let Some(last) = segments.last_mut() {
            last.gap_after = gap;
        }

        if rng.random::<f32>() < g.step_chance {
            let target = terrain_at(terrain, g.terrain_step, start).clamp(g.band_top, g.band_bottom);
            let delta = (target - baseline).clamp(-g.max_step, g.max_step);
            baseline = (baseline + delta).clamp(g.band_top, g.band_bottom);
        }

        let roll = rng.random::<f32>();
        let kind = if roll < g.moving_chance {
            SegmentKind::Moving
        } else if roll < g.moving_chance + g.bounce_chance {
            SegmentKind::Bounce
        } else {
            SegmentKind::Static
        };

        segments.push(Segment {
            x: start,
            span,
            top: baseline,
            kind,
            gap_before: gap,
            gap_after: 0.0,
        });
        x = start + span;
        gap = next_gap;
    }

    // Goal pad runs to the end of the level
    let start = (x + gap).min(length - goal_width);
    if let Some(last) = segments.last_mut() {
        last.gap_after = start - x;
    }
    segments.push(Segment {
        x: start,
        span: length - start,
        top: baseline,
        kind: SegmentKind::Static,
        gap_before: start - x,
        gap_after: 0.0,
    });

    segments
}

/// Enemy kinds unlocked by world index
fn unlocked_kinds(world: u32) -> &'static [EnemyKind] {
    const KINDS: [EnemyKind; 3] = [EnemyKind::Walker, EnemyKind::Jumper, EnemyKind::Shooter];
    let n = (world as usize).clamp(1, KINDS.len());
    &KINDS[..n]
}

/// Standard normal sample (Box-Muller)
fn gaussian(rng: &mut Pcg32) -> f32 {
    let u1 = 1.0 - rng.random::<f32>(); // (0, 1]
    let u2 = rng.random::<f32>();
    (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos()
}

/// Enemies cluster around the level midpoint; spread widens with world index
fn place_enemies(
    rng: &mut Pcg32,
    platforms: &[Platform],
    g: &GeneratorTuning,
    world: u32,
    length: f32,
) -> Vec<EnemySpawn> {
    // Static platforms only, never the spawn pad
    let candidates: Vec<&Platform> = platforms
        .iter()
        .skip(1)
        .filter(|p| p.kind == PlatformKind::Static && p.bounds.width() >= ENEMY_WIDTH)
        .collect();
    if candidates.is_empty() {
        log::warn!("Level {} has no platform enemies can stand on", world);
        return Vec::new();
    }

    let count = g.enemy_base_count + g.enemies_per_world * world;
    let spread_frac = (g.enemy_spread_base + g.enemy_spread_per_world * world as f32).min(0.35);
    let sigma = length * spread_frac;
    let mid = length / 2.0;
    let kinds = unlocked_kinds(world);

    let mut enemies = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let x = (mid + gaussian(rng) * sigma).clamp(g.enemy_safe_zone.min(length), length);

        // Platform under x, else the nearest one
        let platform = candidates
            .iter()
            .find(|p| p.bounds.contains_x(x))
            .or_else(|| {
                candidates.iter().min_by(|a, b| {
                    (a.bounds.center_x() - x)
                        .abs()
                        .total_cmp(&(b.bounds.center_x() - x).abs())
                })
            })
            .copied();
        let Some(platform) = platform else { continue };

        let half = ENEMY_WIDTH / 2.0;
        let x = x.clamp(platform.bounds.left() + half, platform.bounds.right() - half);
        let kind = kinds[rng.random_range(0..kinds.len())];
        let direction = if rng.random::<bool>() { 1.0 } else { -1.0 };

        enemies.push(EnemySpawn {
            kind,
            pos: Vec2::new(x, platform.bounds.top()),
            size: Vec2::new(ENEMY_WIDTH, ENEMY_HEIGHT),
            direction,
        });
    }
    enemies
}

/// One collectible per slot, uniform within the collectible band
fn scatter_collectibles(
    rng: &mut Pcg32,
    g: &GeneratorTuning,
    length: f32,
) -> Result<Vec<CollectibleSpawn>, LevelError> {
    let (min_x, max_x) = (100.0_f32.min(length / 2.0), (length - 100.0).max(length / 2.0));
    (0..g.collectible_count)
        .map(|_| {
            let x = rng.random_range(min_x..=max_x);
            let y = rng.random_range(g.collectible_top..=g.collectible_bottom);
            let kind = if rng.random::<f32>() < g.powerup_chance {
                CollectibleKind::PowerUp
            } else {
                CollectibleKind::Coin
            };
            let bounds = AxisBox::new(x, y, COLLECTIBLE_SIZE, COLLECTIBLE_SIZE).map_err(|source| {
                LevelError::Geometry {
                    what: "collectible",
                    source,
                }
            })?;
            Ok(CollectibleSpawn { kind, bounds })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(seed: u64, world: u32, level: u32) -> LevelDescriptor {
        LevelGenerator::new(&Tuning::default())
            .generate(seed, world, level)
            .unwrap()
    }

    #[test]
    fn test_determinism() {
        let a = generate(42, 1, 1);
        let b = generate(42, 1, 1);
        assert!(a.same_layout(&b));
        assert_eq!(a.platforms.len(), b.platforms.len());
        assert_eq!(a.enemies, b.enemies);
        assert_eq!(a.collectibles, b.collectibles);
    }

    #[test]
    fn test_seed_and_index_change_layout() {
        let base = generate(42, 1, 1);
        assert!(!base.same_layout(&generate(43, 1, 1)));
        assert!(!base.same_layout(&generate(42, 1, 2)));
        assert!(!base.same_layout(&generate(42, 2, 1)));
    }

    #[test]
    fn test_zero_index_rejected() {
        let generator = LevelGenerator::new(&Tuning::default());
        assert!(matches!(
            generator.generate(1, 0, 1),
            Err(LevelError::InvalidIndex { world: 0, level: 1 })
        ));
    }

    #[test]
    fn test_bad_tuning_rejected_before_generation() {
        let mut tuning = Tuning::default();
        tuning.generator.span_min = 300.0;
        tuning.generator.span_max = 100.0;
        assert!(matches!(
            LevelGenerator::new(&tuning).generate(1, 1, 1),
            Err(LevelError::Tuning(_))
        ));

        let mut tuning = Tuning::default();
        tuning.generator.max_step = -5.0;
        tuning.generator.step_chance = 1.0;
        assert!(matches!(
            LevelGenerator::new(&tuning).generate(1, 1, 1),
            Err(LevelError::Tuning(_))
        ));
    }

    #[test]
    fn test_pads_and_length() {
        let desc = generate(7, 2, 3);
        let g = GeneratorTuning::default();
        assert_eq!(desc.length, g.level_length(2, 3));

        let first = desc.platforms.first().unwrap();
        assert_eq!(first.bounds.left(), 0.0);
        assert_eq!(first.kind, PlatformKind::Static);

        let last = desc.platforms.last().unwrap();
        assert!((last.bounds.right() - desc.length).abs() < 0.01);
        assert_eq!(last.kind, PlatformKind::Static);

        // Spawn sits on the spawn pad
        assert_eq!(desc.spawn.y, first.bounds.top());
        assert!(first.bounds.contains_x(desc.spawn.x));
    }

    #[test]
    fn test_platforms_left_to_right_within_band() {
        let g = GeneratorTuning::default();
        for seed in 0..20 {
            let desc = generate(seed, 3, 2);
            for pair in desc.platforms.windows(2) {
                assert!(pair[0].bounds.right() <= pair[1].bounds.left());
            }
            for p in &desc.platforms {
                assert!(p.bounds.top() >= g.band_top && p.bounds.top() <= g.band_bottom);
            }
            // Steps between neighbours stay climbable
            for pair in desc.platforms.windows(2) {
                assert!((pair[0].bounds.top() - pair[1].bounds.top()).abs() <= g.max_step + 0.01);
            }
        }
    }

    #[test]
    fn test_gaps_widen_with_world() {
        let widest = |world: u32| {
            (0..30)
                .flat_map(|seed| {
                    let desc = generate(seed, world, 1);
                    desc.platforms
                        .windows(2)
                        .map(|p| p[1].bounds.left() - p[0].bounds.right())
                        .collect::<Vec<_>>()
                })
                .fold(0.0_f32, f32::max)
        };
        assert!(widest(8) > widest(1));
        assert!(widest(1) <= GeneratorTuning::default().gap_max(1) + 0.01);
    }

    #[test]
    fn test_enemy_count_scales_with_world() {
        let g = GeneratorTuning::default();
        let w1 = generate(11, 1, 1);
        let w4 = generate(11, 4, 1);
        assert_eq!(w1.enemies.len() as u32, g.enemy_base_count + g.enemies_per_world);
        assert_eq!(w4.enemies.len() as u32, g.enemy_base_count + g.enemies_per_world * 4);
    }

    #[test]
    fn test_enemies_stand_on_static_platforms() {
        let desc = generate(99, 5, 4);
        for e in &desc.enemies {
            let on = desc.platforms.iter().any(|p| {
                p.kind == PlatformKind::Static
                    && p.bounds.top() == e.pos.y
                    && e.pos.x - e.size.x / 2.0 >= p.bounds.left()
                    && e.pos.x + e.size.x / 2.0 <= p.bounds.right()
            });
            assert!(on, "enemy at {:?} is not on a static platform", e.pos);
            assert!(!desc.platforms[0].bounds.contains_x(e.pos.x));
        }
    }

    #[test]
    fn test_world_one_only_walkers() {
        let desc = generate(3, 1, 1);
        assert!(desc.enemies.iter().all(|e| e.kind == EnemyKind::Walker));
    }

    #[test]
    fn test_collectibles_in_bounds() {
        let g = GeneratorTuning::default();
        let desc = generate(5, 1, 1);
        assert_eq!(desc.collectibles.len() as u32, g.collectible_count);
        for c in &desc.collectibles {
            assert!(c.bounds.left() >= 100.0 && c.bounds.left() <= desc.length - 100.0);
            assert!(c.bounds.top() >= g.collectible_top && c.bounds.top() <= g.collectible_bottom);
        }
    }

    #[test]
    fn test_terrain_covers_level() {
        let desc = generate(1, 1, 1);
        let g = GeneratorTuning::default();
        assert_eq!(desc.terrain[0].x, 0.0);
        assert!(desc.terrain.last().unwrap().x >= desc.length - g.terrain_step);
        for s in &desc.terrain {
            assert!((s.height - g.terrain_base).abs() <= g.terrain_amplitude + 0.01);
        }
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let mut desc = generate(8, 1, 1);
        let copy = desc.platforms[1].clone();
        desc.platforms.push(copy);
        assert!(matches!(
            desc.validate(),
            Err(LevelError::OverlappingPlatforms { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_size() {
        let mut desc = generate(8, 1, 1);
        desc.platforms[0].bounds.size.x = 0.0;
        assert!(matches!(desc.validate(), Err(LevelError::Geometry { .. })));
    }
}
