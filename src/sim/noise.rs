//! Seeded 1D fractal value noise for terrain heights
//!
//! Pure function of (seed, x): integer lattice points hash to values in
//! [-1, 1], quintic fade interpolates between them, octaves are summed with
//! falling amplitude and normalized back into [-1, 1].

use serde::{Deserialize, Serialize};

/// Fractal noise parameters bound to a seed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseField {
    pub seed: u64,
    pub octaves: u32,
    /// Amplitude multiplier per octave
    pub persistence: f32,
    /// Frequency multiplier per octave
    pub lacunarity: f32,
}

impl NoiseField {
    pub fn new(seed: u64, octaves: u32, persistence: f32, lacunarity: f32) -> Self {
        Self {
            seed,
            octaves,
            persistence,
            lacunarity,
        }
    }

    #[inline]
    pub fn sample(&self, x: f32) -> f32 {
        sample(self.seed, x, self.octaves, self.persistence, self.lacunarity)
    }
}

/// Fractal noise at `x`, in [-1, 1]. Zero octaves yields 0.
pub fn sample(seed: u64, x: f32, octaves: u32, persistence: f32, lacunarity: f32) -> f32 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_amplitude = 0.0;

    for octave in 0..octaves {
        // Decorrelate octaves so they don't share lattice values
        let octave_seed = seed.wrapping_add((octave as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        total += value_noise(octave_seed, x * frequency) * amplitude;
        max_amplitude += amplitude;
        amplitude *= persistence;
        frequency *= lacunarity;
    }

    if max_amplitude <= 0.0 {
        return 0.0;
    }
    (total / max_amplitude).clamp(-1.0, 1.0)
}

/// Single octave: smooth interpolation between hashed lattice values
fn value_noise(seed: u64, x: f32) -> f32 {
    let x0 = x.floor();
    let t = x - x0;
    let i = x0 as i64;

    let a = lattice(seed, i);
    let b = lattice(seed, i.wrapping_add(1));
    a + (b - a) * fade(t)
}

/// Quintic smoothstep, C2-continuous at lattice points
#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Hash a lattice coordinate to [-1, 1]
fn lattice(seed: u64, i: i64) -> f32 {
    let mut h = seed ^ (i as u64).wrapping_mul(0xD6E8_FEB8_6659_FD93);
    // splitmix64 finalizer
    h = (h ^ (h >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h = (h ^ (h >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^= h >> 31;
    // Top 24 bits -> [0, 1] -> [-1, 1]
    let unit = (h >> 40) as f32 / ((1u64 << 24) - 1) as f32;
    unit * 2.0 - 1.0
}
