#![forbid(unsafe_code)]

//! Deterministic curve colors.
//!
//! One seeded generator per editor. Colors use a random hue at fixed
//! saturation and value, so they stay distinguishable on both light and
//! dark backgrounds. The same seed always yields the same sequence.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const SATURATION: f64 = 0.7;
const BRIGHTNESS: f64 = 0.95;

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurveColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl CurveColor {
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Create a color from components.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Convert HSV (hue in degrees, saturation and value in `[0, 1]`) to RGB.
#[must_use]
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> CurveColor {
    let h = h.rem_euclid(360.0);
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    CurveColor::rgb(
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    )
}

/// Seeded color source.
#[derive(Debug, Clone)]
pub struct Palette {
    seed: u64,
    rng: ChaCha8Rng,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEED)
    }
}

impl Palette {
    /// Seed used when none is configured.
    pub const DEFAULT_SEED: u64 = 0x00C0_FFEE;

    /// Create a palette from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seed this palette was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restart the sequence from the seed.
    pub fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }

    /// Next color in the sequence.
    pub fn next_color(&mut self) -> CurveColor {
        let hue = self.rng.random_range(0.0..360.0);
        hsv_to_rgb(hue, SATURATION, BRIGHTNESS)
    }
}
