//! Terrain height profile
//!
//! The ground is a sum of three sinusoids around a baseline. Screen-style
//! coordinates: larger `y` is lower on screen, so "above ground" means a
//! smaller `y` than `height_at(x)`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One sinusoid layer: `amplitude * sin((x + phase) / period)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    pub amplitude: f32,
    pub phase: f32,
    pub period: f32,
}

/// Long rolling hills, medium bumps, short ripples
pub const TERRAIN_WAVES: [Wave; 3] = [
    Wave {
        amplitude: 90.0,
        phase: 300.0,
        period: 260.0,
    },
    Wave {
        amplitude: 48.0,
        phase: 800.0,
        period: 110.0,
    },
    Wave {
        amplitude: 24.0,
        phase: -1200.0,
        period: 55.0,
    },
];

/// Step used by `slope_at` for the central difference
pub const SLOPE_STEP: f32 = 1.0;

/// Static, stateless terrain model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Terrain {
    /// Baseline ground level
    pub base: f32,
}

impl Terrain {
    pub fn new(base: f32) -> Self {
        Self { base }
    }

    /// Ground height at track position `x`
    #[inline]
    pub fn height_at(&self, x: f32) -> f32 {
        self.base
            + TERRAIN_WAVES
                .iter()
                .map(|w| w.amplitude * ((x + w.phase) / w.period).sin())
                .sum::<f32>()
    }

    /// Local slope dy/dx by central difference
    pub fn slope_at(&self, x: f32) -> f32 {
        let y1 = self.height_at(x - SLOPE_STEP);
        let y2 = self.height_at(x + SLOPE_STEP);
        (y2 - y1) / (2.0 * SLOPE_STEP)
    }

    /// Sprite tilt in degrees for a rider at `x` (damped so bikes don't flip on steep faces)
    pub fn tilt_degrees(&self, x: f32) -> f32 {
        (-self.slope_at(x)).atan().to_degrees() * 0.6
    }

    /// Ground polyline from `x0` to `x1` for drawing, always including the end point
    pub fn sample(&self, x0: f32, x1: f32, step: f32) -> Vec<Vec2> {
        if step <= 0.0 || x1 < x0 {
            return Vec::new();
        }
        let count = ((x1 - x0) / step).floor() as usize;
        let mut points: Vec<Vec2> = (0..=count)
            .map(|i| {
                let x = x0 + i as f32 * step;
                Vec2::new(x, self.height_at(x))
            })
            .collect();
        if points.last().is_some_and(|p| p.x < x1) {
            points.push(Vec2::new(x1, self.height_at(x1)));
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_is_deterministic() {
        let terrain = Terrain::new(720.0);
        assert_eq!(terrain.height_at(1234.5), terrain.height_at(1234.5));
    }

    #[test]
    fn test_height_stays_within_amplitude_sum() {
        let terrain = Terrain::new(720.0);
        let max_dev: f32 = TERRAIN_WAVES.iter().map(|w| w.amplitude).sum();
        for i in -200..800 {
            let y = terrain.height_at(i as f32 * 7.3);
            assert!((y - 720.0).abs() <= max_dev + 0.001);
        }
    }

    #[test]
    fn test_slope_matches_analytic_derivative() {
        let terrain = Terrain::new(720.0);
        for x in [0.0_f32, 150.0, 999.0, 2500.0, 3999.0] {
            let analytic: f32 = TERRAIN_WAVES
                .iter()
                .map(|w| w.amplitude / w.period * ((x + w.phase) / w.period).cos())
                .sum();
            assert!((terrain.slope_at(x) - analytic).abs() < 0.05);
        }
    }

    #[test]
    fn test_sample_covers_range() {
        let terrain = Terrain::new(720.0);
        let points = terrain.sample(0.0, 100.0, 16.0);
        assert_eq!(points.first().map(|p| p.x), Some(0.0));
        assert_eq!(points.last().map(|p| p.x), Some(100.0));
        assert!(points.windows(2).all(|w| w[0].x < w[1].x));
        assert!(terrain.sample(10.0, 0.0, 16.0).is_empty());
    }
}
