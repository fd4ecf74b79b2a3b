//! Ground surface for the reference world.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Raised circular area with a flat top.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plateau {
    /// Centre on the horizontal plane (x, z).
    pub center: Vec2,
    /// Radius of the flat top.
    pub radius: f32,
    /// Height of the top surface.
    pub height: f32,
}

/// Flat ground at `base_height` with optional plateaus.
///
/// When `half_extent` is set the terrain only exists inside the square
/// `|x|, |z| <= half_extent`; outside it both probes and height samples fail.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Terrain {
    /// Height of the open ground.
    pub base_height: f32,
    /// Raised areas; the highest one covering a point wins.
    pub plateaus: Vec<Plateau>,
    /// Half size of the terrain square, unbounded when `None`.
    pub half_extent: Option<f32>,
}

impl Terrain {
    /// Unbounded flat ground.
    #[must_use]
    pub fn flat(base_height: f32) -> Self {
        Self {
            base_height,
            plateaus: Vec::new(),
            half_extent: None,
        }
    }

    /// Restricts the terrain to a square of the given half size.
    #[must_use]
    pub fn bounded(mut self, half_extent: f32) -> Self {
        self.half_extent = Some(half_extent);
        self
    }

    /// Adds a plateau.
    #[must_use]
    pub fn with_plateau(mut self, center: Vec2, radius: f32, height: f32) -> Self {
        self.plateaus.push(Plateau {
            center,
            radius,
            height,
        });
        self
    }

    /// True when (x, z) lies on the terrain.
    #[must_use]
    pub fn covers(&self, x: f32, z: f32) -> bool {
        self.half_extent
            .map_or(true, |half| x.abs() <= half && z.abs() <= half)
    }

    /// Surface height at (x, z).
    #[must_use]
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        if !self.covers(x, z) {
            return None;
        }
        let point = Vec2::new(x, z);
        let height = self
            .plateaus
            .iter()
            .filter(|p| p.center.distance_squared(point) <= p.radius * p.radius)
            .map(|p| p.height)
            .fold(self.base_height, f32::max);
        Some(height)
    }

    /// Downward ray from `origin`; hits if the surface is below it and
    /// within `max_distance`.
    #[must_use]
    pub fn probe_down(&self, origin: Vec3, max_distance: f32) -> Option<Vec3> {
        let height = self.height_at(origin.x, origin.z)?;
        let drop = origin.y - height;
        (drop >= 0.0 && drop <= max_distance).then(|| Vec3::new(origin.x, height, origin.z))
    }
}
