//! Field configuration
//!
//! Immutable for the session: the animator takes its own copy at construction
//! and never edits it. The host can only swap in a whole new one.

use crate::error::BackdropError;
use crate::ui::theme;

/// Viewports narrower than this get the compact particle count
pub const COMPACT_VIEWPORT_WIDTH: u32 = 768;
pub const COMPACT_PARTICLE_COUNT: usize = 30;

pub const DEFAULT_PARTICLE_COUNT: usize = 50;
pub const DEFAULT_MAX_DISTANCE: f32 = 150.0;
pub const DEFAULT_SPEED: f32 = 0.5;
/// Peak opacity of a connection line at distance 0
pub const DEFAULT_LINE_OPACITY: f32 = 0.15;

#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    pub particle_count: usize,
    /// Pairs at or beyond this distance (px) are not connected
    pub max_distance: f32,
    /// Velocity components are drawn from [-speed/2, speed/2] px per frame
    pub speed: f32,
    pub radius_min: f32,
    pub radius_max: f32,
    pub particle_colour: u32,
    pub line_colour: u32,
    pub line_opacity: f32,
    pub line_width: f32,
    pub background: u32,
    /// Fixed RNG seed; None seeds from entropy
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            max_distance: DEFAULT_MAX_DISTANCE,
            speed: DEFAULT_SPEED,
            radius_min: 1.0,
            radius_max: 3.0,
            particle_colour: theme::PARTICLE_FILL,
            line_colour: theme::CONNECTION_STROKE,
            line_opacity: DEFAULT_LINE_OPACITY,
            line_width: 1.0,
            background: theme::BACKGROUND,
            seed: None,
        }
    }
}

impl FieldConfig {
    /// Default configuration scaled for the given viewport width
    pub fn for_viewport(viewport_width: u32) -> Self {
        let mut config = Self::default();
        if viewport_width < COMPACT_VIEWPORT_WIDTH {
            config.particle_count = COMPACT_PARTICLE_COUNT;
        }
        config
    }

    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Lengths multiplied by a display scale factor
    ///
    /// Distances, speed, radii and line width are given in logical pixels;
    /// the host scales them to the physical pixels it draws in.
    pub fn scaled(mut self, factor: f32) -> Self {
        if !factor.is_finite() || factor <= 0.0 {
            return self;
        }
        self.max_distance *= factor;
        self.speed *= factor;
        self.radius_min *= factor;
        self.radius_max *= factor;
        self.line_width *= factor;
        self
    }

    pub fn validate(&self) -> Result<(), BackdropError> {
        if !self.max_distance.is_finite() || self.max_distance <= 0.0 {
            return Err(BackdropError::InvalidConfig(format!(
                "max_distance must be positive, got {}",
                self.max_distance
            )));
        }
        if !self.speed.is_finite() || self.speed < 0.0 {
            return Err(BackdropError::InvalidConfig(format!(
                "speed must be non-negative, got {}",
                self.speed
            )));
        }
        if !(self.radius_min >= 0.0 && self.radius_min <= self.radius_max)
            || !self.radius_max.is_finite()
        {
            return Err(BackdropError::InvalidConfig(format!(
                "radius range {}..={} is not valid",
                self.radius_min, self.radius_max
            )));
        }
        if !(0.0..=1.0).contains(&self.line_opacity) {
            return Err(BackdropError::InvalidConfig(format!(
                "line_opacity must be within 0..=1, got {}",
                self.line_opacity
            )));
        }
        Ok(())
    }
}
