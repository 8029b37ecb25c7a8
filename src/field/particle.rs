use rand::Rng;

use crate::config::FieldConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
}

impl Particle {
    /// Random particle somewhere inside a `width` x `height` area
    pub fn spawn<R: Rng + ?Sized>(
        rng: &mut R,
        width: f32,
        height: f32,
        config: &FieldConfig,
    ) -> Self {
        Self {
            x: rng.gen::<f32>() * width,
            y: rng.gen::<f32>() * height,
            vx: (rng.gen::<f32>() - 0.5) * config.speed,
            vy: (rng.gen::<f32>() - 0.5) * config.speed,
            radius: config.radius_min + rng.gen::<f32>() * (config.radius_max - config.radius_min),
        }
    }

    /// Advance one tick inside [0, width] x [0, height]
    ///
    /// Velocity flips whenever the moved coordinate is outside its range, then
    /// the position is clamped. A particle sitting exactly on the edge keeps
    /// its velocity.
    #[inline]
    pub fn step(&mut self, width: f32, height: f32) {
        self.x += self.vx;
        self.y += self.vy;

        if self.x < 0.0 || self.x > width {
            self.vx = -self.vx;
        }
        if self.y < 0.0 || self.y > height {
            self.vy = -self.vy;
        }

        self.x = self.x.clamp(0.0, width);
        self.y = self.y.clamp(0.0, height);
    }

    #[inline]
    pub fn distance_to(&self, other: &Particle) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}
