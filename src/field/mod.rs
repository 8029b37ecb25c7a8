//! The particle set and its per-frame math
//!
//! Pure data: no drawing, no scheduling. The animator owns a field and turns
//! its particles and connections into canvas calls.

mod particle;

pub use particle::Particle;

use rand::Rng;

use crate::config::FieldConfig;

/// A line between two particles that are close enough to be linked
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub from: (f32, f32),
    pub to: (f32, f32),
    pub opacity: f32,
}

/// Opacity of a connection line at `distance`
///
/// Falls linearly from `factor` at distance 0 to zero at `max_distance`.
/// Returns None when the pair is too far apart to connect.
#[inline]
pub fn line_opacity(distance: f32, max_distance: f32, factor: f32) -> Option<f32> {
    if distance < max_distance {
        Some(factor * (1.0 - distance / max_distance))
    } else {
        None
    }
}

pub struct ParticleField {
    particles: Vec<Particle>,
    width: f32,
    height: f32,
    config: FieldConfig,
}

impl ParticleField {
    pub fn new<R: Rng + ?Sized>(width: f32, height: f32, config: FieldConfig, rng: &mut R) -> Self {
        let mut field = Self::empty(config);
        field.regenerate(width, height, rng);
        field
    }

    /// Field with no particles and no area; `regenerate` fills it
    pub fn empty(config: FieldConfig) -> Self {
        Self {
            particles: Vec::with_capacity(config.particle_count),
            width: 0.0,
            height: 0.0,
            config,
        }
    }

    /// Throw away every particle and spawn a fresh set at the new size
    pub fn regenerate<R: Rng + ?Sized>(&mut self, width: f32, height: f32, rng: &mut R) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.particles.clear();
        for _ in 0..self.config.particle_count {
            self.particles
                .push(Particle::spawn(rng, self.width, self.height, &self.config));
        }
    }

    pub fn update(&mut self) {
        let (width, height) = (self.width, self.height);
        for particle in &mut self.particles {
            particle.step(width, height);
        }
    }

    /// Every unordered pair closer than the configured max distance
    ///
    /// O(n^2): 1225 pair checks at the default 50 particles.
    pub fn connections(&self) -> impl Iterator<Item = Connection> + '_ {
        let max_distance = self.config.max_distance;
        let factor = self.config.line_opacity;
        self.particles.iter().enumerate().flat_map(move |(i, a)| {
            self.particles[i + 1..].iter().filter_map(move |b| {
                line_opacity(a.distance_to(b), max_distance, factor).map(|opacity| Connection {
                    from: (a.x, a.y),
                    to: (b.x, b.y),
                    opacity,
                })
            })
        })
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn particles_mut(&mut self) -> &mut Vec<Particle> {
        &mut self.particles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn still(x: f32, y: f32) -> Particle {
        Particle {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            radius: 1.0,
        }
    }

    #[test]
    fn test_positions_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        for count in [0, 1, 2, 50, 200] {
            // Fast particles so the edges get hit constantly
            let mut config = FieldConfig::default().with_particle_count(count);
            config.speed = 40.0;
            let mut field = ParticleField::new(64.0, 48.0, config, &mut rng);

            for _ in 0..1000 {
                field.update();
                for p in field.particles() {
                    assert!((0.0..=64.0).contains(&p.x), "x out of bounds: {}", p.x);
                    assert!((0.0..=48.0).contains(&p.y), "y out of bounds: {}", p.y);
                }
            }
            assert_eq!(field.len(), count);
        }
    }

    #[test]
    fn test_regenerate_at_new_size() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = ParticleField::new(1920.0, 1080.0, FieldConfig::default(), &mut rng);

        field.regenerate(300.0, 120.0, &mut rng);

        assert_eq!(field.len(), 50);
        assert_eq!(field.size(), (300.0, 120.0));
        for p in field.particles() {
            assert!(p.x <= 300.0 && p.y <= 120.0);
        }
    }

    #[test]
    fn test_negative_size_treated_as_empty_area() {
        let mut rng = StdRng::seed_from_u64(3);
        let field = ParticleField::new(-10.0, -5.0, FieldConfig::default(), &mut rng);
        assert_eq!(field.size(), (0.0, 0.0));
        assert!(field.particles().iter().all(|p| p.x == 0.0 && p.y == 0.0));
    }

    #[test]
    fn test_line_opacity() {
        assert_eq!(line_opacity(0.0, 150.0, 0.15), Some(0.15));
        let half = line_opacity(75.0, 150.0, 0.15).unwrap();
        assert!((half - 0.075).abs() < 1e-6);
        assert_eq!(line_opacity(150.0, 150.0, 0.15), None);
        assert_eq!(line_opacity(151.0, 150.0, 0.15), None);
    }

    #[test]
    fn test_connections_respect_max_distance() {
        let mut rng = StdRng::seed_from_u64(0);
        let config = FieldConfig::default().with_particle_count(0).with_max_distance(100.0);
        let mut field = ParticleField::new(500.0, 500.0, config, &mut rng);
        field
            .particles_mut()
            .extend([still(0.0, 0.0), still(30.0, 40.0), still(400.0, 400.0), still(400.0, 500.0)]);

        let links: Vec<Connection> = field.connections().collect();

        // The last pair sits exactly 100px apart and must not connect
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].from, (0.0, 0.0));
        assert_eq!(links[0].to, (30.0, 40.0));
        assert!((links[0].opacity - 0.075).abs() < 1e-6);
    }

    #[test]
    fn test_connections_cover_every_pair_once() {
        let mut rng = StdRng::seed_from_u64(9);
        // Everything within range of everything else
        let config = FieldConfig::default().with_max_distance(10_000.0);
        let field = ParticleField::new(800.0, 600.0, config, &mut rng);

        assert_eq!(field.connections().count(), 50 * 49 / 2);
    }
}
