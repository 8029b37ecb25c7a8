//! Particle Field Animator
//!
//! Owns a drawable surface, a frame scheduler and a particle field. Each frame
//! clears the surface, advances the field, draws the connection lines, draws
//! the particles and, while running, asks for the next frame.
//!
//! The host calls `on_frame` with the handle it was given when the scheduled
//! refresh fires. Only the currently pending handle draws, so a cancelled or
//! stale callback can never produce output after `stop()`.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::FieldConfig;
use crate::debug_println;
use crate::field::ParticleField;
use crate::scheduler::{FrameHandle, FrameScheduler};
use crate::surface::{Canvas2d, DrawableSurface};

/// Start/stop control, implemented by anything a visibility gate can drive
pub trait Playback {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

pub struct Animator<S: DrawableSurface, F: FrameScheduler> {
    surface: S,
    scheduler: F,
    config: FieldConfig,
    rng: StdRng,
    /// None when the surface has no 2D context: the animator stays inert
    field: Option<ParticleField>,
    running: bool,
    pending: Option<FrameHandle>,
    frames_drawn: u64,
}

impl<S: DrawableSurface, F: FrameScheduler> Animator<S, F> {
    pub fn new(mut surface: S, scheduler: F, config: FieldConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let field = if surface.context_2d().is_some() {
            Some(ParticleField::empty(config.clone()))
        } else {
            log::warn!("2D drawing context unavailable, particle backdrop disabled");
            None
        };

        let mut animator = Self {
            surface,
            scheduler,
            config,
            rng,
            field,
            running: false,
            pending: None,
            frames_drawn: 0,
        };
        animator.resize();
        animator
    }

    /// Match the surface to its container and respawn every particle
    pub fn resize(&mut self) {
        let Some(field) = self.field.as_mut() else {
            return;
        };
        let (width, height) = self.surface.container_size();
        self.surface.set_size(width, height);
        field.regenerate(width as f32, height as f32, &mut self.rng);
        debug_println!(
            "Field resized to {}x{}, {} particles",
            width,
            height,
            field.len()
        );
    }

    /// Replace the configuration and respawn the field with it
    pub fn set_config(&mut self, config: FieldConfig) {
        if let Some(field) = self.field.as_mut() {
            *field = ParticleField::empty(config.clone());
        }
        self.config = config;
        self.resize();
    }

    /// Run the frame the scheduler just fired
    ///
    /// Returns true if something was drawn. Handles other than the pending
    /// one are ignored.
    pub fn on_frame(&mut self, handle: FrameHandle) -> bool {
        if self.pending != Some(handle) {
            debug_println!("Ignoring stale frame {}", handle.id());
            return false;
        }
        self.pending = None;

        if !self.draw_frame(true) {
            return false;
        }
        self.pending = Some(self.scheduler.request_frame());
        true
    }

    /// Paint the field once without moving it or scheduling anything
    pub fn draw_still(&mut self) -> bool {
        self.draw_frame(false)
    }

    fn draw_frame(&mut self, advance: bool) -> bool {
        let Some(field) = self.field.as_mut() else {
            return false;
        };
        let Some(canvas) = self.surface.context_2d() else {
            return false;
        };
        let config = &self.config;

        canvas.clear(config.background);
        if advance {
            field.update();
        }
        for link in field.connections() {
            canvas.stroke_line(
                link.from.0,
                link.from.1,
                link.to.0,
                link.to.1,
                config.line_width,
                config.line_colour,
                link.opacity,
            );
        }
        for p in field.particles() {
            canvas.fill_circle(p.x, p.y, p.radius, config.particle_colour);
        }

        self.frames_drawn += 1;
        true
    }

    pub fn is_inert(&self) -> bool {
        self.field.is_none()
    }

    pub fn field(&self) -> Option<&ParticleField> {
        self.field.as_ref()
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }
}

impl<S: DrawableSurface, F: FrameScheduler> Playback for Animator<S, F> {
    fn start(&mut self) {
        if self.running || self.field.is_none() {
            return;
        }
        self.running = true;
        if self.pending.is_none() {
            self.pending = Some(self.scheduler.request_frame());
        }
        log::debug!("Particle animation started");
    }

    fn stop(&mut self) {
        if !self.running && self.pending.is_none() {
            return;
        }
        self.running = false;
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        log::debug!("Particle animation stopped");
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::FrameClock;
    use std::time::{Duration, Instant};

    #[derive(Default)]
    struct CountingCanvas {
        clears: usize,
        circles: usize,
        lines: usize,
    }

    impl Canvas2d for CountingCanvas {
        fn clear(&mut self, _background: u32) {
            self.clears += 1;
        }
        fn fill_circle(&mut self, _x: f32, _y: f32, _radius: f32, _colour: u32) {
            self.circles += 1;
        }
        fn stroke_line(&mut self, _: f32, _: f32, _: f32, _: f32, _: f32, _: u32, _: f32) {
            self.lines += 1;
        }
    }

    struct TestSurface {
        container: (u32, u32),
        size: (u32, u32),
        canvas: Option<CountingCanvas>,
    }

    impl TestSurface {
        fn new(width: u32, height: u32) -> Self {
            Self {
                container: (width, height),
                size: (0, 0),
                canvas: Some(CountingCanvas::default()),
            }
        }

        fn broken() -> Self {
            Self {
                canvas: None,
                ..Self::new(300, 150)
            }
        }
    }

    impl DrawableSurface for TestSurface {
        type Canvas = CountingCanvas;

        fn container_size(&self) -> (u32, u32) {
            self.container
        }
        fn set_size(&mut self, width: u32, height: u32) {
            self.size = (width, height);
        }
        fn context_2d(&mut self) -> Option<&mut CountingCanvas> {
            self.canvas.as_mut()
        }
    }

    fn animator(width: u32, height: u32) -> Animator<TestSurface, FrameClock> {
        let config = FieldConfig::default().with_seed(11);
        Animator::new(TestSurface::new(width, height), FrameClock::new(Duration::ZERO), config)
    }

    fn fire(animator: &mut Animator<TestSurface, FrameClock>) -> bool {
        let due = animator.scheduler_mut().take_due(Instant::now());
        match due {
            Some(handle) => animator.on_frame(handle),
            None => false,
        }
    }

    #[test]
    fn test_construction_sizes_surface() {
        let animator = animator(640, 480);
        assert_eq!(animator.surface().size, (640, 480));
        let field = animator.field().unwrap();
        assert_eq!(field.len(), 50);
        assert_eq!(field.size(), (640.0, 480.0));
        assert!(!animator.is_running());
    }

    #[test]
    fn test_construction_spawns_once() {
        let animator = animator(640, 480);

        // Same seed, one spawn pass: the animator's field matches a fresh one
        let mut rng = StdRng::seed_from_u64(11);
        let config = FieldConfig::default().with_seed(11);
        let expected = ParticleField::new(640.0, 480.0, config, &mut rng);
        assert_eq!(animator.field().unwrap().particles(), expected.particles());
    }

    #[test]
    fn test_frame_draws_everything() {
        let mut animator = animator(640, 480);
        animator.start();
        assert!(fire(&mut animator));

        let canvas = animator.surface.canvas.as_ref().unwrap();
        assert_eq!(canvas.clears, 1);
        assert_eq!(canvas.circles, 50);
        assert!(canvas.lines <= 50 * 49 / 2);
        // The loop re-arms itself
        assert!(animator.scheduler().is_pending());
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut animator = animator(200, 200);
        animator.start();
        let first = animator.pending_frame();
        animator.start();
        assert_eq!(animator.pending_frame(), first);

        assert!(fire(&mut animator));
        // Exactly one frame was due, so exactly one loop is alive
        assert!(animator.scheduler_mut().take_due(Instant::now()).is_some());
        assert!(animator.scheduler_mut().take_due(Instant::now()).is_none());
    }

    #[test]
    fn test_stop_cancels_pending_frame() {
        let mut animator = animator(200, 200);
        animator.start();
        fire(&mut animator);
        let stale = animator.pending_frame().unwrap();

        animator.stop();
        assert!(!animator.scheduler().is_pending());

        // Even if the host fires the old handle, nothing is drawn
        assert!(!animator.on_frame(stale));
        for _ in 0..10 {
            assert!(!fire(&mut animator));
        }
        assert_eq!(animator.frames_drawn(), 1);
    }

    #[test]
    fn test_inert_without_context() {
        let mut animator = Animator::new(
            TestSurface::broken(),
            FrameClock::new(Duration::ZERO),
            FieldConfig::default(),
        );
        assert!(animator.is_inert());
        assert!(animator.field().is_none());

        animator.resize();
        animator.start();
        assert!(!animator.is_running());
        assert!(!animator.scheduler().is_pending());
        assert!(!animator.draw_still());
        assert_eq!(animator.surface().size, (0, 0));
    }

    #[test]
    fn test_resize_regenerates_field() {
        let mut animator = animator(1024, 768);
        animator.surface_mut().container = (320, 100);
        animator.resize();

        assert_eq!(animator.surface().size, (320, 100));
        let field = animator.field().unwrap();
        assert_eq!(field.len(), 50);
        assert!(field.particles().iter().all(|p| p.x <= 320.0 && p.y <= 100.0));
    }

    #[test]
    fn test_set_config_respawns_with_new_settings() {
        let mut animator = animator(400, 300);
        let config = FieldConfig::default().with_seed(11).scaled(2.0);
        animator.set_config(config.clone());

        assert_eq!(animator.config(), &config);
        let field = animator.field().unwrap();
        assert_eq!(field.config(), &config);
        assert_eq!(field.size(), (400.0, 300.0));
        assert!(field.particles().iter().all(|p| p.radius >= 2.0 && p.radius <= 6.0));
    }

    #[test]
    fn test_draw_still_does_not_advance() {
        let mut animator = animator(400, 300);
        let before: Vec<_> = animator.field().unwrap().particles().to_vec();

        assert!(animator.draw_still());

        assert_eq!(animator.field().unwrap().particles(), &before[..]);
        assert!(!animator.scheduler().is_pending());
        assert_eq!(animator.surface.canvas.as_ref().unwrap().circles, 50);
    }
}
