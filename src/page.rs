//! Explicit entry point for the hosting environment
//!
//! Called once with everything the backdrop depends on. Nothing here reads
//! global state: the host decides reduced motion and viewport width and
//! passes them in.

use crate::animator::{Animator, Playback};
use crate::config::FieldConfig;
use crate::error::BackdropError;
use crate::scheduler::FrameScheduler;
use crate::surface::DrawableSurface;
use crate::visibility::VisibilityGate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageEnvironment {
    /// User asked for reduced motion: the animation is never started
    pub prefers_reduced_motion: bool,
    pub viewport_width: u32,
}

pub struct Page<S: DrawableSurface, F: FrameScheduler> {
    animator: Option<Animator<S, F>>,
    gate: VisibilityGate,
    motion_allowed: bool,
    loaded: bool,
}

impl<S: DrawableSurface, F: FrameScheduler> Page<S, F> {
    /// Bring the backdrop up
    ///
    /// `config` of None picks the default for the viewport width. Any failure
    /// is logged and swallowed: the page is marked loaded regardless.
    pub fn launch<B>(env: PageEnvironment, config: Option<FieldConfig>, build: B) -> Self
    where
        B: FnOnce() -> Result<(S, F), BackdropError>,
    {
        let config = config.unwrap_or_else(|| FieldConfig::for_viewport(env.viewport_width));

        let animator = match Self::init(config, build) {
            Ok(animator) => Some(animator),
            Err(e) => {
                log::error!("Backdrop initialization failed: {}", e);
                None
            }
        };

        if env.prefers_reduced_motion {
            log::info!("Reduced motion requested, particle animation will not run");
        }

        Self {
            animator,
            gate: VisibilityGate::default(),
            motion_allowed: !env.prefers_reduced_motion,
            loaded: true,
        }
    }

    fn init<B>(config: FieldConfig, build: B) -> Result<Animator<S, F>, BackdropError>
    where
        B: FnOnce() -> Result<(S, F), BackdropError>,
    {
        config.validate()?;
        let (surface, scheduler) = build()?;
        Ok(Animator::new(surface, scheduler, config))
    }

    /// Intersection ratio of the surface changed
    pub fn on_visibility(&mut self, ratio: f32) {
        if !self.motion_allowed {
            return;
        }
        if let Some(animator) = self.animator.as_mut() {
            self.gate.observe(ratio, animator);
        }
    }

    pub fn on_viewport_resize(&mut self) {
        if let Some(animator) = self.animator.as_mut() {
            animator.resize();
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn motion_allowed(&self) -> bool {
        self.motion_allowed
    }

    pub fn is_animating(&self) -> bool {
        self.animator.as_ref().is_some_and(|a| a.is_running())
    }

    pub fn animator(&self) -> Option<&Animator<S, F>> {
        self.animator.as_ref()
    }

    pub fn animator_mut(&mut self) -> Option<&mut Animator<S, F>> {
        self.animator.as_mut()
    }
}
