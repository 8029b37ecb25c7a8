//! Visibility observer adapter
//!
//! Turns intersection-ratio reports into start/stop calls so the backdrop
//! only burns frames while enough of it is on screen.

use crate::animator::Playback;

/// Fraction of the surface that must be visible for the animation to run
pub const DEFAULT_VISIBILITY_THRESHOLD: f32 = 0.1;

pub struct VisibilityGate {
    threshold: f32,
    visible: Option<bool>,
}

impl VisibilityGate {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            visible: None,
        }
    }

    /// Report the current intersection ratio (0.0 hidden .. 1.0 fully visible)
    pub fn observe<P: Playback + ?Sized>(&mut self, ratio: f32, target: &mut P) {
        let visible = ratio >= self.threshold;
        if self.visible != Some(visible) {
            log::debug!(
                "Backdrop {} (intersection ratio {:.2})",
                if visible { "visible" } else { "hidden" },
                ratio
            );
            self.visible = Some(visible);
        }

        if visible {
            target.start();
        } else {
            target.stop();
        }
    }

    /// Last reported state, None before the first report
    pub fn is_visible(&self) -> Option<bool> {
        self.visible
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Default for VisibilityGate {
    fn default() -> Self {
        Self::new(DEFAULT_VISIBILITY_THRESHOLD)
    }
}
