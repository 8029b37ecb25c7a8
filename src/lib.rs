// Global debug flag - can be toggled at runtime with Ctrl+D (feature "debug-keys")
use std::sync::atomic::AtomicBool;
pub static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

// Debug print macro - only logs if DEBUG_ENABLED is true
// Compiled out entirely in release builds
#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_println {
    ($($arg:tt)*) => {
        if $crate::DEBUG_ENABLED.load(std::sync::atomic::Ordering::Relaxed) {
            log::debug!($($arg)*);
        }
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_println {
    ($($arg:tt)*) => {};
}

/// Initialize logging - call early in main()
///
/// Defaults to `info`; `RUST_LOG` overrides. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}

pub mod animator;
pub mod config;
pub mod error;
pub mod field;
pub mod page;
pub mod scheduler;
pub mod surface;
pub mod ui;
pub mod visibility;

// Re-export commonly used items from submodules
pub use animator::{Animator, Playback};
pub use config::FieldConfig;
pub use error::BackdropError;
pub use field::{line_opacity, Connection, Particle, ParticleField};
pub use page::{Page, PageEnvironment};
pub use scheduler::{FrameClock, FrameHandle, FrameScheduler};
pub use surface::{Canvas2d, DrawableSurface};
pub use visibility::VisibilityGate;
