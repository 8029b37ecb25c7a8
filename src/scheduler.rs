//! Display refresh callbacks
//!
//! The animator asks for "one more frame" and may cancel that request before
//! it fires. `FrameClock` is the single-slot implementation the desktop host
//! drives from its event loop.

use std::time::{Duration, Instant};

/// Opaque id of a requested frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    /// For scheduler implementations minting their own ids
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

pub trait FrameScheduler {
    /// Ask for a callback on the next display refresh
    fn request_frame(&mut self) -> FrameHandle;

    /// Drop a request that has not fired yet. Unknown handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Default frame interval when the monitor refresh rate is unknown (60 Hz)
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub struct FrameClock {
    interval: Duration,
    next_id: u64,
    pending: Option<(FrameHandle, Instant)>,
}

impl FrameClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_id: 0,
            pending: None,
        }
    }

    /// Clock paced to a monitor refresh rate given in millihertz
    ///
    /// Floors the interval so 60Hz -> 16ms (slightly overshoots to avoid frame skips).
    /// Never below 1ms.
    pub fn from_refresh_millihertz(refresh_millihertz: Option<u32>) -> Self {
        let interval = match refresh_millihertz.map(|mhz| mhz / 1000) {
            Some(hz) if hz > 0 => Duration::from_millis((1000 / hz).max(1) as u64),
            _ => DEFAULT_FRAME_INTERVAL,
        };
        Self::new(interval)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the pending frame is due, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, at)| at)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Hand out the pending frame if its deadline has passed
    pub fn take_due(&mut self, now: Instant) -> Option<FrameHandle> {
        match self.pending {
            Some((handle, at)) if now >= at => {
                self.pending = None;
                Some(handle)
            }
            _ => None,
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

impl FrameScheduler for FrameClock {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id = self.next_id.wrapping_add(1);
        let handle = FrameHandle(self.next_id);
        self.pending = Some((handle, Instant::now() + self.interval));
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if matches!(self.pending, Some((pending, _)) if pending == handle) {
            self.pending = None;
        }
    }
}
