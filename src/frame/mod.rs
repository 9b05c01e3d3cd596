//! # Frame Scheduling Module
//!
//! Explicit frame-callback scheduling for the input layer.
//!
//! Components never wire themselves into a render loop implicitly. They
//! expose a plain per-frame function ([`FrameStep`]) and something that owns
//! them registers it with a [`FrameScheduler`], keeping the returned
//! [`FrameHandle`] so it can cancel the callback on teardown.
//!
//! [`FrameLoop`] is the single-threaded scheduler used by the runner: it
//! computes the frame delta and invokes callbacks in registration order.
//! [`driver::drive`] ticks a `FrameLoop` from a tokio interval.

pub mod driver;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tracing::debug;

/// Largest frame delta handed to callbacks, in seconds.
///
/// Longer stalls (debugger pauses, suspended laptops) are treated as a
/// single 100 ms frame.
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Timing information for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Time since the loop started.
    pub now: Duration,
    /// Seconds since the previous frame, clamped to [`MAX_FRAME_DELTA`].
    pub delta: f32,
    /// Frame counter, starting at 0.
    pub frame: u64,
}

/// Identifies a registered frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Boxed per-frame callback.
pub type FrameCallback = Box<dyn FnMut(&FrameTime)>;

/// Registers and cancels per-frame callbacks.
#[cfg_attr(test, mockall::automock)]
pub trait FrameScheduler {
    /// Registers `callback` to run once per frame until cancelled.
    fn register_frame_callback(&mut self, callback: FrameCallback) -> FrameHandle;

    /// Cancels a callback. Returns false if the handle was not registered.
    fn cancel_frame_callback(&mut self, handle: FrameHandle) -> bool;
}

/// A component with a per-frame step.
pub trait FrameStep {
    fn on_frame(&mut self, time: &FrameTime);
}

/// Registers a shared [`FrameStep`] with `scheduler`.
pub fn schedule<T>(scheduler: &mut dyn FrameScheduler, task: &Rc<RefCell<T>>) -> FrameHandle
where
    T: FrameStep + 'static,
{
    let task = Rc::clone(task);
    scheduler.register_frame_callback(Box::new(move |time| task.borrow_mut().on_frame(time)))
}

/// Single-threaded frame scheduler.
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use std::time::Duration;
/// use skyline_input::frame::{FrameLoop, FrameScheduler};
///
/// let mut frames = FrameLoop::new();
/// let count = Rc::new(Cell::new(0));
/// let seen = Rc::clone(&count);
/// let handle = frames.register_frame_callback(Box::new(move |_| seen.set(seen.get() + 1)));
///
/// frames.run_frame(Duration::from_millis(0));
/// frames.run_frame(Duration::from_millis(16));
/// assert_eq!(count.get(), 2);
///
/// frames.cancel_frame_callback(handle);
/// frames.run_frame(Duration::from_millis(32));
/// assert_eq!(count.get(), 2);
/// ```
#[derive(Default)]
pub struct FrameLoop {
    callbacks: Vec<(FrameHandle, FrameCallback)>,
    next_id: u64,
    last: Option<Duration>,
    frame: u64,
}

impl std::fmt::Debug for FrameLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLoop")
            .field("callbacks", &self.callbacks.len())
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl FrameLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Runs every registered callback for the frame at `now`.
    ///
    /// The first frame has a zero delta.
    pub fn run_frame(&mut self, now: Duration) -> FrameTime {
        let delta = self
            .last
            .map_or(0.0, |last| now.saturating_sub(last).as_secs_f32())
            .min(MAX_FRAME_DELTA);
        self.last = Some(now);

        let time = FrameTime {
            now,
            delta,
            frame: self.frame,
        };
        self.frame += 1;

        for (_, callback) in &mut self.callbacks {
            callback(&time);
        }
        time
    }
}

impl FrameScheduler for FrameLoop {
    fn register_frame_callback(&mut self, callback: FrameCallback) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id += 1;
        self.callbacks.push((handle, callback));
        debug!("Registered frame callback {}", handle.0);
        handle
    }

    fn cancel_frame_callback(&mut self, handle: FrameHandle) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(registered, _)| *registered != handle);
        let removed = self.callbacks.len() != before;
        if removed {
            debug!("Cancelled frame callback {}", handle.0);
        }
        removed
    }
}
