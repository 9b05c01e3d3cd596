//! # Frame Driver
//!
//! Ticks a [`FrameLoop`] from a tokio interval until a shutdown future
//! resolves. Must run on a current-thread runtime: frame callbacks are not
//! `Send`.

use std::future::Future;

use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::{FrameLoop, FrameTime};

/// Supported frame rates.
pub const MIN_FRAME_RATE_HZ: u32 = 1;
/// Supported frame rates.
pub const MAX_FRAME_RATE_HZ: u32 = 1000;

/// Period of one frame at `rate_hz`, clamped to the supported range.
#[must_use]
pub fn frame_period(rate_hz: u32) -> Duration {
    let rate = rate_hz.clamp(MIN_FRAME_RATE_HZ, MAX_FRAME_RATE_HZ);
    Duration::from_micros(1_000_000 / u64::from(rate))
}

/// Runs frames at `rate_hz` until `shutdown` completes.
///
/// `after_frame` is called once every frame callback has run, which is where
/// a renderer reads the camera and cursor. Late ticks are skipped rather than
/// bunched up. Returns the number of frames run.
pub async fn drive<F, A>(frames: &mut FrameLoop, rate_hz: u32, shutdown: F, mut after_frame: A) -> u64
where
    F: Future<Output = ()>,
    A: FnMut(&FrameTime),
{
    let period = frame_period(rate_hz);
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tokio::pin!(shutdown);

    info!("Starting frame loop at {}Hz ({:?} per frame)", rate_hz, period);
    let start = Instant::now();
    let mut count = 0u64;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let time = frames.run_frame(start.elapsed());
                after_frame(&time);
                count += 1;
            }
            _ = &mut shutdown => {
                debug!("Frame loop shutdown requested");
                break;
            }
        }
    }

    info!("Frame loop stopped after {} frames", count);
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameScheduler;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_frame_period() {
        assert_eq!(frame_period(60), Duration::from_micros(16_666));
        assert_eq!(frame_period(250), Duration::from_millis(4));
        assert_eq!(frame_period(0), Duration::from_secs(1));
        assert_eq!(frame_period(5000), Duration::from_millis(1));
    }

    #[test]
    fn test_drive_runs_callbacks_until_shutdown() {
        let mut frames = FrameLoop::new();
        let ran = Rc::new(Cell::new(0u64));
        let seen = Rc::clone(&ran);
        frames.register_frame_callback(Box::new(move |_| seen.set(seen.get() + 1)));

        let mut observed = 0u64;
        let count = tokio_test::block_on(async {
            drive(
                &mut frames,
                200,
                tokio::time::sleep(Duration::from_millis(40)),
                |_| observed += 1,
            )
            .await
        });

        // The first tick fires immediately, so at least one frame runs.
        assert!(count >= 1);
        assert_eq!(ran.get(), count);
        assert_eq!(observed, count);
    }

    #[test]
    fn test_drive_with_immediate_shutdown_still_returns() {
        let mut frames = FrameLoop::new();
        let count = tokio_test::block_on(drive(&mut frames, 60, async {}, |_| {}));
        assert!(count <= 1);
    }
}
