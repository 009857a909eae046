//! Frame-driven render loop.
//!
//! A [`RenderSession`] never owns a timer. It asks a [`FrameScheduler`] for
//! the next frame, and the host calls [`RenderSession::on_frame`] with the
//! handle it was given and the frame timestamp. Each frame re-requests the
//! next one, so the chain lives exactly as long as the session.

use log::{debug, info};

use crate::config::{DEFAULT_WIDTH, SURFACE_HEIGHT, SimParams};
use crate::render::{self, FrameStats};
use crate::surface::Surface;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host-side per-frame callback registry.
pub trait FrameScheduler {
    /// Register interest in the next displayed frame.
    fn request_frame(&mut self) -> FrameHandle;
    /// Drop a pending request. Unknown handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
    /// The request that will fire next, if any.
    fn pending(&self) -> Option<FrameHandle>;
}

/// Scheduler driven by hand: the caller decides when a frame fires and with
/// what timestamp. Useful for tests and hosts that own their own loop.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: Option<FrameHandle>,
    /// Total requests ever made.
    pub requested: u64,
    pub cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the pending request, returning the handle to pass to
    /// `on_frame`.
    pub fn fire(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        self.requested += 1;
        let h = FrameHandle(self.next_id);
        self.pending = Some(h);
        h
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
            self.cancelled += 1;
        }
    }

    fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }
}

/// Manual scheduler that also hands out evenly spaced timestamps, for
/// rendering a fixed-rate frame sequence offline.
#[derive(Debug)]
pub struct FixedRateScheduler {
    inner: ManualScheduler,
    frame_ms: f64,
    now_ms: f64,
}

impl FixedRateScheduler {
    pub fn new(fps: f64, start_ms: f64) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { 60.0 };
        Self {
            inner: ManualScheduler::new(),
            frame_ms: 1000.0 / fps,
            now_ms: start_ms,
        }
    }

    /// Fire the pending frame and advance the clock by one frame interval.
    pub fn tick(&mut self) -> Option<(FrameHandle, f64)> {
        let h = self.inner.fire()?;
        let ts = self.now_ms;
        self.now_ms += self.frame_ms;
        Some((h, ts))
    }
}

impl FrameScheduler for FixedRateScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.inner.request_frame()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.inner.cancel_frame(handle)
    }

    fn pending(&self) -> Option<FrameHandle> {
        self.inner.pending()
    }
}

/// Session start time. Set lazily on the first frame, cleared on stop.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnimationClock {
    pub start_ms: Option<f64>,
}

impl AnimationClock {
    /// Seconds since the first observed timestamp. The first call pins the
    /// start and returns 0.
    pub fn elapsed(&mut self, timestamp_ms: f64) -> f64 {
        let start = *self.start_ms.get_or_insert(timestamp_ms);
        (timestamp_ms - start) / 1000.0
    }

    pub fn reset(&mut self) {
        self.start_ms = None;
    }
}

/// One rendering session of the wave lab: a surface, the parameters read
/// each frame, a clock and the scheduler driving it.
pub struct RenderSession<S: FrameScheduler> {
    scheduler: S,
    surface: Option<Surface>,
    params: SimParams,
    clock: AnimationClock,
    pending: Option<FrameHandle>,
    frames: u64,
    last: Option<FrameStats>,
}

impl<S: FrameScheduler> RenderSession<S> {
    pub fn new(scheduler: S, params: SimParams) -> Self {
        Self {
            scheduler,
            surface: None,
            params,
            clock: AnimationClock::default(),
            pending: None,
            frames: 0,
            last: None,
        }
    }

    /// Acquire a surface sized to the container and start the frame chain.
    /// A zero width falls back to the default width. No-op if running.
    pub fn start(&mut self, css_width: u32, dpr: f64) {
        if self.is_running() {
            return;
        }
        let width = if css_width == 0 { DEFAULT_WIDTH } else { css_width };
        self.surface = Some(Surface::new(width, SURFACE_HEIGHT, dpr));
        self.clock.reset();
        self.pending = Some(self.scheduler.request_frame());
        info!("render session started ({}x{} css)", width, SURFACE_HEIGHT);
    }

    /// Deregister the pending frame and forget the clock.
    pub fn stop(&mut self) {
        if let Some(h) = self.pending.take() {
            self.scheduler.cancel_frame(h);
        }
        self.clock.reset();
        info!("render session stopped after {} frames", self.frames);
    }

    /// Host drops the surface (e.g. view torn down mid-frame). The next
    /// frame ends the chain.
    pub fn detach_surface(&mut self) {
        self.surface = None;
    }

    /// New container size. The clock keeps running.
    pub fn resize(&mut self, css_width: u32, dpr: f64) {
        if let Some(s) = self.surface.as_mut() {
            s.resize(css_width, SURFACE_HEIGHT, dpr);
            debug!("surface resized to {}x{} px", s.w, s.h);
        }
    }

    /// Frame callback. Stale handles are ignored so a leaked chain can never
    /// draw alongside the live one.
    pub fn on_frame(&mut self, handle: FrameHandle, timestamp_ms: f64) -> Option<FrameStats> {
        if self.pending != Some(handle) {
            debug!("ignoring stale frame {:?}", handle);
            return None;
        }
        self.pending = None;

        let surface = match self.surface.as_mut() {
            Some(s) => s,
            None => {
                debug!("surface gone, ending frame chain");
                self.clock.reset();
                return None;
            }
        };

        let elapsed = self.clock.elapsed(timestamp_ms);
        let stats = render::draw_frame(surface, &self.params, elapsed);
        self.frames += 1;
        self.last = Some(stats);

        self.pending = Some(self.scheduler.request_frame());
        Some(stats)
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// Parameter edits land here and show up on the next frame.
    pub fn params_mut(&mut self) -> &mut SimParams {
        &mut self.params
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn clock(&self) -> AnimationClock {
        self.clock
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_stats(&self) -> Option<FrameStats> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WaveMode;

    fn session() -> RenderSession<ManualScheduler> {
        RenderSession::new(ManualScheduler::new(), SimParams::default())
    }

    fn step(s: &mut RenderSession<ManualScheduler>, ts: f64) -> Option<FrameStats> {
        let h = s.scheduler_mut().fire()?;
        s.on_frame(h, ts)
    }

    #[test]
    fn clock_starts_on_first_frame() {
        let mut s = session();
        s.start(400, 1.0);
        assert_eq!(s.clock().start_ms, None);
        let a = step(&mut s, 5000.0).unwrap();
        assert_eq!(a.t, 0.0);
        let b = step(&mut s, 5500.0).unwrap();
        assert!((b.t - 0.5).abs() < 1e-12);
        assert_eq!(s.clock().start_ms, Some(5000.0));
    }

    #[test]
    fn motion_depends_on_time_not_frame_count() {
        let mut fast = session();
        fast.start(400, 1.0);
        let mut slow = session();
        slow.start(400, 1.0);
        let mut last_fast = None;
        for i in 0..=60 {
            last_fast = step(&mut fast, i as f64 * 1000.0 / 60.0);
        }
        step(&mut slow, 0.0);
        let last_slow = step(&mut slow, 1000.0);
        assert!((last_fast.unwrap().t - last_slow.unwrap().t).abs() < 1e-9);
        assert_eq!(fast.surface().unwrap().data, slow.surface().unwrap().data);
    }

    #[test]
    fn each_frame_requests_the_next() {
        let mut s = session();
        s.start(200, 1.0);
        for i in 0..5 {
            step(&mut s, i as f64 * 16.0);
        }
        assert_eq!(s.frames(), 5);
        assert_eq!(s.scheduler().requested, 6);
        assert!(s.scheduler().pending().is_some());
    }

    #[test]
    fn stop_cancels_pending_and_resets_clock() {
        let mut s = session();
        s.start(200, 1.0);
        step(&mut s, 100.0);
        s.stop();
        assert!(!s.is_running());
        assert_eq!(s.scheduler().pending(), None);
        assert_eq!(s.scheduler().cancelled, 1);
        assert_eq!(s.clock().start_ms, None);

        // a fresh session starts its own clock at zero
        s.start(200, 1.0);
        let stats = step(&mut s, 9000.0).unwrap();
        assert_eq!(stats.t, 0.0);
    }

    #[test]
    fn stale_handles_are_ignored() {
        let mut s = session();
        s.start(200, 1.0);
        let old = s.scheduler_mut().fire().unwrap();
        s.stop();
        s.start(200, 1.0);
        assert!(s.on_frame(old, 0.0).is_none());
        assert!(s.is_running());
        assert_eq!(s.frames(), 0);
    }

    #[test]
    fn start_twice_keeps_one_chain() {
        let mut s = session();
        s.start(200, 1.0);
        s.start(200, 1.0);
        assert_eq!(s.scheduler().requested, 1);
    }

    #[test]
    fn detached_surface_ends_chain_silently() {
        let mut s = session();
        s.start(200, 1.0);
        step(&mut s, 0.0);
        s.detach_surface();
        assert!(step(&mut s, 16.0).is_none());
        assert!(!s.is_running());
        assert_eq!(s.scheduler().pending(), None);
    }

    #[test]
    fn resize_keeps_clock() {
        let mut s = session();
        s.start(200, 1.0);
        step(&mut s, 1000.0);
        s.resize(600, 2.0);
        assert_eq!(s.surface().unwrap().w, 1200);
        let stats = step(&mut s, 2000.0).unwrap();
        assert!((stats.t - 1.0).abs() < 1e-12);
        assert_eq!(stats.samples, 601);
    }

    #[test]
    fn parameter_edits_apply_next_frame() {
        let mut s = session();
        s.start(200, 1.0);
        step(&mut s, 0.0);
        s.params_mut().render.mode = WaveMode::Interference;
        let stats = step(&mut s, 16.0).unwrap();
        assert_eq!(stats.mode, WaveMode::Interference);
        assert_eq!(stats.paths, 3);
    }

    #[test]
    fn zero_width_falls_back_to_default() {
        let mut s = session();
        s.start(0, 1.0);
        assert_eq!(s.surface().unwrap().css_width(), DEFAULT_WIDTH);
    }

    #[test]
    fn fixed_rate_scheduler_spaces_timestamps() {
        let mut s = RenderSession::new(FixedRateScheduler::new(50.0, 0.0), SimParams::default());
        s.start(100, 1.0);
        let mut stamps = Vec::new();
        for _ in 0..3 {
            let (h, ts) = s.scheduler_mut().tick().unwrap();
            stamps.push(ts);
            s.on_frame(h, ts);
        }
        assert_eq!(stamps, vec![0.0, 20.0, 40.0]);
    }
}
