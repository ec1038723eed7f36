/*
Copyright (c) 2026 ov7670-dcmi contributors
LICENSE: BSD3 (see LICENSE file)
*/

//! Interrupt-fed capture timing telemetry.
//!
//! The capture peripheral raises frame, line, and vsync events; the matching
//! `on_*` handlers here stamp those events into fixed-capacity arrays for
//! later inspection of capture cadence. Handlers are meant to run in
//! interrupt context: they take the current tick as a parameter, never fail,
//! never block, and never allocate. Application code reads the arrays back
//! through the accessors between capture sessions.
//!
//! The recorder touches no driver state and the driver touches no telemetry
//! state, so the only cross-context sharing is whatever cell the application
//! wraps this struct in.

/// Capacity of the frame, line, and vsync timestamp arrays.
pub const EVENT_SLOTS: usize = 30;

/// Capacity of the early frame-rate sample array.
pub const RATE_SLOTS: usize = 10;

/// Bounded event-timestamp recorder.
///
/// The frame counter keeps counting past [`EVENT_SLOTS`]; the arrays simply
/// stop accepting writes. That "counter outruns the arrays" behavior is the
/// contract, not an accident: the counter doubles as a total-frames figure
/// while the arrays only hold the session's first samples.
#[derive(Debug)]
pub struct Telemetry {
    frame_count: u16,
    frame_ticks: [u32; EVENT_SLOTS],
    line_ticks: [u32; EVENT_SLOTS],
    vsync_ticks: [u32; EVENT_SLOTS],
    rate_ticks: [u32; RATE_SLOTS],
}

impl Telemetry {
    pub const fn new() -> Self {
        Self {
            frame_count: 0,
            frame_ticks: [0; EVENT_SLOTS],
            line_ticks: [0; EVENT_SLOTS],
            vsync_ticks: [0; EVENT_SLOTS],
            rate_ticks: [0; RATE_SLOTS],
        }
    }

    /// Frame-complete hook.
    ///
    /// Stamps `now` into the next frame slot (and, for the first
    /// [`RATE_SLOTS`] frames, the frame-rate slot), then increments the frame
    /// counter. The counter saturates rather than wrapping.
    pub fn on_frame(&mut self, now: u32) {
        let n = self.frame_count as usize;
        if n < EVENT_SLOTS {
            self.frame_ticks[n] = now;
        }
        if n < RATE_SLOTS {
            self.rate_ticks[n] = now;
        }
        self.frame_count = self.frame_count.saturating_add(1);
    }

    /// Line-event hook; stamps `now` against the frame the line belongs to.
    pub fn on_line(&mut self, now: u32) {
        let n = self.frame_count as usize;
        if n < EVENT_SLOTS {
            self.line_ticks[n] = now;
        }
    }

    /// Vsync-event hook; same indexing policy as [`Telemetry::on_line`].
    pub fn on_vsync(&mut self, now: u32) {
        let n = self.frame_count as usize;
        if n < EVENT_SLOTS {
            self.vsync_ticks[n] = now;
        }
    }

    /// Total frames seen (may exceed the array capacities).
    pub fn frame_count(&self) -> u16 {
        self.frame_count
    }

    pub fn frame_ticks(&self) -> &[u32] {
        &self.frame_ticks
    }

    pub fn line_ticks(&self) -> &[u32] {
        &self.line_ticks
    }

    pub fn vsync_ticks(&self) -> &[u32] {
        &self.vsync_ticks
    }

    pub fn rate_ticks(&self) -> &[u32] {
        &self.rate_ticks
    }

    /// Clears all counters and stamps for a new capture session.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_counter_outruns_arrays() {
        let mut t = Telemetry::new();
        for i in 0..35u32 {
            t.on_frame(1000 + i);
        }
        assert_eq!(t.frame_count(), 35);
        // First 30 frame slots stamped, first 10 rate slots stamped
        assert_eq!(t.frame_ticks()[0], 1000);
        assert_eq!(t.frame_ticks()[EVENT_SLOTS - 1], 1000 + 29);
        assert_eq!(t.rate_ticks()[RATE_SLOTS - 1], 1000 + 9);
    }

    #[test]
    fn line_and_vsync_index_by_frame() {
        let mut t = Telemetry::new();
        t.on_vsync(5);
        t.on_line(7);
        t.on_frame(10);
        t.on_vsync(15);
        t.on_line(17);
        assert_eq!(t.vsync_ticks()[0], 5);
        assert_eq!(t.line_ticks()[0], 7);
        assert_eq!(t.vsync_ticks()[1], 15);
        assert_eq!(t.line_ticks()[1], 17);
    }

    #[test]
    fn line_events_ignored_past_capacity() {
        let mut t = Telemetry::new();
        for _ in 0..EVENT_SLOTS as u32 {
            t.on_frame(0);
        }
        t.on_line(99);
        t.on_vsync(99);
        assert!(t.line_ticks().iter().all(|&tick| tick == 0));
        assert!(t.vsync_ticks().iter().all(|&tick| tick == 0));
    }

    #[test]
    fn reset_clears_session() {
        let mut t = Telemetry::new();
        t.on_frame(42);
        t.reset();
        assert_eq!(t.frame_count(), 0);
        assert_eq!(t.frame_ticks()[0], 0);
    }
}
