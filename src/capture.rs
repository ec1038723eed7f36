/*
Copyright (c) 2026 ov7670-dcmi contributors
LICENSE: BSD3 (see LICENSE file)
*/

//! Capture-side abstraction for the synchronization peripheral and its DMA
//! engine. The driver only ever arms and halts transfers through this trait;
//! clock and pin bring-up of the hardware stays with the application.

/// Frame delivery policy for an armed capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Free-running: the peripheral re-arms itself after every frame.
    Continuous,
    /// One-shot: the peripheral delivers a single frame and stops re-arming.
    /// The driver does not observe completion; callers track it through the
    /// frame-event telemetry hook.
    Snapshot,
}

/// Interface to the video-capture peripheral / DMA pair.
///
/// Implemented once for the real hardware (e.g. the STM32 DCMI block plus a
/// DMA stream) and once as an in-memory double for tests.
pub trait CapturePeripheral {
    type Error;

    /// Arm a DMA-backed transfer of `length` half-words into `destination`.
    ///
    /// The peripheral must begin delivering pixel data asynchronously; the
    /// call returns as soon as the transfer is set up. Re-arming while a
    /// transfer is in flight is hardware-defined and not validated here.
    fn start(
        &mut self,
        mode: CaptureMode,
        destination: u32,
        length: u32,
    ) -> Result<(), Self::Error>;

    /// Halt the DMA transfer unconditionally, regardless of mode.
    ///
    /// Takes effect before the next frame boundary; there is no
    /// wait-for-completion contract.
    fn stop(&mut self) -> Result<(), Self::Error>;
}
