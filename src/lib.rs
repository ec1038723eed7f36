/*
Copyright (c) 2026 ov7670-dcmi contributors
LICENSE: BSD3 (see LICENSE file)
*/
#![cfg_attr(not(test), no_std)]

//! Configuration and capture-control driver for the OmniVision OV7670 image sensor
//! This imaging sensor has multiple interfaces:
//! - Two-wire SCCB for configuration registers (i2c-compatible)
//! - parallel pixel data out (dout)
//! - pixel out sync (vsync, href, pix clock)
//! This driver programs the SCCB interface and arms/halts the DMA-backed
//! capture peripheral that drains the parallel interface into memory. Pixel
//! data itself never passes through this crate.
//!
//! All configuration entry points are synchronous, blocking, and must be
//! serialized by the caller; the bus handle has no internal locking. The only
//! interrupt-context code is the [`telemetry::Telemetry`] recorder, which
//! shares no state with the driver.

#[cfg(feature = "rttdebug")]
use panic_rtt_core::rprintln;

pub mod capture;
pub mod regs;
pub mod telemetry;

pub use capture::{CaptureMode, CapturePeripheral};

use embedded_hal::blocking::delay::DelayMs;
use regs::PllMultiplier;

/// Errors in this crate
#[derive(Debug)]
pub enum Error<CommE, CapE> {
    /// Sensor communication error (bus timeout or NACK surface here)
    Comm(CommE),

    /// Capture peripheral refused to arm or halt
    Capture(CapE),
}

/// The sensor answers at write address 0x42 on the wire; embedded-hal
/// transactions take the 7-bit form.
pub const DEFAULT_SCCB_ADDRESS: u8 = SCCB_WRITE_ADDRESS >> 1;

const SCCB_WRITE_ADDRESS: u8 = 0x42;

/// Returned by [`Ov7670::init`] when the identity register does not carry
/// the expected product version (or cannot be read at all).
pub const INIT_ID_MISMATCH: u8 = 255;

/// Settle time after each configuration-table write; the sensor commits
/// register updates with noticeable internal latency.
const REG_SETTLE_MS: u32 = 1;

/// Settle time after soft reset before the register file is coherent.
const RESET_SETTLE_MS: u32 = 30;

/// Settle time after the global defaults table and before format writes.
const MODE_SETTLE_MS: u32 = 10;

/// Output pixel sizes selectable through the vendor scaler tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// 320x240
    Qvga,
    /// 160x120
    Qqvga,
    /// 80x60
    Qqqvga,
    /// 352x288
    Cif,
    /// 176x144
    Qcif,
    /// 88x72
    Qqcif,
}

impl Resolution {
    /// Nominal output dimensions in pixels, (width, height).
    pub fn dimensions(self) -> (u16, u16) {
        match self {
            Resolution::Qvga => (320, 240),
            Resolution::Qqvga => (160, 120),
            Resolution::Qqqvga => (80, 60),
            Resolution::Cif => (352, 288),
            Resolution::Qcif => (176, 144),
            Resolution::Qqcif => (88, 72),
        }
    }

    /// Empirically tuned timing window, (hstart, hstop, vstart, vstop).
    ///
    /// These are calibration constants, not derived values. Some are known
    /// imperfect at the register-map level and are kept that way on purpose:
    /// CIF uses vstop 489 because 492 pushes the image out of the window,
    /// QCIF with hstart 454 / hstop 24 corrupts the last vertical line, and
    /// QQCIF still shows a corrupt first line and off colors.
    pub fn frame_window(self) -> (u16, u16, u16, u16) {
        match self {
            Resolution::Qvga => (168, 24, 12, 492),
            Resolution::Qqvga => (174, 30, 12, 492),
            Resolution::Qqqvga => (196, 52, 12, 492), // (196+640)%784=52
            Resolution::Cif => (174, 94, 12, 489),
            Resolution::Qcif => (454, 22, 12, 492),
            Resolution::Qqcif => (474, 42, 12, 492),
        }
    }

    fn config_table(self) -> &'static [(u8, u8)] {
        match self {
            Resolution::Qvga => regs::RES_QVGA,
            Resolution::Qqvga => regs::RES_QQVGA,
            Resolution::Qqqvga => regs::RES_QQQVGA,
            Resolution::Cif => regs::RES_CIF,
            Resolution::Qcif => regs::RES_QCIF,
            Resolution::Qqcif => regs::RES_QQCIF,
        }
    }
}

/// Output color encoding. Both variants are 16 bits per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFormat {
    Yuv422,
    Rgb565,
}

/// Requested resolution/format pair for [`Ov7670::update_settings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraSettings {
    pub resolution: Resolution,
    pub format: ColorFormat,
}

/// Main driver struct
///
/// Owns the device handle triple for its whole lifetime: the two-wire bus,
/// the capture peripheral (with its DMA engine behind it), and a delay
/// provider for the sensor's settle times.
pub struct Ov7670<I2C, CAP, D> {
    base_address: u8,
    i2c: I2C,
    cap: CAP,
    delay: D,
    mode: CaptureMode,
    destination: u32,
    width: u16,
    height: u16,
    format: ColorFormat,
}

impl<I2C, CAP, D, CommE> Ov7670<I2C, CAP, D>
where
    I2C: embedded_hal::blocking::i2c::Write<Error = CommE>
        + embedded_hal::blocking::i2c::Read<Error = CommE>,
    CAP: CapturePeripheral,
    D: DelayMs<u32>,
{
    /// Create a new instance with an explicit SCCB address:
    /// May use DEFAULT_SCCB_ADDRESS if in doubt.
    pub fn new(i2c: I2C, cap: CAP, delay: D, address: u8) -> Self {
        Self {
            base_address: address,
            i2c,
            cap,
            delay,
            mode: CaptureMode::Continuous,
            destination: 0,
            width: 320,
            height: 240,
            format: ColorFormat::Rgb565,
        }
    }

    pub fn default(i2c: I2C, cap: CAP, delay: D) -> Self {
        Self::new(i2c, cap, delay, DEFAULT_SCCB_ADDRESS)
    }

    /// Hand the peripheral handles back to the caller.
    pub fn release(self) -> (I2C, CAP, D) {
        (self.i2c, self.cap, self.delay)
    }

    /// Bring the sensor out of reset and verify its identity.
    ///
    /// Issues a soft reset, reads it back, waits for the register file to
    /// settle, then checks the product version register. Returns
    /// [`INIT_ID_MISMATCH`] if the identity byte is wrong (or unreadable),
    /// otherwise the number of failed sub-operations; 0 means fully healthy.
    /// A nonzero count is non-fatal; the caller decides whether to proceed.
    pub fn init(&mut self) -> u8 {
        #[cfg(feature = "rttdebug")]
        rprintln!("ov7670 init start");

        let mut failures: u8 = 0;
        failures += self.write_register(regs::REG_COM7, regs::COM7_RESET).is_err() as u8;
        failures += self.read_register(regs::REG_COM7).is_err() as u8;
        self.delay.delay_ms(RESET_SETTLE_MS);

        match self.read_register(regs::REG_VER) {
            Ok(id) if id == regs::PRODUCT_VER => {}
            // An unreadable identity register is reported the same as a
            // wrong one: the caller cannot trust anything past this point.
            _ => return INIT_ID_MISMATCH,
        }

        #[cfg(feature = "rttdebug")]
        rprintln!("ov7670 init done, {} failures", failures);
        failures
    }

    /// Write a u8 to an 8-bit register address.
    ///
    /// A single attempt is made and the result returned verbatim; there is
    /// no built-in retry. Callers that need resilience against one-off bus
    /// glitches opt in via [`Ov7670::write_register_retry`].
    pub fn write_register(&mut self, reg: u8, value: u8) -> Result<(), Error<CommE, CAP::Error>> {
        let write_buf = [reg, value];
        self.i2c
            .write(self.base_address, &write_buf)
            .map_err(Error::Comm)?;
        Ok(())
    }

    /// Read a u8 from an 8-bit register address.
    pub fn read_register(&mut self, reg: u8) -> Result<u8, Error<CommE, CAP::Error>> {
        // SCCB needs the address select and the byte receive as two
        // separate transactions; a combined write-read does not work.
        let cmd_buf = [reg];
        let mut recv_buf = [0u8];
        self.i2c
            .write(self.base_address, &cmd_buf)
            .map_err(Error::Comm)?;
        self.i2c
            .read(self.base_address, &mut recv_buf)
            .map_err(Error::Comm)?;

        Ok(recv_buf[0])
    }

    /// Re-issue a single-register write up to `attempts` times, returning
    /// the first success or the last failure. Explicit opt-in retry policy;
    /// the plain transport never retries on its own.
    pub fn write_register_retry(
        &mut self,
        reg: u8,
        value: u8,
        attempts: u8,
    ) -> Result<(), Error<CommE, CAP::Error>> {
        let mut result = self.write_register(reg, value);
        let mut tries = 1;
        while result.is_err() && tries < attempts {
            result = self.write_register(reg, value);
            tries += 1;
        }
        result
    }

    /// Apply an ordered configuration table through the register transport.
    ///
    /// Iterates front to back, one write per entry with a fixed settle delay
    /// in between, stopping at the first [`regs::CONFIG_END`] address. A
    /// rejected write does not abort the loop: some tables must be applied
    /// in full even when a single register NACKs, because later entries in
    /// the same table supersede the failed one. Deliberate permissive
    /// continue; callers needing certainty re-run the full sequence.
    pub fn apply_config(&mut self, table: &[(u8, u8)]) {
        for &(reg, value) in table {
            if reg == regs::CONFIG_END {
                break;
            }
            let _ = self.write_register(reg, value);
            self.delay.delay_ms(REG_SETTLE_MS);
        }
    }

    /// Set the pixel clock: XCLK is divided by the CLKRC prescaler and then
    /// multiplied by the PLL. Use [`regs::xclk_div`] for the divider field.
    pub fn set_frame_rate(
        &mut self,
        divider: u8,
        multiplier: PllMultiplier,
    ) -> Result<(), Error<CommE, CAP::Error>> {
        self.write_register(regs::REG_CLKRC, regs::CLKRC_BASE | divider)?;
        self.delay.delay_ms(REG_SETTLE_MS);
        self.write_register(regs::REG_DBLV, regs::DBLV_BASE | multiplier as u8)?;
        self.delay.delay_ms(REG_SETTLE_MS);
        Ok(())
    }

    /// Select the output color encoding.
    ///
    /// COM7 and COM15 are shared with unrelated sensor features, so the
    /// color-path bits are masked out of the current values and the rest
    /// written back untouched. A blind overwrite would corrupt them.
    pub fn set_color_format(
        &mut self,
        format: ColorFormat,
    ) -> Result<(), Error<CommE, CAP::Error>> {
        let com7 = self.read_register(regs::REG_COM7)? & regs::COM7_FORMAT_MASK;
        let com15 = self.read_register(regs::REG_COM15)? & regs::COM15_FORMAT_MASK;
        self.delay.delay_ms(MODE_SETTLE_MS);

        // Bit patterns per the vendor implementation guide, Table 2-1
        let (com7_bits, com15_bits) = match format {
            ColorFormat::Yuv422 => (0x00, 0x00),
            ColorFormat::Rgb565 => (regs::COM7_RGB, regs::COM15_RGB565),
        };
        self.write_register(regs::REG_COM7, com7 | com7_bits)?;
        self.write_register(regs::REG_COM15, com15 | com15_bits)?;
        self.format = format;
        Ok(())
    }

    /// Program the frame timing window.
    ///
    /// The sensor's register map splits each 16-bit pixel coordinate across
    /// a whole-byte register and a packed low-bits register: horizontal
    /// bounds keep their low 3 bits in HREF, vertical bounds their low
    /// 2 bits in VREF.
    pub fn set_frame_window(
        &mut self,
        hstart: u16,
        hstop: u16,
        vstart: u16,
        vstop: u16,
    ) -> Result<(), Error<CommE, CAP::Error>> {
        self.write_register(regs::REG_HSTART, (hstart >> 3) as u8)?;
        self.write_register(regs::REG_HSTOP, (hstop >> 3) as u8)?;
        self.write_register(regs::REG_HREF, (((hstop & 0x7) << 3) | (hstart & 0x7)) as u8)?;

        self.write_register(regs::REG_VSTART, (vstart >> 2) as u8)?;
        self.write_register(regs::REG_VSTOP, (vstop >> 2) as u8)?;
        self.write_register(regs::REG_VREF, (((vstop & 0x3) << 2) | (vstart & 0x3)) as u8)?;
        Ok(())
    }

    /// Select an output resolution: vendor scaler table, then the
    /// resolution's fixed timing window, then the recorded dimensions that
    /// size later capture transfers.
    pub fn set_resolution(
        &mut self,
        resolution: Resolution,
    ) -> Result<(), Error<CommE, CAP::Error>> {
        self.apply_config(resolution.config_table());
        let (hstart, hstop, vstart, vstop) = resolution.frame_window();
        self.set_frame_window(hstart, hstop, vstart, vstop)?;
        let (width, height) = resolution.dimensions();
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Reconfigure the sensor for a resolution/format pair.
    ///
    /// Ordering is load-bearing: the global defaults go in first, then the
    /// resolution table (which touches format-adjacent registers), and only
    /// then the format bits. An interrupted run leaves the sensor in an
    /// undefined but non-fatal state; re-running the whole sequence recovers.
    pub fn update_settings(
        &mut self,
        settings: CameraSettings,
    ) -> Result<(), Error<CommE, CAP::Error>> {
        self.apply_config(regs::DEFAULTS);
        self.delay.delay_ms(MODE_SETTLE_MS);

        self.set_resolution(settings.resolution)?;
        self.set_color_format(settings.format)
    }

    /// Arm a capture into `destination`.
    ///
    /// The transfer length is `width * height / 2` half-words from the
    /// currently configured dimensions. Both supported formats are 16 bits
    /// per pixel, which is what makes that computation format-agnostic
    /// today; adding a format with a different pixel size means revisiting
    /// it. No armed-state check is made: calling this while capturing
    /// re-issues the peripheral start, with hardware-defined results.
    pub fn start_capture(
        &mut self,
        mode: CaptureMode,
        destination: u32,
    ) -> Result<(), Error<CommE, CAP::Error>> {
        self.mode = mode;
        self.destination = destination;
        let length = u32::from(self.width) * u32::from(self.height) / 2;
        self.cap
            .start(mode, destination, length)
            .map_err(Error::Capture)
    }

    /// Halt the capture peripheral's DMA transfer, regardless of mode.
    ///
    /// The recorded mode flag is not reset; a snapshot that already
    /// completed still reads back as [`CaptureMode::Snapshot`] until the
    /// next [`Ov7670::start_capture`].
    pub fn stop_capture(&mut self) -> Result<(), Error<CommE, CAP::Error>> {
        self.cap.stop().map_err(Error::Capture)
    }

    /// Width in pixels of the most recently applied resolution.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels of the most recently applied resolution.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Format of the most recent color-format register write.
    pub fn color_format(&self) -> ColorFormat {
        self.format
    }

    /// Mode recorded by the last [`Ov7670::start_capture`].
    pub fn capture_mode(&self) -> CaptureMode {
        self.mode
    }

    /// Destination address recorded by the last [`Ov7670::start_capture`].
    pub fn destination(&self) -> u32 {
        self.destination
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::blocking::i2c::{Read, Write};
    use embedded_hal_mock::delay::MockNoop;
    use embedded_hal_mock::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use std::collections::HashMap;

    /// Stateful SCCB double: write([reg]) selects, write([reg, val]) stores,
    /// read returns the selected register. Records every committed write.
    struct RegisterBus {
        regs: HashMap<u8, u8>,
        selected: u8,
        writes: Vec<(u8, u8)>,
        fail_on: Option<u8>,
    }

    #[derive(Debug)]
    struct BusFault;

    impl RegisterBus {
        fn new(seed: &[(u8, u8)]) -> Self {
            Self {
                regs: seed.iter().cloned().collect(),
                selected: 0,
                writes: Vec::new(),
                fail_on: None,
            }
        }

        fn failing_on(reg: u8) -> Self {
            let mut bus = Self::new(&[]);
            bus.fail_on = Some(reg);
            bus
        }

        fn get(&self, reg: u8) -> u8 {
            *self.regs.get(&reg).unwrap_or(&0)
        }
    }

    impl Write for RegisterBus {
        type Error = BusFault;

        fn write(&mut self, _addr: u8, bytes: &[u8]) -> Result<(), BusFault> {
            match *bytes {
                [reg] => {
                    self.selected = reg;
                    Ok(())
                }
                [reg, value] => {
                    if self.fail_on == Some(reg) {
                        return Err(BusFault);
                    }
                    self.regs.insert(reg, value);
                    self.writes.push((reg, value));
                    Ok(())
                }
                _ => Err(BusFault),
            }
        }
    }

    impl Read for RegisterBus {
        type Error = BusFault;

        fn read(&mut self, _addr: u8, buffer: &mut [u8]) -> Result<(), BusFault> {
            buffer[0] = self.get(self.selected);
            Ok(())
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum CaptureCall {
        Start(CaptureMode, u32, u32),
        Stop,
    }

    /// Capture double that records the start/stop call sequence.
    #[derive(Default)]
    struct CaptureDouble {
        calls: Vec<CaptureCall>,
    }

    impl CapturePeripheral for CaptureDouble {
        type Error = ();

        fn start(&mut self, mode: CaptureMode, destination: u32, length: u32) -> Result<(), ()> {
            self.calls.push(CaptureCall::Start(mode, destination, length));
            Ok(())
        }

        fn stop(&mut self) -> Result<(), ()> {
            self.calls.push(CaptureCall::Stop);
            Ok(())
        }
    }

    fn driver_on(bus: RegisterBus) -> Ov7670<RegisterBus, CaptureDouble, MockNoop> {
        Ov7670::default(bus, CaptureDouble::default(), MockNoop::new())
    }

    /// Reconstruct a frame window from the six packed register values.
    fn unpack_window(bus: &RegisterBus) -> (u16, u16, u16, u16) {
        let href = u16::from(bus.get(regs::REG_HREF));
        let vref = u16::from(bus.get(regs::REG_VREF));
        (
            (u16::from(bus.get(regs::REG_HSTART)) << 3) | (href & 0x7),
            (u16::from(bus.get(regs::REG_HSTOP)) << 3) | ((href >> 3) & 0x7),
            (u16::from(bus.get(regs::REG_VSTART)) << 2) | (vref & 0x3),
            (u16::from(bus.get(regs::REG_VSTOP)) << 2) | ((vref >> 2) & 0x3),
        )
    }

    #[test]
    fn frame_window_wire_bytes_exact() {
        // QVGA window (168, 24, 12, 492) through the documented bit packing
        let expectations = [
            I2cTransaction::write(DEFAULT_SCCB_ADDRESS, vec![regs::REG_HSTART, 168 >> 3]),
            I2cTransaction::write(DEFAULT_SCCB_ADDRESS, vec![regs::REG_HSTOP, 24 >> 3]),
            I2cTransaction::write(DEFAULT_SCCB_ADDRESS, vec![regs::REG_HREF, 0x00]),
            I2cTransaction::write(DEFAULT_SCCB_ADDRESS, vec![regs::REG_VSTART, 12 >> 2]),
            I2cTransaction::write(DEFAULT_SCCB_ADDRESS, vec![regs::REG_VSTOP, (492u16 >> 2) as u8]),
            I2cTransaction::write(DEFAULT_SCCB_ADDRESS, vec![regs::REG_VREF, 0x00]),
        ];
        let mut cam = Ov7670::default(
            I2cMock::new(&expectations),
            CaptureDouble::default(),
            MockNoop::new(),
        );
        cam.set_frame_window(168, 24, 12, 492).unwrap();
        let (mut i2c, _, _) = cam.release();
        i2c.done();
    }

    #[test]
    fn frame_window_round_trips_modulo_truncation() {
        for &(hstart, hstop, vstart, vstop) in &[
            (168u16, 24u16, 12u16, 492u16),
            (454, 22, 12, 492),
            (174, 94, 12, 489),
            (0x1FF, 0x155, 0x3FF, 0x2AB),
        ] {
            let mut cam = driver_on(RegisterBus::new(&[]));
            cam.set_frame_window(hstart, hstop, vstart, vstop).unwrap();
            let (bus, _, _) = cam.release();
            // The whole-byte registers hold 8 bits, the packed registers the
            // low 3 (horizontal) or 2 (vertical), so coordinates survive
            // modulo 11 and 10 bits respectively
            assert_eq!(
                unpack_window(&bus),
                (hstart & 0x7FF, hstop & 0x7FF, vstart & 0x3FF, vstop & 0x3FF)
            );
        }
    }

    #[test]
    fn resolutions_set_dimensions_and_window() {
        let cases = [
            (Resolution::Qvga, 320, 240),
            (Resolution::Qqvga, 160, 120),
            (Resolution::Qqqvga, 80, 60),
            (Resolution::Cif, 352, 288),
            (Resolution::Qcif, 176, 144),
            (Resolution::Qqcif, 88, 72),
        ];
        for &(resolution, width, height) in &cases {
            let mut cam = driver_on(RegisterBus::new(&[]));
            cam.set_resolution(resolution).unwrap();
            assert_eq!((cam.width(), cam.height()), (width, height));
            let expected = resolution.frame_window();
            let (bus, _, _) = cam.release();
            assert_eq!(unpack_window(&bus), expected);
        }
    }

    #[test]
    fn color_format_preserves_unrelated_bits() {
        // Non-color-path bits set in both shared registers
        let bus = RegisterBus::new(&[(regs::REG_COM7, 0x50), (regs::REG_COM15, 0x0A)]);
        let mut cam = driver_on(bus);

        cam.set_color_format(ColorFormat::Yuv422).unwrap();
        cam.set_color_format(ColorFormat::Rgb565).unwrap();
        let (bus_mid, cap, delay) = cam.release();
        assert_eq!(bus_mid.get(regs::REG_COM7), 0x50 | regs::COM7_RGB);
        assert_eq!(bus_mid.get(regs::REG_COM15), 0x0A | regs::COM15_RGB565);

        let mut cam = Ov7670::default(bus_mid, cap, delay);
        cam.set_color_format(ColorFormat::Yuv422).unwrap();
        assert_eq!(cam.color_format(), ColorFormat::Yuv422);
        let (bus, _, _) = cam.release();
        // A -> B -> A restores the original register values
        assert_eq!(bus.get(regs::REG_COM7), 0x50);
        assert_eq!(bus.get(regs::REG_COM15), 0x0A);
    }

    #[test]
    fn update_settings_leaves_only_latest_state() {
        let mut cam = driver_on(RegisterBus::new(&[]));
        cam.update_settings(CameraSettings {
            resolution: Resolution::Qvga,
            format: ColorFormat::Rgb565,
        })
        .unwrap();
        cam.update_settings(CameraSettings {
            resolution: Resolution::Cif,
            format: ColorFormat::Yuv422,
        })
        .unwrap();

        assert_eq!((cam.width(), cam.height()), (352, 288));
        assert_eq!(cam.color_format(), ColorFormat::Yuv422);
        let (bus, _, _) = cam.release();
        // No residual QVGA window registers
        assert_eq!(unpack_window(&bus), Resolution::Cif.frame_window());
    }

    #[test]
    fn apply_config_stops_at_sentinel() {
        let table = [
            (0x20u8, 0x11u8),
            (0x21, 0x22),
            (regs::CONFIG_END, 0x00),
            (0x22, 0x33),
        ];
        let mut cam = driver_on(RegisterBus::new(&[]));
        cam.apply_config(&table);
        let (bus, _, _) = cam.release();
        assert_eq!(bus.writes, vec![(0x20, 0x11), (0x21, 0x22)]);
    }

    #[test]
    fn apply_config_continues_past_failed_write() {
        let table = [
            (0x20u8, 0x11u8),
            (0x21, 0x22),
            (0x22, 0x33),
            (regs::CONFIG_END, 0x00),
        ];
        let mut cam = driver_on(RegisterBus::failing_on(0x21));
        cam.apply_config(&table);
        let (bus, _, _) = cam.release();
        // The rejected middle entry is skipped, not fatal
        assert_eq!(bus.writes, vec![(0x20, 0x11), (0x22, 0x33)]);
    }

    #[test]
    fn retry_helper_reissues_until_attempts_spent() {
        let mut cam = driver_on(RegisterBus::failing_on(0x30));
        assert!(cam.write_register_retry(0x30, 0x01, 3).is_err());
        assert!(cam.write_register_retry(0x31, 0x02, 3).is_ok());
        let (bus, _, _) = cam.release();
        assert_eq!(bus.writes, vec![(0x31, 0x02)]);
    }

    #[test]
    fn snapshot_then_stop_leaves_peripheral_idle() {
        let mut cam = driver_on(RegisterBus::new(&[]));
        cam.start_capture(CaptureMode::Snapshot, 0xD000_0000).unwrap();
        cam.stop_capture().unwrap();

        assert_eq!(cam.capture_mode(), CaptureMode::Snapshot);
        assert_eq!(cam.destination(), 0xD000_0000);
        let (_, cap, _) = cam.release();
        // Default 320x240 at 16 bpp: 320 * 240 / 2 half-words
        assert_eq!(
            cap.calls,
            vec![
                CaptureCall::Start(CaptureMode::Snapshot, 0xD000_0000, 320 * 240 / 2),
                CaptureCall::Stop,
            ]
        );
    }

    #[test]
    fn capture_length_tracks_configured_resolution() {
        let mut cam = driver_on(RegisterBus::new(&[]));
        cam.set_resolution(Resolution::Qqvga).unwrap();
        cam.start_capture(CaptureMode::Continuous, 0x2000_0000).unwrap();
        let (_, cap, _) = cam.release();
        assert_eq!(
            cap.calls,
            vec![CaptureCall::Start(CaptureMode::Continuous, 0x2000_0000, 160 * 120 / 2)]
        );
    }

    #[test]
    fn init_healthy_sensor_reports_zero_failures() {
        let bus = RegisterBus::new(&[(regs::REG_VER, regs::PRODUCT_VER)]);
        let mut cam = driver_on(bus);
        assert_eq!(cam.init(), 0);
        let (bus, _, _) = cam.release();
        // Soft reset was issued
        assert!(bus.writes.contains(&(regs::REG_COM7, regs::COM7_RESET)));
    }

    #[test]
    fn init_identity_mismatch_returns_sentinel() {
        let bus = RegisterBus::new(&[(regs::REG_VER, 0x42)]);
        let mut cam = driver_on(bus);
        assert_eq!(cam.init(), INIT_ID_MISMATCH);
    }

    #[test]
    fn set_frame_rate_wire_bytes() {
        let expectations = [
            I2cTransaction::write(
                DEFAULT_SCCB_ADDRESS,
                vec![regs::REG_CLKRC, regs::CLKRC_BASE | regs::xclk_div(4)],
            ),
            I2cTransaction::write(
                DEFAULT_SCCB_ADDRESS,
                vec![regs::REG_DBLV, regs::DBLV_BASE | PllMultiplier::Mul6 as u8],
            ),
        ];
        let mut cam = Ov7670::default(
            I2cMock::new(&expectations),
            CaptureDouble::default(),
            MockNoop::new(),
        );
        cam.set_frame_rate(regs::xclk_div(4), PllMultiplier::Mul6).unwrap();
        let (mut i2c, _, _) = cam.release();
        i2c.done();
    }
}
