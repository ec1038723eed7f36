/*
Copyright (c) 2026 ov7670-dcmi contributors
LICENSE: BSD3 (see LICENSE file)
*/

//! OV7670 register map and vendor configuration tables.
//!
//! The tables are ordered (address, value) pairs applied verbatim through the
//! configuration interpreter, terminated by the reserved [`CONFIG_END`]
//! address. Their contents come from the vendor implementation guide and are
//! treated as opaque data by the driver.

/// Reserved address that terminates every configuration table.
pub const CONFIG_END: u8 = 0xFF;

// Identity registers
pub const REG_PID: u8 = 0x0A;
pub const REG_VER: u8 = 0x0B;

/// Value read back from `REG_VER` on a healthy OV7670.
pub const PRODUCT_VER: u8 = 0x73;

// Clock control
pub const REG_CLKRC: u8 = 0x11;
pub const REG_DBLV: u8 = 0x6B;

// Common control registers touched directly by the driver
pub const REG_COM3: u8 = 0x0C;
pub const REG_COM7: u8 = 0x12;
pub const REG_COM8: u8 = 0x13;
pub const REG_COM14: u8 = 0x3E;
pub const REG_COM15: u8 = 0x40;

// Frame window registers
pub const REG_HSTART: u8 = 0x17;
pub const REG_HSTOP: u8 = 0x18;
pub const REG_VSTART: u8 = 0x19;
pub const REG_VSTOP: u8 = 0x1A;
pub const REG_HREF: u8 = 0x32;
pub const REG_VREF: u8 = 0x03;

// Scaling control
pub const REG_SCALING_XSC: u8 = 0x70;
pub const REG_SCALING_YSC: u8 = 0x71;
pub const REG_SCALING_DCWCTR: u8 = 0x72;
pub const REG_SCALING_PCLK_DIV: u8 = 0x73;
pub const REG_SCALING_PCLK_DELAY: u8 = 0xA2;

/// COM7 soft-reset bit; all registers return to defaults.
pub const COM7_RESET: u8 = 0x80;
/// COM7 RGB output select.
pub const COM7_RGB: u8 = 0x04;
/// Mask that clears the COM7 color-path bits and keeps the rest.
pub const COM7_FORMAT_MASK: u8 = 0b1111_1010;

/// COM15 RGB565 output select.
pub const COM15_RGB565: u8 = 0x10;
/// Mask that clears the COM15 data-range/format bits and keeps the rest.
pub const COM15_FORMAT_MASK: u8 = 0b0000_1111;

/// Fixed CLKRC bits written alongside the prescaler value.
pub const CLKRC_BASE: u8 = 0x80;
/// Fixed DBLV bits (internal regulator) written alongside the PLL selection.
pub const DBLV_BASE: u8 = 0x0A;

/// Converts a desired XCLK divide ratio into the CLKRC prescaler field.
pub const fn xclk_div(ratio: u8) -> u8 {
    ratio - 1
}

/// PLL multiplier applied to XCLK after the CLKRC prescaler.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PllMultiplier {
    Bypass = 0x00,
    Mul4 = 0x40,
    Mul6 = 0x80,
    Mul8 = 0xC0,
}

/// Global default configuration, applied before any resolution table.
/// QVGA-sized window, YUV output path, AGC/AWB/AEC enabled.
pub const DEFAULTS: &[(u8, u8)] = &[
    (REG_CLKRC, 0x01),
    (0x3A, 0x04), // TSLB: UYVY ordering
    (REG_COM7, 0x00),
    // Window defaults; overwritten per resolution later
    (REG_HSTART, 0x13),
    (REG_HSTOP, 0x01),
    (REG_HREF, 0xB6),
    (REG_VSTART, 0x02),
    (REG_VSTOP, 0x7A),
    (REG_VREF, 0x0A),
    (REG_COM3, 0x00),
    (REG_COM14, 0x00),
    // Scaler neutral position
    (REG_SCALING_XSC, 0x3A),
    (REG_SCALING_YSC, 0x35),
    (REG_SCALING_DCWCTR, 0x11),
    (REG_SCALING_PCLK_DIV, 0xF0),
    (REG_SCALING_PCLK_DELAY, 0x02),
    // Exposure and gain ceilings
    (0x00, 0x00), // GAIN
    (0x10, 0x00), // AECH
    (0x0D, 0x40), // COM4
    (0x14, 0x18), // COM9: 4x gain ceiling
    (0xA5, 0x05), // BD50MAX
    (0xAB, 0x07), // BD60MAX
    (0x24, 0x95), // AEW
    (0x25, 0x33), // AEB
    (0x26, 0xE3), // VPT
    (0x9F, 0x78), // HAECC1
    (0xA0, 0x68), // HAECC2
    (0xA1, 0x03),
    (0xA6, 0xD8), // HAECC3
    (0xA7, 0xD8), // HAECC4
    (0xA8, 0xF0), // HAECC5
    (0xA9, 0x90), // HAECC6
    (0xAA, 0x94), // HAECC7
    (REG_COM8, 0xE5),
    // Reserved magic from the implementation guide
    (0x0E, 0x61), // COM5
    (0x0F, 0x4B), // COM6
    (0x16, 0x02),
    (0x1E, 0x07), // MVFP
    (0x21, 0x02),
    (0x22, 0x91),
    (0x29, 0x07),
    (0x33, 0x0B),
    (0x35, 0x0B),
    (0x37, 0x1D),
    (0x38, 0x71),
    (0x39, 0x2A),
    (0x3C, 0x78), // COM12
    (0x4D, 0x40),
    (0x4E, 0x20),
    (0x69, 0x00), // GFIX
    (0x74, 0x10),
    (0x8D, 0x4F),
    (0x8E, 0x00),
    (0x8F, 0x00),
    (0x90, 0x00),
    (0x91, 0x00),
    (0x96, 0x00),
    (0x9A, 0x00),
    (0xB0, 0x84),
    (0xB1, 0x0C),
    (0xB2, 0x0E),
    (0xB3, 0x82),
    (0xB8, 0x0A),
    // AWB gains
    (0x43, 0x0A),
    (0x44, 0xF0),
    (0x45, 0x34),
    (0x46, 0x58),
    (0x47, 0x28),
    (0x48, 0x3A),
    (0x59, 0x88),
    (0x5A, 0x88),
    (0x5B, 0x44),
    (0x5C, 0x67),
    (0x5D, 0x49),
    (0x5E, 0x0E),
    (0x6C, 0x0A),
    (0x6D, 0x55),
    (0x6E, 0x11),
    (0x6F, 0x9F),
    (0x6A, 0x40),
    (0x01, 0x40), // BLUE gain
    (0x02, 0x60), // RED gain
    // Color matrix
    (0x4F, 0x80),
    (0x50, 0x80),
    (0x51, 0x00),
    (0x52, 0x22),
    (0x53, 0x5E),
    (0x54, 0x80),
    (0x58, 0x9E), // MTXS
    (0x41, 0x08), // COM16: edge enhancement
    (0x3F, 0x00), // EDGE
    (0x75, 0x05),
    (0x76, 0xE1),
    (0x4C, 0x00), // DNSTH
    (0x77, 0x01),
    (0x3D, 0xC0), // COM13: gamma + UV saturation
    (0x4B, 0x09),
    (0xC9, 0x60),
    (0x56, 0x40), // CONTRAS
    (0x34, 0x11),
    (0x3B, 0x12), // COM11: exposure below banding
    (CONFIG_END, CONFIG_END),
];

/// QVGA (320x240) downsample by 2 via DCW.
pub const RES_QVGA: &[(u8, u8)] = &[
    (REG_COM3, 0x04),
    (REG_COM14, 0x19),
    (REG_SCALING_XSC, 0x3A),
    (REG_SCALING_YSC, 0x35),
    (REG_SCALING_DCWCTR, 0x11),
    (REG_SCALING_PCLK_DIV, 0xF1),
    (REG_SCALING_PCLK_DELAY, 0x02),
    (CONFIG_END, CONFIG_END),
];

/// QQVGA (160x120) downsample by 4.
pub const RES_QQVGA: &[(u8, u8)] = &[
    (REG_COM3, 0x04),
    (REG_COM14, 0x1A),
    (REG_SCALING_XSC, 0x3A),
    (REG_SCALING_YSC, 0x35),
    (REG_SCALING_DCWCTR, 0x22),
    (REG_SCALING_PCLK_DIV, 0xF2),
    (REG_SCALING_PCLK_DELAY, 0x02),
    (CONFIG_END, CONFIG_END),
];

/// QQQVGA (80x60) downsample by 8.
pub const RES_QQQVGA: &[(u8, u8)] = &[
    (REG_COM3, 0x04),
    (REG_COM14, 0x1B),
    (REG_SCALING_XSC, 0x3A),
    (REG_SCALING_YSC, 0x35),
    (REG_SCALING_DCWCTR, 0x33),
    (REG_SCALING_PCLK_DIV, 0xF3),
    (REG_SCALING_PCLK_DELAY, 0x02),
    (CONFIG_END, CONFIG_END),
];

/// CIF (352x288) through the pre-scaler.
pub const RES_CIF: &[(u8, u8)] = &[
    (REG_COM3, 0x08),
    (REG_COM14, 0x11),
    (REG_SCALING_XSC, 0x3A),
    (REG_SCALING_YSC, 0x35),
    (REG_SCALING_DCWCTR, 0x11),
    (REG_SCALING_PCLK_DIV, 0xF1),
    (REG_SCALING_PCLK_DELAY, 0x02),
    (CONFIG_END, CONFIG_END),
];

/// QCIF (176x144) pre-scaler plus DCW by 2.
pub const RES_QCIF: &[(u8, u8)] = &[
    (REG_COM3, 0x0C),
    (REG_COM14, 0x12),
    (REG_SCALING_XSC, 0x3A),
    (REG_SCALING_YSC, 0x35),
    (REG_SCALING_DCWCTR, 0x22),
    (REG_SCALING_PCLK_DIV, 0xF2),
    (REG_SCALING_PCLK_DELAY, 0x52),
    (CONFIG_END, CONFIG_END),
];

/// QQCIF (88x72) pre-scaler plus DCW by 4.
pub const RES_QQCIF: &[(u8, u8)] = &[
    (REG_COM3, 0x0C),
    (REG_COM14, 0x13),
    (REG_SCALING_XSC, 0x3A),
    (REG_SCALING_YSC, 0x35),
    (REG_SCALING_DCWCTR, 0x33),
    (REG_SCALING_PCLK_DIV, 0xF3),
    (REG_SCALING_PCLK_DELAY, 0x52),
    (CONFIG_END, CONFIG_END),
];
