// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Table-driven CRC16.
//!
//! Reflected polynomial `0xA001` (0x8005 bit-reversed), initial value `0xFFFF`, no final XOR;
//! i.e. CRC-16/MODBUS. The 256-entry table is generated at compile time.

/// Reflected generator polynomial.
pub const POLY: u16 = 0xA001;

/// Register value before the first byte.
pub const INIT: u16 = 0xFFFF;

const fn make_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u16;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ POLY } else { crc >> 1 };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

pub static TABLE: [u16; 256] = make_table();

/// Running CRC for data that arrives in pieces.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Crc16 {
    crc: u16,
}

impl Crc16 {
    pub const fn new() -> Self {
        Self { crc: INIT }
    }

    #[inline]
    pub fn update_byte(&mut self, byte: u8) {
        self.crc = (self.crc >> 8) ^ TABLE[((self.crc ^ byte as u16) & 0xFF) as usize];
    }

    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        for &b in data {
            self.update_byte(b);
        }
        self
    }

    #[inline]
    pub fn finish(&self) -> u16 {
        self.crc
    }
}

impl Default for Crc16 {
    fn default() -> Self {
        Self::new()
    }
}

/// CRC16 of a complete buffer.
pub fn crc16(data: &[u8]) -> u16 {
    Crc16::new().update(data).finish()
}
