// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! MTi-3 AHRS Click (UART): Xsens MTi-3 orientation module.
//!
//! In measurement mode the module streams `MTData2` messages. Received bytes are run through
//! an [`XbusParser`]; every valid `MTData2` updates the latest quaternion, which is also
//! available as Euler angles.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal_nb::serial::{Read, Write};
use log::{debug, trace};

use crate::error::Error;
use crate::hw::serial::{try_read, write_all, SerialConfig};
use crate::hw::NoPin;
use crate::protocol::xsens::{self, mid, Euler, Quaternion, XbusParser};
use crate::protocol::ParseError;

pub const DEFAULT_BUFFER: usize = 256;

/// Largest command message this driver builds.
const TX_BUFFER: usize = 32;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub serial: SerialConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial: SerialConfig::new(115_200),
        }
    }
}

impl Config {
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.serial.baud_rate = baud_rate;
        self
    }
}

pub struct XsensMti3<UART, RST = NoPin, const N: usize = DEFAULT_BUFFER> {
    uart: UART,
    rst: RST,
    parser: XbusParser<N>,
    quaternion: Option<Quaternion>,
    packet_counter: Option<u16>,
}

impl<UART, RST, const N: usize> XsensMti3<UART, RST, N>
where
    UART: Read<u8> + Write<u8>,
    RST: OutputPin,
{
    /// Take the UART and the active-low reset line and release the module.
    pub fn init(uart: UART, mut rst: RST, config: &Config) -> Result<Self, Error<UART::Error>> {
        rst.set_high().map_err(Error::pin)?;
        debug!("xsensmti3: init at {} baud", config.serial.baud_rate);
        Ok(Self {
            uart,
            rst,
            parser: XbusParser::new(),
            quaternion: None,
            packet_counter: None,
        })
    }

    pub fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<UART::Error>> {
        self.rst.set_low().map_err(Error::pin)?;
        delay.delay_ms(1);
        self.rst.set_high().map_err(Error::pin)?;
        self.parser.reset();
        self.quaternion = None;
        self.packet_counter = None;
        Ok(())
    }

    /// Send an Xbus message.
    pub fn send(&mut self, id: u8, data: &[u8]) -> Result<(), Error<UART::Error>> {
        let mut msg = [0u8; TX_BUFFER];
        let n = xsens::encode_message(id, data, &mut msg)?;
        trace!("xsensmti3: send mid 0x{:02X}", id);
        write_all(&mut self.uart, &msg[..n]).map_err(Error::Bus)
    }

    pub fn go_to_config(&mut self) -> Result<(), Error<UART::Error>> {
        self.send(mid::GOTO_CONFIG, &[])
    }

    pub fn go_to_measurement(&mut self) -> Result<(), Error<UART::Error>> {
        self.send(mid::GOTO_MEASUREMENT, &[])
    }

    /// Feed one received byte. Returns the id of a message it completed.
    pub fn isr_parser(&mut self, byte: u8) -> Option<u8> {
        let id = self.parser.push(byte)?;
        if id == mid::MT_DATA2 {
            self.update_from_mtdata2();
        }
        Some(id)
    }

    fn update_from_mtdata2(&mut self) {
        let Some(data) = self.parser.data() else {
            return;
        };
        match Quaternion::from_mtdata2(data) {
            Ok(q) => self.quaternion = Some(q),
            Err(ParseError::NotFound) => {}
            Err(e) => trace!("xsensmti3: bad quaternion item: {}", e),
        }
        if let Ok(counter) = xsens::packet_counter(data) {
            self.packet_counter = Some(counter);
        }
    }

    /// Drain the UART through the parser. Returns how many messages completed.
    pub fn poll(&mut self) -> Result<usize, Error<UART::Error>> {
        let mut messages = 0;
        while let Some(byte) = try_read(&mut self.uart).map_err(Error::Bus)? {
            if self.isr_parser(byte).is_some() {
                messages += 1;
            }
        }
        Ok(messages)
    }

    /// Latest orientation, `None` until the first `MTData2` with a quaternion.
    pub fn quaternion(&self) -> Option<Quaternion> {
        self.quaternion
    }

    pub fn euler(&self) -> Option<Euler> {
        self.quaternion.map(|q| q.to_euler())
    }

    pub fn packet_counter(&self) -> Option<u16> {
        self.packet_counter
    }

    pub fn free(self) -> (UART, RST) {
        (self.uart, self.rst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::mock::MockSerial;
    use crate::protocol::xsens::{encode_message, xdi};

    fn mtdata2(counter: u16, q: [f32; 4]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&xdi::PACKET_COUNTER.to_be_bytes());
        data.push(2);
        data.extend_from_slice(&counter.to_be_bytes());
        data.extend_from_slice(&xdi::QUATERNION.to_be_bytes());
        data.push(16);
        for v in q {
            data.extend_from_slice(&v.to_be_bytes());
        }
        data
    }

    fn message(id: u8, data: &[u8]) -> Vec<u8> {
        let mut out = vec![0u8; data.len() + 8];
        let n = encode_message(id, data, &mut out).unwrap();
        out.truncate(n);
        out
    }

    fn imu(uart: &MockSerial) -> XsensMti3<MockSerial, NoPin, 64> {
        XsensMti3::init(uart.clone(), NoPin, &Config::default()).unwrap()
    }

    #[test]
    fn mode_commands() {
        let uart = MockSerial::new();
        let mut imu = imu(&uart);

        imu.go_to_config().unwrap();
        imu.go_to_measurement().unwrap();
        assert_eq!(
            uart.sent(),
            vec![0xFA, 0xFF, 0x30, 0x00, 0xD1, 0xFA, 0xFF, 0x10, 0x00, 0xF1]
        );
    }

    #[test]
    fn tracks_latest_orientation() {
        let uart = MockSerial::new();
        let mut imu = imu(&uart);
        assert!(imu.quaternion().is_none());

        let h = core::f32::consts::FRAC_1_SQRT_2;
        uart.inject(&message(mid::MT_DATA2, &mtdata2(1, [1.0, 0.0, 0.0, 0.0])));
        uart.inject(&message(mid::WAKE_UP, &[]));
        uart.inject(&message(mid::MT_DATA2, &mtdata2(2, [h, 0.0, 0.0, h])));

        assert_eq!(imu.poll().unwrap(), 3);
        assert_eq!(imu.packet_counter(), Some(2));
        let q = imu.quaternion().unwrap();
        assert_eq!((q.w, q.x, q.y, q.z), (h, 0.0, 0.0, h));

        let e = imu.euler().unwrap();
        assert!((e.yaw - 90.0).abs() < 1e-3);
    }

    #[test]
    fn corrupted_message_keeps_previous_sample() {
        let uart = MockSerial::new();
        let mut imu = imu(&uart);

        uart.inject(&message(mid::MT_DATA2, &mtdata2(1, [1.0, 0.0, 0.0, 0.0])));
        let mut bad = message(mid::MT_DATA2, &mtdata2(2, [0.0, 1.0, 0.0, 0.0]));
        let last = bad.len() - 1;
        bad[last] ^= 0x55;
        uart.inject(&bad);

        assert_eq!(imu.poll().unwrap(), 1);
        assert_eq!(imu.packet_counter(), Some(1));
        assert_eq!(imu.quaternion().map(|q| q.w), Some(1.0));
    }
}
