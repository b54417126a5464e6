// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! FT Click + POT Click demo on the NUCLEO-F767ZI.
//!
//! Every second the wiper voltage is sent to the peer as an FT frame
//! `[seq, mV_hi, mV_lo]`. Frames from the peer are logged with their CRC status and toggle the
//! green LED. Logs go out on the ST-LINK virtual COM port at 115200 baud.

#![no_main]
#![no_std]

use cortex_m_rt::entry;
use embedded_hal::delay::DelayNs;
use log::{error, info, warn, LevelFilter};
use panic_halt as _;

use clickboard::drivers::{ft, pot, Ft, Pot};
use clickboard::hw::Switch;
use hal::{
    gpio::{gpioa, gpiob, gpiod, Analog, Output, PushPull},
    pac,
    prelude::*,
    serial::{Config, Serial},
};
use stm32f7xx_hal as hal;

mod hw;
use hw::{logger, Adc, AdcChannel, BoardPins, PushPullPin, SerialPort, SysDelay, Usart};

const TASK_PERIOD_MS: u32 = 10;
const SEND_PERIOD_TICKS: u32 = 100;
/// Largest payload this demo accepts from the peer.
const RX_PAYLOAD: usize = 64;
const POT_ADC_CHANNEL: u8 = 3;

type FtClick = Ft<SerialPort<pac::USART2>, PushPullPin<gpiod::PD14<Output<PushPull>>>>;
type Led = Switch<PushPullPin<gpiob::PB0<Output<PushPull>>>>;
type PotClick = Pot<AdcChannel<gpioa::PA3<Analog>>>;

struct App {
    ft: FtClick,
    pot: PotClick,
    led: Led,
    delay: SysDelay,
    tick: u32,
    seq: u8,
}

fn application_init() -> App {
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();
    let mut delay = SysDelay::new(cp.SYST, clocks.sysclk().raw());

    let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD);

    // USART3 via ST-LINK (PD8/PD9)
    let serial_cfg = Config {
        baud_rate: 115_200.bps(),
        ..Default::default()
    };
    let debug = Serial::new(
        dp.USART3,
        (pins.usart3.tx, pins.usart3.rx),
        &clocks,
        serial_cfg,
    );
    logger::init(Usart::new(debug), LevelFilter::Info);
    info!("clickboard demo: sysclk {} Hz", clocks.sysclk().raw());

    let led = Switch::active_high(PushPullPin::new(pins.leds.green)).unwrap();

    // FT Click on USART2 (PD5/PD6), RST on PD14
    let ft_cfg = ft::Config::default();
    let click_serial = Serial::new(
        dp.USART2,
        (pins.mikrobus.tx, pins.mikrobus.rx),
        &clocks,
        Config {
            baud_rate: ft_cfg.serial.baud_rate.bps(),
            ..Default::default()
        },
    );
    let mut ft = Ft::init(
        SerialPort::new(click_serial),
        PushPullPin::new(pins.mikrobus.rst),
        &ft_cfg,
    )
    .unwrap();
    ft.reset(&mut delay).unwrap();

    // POT Click on AN (PA3, ADC1_IN3)
    let pot_in = Adc::adc1(dp.ADC1).channel(pins.mikrobus.an, POT_ADC_CHANNEL);
    let pot = Pot::init(pot_in, &pot::Config::default()).unwrap();

    info!("clickboard demo: ready");

    App {
        ft,
        pot,
        led,
        delay,
        tick: 0,
        seq: 0,
    }
}

fn receive(app: &mut App) {
    match app.ft.poll() {
        Ok(true) => {}
        Ok(false) => return,
        Err(e) => {
            error!("ft: {}", e);
            return;
        }
    }

    let crc_ok = app.ft.crc_valid();
    let mut payload = [0u8; RX_PAYLOAD];
    let n = app.ft.get_data(&mut payload);

    match crc_ok {
        Some(true) => info!("ft: rx {:02X?}", &payload[..n]),
        _ => warn!("ft: rx {:02X?} (crc mismatch)", &payload[..n]),
    }
    if let Err(e) = app.led.toggle() {
        warn!("led: {}", e);
    }
}

fn send(app: &mut App) {
    let Ok(volts) = app.pot.read_an_pin_voltage() else {
        return;
    };
    let mv = (volts * 1000.0) as u16;
    let [hi, lo] = mv.to_be_bytes();

    match app.ft.send_package(&[app.seq, hi, lo]) {
        Ok(()) => info!("ft: tx seq {} pot {} mV", app.seq, mv),
        Err(e) => error!("ft: tx failed: {}", e),
    }
    app.seq = app.seq.wrapping_add(1);
}

fn application_task(app: &mut App) {
    receive(app);

    if app.tick % SEND_PERIOD_TICKS == 0 {
        send(app);
    }

    app.tick = app.tick.wrapping_add(1);
    app.delay.delay_ms(TASK_PERIOD_MS);
}

#[entry]
fn main() -> ! {
    let mut app = application_init();

    loop {
        application_task(&mut app);
    }
}
