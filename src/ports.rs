/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of ZXSTATE, a Rust library for ZX Spectrum machine state.

    For the full copyright notice, see the lib.rs file.
*/
//! I/O port decoding.
//!
//! Ports are decoded partially, only the address lines listed below are significant.
//!
//! | Device              | Address lines            | Example  |
//! |---------------------|--------------------------|----------|
//! | ULA                 | `xxxx_xxxx_xxxx_xxx0`    | `0xfe`   |
//! | Kempston joystick   | `xxxx_xxxx_000x_xxxx`    | `0x1f`   |
//! | AY-3-8912           | `1xxx_xxxx_xxxx_xx0x`    | `0xfffd` |
//! | Memory control      | `01xx_xxxx_xxxx_xx0x`    | `0x7ffd` |
//!
//! The secondary memory control port (`0x1ffd`) is not decoded, writes to it have no effect.
//! The extended control latches are changed only by restoring a snapshot.
use core::fmt::Debug;

use log::trace;

use crate::chip::{EarMic, UlaPortFlags, MemCtrlFlags};
use crate::config::MachineConfig;
use crate::memory::MemoryBankingUnit;
use crate::peripherals::ay::{Ay3_8912Io, AyPortDecode, Ay128kPortDecode};
use crate::peripherals::joystick::KempstonJoystick;
use crate::peripherals::keyboard::KeyboardMatrix;
use crate::video::BorderColor;

/// A helper trait for matching I/O port addresses.
pub trait PortAddress: Debug {
    /// Relevant address bits should be set to 1.
    const ADDRESS_MASK: u16;
    /// Bits from this constant will be matching only if `ADDRESS_MASK` constains 1 for bits in the same positions.
    const ADDRESS_BITS: u16;
    /// Returns `true` if a provided `address` masked with `ADDRESS_MASK` matches `ADDRESS_BITS`.
    #[inline]
    fn match_port(address: u16) -> bool {
        address & Self::ADDRESS_MASK == Self::ADDRESS_BITS & Self::ADDRESS_MASK
    }
}

#[derive(Clone, Copy, Default, Debug)]
pub struct UlaPortAddress;
impl PortAddress for UlaPortAddress {
    const ADDRESS_MASK: u16 = 0b0000_0000_0000_0001;
    const ADDRESS_BITS: u16 = 0b1111_1111_1111_1110;
}

#[derive(Clone, Copy, Default, Debug)]
pub struct KempstonPortAddress;
impl PortAddress for KempstonPortAddress {
    const ADDRESS_MASK: u16 = 0b0000_0000_1110_0000;
    const ADDRESS_BITS: u16 = 0b0000_0000_0001_1111;
}

#[derive(Clone, Copy, Default, Debug)]
pub struct MemCtrlPortAddress;
impl PortAddress for MemCtrlPortAddress {
    const ADDRESS_MASK: u16 = 0b1100_0000_0000_0010;
    const ADDRESS_BITS: u16 = 0b0111_1111_1111_1101;
}

/// Peripheral devices reachable through the I/O ports.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ports {
    /// The keyboard half-rows.
    pub keyboard: KeyboardMatrix,
    /// The Kempston joystick input register.
    pub kempston: KempstonJoystick,
    /// The sound processor registers, used only if sound is configured.
    pub ay: Ay3_8912Io,
    ula_out: UlaPortFlags,
    ear_in: bool
}

impl Ports {
    /// Returns the last value written to the ULA port.
    #[inline]
    pub fn ula_port(&self) -> UlaPortFlags {
        self.ula_out
    }

    #[inline]
    pub fn border_color(&self) -> BorderColor {
        self.ula_out.into()
    }
    /// Sets the border color bits of the ULA output latch.
    pub fn set_border_color(&mut self, border: BorderColor) {
        self.ula_out = (self.ula_out & !UlaPortFlags::BORDER_MASK)
                     | UlaPortFlags::from_data(border.into());
    }
    /// Returns the state of the EAR and MIC output lines.
    #[inline]
    pub fn ear_mic_out(&self) -> EarMic {
        self.ula_out.into()
    }
    /// Sets the level of the EAR input line.
    #[inline]
    pub fn set_ear_in(&mut self, level: bool) {
        self.ear_in = level;
    }

    #[inline]
    pub fn ear_in(&self) -> bool {
        self.ear_in
    }
    /// Resets the output latches and the sound processor, key states are preserved.
    pub fn reset(&mut self) {
        self.ula_out = UlaPortFlags::empty();
        self.ay.reset();
    }
    /// Reads data from the device decoded at `port`.
    ///
    /// The first device matching the port address answers. When none does, the value derived
    /// from the floating `bus` is returned.
    pub fn read(&self, config: &MachineConfig, port: u16, bus: u8) -> u8 {
        let high = (port >> 8) as u8;
        if UlaPortAddress::match_port(port) {
            let mut data = UlaPortFlags::from_bits_retain(self.keyboard.read_rows(high));
            if config.ear_input && high == 0xFE {
                data.set(UlaPortFlags::EAR_IN, self.ear_in);
            }
            data.bits()
        }
        else if KempstonPortAddress::match_port(port) {
            self.kempston.port_read()
        }
        else if config.sound && Ay128kPortDecode::is_data_read(port) {
            self.ay.data_port_read()
        }
        else {
            (bus | 0xE0) & !0x40
        }
    }
    /// Writes `data` to every device decoded at `port`.
    ///
    /// Devices are visited in order: the ULA, the sound processor and the memory control.
    pub fn write(&mut self, mem: &mut MemoryBankingUnit, config: &MachineConfig, port: u16, data: u8) {
        if UlaPortAddress::match_port(port) {
            self.ula_out = UlaPortFlags::from_data(data);
        }
        if config.sound {
            Ay128kPortDecode::write_ay_io(&mut self.ay, port, data);
        }
        if MemCtrlPortAddress::match_port(port) {
            if !mem.write_mem_ctrl(MemCtrlFlags::from_data(data)) {
                trace!("memory control write ignored: 0x{:02x}", data);
            }
        }
    }
}
