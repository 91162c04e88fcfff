/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of ZXSTATE, a Rust library for ZX Spectrum machine state.

    For the full copyright notice, see the lib.rs file.
*/
//! The **AY-3-8912** programmable sound generator register file.
//!
//! Only the I/O protocol is emulated here, the sound synthesis is left to the host.
use core::fmt;

#[cfg(feature = "snapshot")]
use serde::{Serialize, Deserialize};

/// An enumeration of AY-3-8912 registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum AyRegister {
      ToneFineA      =  0,
      ToneCoarseA    =  1,
      ToneFineB      =  2,
      ToneCoarseB    =  3,
      ToneFineC      =  4,
      ToneCoarseC    =  5,
      NoisePeriod    =  6,
      MixerControl   =  7,
      AmpLevelA      =  8,
      AmpLevelB      =  9,
      AmpLevelC      = 10,
      EnvPerFine     = 11,
      EnvPerCoarse   = 12,
      EnvShape       = 13,
      IoA            = 14,
      IoB            = 15,
}

pub const NUM_REGISTERS: usize = 16;

const REG_MASKS: [u8;NUM_REGISTERS] = [
    0xff, 0x0f, 0xff, 0x0f, 0xff, 0x0f, 0x1f, 0xff,
    0x1f, 0x1f, 0x1f, 0xff, 0xff, 0x0f, 0xff, 0xff
];

const ALL_REGISTERS: [AyRegister;NUM_REGISTERS] = [
    AyRegister::ToneFineA, AyRegister::ToneCoarseA, AyRegister::ToneFineB, AyRegister::ToneCoarseB,
    AyRegister::ToneFineC, AyRegister::ToneCoarseC, AyRegister::NoisePeriod, AyRegister::MixerControl,
    AyRegister::AmpLevelA, AyRegister::AmpLevelB, AyRegister::AmpLevelC, AyRegister::EnvPerFine,
    AyRegister::EnvPerCoarse, AyRegister::EnvShape, AyRegister::IoA, AyRegister::IoB
];

/// A helper trait for matching I/O port addresses for AY-3-8912.
pub trait AyPortDecode: fmt::Debug {
    /// A mask of significant address bus bits for port decoding.
    const PORT_MASK: u16;
    /// A mask of address bus bit values - for the register selection function.
    const PORT_SELECT: u16;
    /// A mask of address bus bit values - for the reading from the selected register function.
    const PORT_DATA_READ: u16;
    /// A mask of address bus bit values - for the writing to the selected register function.
    const PORT_DATA_WRITE: u16;
    /// Return `true` if the port matches the register selection function.
    #[inline]
    fn is_select(port: u16) -> bool {
        port & Self::PORT_MASK == Self::PORT_SELECT & Self::PORT_MASK
    }
    /// Return `true` if the port matches the register reading function.
    #[inline]
    fn is_data_read(port: u16) -> bool {
        port & Self::PORT_MASK == Self::PORT_DATA_READ & Self::PORT_MASK
    }
    /// Return `true` if the port matches the register writing function.
    #[inline]
    fn is_data_write(port: u16) -> bool {
        port & Self::PORT_MASK == Self::PORT_DATA_WRITE & Self::PORT_MASK
    }
    /// A helper for writing data to one of the functions decoded from `port` address.
    ///
    /// Returns `false` if the port doesn't address the chip.
    #[inline]
    fn write_ay_io(ay_io: &mut Ay3_8912Io, port: u16, data: u8) -> bool {
        match port & Self::PORT_MASK {
            p if p == Self::PORT_SELECT => {
                ay_io.select_port_write(data);
                true
            }
            p if p == Self::PORT_DATA_WRITE => {
                ay_io.data_port_write(data);
                true
            }
            _ => false
        }
    }
}

/// Matches I/O port addresses for AY-3-8912 used by the **ZX Spectrum 128k**.
///
/// * Register select: `11xx_xxxx_xxxx_xx0x` (`0xfffd`).
/// * Data read: `11xx_xxxx_xxxx_xx0x` (`0xfffd`).
/// * Data write: `10xx_xxxx_xxxx_xx0x` (`0xbffd`).
#[derive(Clone, Copy, Default, Debug)]
pub struct Ay128kPortDecode;
impl AyPortDecode for Ay128kPortDecode {
    const PORT_MASK      : u16 = 0b1100_0000_0000_0010;
    const PORT_SELECT    : u16 = 0b1100_0000_0000_0000;
    const PORT_DATA_READ : u16 = 0b1100_0000_0000_0000;
    const PORT_DATA_WRITE: u16 = 0b1000_0000_0000_0000;
}

/// Implements the communication protocol with the programmable sound generator AY-3-8912.
///
/// The only I/O port (`A`) has no device attached, so it reads as all ones when set as an input.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "snapshot", serde(rename_all = "camelCase"))]
pub struct Ay3_8912Io {
    regs: [u8; NUM_REGISTERS],
    selected_reg: AyRegister,
}

impl Ay3_8912Io {
    /// Resets the state of internal registers and which register is being
    /// currently selected for reading and writing.
    pub fn reset(&mut self) {
        *self = Ay3_8912Io::default();
    }
    /// Retrieves a current value of the indicated register.
    #[inline]
    pub fn get(&self, reg: AyRegister) -> u8 {
        self.regs[usize::from(reg)]
    }
    /// Sets a current value of the indicated register.
    #[inline]
    pub fn set(&mut self, reg: AyRegister, val: u8) {
        let index = usize::from(reg);
        self.regs[index] = val & REG_MASKS[index];
    }
    /// Returns a reference to all registers as an array of their current values.
    #[inline]
    pub fn registers(&self) -> &[u8;NUM_REGISTERS] {
        &self.regs
    }
    /// Sets all registers and the selected register at once, e.g. from a snapshot.
    ///
    /// Unused bits of each register are cleared.
    pub fn set_registers(&mut self, selected: AyRegister, regs: &[u8;NUM_REGISTERS]) {
        for (reg, &val) in AyRegister::enumerate().zip(regs.iter()) {
            self.set(reg, val);
        }
        self.selected_reg = selected;
    }
    /// Returns an iterator of `(register, value)` pairs over current registers.
    #[inline]
    pub fn iter_regs(&'_ self) -> impl Iterator<Item=(AyRegister, u8)> + '_ {
        AyRegister::enumerate().zip(self.regs.iter().copied())
    }
    /// Returns `true` if the control register bit controlling I/O port `A` input is reset.
    #[inline]
    pub fn is_ioa_input(&self) -> bool {
        self.get(AyRegister::MixerControl) & 0x40 == 0
    }
    /// Returns a previously selected register with [Ay3_8912Io::select_port_write].
    #[inline]
    pub fn selected_register(&self) -> AyRegister {
        self.selected_reg
    }
    /// Bits 0-3 of `data` selects a register to be read from or written to.
    #[inline]
    pub fn select_port_write(&mut self, data: u8) {
        self.selected_reg = AyRegister::from(data)
    }
    /// Writes data to a previously selected register.
    #[inline]
    pub fn data_port_write(&mut self, data: u8) {
        self.set(self.selected_reg, data);
    }
    /// Reads data from a previously selected register.
    #[inline]
    pub fn data_port_read(&self) -> u8 {
        match self.selected_reg {
            AyRegister::IoA if self.is_ioa_input() => u8::MAX,
            AyRegister::IoB => u8::MAX,
            reg => self.get(reg)
        }
    }
}

impl AyRegister {
    /// Returns an iterator of all [AyRegister] values in an ascending order.
    pub fn enumerate() -> impl Iterator<Item=AyRegister> {
        ALL_REGISTERS.iter().copied()
    }
}

impl Default for AyRegister {
    fn default() -> Self {
        AyRegister::ToneFineA
    }
}

impl From<u8> for AyRegister {
    /// Only the 4 lowest bits of `value` are significant.
    fn from(value: u8) -> Self {
        ALL_REGISTERS[usize::from(value & 0x0F)]
    }
}

macro_rules! impl_from_ay_reg {
    ($($ty:ty),*) => { $(
        impl From<AyRegister> for $ty {
            #[inline(always)]
            fn from(reg: AyRegister) -> $ty {
                reg as $ty
            }
        }
    )* };
}
impl_from_ay_reg!(u8, u16, u32, u64, usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ay_register_conversions() {
        for (n, reg) in AyRegister::enumerate().enumerate() {
            assert_eq!(usize::from(reg), n);
            assert_eq!(AyRegister::from(n as u8), reg);
            assert_eq!(AyRegister::from(n as u8 | 0xF0), reg);
        }
        assert_eq!(AyRegister::enumerate().count(), NUM_REGISTERS);
    }

    #[test]
    fn ay_io_works() {
        let mut ay = Ay3_8912Io::default();
        assert_eq!(ay.selected_register(), AyRegister::ToneFineA);
        ay.select_port_write(0xF1);
        assert_eq!(ay.selected_register(), AyRegister::ToneCoarseA);
        ay.data_port_write(0xFF);
        assert_eq!(ay.data_port_read(), 0x0F);
        ay.select_port_write(AyRegister::IoA.into());
        ay.data_port_write(0x5A);
        assert_eq!(ay.get(AyRegister::IoA), 0x5A);
        assert_eq!(ay.data_port_read(), 0xFF);
        ay.set(AyRegister::MixerControl, 0x40);
        assert_eq!(ay.data_port_read(), 0x5A);
        ay.select_port_write(AyRegister::IoB.into());
        assert_eq!(ay.data_port_read(), 0xFF);
        ay.reset();
        assert_eq!(ay, Ay3_8912Io::default());
    }

    #[test]
    fn ay_set_registers_works() {
        let mut ay = Ay3_8912Io::default();
        ay.set_registers(AyRegister::EnvShape, &[0xFF; NUM_REGISTERS]);
        assert_eq!(ay.registers(), &REG_MASKS);
        assert_eq!(ay.selected_register(), AyRegister::EnvShape);
        assert_eq!(ay.iter_regs().nth(6), Some((AyRegister::NoisePeriod, 0x1f)));
    }

    #[test]
    fn ay_128k_port_decode_works() {
        let mut ay = Ay3_8912Io::default();
        assert!(Ay128kPortDecode::is_select(0xFFFD));
        assert!(Ay128kPortDecode::is_data_read(0xFFFD));
        assert!(Ay128kPortDecode::is_data_write(0xBFFD));
        assert!(!Ay128kPortDecode::is_data_write(0x7FFD));
        assert!(Ay128kPortDecode::write_ay_io(&mut ay, 0xC000, 8));
        assert!(Ay128kPortDecode::write_ay_io(&mut ay, 0x8000, 0xFF));
        assert_eq!(ay.get(AyRegister::AmpLevelA), 0x1f);
        assert!(!Ay128kPortDecode::write_ay_io(&mut ay, 0x4000, 0));
        assert!(!Ay128kPortDecode::write_ay_io(&mut ay, 0xFFFF, 0));
    }

    #[cfg(feature = "snapshot")]
    #[test]
    fn ay_io_serde() {
        let mut ay = Ay3_8912Io::default();
        ay.select_port_write(7);
        ay.data_port_write(0x38);
        let text = serde_json::to_string(&ay).unwrap();
        let restored: Ay3_8912Io = serde_json::from_str(&text).unwrap();
        assert_eq!(restored, ay);
    }
}
