/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of ZXSTATE, a Rust library for ZX Spectrum machine state.

    For the full copyright notice, see the lib.rs file.
*/
//! The register bank of the emulated CPU.
//!
//! Snapshot codecs access the CPU only through the [RegisterBank] trait, which is implemented
//! for [z80emu::Z80] of every flavour.
use z80emu::{Cpu, Prefix, StkReg16, CpuFlags, Z80, z80::Flavour};

pub use z80emu::InterruptMode;

/// Get and set access to every register persisted in a snapshot.
///
/// Register pairs are returned as 16-bit values with the first named register in the high byte,
/// e.g. `af() >> 8` is the accumulator.
pub trait RegisterBank {
    fn af(&self) -> u16;
    fn set_af(&mut self, af: u16);
    fn bc(&self) -> u16;
    fn set_bc(&mut self, bc: u16);
    fn de(&self) -> u16;
    fn set_de(&mut self, de: u16);
    fn hl(&self) -> u16;
    fn set_hl(&mut self, hl: u16);
    fn af_alt(&self) -> u16;
    fn set_af_alt(&mut self, af: u16);
    fn bc_alt(&self) -> u16;
    fn set_bc_alt(&mut self, bc: u16);
    fn de_alt(&self) -> u16;
    fn set_de_alt(&mut self, de: u16);
    fn hl_alt(&self) -> u16;
    fn set_hl_alt(&mut self, hl: u16);
    fn ix(&self) -> u16;
    fn set_ix(&mut self, ix: u16);
    fn iy(&self) -> u16;
    fn set_iy(&mut self, iy: u16);
    fn stack_pointer(&self) -> u16;
    fn set_stack_pointer(&mut self, sp: u16);
    fn program_counter(&self) -> u16;
    fn set_program_counter(&mut self, pc: u16);
    /// The interrupt page address register `I`.
    fn interrupt_vector(&self) -> u8;
    fn set_interrupt_vector(&mut self, i: u8);
    /// The memory refresh register `R`.
    fn refresh(&self) -> u8;
    fn set_refresh(&mut self, r: u8);
    fn interrupt_mode(&self) -> InterruptMode;
    fn set_interrupt_mode(&mut self, im: InterruptMode);
    fn iff1(&self) -> bool;
    fn iff2(&self) -> bool;
    fn set_interrupt_flip_flops(&mut self, iff1: bool, iff2: bool);
    /// Resets the CPU to its power-on state.
    fn reset_registers(&mut self);
}

/// Converts an interrupt mode into its numeric form as stored in snapshot files.
pub fn interrupt_mode_to_u8(im: InterruptMode) -> u8 {
    match im {
        InterruptMode::Mode0 => 0,
        InterruptMode::Mode1 => 1,
        InterruptMode::Mode2 => 2,
    }
}

/// Converts a numeric interrupt mode, returns `None` if `im` is above 2.
pub fn interrupt_mode_from_u8(im: u8) -> Option<InterruptMode> {
    match im {
        0 => Some(InterruptMode::Mode0),
        1 => Some(InterruptMode::Mode1),
        2 => Some(InterruptMode::Mode2),
        _ => None
    }
}

/// Converts the low 2 bits of a stored interrupt mode, the unused value 3 is read as mode 2.
pub fn interrupt_mode_from_bits(im: u8) -> InterruptMode {
    match im & 3 {
        0 => InterruptMode::Mode0,
        1 => InterruptMode::Mode1,
        _ => InterruptMode::Mode2
    }
}

#[inline]
fn pair(hi: u8, lo: u8) -> u16 {
    u16::from_be_bytes([hi, lo])
}

impl<Q: Flavour> RegisterBank for Z80<Q> {
    fn af(&self) -> u16 {
        let (a, f) = Cpu::get_reg2(self, StkReg16::AF);
        pair(a, f)
    }

    fn set_af(&mut self, af: u16) {
        let [a, f] = af.to_be_bytes();
        Cpu::set_acc(self, a);
        Cpu::set_flags(self, CpuFlags::from_bits_truncate(f));
    }

    fn bc(&self) -> u16 {
        Cpu::get_reg16(self, StkReg16::BC)
    }

    fn set_bc(&mut self, bc: u16) {
        Cpu::set_reg16(self, StkReg16::BC, bc)
    }

    fn de(&self) -> u16 {
        Cpu::get_reg16(self, StkReg16::DE)
    }

    fn set_de(&mut self, de: u16) {
        Cpu::set_reg16(self, StkReg16::DE, de)
    }

    fn hl(&self) -> u16 {
        Cpu::get_reg16(self, StkReg16::HL)
    }

    fn set_hl(&mut self, hl: u16) {
        Cpu::set_reg16(self, StkReg16::HL, hl)
    }

    fn af_alt(&self) -> u16 {
        let (a, f) = Cpu::get_alt_reg2(self, StkReg16::AF);
        pair(a, f)
    }

    fn set_af_alt(&mut self, af: u16) {
        Cpu::ex_af_af(self);
        self.set_af(af);
        Cpu::ex_af_af(self);
    }

    fn bc_alt(&self) -> u16 {
        Cpu::get_alt_reg16(self, StkReg16::BC)
    }

    fn set_bc_alt(&mut self, bc: u16) {
        Cpu::exx(self);
        Cpu::set_reg16(self, StkReg16::BC, bc);
        Cpu::exx(self);
    }

    fn de_alt(&self) -> u16 {
        Cpu::get_alt_reg16(self, StkReg16::DE)
    }

    fn set_de_alt(&mut self, de: u16) {
        Cpu::exx(self);
        Cpu::set_reg16(self, StkReg16::DE, de);
        Cpu::exx(self);
    }

    fn hl_alt(&self) -> u16 {
        Cpu::get_alt_reg16(self, StkReg16::HL)
    }

    fn set_hl_alt(&mut self, hl: u16) {
        Cpu::exx(self);
        Cpu::set_reg16(self, StkReg16::HL, hl);
        Cpu::exx(self);
    }

    fn ix(&self) -> u16 {
        Cpu::get_index16(self, Prefix::Xdd)
    }

    fn set_ix(&mut self, ix: u16) {
        Cpu::set_index16(self, Prefix::Xdd, ix)
    }

    fn iy(&self) -> u16 {
        Cpu::get_index16(self, Prefix::Yfd)
    }

    fn set_iy(&mut self, iy: u16) {
        Cpu::set_index16(self, Prefix::Yfd, iy)
    }

    fn stack_pointer(&self) -> u16 {
        Cpu::get_sp(self)
    }

    fn set_stack_pointer(&mut self, sp: u16) {
        Cpu::set_sp(self, sp)
    }

    fn program_counter(&self) -> u16 {
        Cpu::get_pc(self)
    }

    fn set_program_counter(&mut self, pc: u16) {
        Cpu::set_pc(self, pc)
    }

    fn interrupt_vector(&self) -> u8 {
        Cpu::get_i(self)
    }

    fn set_interrupt_vector(&mut self, i: u8) {
        Cpu::set_i(self, i)
    }

    fn refresh(&self) -> u8 {
        Cpu::get_r(self)
    }

    fn set_refresh(&mut self, r: u8) {
        Cpu::set_r(self, r)
    }

    fn interrupt_mode(&self) -> InterruptMode {
        Cpu::get_im(self)
    }

    fn set_interrupt_mode(&mut self, im: InterruptMode) {
        Cpu::set_im(self, im)
    }

    fn iff1(&self) -> bool {
        Cpu::get_iffs(self).0
    }

    fn iff2(&self) -> bool {
        Cpu::get_iffs(self).1
    }

    fn set_interrupt_flip_flops(&mut self, iff1: bool, iff2: bool) {
        Cpu::set_iffs(self, iff1, iff2)
    }

    fn reset_registers(&mut self) {
        Cpu::reset(self)
    }
}
