/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of ZXSTATE, a Rust library for ZX Spectrum machine state.

    For the full copyright notice, see the lib.rs file.
*/
use std::io::Read;

use bitflags::bitflags;
use log::warn;

use zxstate_core::cpu::{InterruptMode, interrupt_mode_from_bits, interrupt_mode_to_u8};
use zxstate_core::memory::PAGE_SIZE;
use zxstate_core::video::BorderColor;

use crate::{StructRead, StructWrite, SnapshotError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Z80Version { V1, V2, V3 }

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Flags1: u8 {
        const R_HIGH_BIT     = 0b0000_0001;
        const BORDER_COLOR   = 0b0000_1110;
        const BASIC_SAMROM   = 0b0001_0000;
        const MEM_COMPRESSED = 0b0010_0000;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Flags2: u8 {
        const INTR_MODE_MASK   = 0b0000_0011;
        const ISSUE2_EMULATION = 0b0000_0100;
        const DOUBLE_INTERRUPT = 0b0000_1000;
        const VIDEO_SYNC       = 0b0011_0000;
        const JOYSTICK_MODEL   = 0b1100_0000;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Flags3: u8 {
        const REG_R_EMU     = 0b0000_0001;
        const LDIR_EMU      = 0b0000_0010;
        const AY_SOUND_EMU  = 0b0000_0100;
        const AY_FULLER_BOX = 0b0100_0000;
        const ALT_HW_MODE   = 0b1000_0000;
    }
}

#[derive(Clone, Copy, Debug, Default)]
#[repr(C)]
#[repr(packed)]
pub struct Header {
    pub a: u8,
    pub f: u8,
    pub bc: [u8;2],
    pub hl: [u8;2],
    pub pc: [u8;2],
    pub sp: [u8;2],
    pub i: u8,
    pub r7: u8,
    pub flags1: u8,
    pub de: [u8;2],
    pub bc_alt: [u8;2],
    pub de_alt: [u8;2],
    pub hl_alt: [u8;2],
    pub a_alt: u8,
    pub f_alt: u8,
    pub iy: [u8;2],
    pub ix: [u8;2],
    pub iff1: u8,
    pub iff2: u8,
    pub flags2: u8
}

#[derive(Clone, Copy, Debug, Default)]
#[repr(C)]
#[repr(packed)]
pub struct HeaderEx {
    // version 2,3
    pub pc: [u8;2],
    pub hw_mode: u8,
    pub port1: u8,
    pub ifrom: u8,
    pub flags3: u8,
    pub ay_sel_reg: u8,
    pub ay_regs: [u8;16],
    // version 3
    pub ts_lo: [u8;2],
    pub ts_hi: u8,
    pub flags4: u8,
    pub mgt_rom: u8,
    pub mf_rom: u8,
    pub fn1: u8,
    pub fn2: u8,
    pub joy_bindings: [u8;10],
    pub joy_ascii: [u8;10],
    pub mgt_type: u8,
    pub disciple1: u8,
    pub disciple2: u8,
    // version 3 with 55 bytes extension
    pub port2: u8,
}

#[derive(Clone, Copy, Debug, Default)]
#[repr(C)]
#[repr(packed)]
pub struct MemoryHeader {
    length: [u8;2],
    page: u8
}

pub const MEMORY_V1_TERM: &[u8] = &[0, 0xED, 0xED, 0];
/// The length of the memory block of the version 1 file.
pub const MEMORY_V1_SIZE: usize = 3 * PAGE_SIZE;
/// A chunk length marking an uncompressed 16 KiB page.
pub const UNCOMPRESSED_CHUNK: u16 = u16::MAX;

pub const HEADER_EX_V2_LENGTH: u16 = 23;
pub const HEADER_EX_V3_LENGTH: u16 = 54;
pub const HEADER_EX_V3_PORT2_LENGTH: u16 = 55;

// Structs must be packed and consist of `u8` or/and arrays of `u8` primitives only.
unsafe impl StructRead for Header {}
unsafe impl StructRead for HeaderEx {}
unsafe impl StructRead for MemoryHeader {}
unsafe impl StructWrite for Header {}
unsafe impl StructWrite for HeaderEx {}
unsafe impl StructWrite for MemoryHeader {}

impl From<u8> for Flags1 {
    fn from(mut byte: u8) -> Self {
        // some old programs store 255 here
        if byte == u8::MAX {
            byte = 1;
        }
        Flags1::from_bits_truncate(byte)
    }
}

impl Flags1 {
    pub fn with_border_color(self, border: BorderColor) -> Self {
        (self & !Flags1::BORDER_COLOR) | Flags1::from_bits_truncate(u8::from(border) << 1)
    }

    pub fn with_refresh_high_bit(mut self, r: u8) -> Self {
        self.set(Flags1::R_HIGH_BIT, (r & 0x80) != 0);
        self
    }

    pub fn border_color(self) -> BorderColor {
        BorderColor::from_data((self & Flags1::BORDER_COLOR).bits() >> 1)
    }

    pub fn is_mem_compressed(self) -> bool {
        self.intersects(Flags1::MEM_COMPRESSED)
    }

    pub fn mix_r(self, r: u8) -> u8 {
        (r & 0x7F) | ((self & Flags1::R_HIGH_BIT).bits() << 7)
    }
}

impl From<u8> for Flags2 {
    fn from(byte: u8) -> Self {
        Flags2::from_bits_truncate(byte)
    }
}

impl Flags2 {
    pub fn with_interrupt_mode(self, im: InterruptMode) -> Self {
        (self & !Flags2::INTR_MODE_MASK) | Flags2::from_bits_truncate(interrupt_mode_to_u8(im))
    }

    /// The unused mode 3 is read as mode 2.
    pub fn interrupt_mode(self) -> InterruptMode {
        interrupt_mode_from_bits((self & Flags2::INTR_MODE_MASK).bits())
    }
}

impl From<u8> for Flags3 {
    fn from(byte: u8) -> Self {
        Flags3::from_bits_truncate(byte)
    }
}

impl Flags3 {
    pub fn is_ay_sound_emu(self) -> bool {
        self.intersects(Flags3::AY_SOUND_EMU)
    }
}

/// Reads the length of the extended header and the extended header.
///
/// Returns the version of the file, the extended header and its length.
pub fn load_header_ex<R: Read>(mut rd: R) -> Result<(Z80Version, HeaderEx, u16)> {
    let mut header_length = [0u8;2];
    rd.read_exact(&mut header_length)?;
    let header_length = u16::from_le_bytes(header_length);
    let version = match header_length {
        HEADER_EX_V2_LENGTH => Z80Version::V2,
        HEADER_EX_V3_LENGTH|HEADER_EX_V3_PORT2_LENGTH => Z80Version::V3,
        _ => return Err(SnapshotError::Format("Z80: invalid extended header size"))
    };
    let mut header_ex = HeaderEx::default();
    header_ex.read_struct_with_limit(rd.by_ref(), header_length.into())?;
    Ok((version, header_ex, header_length))
}

/// Reads a **Z80** V2/V3 memory header and returns `(length, page, is_compressed)` on success.
///
/// Returns `None` at the end of the file, or if only a part of the header could be read.
pub fn load_mem_header<R: Read>(rd: R) -> Result<Option<(usize, u8, bool)>> {
    let mut header = MemoryHeader::default();
    let len = header.read_struct_or_to_end(rd)?;
    if len < core::mem::size_of::<MemoryHeader>() {
        if len != 0 {
            warn!("Z80: incomplete memory block header at the end of file");
        }
        return Ok(None)
    }
    let length = u16::from_le_bytes(header.length);
    if length == UNCOMPRESSED_CHUNK {
        Ok(Some((PAGE_SIZE, header.page, false)))
    }
    else {
        Ok(Some((length.into(), header.page, true)))
    }
}

impl MemoryHeader {
    pub fn new(length: u16, page: u8) -> Self {
        let length = length.to_le_bytes();
        MemoryHeader { length, page }
    }
}
