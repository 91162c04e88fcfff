/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of ZXSTATE, a Rust library for ZX Spectrum machine state.

    For the full copyright notice, see the lib.rs file.
*/
use std::io::Write;

use log::{debug, warn};

use zxstate_core::cpu::RegisterBank;
use zxstate_core::memory::PAGE_SIZE;
use zxstate_core::video::BorderColor;

use crate::{StructWrite, SnapshotError, Result};
use crate::snapshot::*;
use super::common::*;
use super::compress::*;

fn init_z80_header<C: RegisterBank>(
        header: &mut Header,
        version: Z80Version,
        cpu: &C,
        border: BorderColor
    )
{
    let r = cpu.refresh();
    let flags1 = if version == Z80Version::V1 {
        Flags1::MEM_COMPRESSED
    }
    else {
        Flags1::empty()
    }
    .with_border_color(border)
    .with_refresh_high_bit(r);
    let flags2 = Flags2::empty().with_interrupt_mode(cpu.interrupt_mode());

    let [a, f] = cpu.af().to_be_bytes();
    header.a = a;
    header.f = f;
    header.bc = cpu.bc().to_le_bytes();
    header.hl = cpu.hl().to_le_bytes();
    header.pc = if version == Z80Version::V1 { cpu.program_counter() } else { 0 }.to_le_bytes();
    header.sp = cpu.stack_pointer().to_le_bytes();
    header.i = cpu.interrupt_vector();
    header.r7 = r & 0x7F;
    header.flags1 = flags1.bits();
    header.de = cpu.de().to_le_bytes();
    header.bc_alt = cpu.bc_alt().to_le_bytes();
    header.de_alt = cpu.de_alt().to_le_bytes();
    header.hl_alt = cpu.hl_alt().to_le_bytes();
    let [a_alt, f_alt] = cpu.af_alt().to_be_bytes();
    header.a_alt = a_alt;
    header.f_alt = f_alt;
    header.iy = cpu.iy().to_le_bytes();
    header.ix = cpu.ix().to_le_bytes();
    header.iff1 = if cpu.iff1() { !0 } else { 0 };
    header.iff2 = if cpu.iff2() { !0 } else { 0 };
    header.flags2 = flags2.bits();
}

fn save_ram_pages<W: Write, S: SnapshotCreator + ?Sized, I: Iterator<Item=(u8, usize)>>(
        mut wr: W,
        snapshot: &S,
        pages: I
    ) -> Result<()>
{
    let mut buf = Vec::with_capacity(0x1000);
    for (ptype, bank) in pages {
        buf.clear();
        let mem_slice = &snapshot.memory_ref().ram_bank_ref(bank)?[..];
        compress_write_all(mem_slice, &mut buf)?;
        let (mem_head, slice) = if buf.len() >= PAGE_SIZE {
            (MemoryHeader::new(UNCOMPRESSED_CHUNK, ptype), mem_slice)
        }
        else {
            (MemoryHeader::new(buf.len() as u16, ptype), &buf[..])
        };
        debug!("Z80: saving memory block {} from bank {} length: {}", ptype, bank, slice.len());
        mem_head.write_struct(wr.by_ref())?;
        wr.write_all(slice)?;
    }
    wr.flush()?;
    Ok(())
}

/// Saves a **Z80** file version 1 into `wr` from the provided reference to a `snapshot` struct
/// implementing [SnapshotCreator].
///
/// The memory visible at `0x4000..=0xFFFF` is saved compressed, followed by the terminator.
/// On the 128k architecture the remaining RAM banks and the paging state are lost.
///
/// # Errors
/// [SnapshotError::Format] if the program counter is `0`, because a zero in the header marks
/// a version 2 or 3 file, nothing is written in this instance. Otherwise this function may
/// return an error from attempts to write the file.
pub fn save_z80v1<C: SnapshotCreator, W: Write>(
        snapshot: &C,
        mut wr: W
    ) -> Result<()>
{
    if snapshot.cpu().program_counter() == 0 {
        return Err(SnapshotError::Format("Z80: version 1 can't store a zero program counter"))
    }
    if snapshot.architecture().is_128k() {
        warn!("Z80: version 1 snapshot can only hold the paged in 48k of memory");
    }
    let mut header = Header::default();
    init_z80_header(&mut header, Z80Version::V1, snapshot.cpu(), snapshot.border_color());
    header.write_struct(wr.by_ref())?;

    let mem = snapshot.memory_ref();
    let mut mem48 = Vec::with_capacity(MEMORY_V1_SIZE);
    for page in 1..4 {
        mem48.extend_from_slice(&mem.page_ref(page)?[..]);
    }
    compress_write_all(&mem48, wr.by_ref())?;
    wr.write_all(MEMORY_V1_TERM)?;
    wr.flush()?;
    Ok(())
}

/// Saves a **Z80** file version 3 into `wr` from the provided reference to a `snapshot` struct
/// implementing [SnapshotCreator].
///
/// Each RAM bank is saved as a separate compressed memory block, or uncompressed if the
/// compression does not reduce its size. ROM banks are not saved.
///
/// # Errors
/// This function may return an error from attempts to write the file.
pub fn save_z80v3<C: SnapshotCreator, W: Write>(
        snapshot: &C,
        mut wr: W
    ) -> Result<()>
{
    let arch = snapshot.architecture();
    let mut header = Header::default();
    init_z80_header(&mut header, Z80Version::V3, snapshot.cpu(), snapshot.border_color());

    let mem = snapshot.memory_ref();
    let mut head_ex = HeaderEx::default();
    head_ex.pc = snapshot.cpu().program_counter().to_le_bytes();
    let mut flags3 = Flags3::empty();
    if let Some((ay_sel_reg, ay_regs)) = snapshot.ay_state() {
        if !arch.is_128k() {
            flags3.insert(Flags3::AY_SOUND_EMU);
        }
        head_ex.ay_sel_reg = ay_sel_reg.into();
        head_ex.ay_regs = *ay_regs;
    }
    head_ex.flags3 = flags3.bits();
    // ROM is paged in at 0x0000 - 0x3FFF
    head_ex.fn1 = !0;
    head_ex.fn2 = !0;
    if arch.is_128k() {
        head_ex.hw_mode = 4;
        head_ex.port1 = mem.mem_ctrl_flags().bits();
        head_ex.port2 = mem.ext_ctrl_flags().bits();
    }

    let ex_len = if head_ex.port2 != 0 {
        HEADER_EX_V3_PORT2_LENGTH
    }
    else {
        HEADER_EX_V3_LENGTH
    };

    header.write_struct(wr.by_ref())?;
    wr.write_all(&ex_len.to_le_bytes())?;
    head_ex.write_struct_with_limit(wr.by_ref(), ex_len.into())?;

    if arch.is_128k() {
        save_ram_pages(wr, snapshot, (0..8).map(|bank| (bank as u8 + 3, bank)))
    }
    else {
        let last_bank = usize::from(mem.bank_latch());
        save_ram_pages(wr, snapshot, [(8, 5), (4, 2), (5, last_bank)].iter().copied())
    }
}
