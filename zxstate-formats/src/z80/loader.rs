/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of ZXSTATE, a Rust library for ZX Spectrum machine state.

    For the full copyright notice, see the lib.rs file.
*/
use std::io::Read;

use log::{debug, warn};

use zxstate_core::arch::Architecture;
use zxstate_core::chip::{MemCtrlFlags, ExtCtrlFlags};
use zxstate_core::cpu::RegisterBank;
use zxstate_core::memory::{MemoryBankingUnit, PAGE_SIZE};
use zxstate_peripherals::ay::AyRegister;

use crate::{ReadExactEx, StructRead, Result};
use crate::snapshot::*;

use super::common::*;
use super::decompress::*;

/// Hardware emulated by the snapshot, decoded from the hardware mode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HwMode {
    Spectrum48,
    SamRam,
    Spectrum128
}

impl HwMode {
    fn select(version: Z80Version, hw_mode: u8) -> Self {
        use Z80Version::*;
        match (version, hw_mode) {
            (V1, _)|(V2, 0|1)|(V3, 0|1|3) => HwMode::Spectrum48,
            (_, 2) => HwMode::SamRam,
            _ => HwMode::Spectrum128
        }
    }

    fn architecture(self) -> Architecture {
        match self {
            HwMode::Spectrum48|HwMode::SamRam => Architecture::Spectrum48,
            HwMode::Spectrum128 => Architecture::Spectrum128
        }
    }
}

/// A destination of a memory block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemTarget {
    Rom(usize),
    Ram(usize)
}

fn mem_page_to_target(page: u8, arch: Architecture) -> Option<MemTarget> {
    match arch {
        Architecture::Spectrum48 => match page {
            4 => Some(MemTarget::Ram(2)),
            5 => Some(MemTarget::Ram(0)),
            8 => Some(MemTarget::Ram(5)),
            _ => None
        }
        Architecture::Spectrum128 => match page {
            0 => Some(MemTarget::Rom(1)),
            1 => Some(MemTarget::Rom(2)),
            2 => Some(MemTarget::Rom(0)),
            3..=10 => Some(MemTarget::Ram(usize::from(page - 3))),
            11 => Some(MemTarget::Rom(3)),
            _ => None
        }
    }
}

fn set_registers<C: RegisterBank>(cpu: &mut C, head: &Header) -> Result<()> {
    let flags1 = Flags1::from(head.flags1);
    cpu.set_af(u16::from_be_bytes([head.a, head.f]));
    cpu.set_bc(u16::from_le_bytes(head.bc));
    cpu.set_hl(u16::from_le_bytes(head.hl));
    cpu.set_program_counter(u16::from_le_bytes(head.pc));
    cpu.set_stack_pointer(u16::from_le_bytes(head.sp));
    cpu.set_interrupt_vector(head.i);
    cpu.set_refresh(flags1.mix_r(head.r7));
    cpu.set_de(u16::from_le_bytes(head.de));
    cpu.set_bc_alt(u16::from_le_bytes(head.bc_alt));
    cpu.set_de_alt(u16::from_le_bytes(head.de_alt));
    cpu.set_hl_alt(u16::from_le_bytes(head.hl_alt));
    cpu.set_af_alt(u16::from_be_bytes([head.a_alt, head.f_alt]));
    cpu.set_iy(u16::from_le_bytes(head.iy));
    cpu.set_ix(u16::from_le_bytes(head.ix));
    cpu.set_interrupt_flip_flops(head.iff1 != 0, head.iff2 != 0);
    let flags2 = Flags2::from(head.flags2);
    if flags2.contains(Flags2::INTR_MODE_MASK) {
        warn!("Z80: interrupt mode 3 loaded as mode 2");
    }
    cpu.set_interrupt_mode(flags2.interrupt_mode());
    Ok(())
}

/// Reads the 48k address space `0x4000..=0xFFFF` from `rd` through the paging latches.
///
/// Stops at the end of the source or after `0xFFFF` has been written.
fn read_v1_memory<R: Read>(mem: &mut MemoryBankingUnit, mut rd: R) -> Result<()> {
    for addr in (1..4).map(|page| page * PAGE_SIZE as u16) {
        let bank = mem.page_index_at(addr).bank;
        let page = mem.ram_bank_mut(bank.into())?;
        if rd.read_exact_or_to_end(page)? != PAGE_SIZE {
            break
        }
    }
    Ok(())
}

fn read_chunk_into<L: SnapshotLoader + ?Sized>(
        loader: &mut L,
        target: MemTarget,
        data: &[u8],
        is_compressed: bool
    ) -> Result<()>
{
    let mem = loader.memory_mut();
    let page = match target {
        MemTarget::Rom(bank) => mem.rom_bank_mut(bank)?,
        MemTarget::Ram(bank) => mem.ram_bank_mut(bank)?
    };
    if is_compressed {
        RleDecoder::new(data).read_exact_or_to_end(page)?;
    }
    else {
        let len = data.len().min(PAGE_SIZE);
        page[..len].copy_from_slice(&data[..len]);
    }
    Ok(())
}

/// Loads a **Z80** file from `rd` into the provided `loader` implementing [SnapshotLoader].
///
/// All versions (1, 2 and 3) of the format are recognized. The memory blocks of the SamRam
/// hardware are loaded with the 48k layout and the SamRam specific blocks are skipped.
///
/// Returns the architecture of the loaded snapshot.
///
/// # Errors
/// [SnapshotError::Format][crate::SnapshotError::Format] if the extended header length is
/// invalid, [SnapshotError::Io][crate::SnapshotError::Io] if the headers can't be read.
/// Truncated memory blocks and the interrupt mode 3 (loaded as mode 2) are not an error.
pub fn load_z80<R: Read, L: SnapshotLoader>(
        mut rd: R,
        loader: &mut L
    ) -> Result<Architecture>
{
    reset_for_load(loader);

    let header = Header::read_new_struct(rd.by_ref())?;
    set_registers(loader.cpu_mut(), &header)?;
    let flags1 = Flags1::from(header.flags1);
    loader.set_border_color(flags1.border_color());

    let (version, header_ex) = if u16::from_le_bytes(header.pc) == 0 {
        let (version, head_ex, head_len) = load_header_ex(rd.by_ref())?;
        loader.cpu_mut().set_program_counter(u16::from_le_bytes(head_ex.pc));
        (version, Some((head_ex, head_len)))
    }
    else {
        (Z80Version::V1, None)
    };

    let hw_mode = HwMode::select(version, header_ex.map(|(h, _)| h.hw_mode).unwrap_or(0));
    let arch = hw_mode.architecture();
    debug!("Z80: {:?} hardware: {:?}", version, hw_mode);
    if hw_mode == HwMode::SamRam {
        warn!("Z80: SamRam is not supported, loading as a 48k snapshot");
    }

    let mut buf = Vec::new();
    match header_ex {
        None => {
            rd.read_to_end(&mut buf)?;
            let mem = loader.memory_mut();
            if flags1.is_mem_compressed() {
                let end = buf.len().saturating_sub(MEMORY_V1_TERM.len());
                read_v1_memory(mem, RleDecoder::new(&buf[..end]))?;
            }
            else {
                let end = buf.len().min(MEMORY_V1_SIZE);
                read_v1_memory(mem, &buf[..end])?;
            }
        }
        Some(..) => {
            while let Some((len, page, is_compressed)) = load_mem_header(rd.by_ref())? {
                buf.resize(len, 0);
                let read_len = rd.read_exact_or_to_end(&mut buf)?;
                if read_len != len {
                    warn!("Z80: memory block {} truncated: {} of {} bytes", page, read_len, len);
                    buf.truncate(read_len);
                }
                debug!("Z80: memory block {} length: {} compressed: {}", page, len, is_compressed);
                match mem_page_to_target(page, arch) {
                    Some(target) => read_chunk_into(loader, target, &buf, is_compressed)?,
                    None => warn!("Z80: skipping unsupported memory block: {}", page)
                }
            }
        }
    }

    if let Some((head_ex, head_len)) = header_ex {
        if arch.is_128k() {
            let mem = loader.memory_mut();
            mem.restore_mem_ctrl(MemCtrlFlags::from_data(head_ex.port1));
            if head_len == HEADER_EX_V3_PORT2_LENGTH {
                mem.restore_ext_ctrl(ExtCtrlFlags::from_data(head_ex.port2));
            }
        }
        if arch.is_128k() || Flags3::from(head_ex.flags3).is_ay_sound_emu() {
            loader.setup_ay(AyRegister::from(head_ex.ay_sel_reg), &head_ex.ay_regs);
        }
    }

    reconcile_architecture(loader, arch);
    Ok(arch)
}
