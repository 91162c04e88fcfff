/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of ZXSTATE, a Rust library for ZX Spectrum machine state.

    For the full copyright notice, see the lib.rs file.
*/
//! Memory API.
//!
//! The [MemoryBankingUnit] owns all ROM and RAM banks of a 48k/128k machine and the paging
//! latches that select which banks are visible in the 16-bit address space.
//!
//! | Page | Address range   | Bank                 |
//! |------|-----------------|----------------------|
//! | 0    | `0x0000-0x3FFF` | ROM `rom_in_use`     |
//! | 1    | `0x4000-0x7FFF` | RAM 5                |
//! | 2    | `0x8000-0xBFFF` | RAM 2                |
//! | 3    | `0xC000-0xFFFF` | RAM `bank_latch`     |
use core::fmt;
use std::io;

use log::trace;

#[cfg(feature = "snapshot")]
use serde::{Serialize, Deserialize};

use crate::arch::Architecture;
use crate::chip::{MemCtrlFlags, ExtCtrlFlags};

pub const PAGE_SIZE: usize = 0x4000;
pub const MEM48K_SIZE: usize = 3 * PAGE_SIZE;
pub const ROM_BANKS: usize = 4;
pub const RAM_BANKS: usize = 8;

/// A single memory bank.
pub type MemPage = [u8; PAGE_SIZE];

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    InvalidPageIndex,
    InvalidBankIndex,
    InvalidRomSize
}

/// A type returned by some of [MemoryBankingUnit] methods.
pub type Result<T> = core::result::Result<T, MemoryError>;

impl std::error::Error for MemoryError {}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MemoryError::InvalidPageIndex => "Memory page index is out of range",
            MemoryError::InvalidBankIndex => "Memory bank index is out of range",
            MemoryError::InvalidRomSize => "ROM size is different from the memory page size",
        })
    }
}

impl From<MemoryError> for io::Error {
    fn from(err: MemoryError) -> Self {
        io::Error::new(io::ErrorKind::InvalidInput, err)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum MemoryKind {
    Rom,
    Ram
}

/// A type returned by [MemoryBankingUnit::page_index_at].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemPageOffset {
    /// A kind of memory bank switched in.
    pub kind: MemoryKind,
    /// A bank index.
    pub bank: u8,
    /// An offset into the bank.
    pub offset: u16
}

/// The paging latches.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "snapshot", serde(default, rename_all = "camelCase"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Latches {
    /// The RAM bank paged in at `0xC000`: 0 - 7.
    pub bank_latch: u8,
    /// `true` if the shadow screen (RAM 7) is displayed.
    pub video_latch: bool,
    /// The low bit of the ROM bank selection.
    pub rom_latch: bool,
    /// Once set, memory control port writes are ignored.
    pub paging_lock: bool,
    /// The extended paging mode bit.
    pub mode_ext: bool,
    /// The high bit of the ROM bank selection.
    pub rom_ext: bool,
    /// The ROM bank paged in at `0x0000`: 0 - 3.
    pub rom_in_use: u8
}

/// ROM and RAM banks with the paging latches.
#[derive(Clone)]
pub struct MemoryBankingUnit {
    rom: Box<[MemPage]>,
    ram: Box<[MemPage]>,
    latches: Latches
}

impl Latches {
    fn derive_rom_in_use(&mut self) {
        self.rom_in_use = (self.rom_ext as u8) << 1 | self.rom_latch as u8;
    }
}

impl Default for MemoryBankingUnit {
    fn default() -> Self {
        MemoryBankingUnit::new(Architecture::default())
    }
}

impl fmt::Debug for MemoryBankingUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryBankingUnit")
         .field("rom_banks", &self.rom.len())
         .field("ram_banks", &self.ram.len())
         .field("latches", &self.latches)
         .finish()
    }
}

impl MemoryBankingUnit {
    /// Creates a new memory with all banks cleared and latches set for a cold start of `arch`.
    pub fn new(arch: Architecture) -> Self {
        let rom = vec![[0u8; PAGE_SIZE]; ROM_BANKS].into_boxed_slice();
        let ram = vec![[0u8; PAGE_SIZE]; RAM_BANKS].into_boxed_slice();
        let mut mem = MemoryBankingUnit { rom, ram, latches: Latches::default() };
        mem.reset(arch);
        mem
    }
    /// Cold reset of the paging latches.
    ///
    /// Memory content is left intact.
    pub fn reset(&mut self, arch: Architecture) {
        self.latches = Latches {
            paging_lock: arch.initial_paging_lock(),
            ..Latches::default()
        };
    }
    /// Resets the paging latches before restoring a snapshot.
    ///
    /// All latches are cleared and the paging lock is set.
    pub fn reset_latches(&mut self) {
        self.latches = Latches {
            paging_lock: true,
            ..Latches::default()
        };
    }
    /// Copies a ROM image into the ROM bank `rom_bank`.
    ///
    /// # Errors
    /// [MemoryError::InvalidBankIndex] if there is no such bank or [MemoryError::InvalidRomSize]
    /// if `data` isn't exactly [PAGE_SIZE] bytes long.
    pub fn load_rom(&mut self, rom_bank: usize, data: &[u8]) -> Result<()> {
        let target = self.rom_bank_mut(rom_bank)?;
        if data.len() != PAGE_SIZE {
            return Err(MemoryError::InvalidRomSize)
        }
        target.copy_from_slice(data);
        Ok(())
    }
    /// Returns the bank currently paged at the given address.
    #[inline]
    pub fn page_index_at(&self, addr: u16) -> MemPageOffset {
        let offset = addr & (PAGE_SIZE as u16 - 1);
        let (kind, bank) = match addr >> 14 {
            0 => (MemoryKind::Rom, self.latches.rom_in_use),
            1 => (MemoryKind::Ram, 5),
            2 => (MemoryKind::Ram, 2),
            _ => (MemoryKind::Ram, self.latches.bank_latch)
        };
        MemPageOffset { kind, bank, offset }
    }
    /// Reads a byte at the given address.
    pub fn read_byte(&self, addr: u16) -> u8 {
        let MemPageOffset { kind, bank, offset } = self.page_index_at(addr);
        let banks = match kind {
            MemoryKind::Rom => &self.rom,
            MemoryKind::Ram => &self.ram
        };
        banks[bank as usize][offset as usize]
    }
    /// Writes a byte at the given address. Writes into ROM are ignored.
    pub fn write_byte(&mut self, addr: u16, val: u8) {
        if let MemPageOffset { kind: MemoryKind::Ram, bank, offset } = self.page_index_at(addr) {
            self.ram[bank as usize][offset as usize] = val;
        }
    }
    /// Reads a little-endian word. The address of the high byte wraps around `0xFFFF`.
    pub fn read_word(&self, addr: u16) -> u16 {
        let lo = self.read_byte(addr);
        let hi = self.read_byte(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }
    /// Writes a little-endian word. The address of the high byte wraps around `0xFFFF`.
    pub fn write_word(&mut self, addr: u16, val: u16) {
        let [lo, hi] = val.to_le_bytes();
        self.write_byte(addr, lo);
        self.write_byte(addr.wrapping_add(1), hi);
    }
    /// Returns a reference to the bank currently paged at `page`: 0 - 3.
    pub fn page_ref(&self, page: u8) -> Result<&MemPage> {
        if page > 3 {
            return Err(MemoryError::InvalidPageIndex)
        }
        let MemPageOffset { kind, bank, .. } = self.page_index_at(u16::from(page) << 14);
        match kind {
            MemoryKind::Rom => self.rom_bank_ref(bank.into()),
            MemoryKind::Ram => self.ram_bank_ref(bank.into())
        }
    }
    /// `rom_bank` should be less than [ROM_BANKS].
    pub fn rom_bank_ref(&self, rom_bank: usize) -> Result<&MemPage> {
        self.rom.get(rom_bank).ok_or(MemoryError::InvalidBankIndex)
    }
    /// `rom_bank` should be less than [ROM_BANKS].
    pub fn rom_bank_mut(&mut self, rom_bank: usize) -> Result<&mut MemPage> {
        self.rom.get_mut(rom_bank).ok_or(MemoryError::InvalidBankIndex)
    }
    /// `ram_bank` should be less than [RAM_BANKS].
    pub fn ram_bank_ref(&self, ram_bank: usize) -> Result<&MemPage> {
        self.ram.get(ram_bank).ok_or(MemoryError::InvalidBankIndex)
    }
    /// `ram_bank` should be less than [RAM_BANKS].
    pub fn ram_bank_mut(&mut self, ram_bank: usize) -> Result<&mut MemPage> {
        self.ram.get_mut(ram_bank).ok_or(MemoryError::InvalidBankIndex)
    }
    /// Copies the content of RAM bank `src` into RAM bank `dst`.
    pub fn copy_ram_bank(&mut self, src: usize, dst: usize) -> Result<()> {
        if src >= RAM_BANKS || dst >= RAM_BANKS {
            return Err(MemoryError::InvalidBankIndex)
        }
        if src != dst {
            let page = self.ram[src];
            self.ram[dst] = page;
        }
        Ok(())
    }
    /// Fills all RAM banks with the data produced by the closure `f`.
    pub fn fill_ram<F: FnMut() -> u8>(&mut self, mut f: F) {
        for byte in self.ram.iter_mut().flat_map(|page| page.iter_mut()) {
            *byte = f();
        }
    }
    /// Returns the current latches.
    #[inline]
    pub fn latches(&self) -> &Latches {
        &self.latches
    }
    /// The RAM bank paged in at `0xC000`.
    #[inline]
    pub fn bank_latch(&self) -> u8 {
        self.latches.bank_latch
    }
    /// The ROM bank paged in at `0x0000`.
    #[inline]
    pub fn rom_in_use(&self) -> u8 {
        self.latches.rom_in_use
    }
    /// Pages in the ROM bank `rom_bank & 3` at `0x0000` without changing the ROM latches.
    pub fn set_rom_in_use(&mut self, rom_bank: u8) {
        self.latches.rom_in_use = rom_bank & 3;
    }
    #[inline]
    pub fn is_paging_locked(&self) -> bool {
        self.latches.paging_lock
    }
    /// Returns the RAM bank holding the displayed screen: 5 or 7.
    pub fn screen_bank(&self) -> usize {
        if self.latches.video_latch { 7 } else { 5 }
    }
    /// Packs the memory control latches into the `0x7FFD` port layout.
    pub fn mem_ctrl_flags(&self) -> MemCtrlFlags {
        let Latches { bank_latch, video_latch, rom_latch, paging_lock, .. } = self.latches;
        let mut flags = MemCtrlFlags::empty().with_last_ram_page_bank(bank_latch.into());
        flags.set(MemCtrlFlags::SCREEN_BANK, video_latch);
        flags.set(MemCtrlFlags::ROM_BANK, rom_latch);
        flags.set(MemCtrlFlags::LOCK_MMU, paging_lock);
        flags
    }
    /// Packs the extended control latches into the `0x1FFD` port layout.
    pub fn ext_ctrl_flags(&self) -> ExtCtrlFlags {
        let mut flags = ExtCtrlFlags::empty();
        flags.set(ExtCtrlFlags::EXT_PAGING, self.latches.mode_ext);
        flags.set(ExtCtrlFlags::ROM_BANK_HI, self.latches.rom_ext);
        flags
    }
    /// Updates the memory control latches as a result of an I/O port write.
    ///
    /// Returns `false` and ignores the write if the paging lock is set.
    pub fn write_mem_ctrl(&mut self, flags: MemCtrlFlags) -> bool {
        if self.latches.paging_lock {
            return false
        }
        self.set_mem_ctrl_latches(flags);
        self.latches.derive_rom_in_use();
        trace!("memory control: {:?} rom: {}", flags, self.latches.rom_in_use);
        true
    }
    /// Restores the memory control latches from a snapshot, regardless of the paging lock.
    ///
    /// The ROM bank paged in follows the ROM latch.
    pub fn restore_mem_ctrl(&mut self, flags: MemCtrlFlags) {
        self.set_mem_ctrl_latches(flags);
        self.latches.rom_in_use = self.latches.rom_latch as u8;
    }
    /// Restores the extended control latches from a snapshot.
    ///
    /// There is no port path to these latches, the ROM bank paged in is re-derived from both
    /// ROM latches.
    pub fn restore_ext_ctrl(&mut self, flags: ExtCtrlFlags) {
        self.latches.mode_ext = flags.has_ext_paging();
        self.latches.rom_ext = flags.rom_page_bank_hi() != 0;
        self.latches.derive_rom_in_use();
    }

    fn set_mem_ctrl_latches(&mut self, flags: MemCtrlFlags) {
        let latches = &mut self.latches;
        latches.bank_latch = flags.last_ram_page_bank() as u8;
        latches.video_latch = flags.is_shadow_screen();
        latches.rom_latch = flags.rom_page_bank() != 0;
        latches.paging_lock = flags.is_mmu_locked();
    }
}
