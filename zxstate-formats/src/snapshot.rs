/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of ZXSTATE, a Rust library for ZX Spectrum machine state.

    For the full copyright notice, see the lib.rs file.
*/
//! Common snapshot formats utilities.
use log::info;

use zxstate_core::arch::{reconcile, Architecture, Reconciliation};
use zxstate_core::cpu::RegisterBank;
use zxstate_core::memory::MemoryBankingUnit;
use zxstate_core::video::BorderColor;
use zxstate_peripherals::ay::{AyRegister, NUM_REGISTERS};

/// Implement this trait to be able to load snapshots into your emulator.
///
/// Loading is performed in this order:
/// * The CPU registers and the paging latches are reset.
/// * Registers, border color and memory banks are restored.
/// * Optionally the AY-3-8912 state is handed over with [SnapshotLoader::setup_ay].
/// * The architecture of the snapshot is reconciled with the runtime architecture,
///   see [reconcile_architecture].
pub trait SnapshotLoader {
    type Cpu: RegisterBank;
    /// Should return a mutable reference to the CPU register bank.
    fn cpu_mut(&mut self) -> &mut Self::Cpu;
    /// Should return a mutable reference to the memory.
    fn memory_mut(&mut self) -> &mut MemoryBankingUnit;
    /// Should set the border color.
    fn set_border_color(&mut self, border: BorderColor);
    /// Should return the architecture of the running machine.
    fn runtime_architecture(&self) -> Architecture;
    /// Should return `true` if the runtime architecture should follow the snapshot's architecture.
    fn force_arch_on_load(&self) -> bool;
    /// Should switch the running machine to the given architecture, preserving the memory
    /// content and the latches.
    fn switch_architecture(&mut self, arch: Architecture);
    /// Should initialize the sound processor if one is available.
    ///
    /// Default implementation does nothing.
    fn setup_ay(&mut self, _reg_selected: AyRegister, _reg_values: &[u8;NUM_REGISTERS]) {}
}

/// Implement this trait to be able to save snapshots from your emulator.
pub trait SnapshotCreator {
    type Cpu: RegisterBank;
    /// Should return a reference to the CPU register bank.
    fn cpu(&self) -> &Self::Cpu;
    /// Should return a reference to the memory.
    fn memory_ref(&self) -> &MemoryBankingUnit;
    /// Should return a mutable reference to the memory.
    ///
    /// The 48k **SNA** format stores the program counter on the emulated stack.
    fn memory_mut(&mut self) -> &mut MemoryBankingUnit;
    /// Should return the current border color.
    fn border_color(&self) -> BorderColor;
    /// Should return the architecture of the running machine.
    fn architecture(&self) -> Architecture;
    /// Should return the selected register and the register values of the sound processor
    /// if one is available.
    ///
    /// Default implementation returns `None`.
    fn ay_state(&self) -> Option<(AyRegister, &[u8;NUM_REGISTERS])> { None }
}

/// Applies the post-load architecture policy after a snapshot for the `snapshot` architecture
/// has been loaded.
///
/// Returns the applied changes.
pub fn reconcile_architecture<L: SnapshotLoader + ?Sized>(
        loader: &mut L,
        snapshot: Architecture
    ) -> Reconciliation
{
    let runtime = loader.runtime_architecture();
    let changes = reconcile(runtime, snapshot, loader.force_arch_on_load());
    if let Some(arch) = changes.switch_to {
        info!("switching architecture from {} to {} to match the snapshot", runtime, arch);
        loader.switch_architecture(arch);
    }
    if let Some(rom) = changes.rom_in_use {
        loader.memory_mut().set_rom_in_use(rom);
    }
    changes
}

/// Resets the CPU registers and the paging latches before a snapshot is restored.
pub(crate) fn reset_for_load<L: SnapshotLoader + ?Sized>(loader: &mut L) {
    loader.cpu_mut().reset_registers();
    loader.memory_mut().reset_latches();
}
