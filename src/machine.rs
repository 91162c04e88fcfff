/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of ZXSTATE, a Rust library for ZX Spectrum machine state.

    For the full copyright notice, see the lib.rs file.
*/
//! The machine context binding the memory, the CPU registers and the peripherals.
use core::mem;
use std::io::{Read, Write, Seek};

use log::debug;

use crate::arch::Architecture;
use crate::config::MachineConfig;
use crate::cpu::RegisterBank;
use crate::formats::{self, quick::QuickSnapshot, Result};
use crate::formats::snapshot::{SnapshotLoader, SnapshotCreator};
use crate::gate::InputGate;
use crate::memory::{self, MemoryBankingUnit};
use crate::peripherals::ay::{AyRegister, NUM_REGISTERS};
use crate::ports::Ports;
use crate::video::BorderColor;
use crate::z80emu::Z80NMOS;

/// A ZX Spectrum 48k/128k machine state with the NMOS Z80 CPU.
pub type ZxMachineNMOS = ZxMachine<Z80NMOS>;

/// The state of the emulated machine.
///
/// Every snapshot operation pauses the asynchronous input sampling through the [InputGate]
/// for its whole duration.
#[derive(Clone, Debug, Default)]
pub struct ZxMachine<C> {
    cpu: C,
    memory: MemoryBankingUnit,
    ports: Ports,
    config: MachineConfig,
    gate: InputGate,
    quick: QuickSnapshot
}

impl<C: RegisterBank + Default> ZxMachine<C> {
    /// Creates a machine in the cold start state of the configured architecture.
    pub fn new(config: MachineConfig) -> Self {
        ZxMachine::with_cpu(C::default(), config)
    }
}

impl<C: RegisterBank> ZxMachine<C> {
    pub fn with_cpu(mut cpu: C, config: MachineConfig) -> Self {
        cpu.reset_registers();
        ZxMachine {
            cpu,
            memory: MemoryBankingUnit::new(config.arch),
            ports: Ports::default(),
            config,
            gate: InputGate::default(),
            quick: QuickSnapshot::default()
        }
    }

    #[inline]
    pub fn cpu(&self) -> &C {
        &self.cpu
    }

    #[inline]
    pub fn cpu_mut(&mut self) -> &mut C {
        &mut self.cpu
    }

    #[inline]
    pub fn memory(&self) -> &MemoryBankingUnit {
        &self.memory
    }

    #[inline]
    pub fn memory_mut(&mut self) -> &mut MemoryBankingUnit {
        &mut self.memory
    }

    #[inline]
    pub fn ports(&self) -> &Ports {
        &self.ports
    }

    #[inline]
    pub fn ports_mut(&mut self) -> &mut Ports {
        &mut self.ports
    }

    #[inline]
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    #[inline]
    pub fn architecture(&self) -> Architecture {
        self.config.arch
    }
    /// Changes the snapshot load policy for 48k snapshots on the 128k architecture.
    pub fn set_force_arch_on_load(&mut self, force: bool) {
        self.config.force_arch_on_load = force;
    }
    /// Returns the gate to be shared with the input sampling.
    #[inline]
    pub fn input_gate(&self) -> &InputGate {
        &self.gate
    }

    #[inline]
    pub fn border_color(&self) -> BorderColor {
        self.ports.border_color()
    }

    /// Installs a ROM image into the given ROM bank.
    pub fn load_rom(&mut self, rom_bank: usize, data: &[u8]) -> memory::Result<()> {
        self.memory.load_rom(rom_bank, data)
    }
    /// Performs a cold reset: the CPU registers, the paging latches and the output latches are
    /// reset. The memory content is preserved.
    pub fn reset(&mut self) {
        debug!("reset: {}", self.config.arch);
        self.cpu.reset_registers();
        self.memory.reset(self.config.arch);
        self.ports.reset();
    }
    /// Changes the running architecture, the memory content and the latches are preserved.
    pub fn switch_architecture(&mut self, arch: Architecture) {
        if self.config.arch != arch {
            debug!("architecture: {} -> {}", self.config.arch, arch);
            self.config.arch = arch;
        }
    }
    /// Reads data from the I/O `port`, `bus` is the floating bus value.
    #[inline]
    pub fn port_read(&self, port: u16, bus: u8) -> u8 {
        self.ports.read(&self.config, port, bus)
    }
    /// Writes `data` to the I/O `port`.
    #[inline]
    pub fn port_write(&mut self, port: u16, data: u8) {
        self.ports.write(&mut self.memory, &self.config, port, data)
    }

    /// Loads an **SNA** snapshot, see [formats::sna::load_sna].
    pub fn load_sna<R: Read + Seek>(&mut self, rd: R) -> Result<Architecture> {
        let _guard = self.gate.pause();
        formats::sna::load_sna(rd, self)
    }
    /// Saves an **SNA** snapshot, see [formats::sna::save_sna_with_fallback].
    pub fn save_sna<W: Write + Seek>(&mut self, wr: W) -> Result<()> {
        let _guard = self.gate.pause();
        formats::sna::save_sna_with_fallback(self, wr)
    }
    /// Loads a **Z80** snapshot of any version, see [formats::z80::load_z80].
    pub fn load_z80<R: Read>(&mut self, rd: R) -> Result<Architecture> {
        let _guard = self.gate.pause();
        formats::z80::load_z80(rd, self)
    }
    /// Saves a version 3 **Z80** snapshot, see [formats::z80::save_z80v3].
    pub fn save_z80<W: Write>(&mut self, wr: W) -> Result<()> {
        let _guard = self.gate.pause();
        formats::z80::save_z80v3(&*self, wr)
    }
    /// Saves the machine state into the in-memory quick snapshot slot.
    pub fn quick_save(&mut self) -> Result<()> {
        let _guard = self.gate.pause();
        let mut quick = mem::take(&mut self.quick);
        let res = quick.save(self);
        self.quick = quick;
        res
    }
    /// Restores the machine state from the in-memory quick snapshot slot.
    pub fn quick_load(&mut self) -> Result<Architecture> {
        let _guard = self.gate.pause();
        let quick = mem::take(&mut self.quick);
        let res = quick.load(self);
        self.quick = quick;
        res
    }
    /// Returns `true` if there is a quick snapshot to be restored.
    pub fn has_quick_snapshot(&self) -> bool {
        self.quick.is_available()
    }
}

impl<C: RegisterBank> SnapshotLoader for ZxMachine<C> {
    type Cpu = C;

    fn cpu_mut(&mut self) -> &mut C {
        &mut self.cpu
    }

    fn memory_mut(&mut self) -> &mut MemoryBankingUnit {
        &mut self.memory
    }

    fn set_border_color(&mut self, border: BorderColor) {
        self.ports.set_border_color(border);
    }

    fn runtime_architecture(&self) -> Architecture {
        self.config.arch
    }

    fn force_arch_on_load(&self) -> bool {
        self.config.force_arch_on_load
    }

    fn switch_architecture(&mut self, arch: Architecture) {
        ZxMachine::switch_architecture(self, arch)
    }

    fn setup_ay(&mut self, reg_selected: AyRegister, reg_values: &[u8;NUM_REGISTERS]) {
        if self.config.sound {
            self.ports.ay.set_registers(reg_selected, reg_values);
        }
    }
}

impl<C: RegisterBank> SnapshotCreator for ZxMachine<C> {
    type Cpu = C;

    fn cpu(&self) -> &C {
        &self.cpu
    }

    fn memory_ref(&self) -> &MemoryBankingUnit {
        &self.memory
    }

    fn memory_mut(&mut self) -> &mut MemoryBankingUnit {
        &mut self.memory
    }

    fn border_color(&self) -> BorderColor {
        self.ports.border_color()
    }

    fn architecture(&self) -> Architecture {
        self.config.arch
    }

    fn ay_state(&self) -> Option<(AyRegister, &[u8;NUM_REGISTERS])> {
        if self.config.sound {
            Some((self.ports.ay.selected_register(), self.ports.ay.registers()))
        }
        else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use crate::formats::SnapshotError;
    use super::*;

    #[test]
    fn machine_reset_works() {
        let mut machine = ZxMachineNMOS::new(MachineConfig::default());
        assert!(!machine.memory().is_paging_locked());
        machine.port_write(0x7FFD, 0b0011_0111);
        machine.port_write(0xFE, 3);
        machine.cpu_mut().set_program_counter(0x8000);
        machine.memory_mut().write_byte(0x8000, 0xAA);
        assert!(machine.memory().is_paging_locked());
        machine.reset();
        assert_eq!(machine.cpu().program_counter(), 0);
        assert!(!machine.memory().is_paging_locked());
        assert_eq!(machine.memory().bank_latch(), 0);
        assert_eq!(machine.border_color(), BorderColor::BLACK);
        assert_eq!(machine.memory().read_byte(0x8000), 0xAA);

        let mut machine = ZxMachineNMOS::new(MachineConfig::new(Architecture::Spectrum48));
        assert!(machine.memory().is_paging_locked());
        machine.reset();
        assert!(machine.memory().is_paging_locked());
    }

    #[test]
    fn machine_switch_architecture_preserves_state() {
        let mut machine = ZxMachineNMOS::new(MachineConfig::default());
        machine.port_write(0x7FFD, 0b0001_0110);
        machine.memory_mut().write_byte(0xC000, 0x66);
        machine.switch_architecture(Architecture::Spectrum48);
        assert_eq!(machine.architecture(), Architecture::Spectrum48);
        assert_eq!(machine.memory().bank_latch(), 6);
        assert_eq!(machine.memory().rom_in_use(), 1);
        assert_eq!(machine.memory().read_byte(0xC000), 0x66);
    }

    #[test]
    fn machine_snapshots_hold_input_gate() {
        struct GateWatcher {
            gate: InputGate,
            paused: bool
        }
        impl Write for GateWatcher {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.paused &= self.gate.is_paused();
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
        }
        let mut machine = ZxMachineNMOS::new(MachineConfig::default());
        let mut watcher = GateWatcher { gate: machine.input_gate().clone(), paused: true };
        machine.save_z80(&mut watcher).unwrap();
        assert!(watcher.paused);
        assert!(!machine.input_gate().is_paused());
        let err = machine.load_sna(Cursor::new(vec![0u8;10])).unwrap_err();
        assert!(matches!(err, SnapshotError::Size {..}));
        assert!(!machine.input_gate().is_paused());
    }

    #[test]
    fn machine_quick_snapshot_works() {
        let mut machine = ZxMachineNMOS::new(MachineConfig::default());
        assert!(!machine.has_quick_snapshot());
        assert!(matches!(machine.quick_load(), Err(SnapshotError::NothingToLoad)));
        machine.port_write(0x7FFD, 3);
        machine.port_write(0xFE, 6);
        machine.memory_mut().write_byte(0xC000, 0x33);
        machine.cpu_mut().set_program_counter(0x4321);
        machine.quick_save().unwrap();
        assert!(machine.has_quick_snapshot());

        machine.reset();
        machine.memory_mut().ram_bank_mut(3).unwrap()[0] = 0;
        assert_eq!(machine.quick_load().unwrap(), Architecture::Spectrum128);
        assert_eq!(machine.cpu().program_counter(), 0x4321);
        assert_eq!(machine.memory().bank_latch(), 3);
        assert_eq!(machine.memory().read_byte(0xC000), 0x33);
        assert_eq!(machine.border_color(), BorderColor::YELLOW);
        assert!(machine.has_quick_snapshot());
    }

    #[test]
    fn machine_ay_follows_sound_config() {
        let mut machine = ZxMachineNMOS::new(MachineConfig::default().with_sound(false));
        assert!(SnapshotCreator::ay_state(&machine).is_none());
        machine.setup_ay(AyRegister::EnvShape, &[1;NUM_REGISTERS]);
        assert_eq!(machine.ports().ay.registers(), &[0;NUM_REGISTERS]);

        let mut machine = ZxMachineNMOS::new(MachineConfig::default());
        machine.setup_ay(AyRegister::EnvShape, &[1;NUM_REGISTERS]);
        let (reg, regs) = SnapshotCreator::ay_state(&machine).unwrap();
        assert_eq!(reg, AyRegister::EnvShape);
        assert_eq!(regs, &[1;NUM_REGISTERS]);
    }
}
