/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of ZXSTATE, a Rust library for ZX Spectrum machine state.

    For the full copyright notice, see the lib.rs file.
*/
//! An in-memory **SNA** snapshot slot.
use std::io::Cursor;

use log::debug;

use zxstate_core::arch::Architecture;

use crate::{SnapshotError, Result};
use crate::sna::{load_sna, save_sna, sna_length, SaveMode};
use crate::snapshot::{SnapshotLoader, SnapshotCreator};

/// Holds a single quick snapshot in the **SNA** format.
///
/// The buffer is reallocated only when the size required by the architecture changes.
#[derive(Clone, Debug, Default)]
pub struct QuickSnapshot {
    buffer: Vec<u8>
}

impl QuickSnapshot {
    pub fn new() -> Self {
        QuickSnapshot::default()
    }
    /// Returns `true` if a snapshot is available to be loaded.
    pub fn is_available(&self) -> bool {
        !self.buffer.is_empty()
    }
    /// Returns the architecture of the stored snapshot.
    pub fn architecture(&self) -> Option<Architecture> {
        match self.buffer.len() as u64 {
            0 => None,
            len if len == sna_length(Architecture::Spectrum48) => Some(Architecture::Spectrum48),
            _ => Some(Architecture::Spectrum128)
        }
    }
    /// Releases the snapshot buffer.
    pub fn clear(&mut self) {
        self.buffer = Vec::new();
    }
    /// Saves the state of `snapshot` replacing the previously stored one.
    ///
    /// # Errors
    /// [SnapshotError::Allocation] if the buffer could not be sized. In this case the previous
    /// snapshot is discarded.
    pub fn save<C: SnapshotCreator>(&mut self, snapshot: &mut C) -> Result<()> {
        let size = sna_length(snapshot.architecture()) as usize;
        if self.buffer.len() != size {
            debug!("quick snapshot: allocating {} bytes", size);
            self.buffer = Vec::new();
            self.buffer.try_reserve_exact(size).map_err(|_| SnapshotError::Allocation(size))?;
        }
        self.buffer.clear();
        let res = save_sna(snapshot, Cursor::new(&mut self.buffer), SaveMode::Block);
        if res.is_err() {
            self.buffer.clear();
        }
        res
    }
    /// Restores the stored snapshot into `loader`.
    ///
    /// Returns the architecture of the restored snapshot.
    ///
    /// # Errors
    /// [SnapshotError::NothingToLoad] if no snapshot has been saved yet.
    pub fn load<L: SnapshotLoader>(&self, loader: &mut L) -> Result<Architecture> {
        if self.buffer.is_empty() {
            return Err(SnapshotError::NothingToLoad)
        }
        load_sna(Cursor::new(&self.buffer[..]), loader)
    }
}

#[cfg(test)]
mod tests {
    use zxstate_core::cpu::RegisterBank;
    use crate::snapshot::tests::TestMachine;
    use super::*;

    #[test]
    fn quick_snapshot_works() {
        let mut quick = QuickSnapshot::new();
        assert!(!quick.is_available());
        assert_eq!(quick.architecture(), None);
        let mut machine = TestMachine::new(Architecture::Spectrum128);
        assert!(matches!(quick.load(&mut machine), Err(SnapshotError::NothingToLoad)));

        machine.cpu.set_program_counter(0x1234);
        machine.mem.write_byte(0xC000, 42);
        quick.save(&mut machine).unwrap();
        assert!(quick.is_available());
        assert_eq!(quick.architecture(), Some(Architecture::Spectrum128));
        assert_eq!(quick.buffer.len() as u64, sna_length(Architecture::Spectrum128));

        machine.cpu.set_program_counter(0);
        machine.mem.write_byte(0xC000, 0);
        assert_eq!(quick.load(&mut machine).unwrap(), Architecture::Spectrum128);
        assert_eq!(machine.cpu.program_counter(), 0x1234);
        assert_eq!(machine.mem.read_byte(0xC000), 42);
        // can be loaded many times
        quick.load(&mut machine).unwrap();
        assert_eq!(machine.cpu.program_counter(), 0x1234);

        let capacity = quick.buffer.capacity();
        quick.save(&mut machine).unwrap();
        assert_eq!(quick.buffer.capacity(), capacity);

        let mut machine = TestMachine::new(Architecture::Spectrum48);
        machine.cpu.set_stack_pointer(0x8000);
        quick.save(&mut machine).unwrap();
        assert_eq!(quick.architecture(), Some(Architecture::Spectrum48));
        assert_eq!(quick.buffer.len() as u64, sna_length(Architecture::Spectrum48));

        quick.clear();
        assert!(!quick.is_available());
        assert!(matches!(quick.load(&mut machine), Err(SnapshotError::NothingToLoad)));
    }
}
