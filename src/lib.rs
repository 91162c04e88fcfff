/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of ZXSTATE, a Rust library for ZX Spectrum machine state.

    ZXSTATE is free software: you can redistribute it and/or modify it under
    the terms of the GNU Lesser General Public License (LGPL) as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    ZXSTATE is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Lesser General Public License for more details.

    You should have received a copy of the GNU Lesser General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.

    Author contact information: see Cargo.toml file, section [package.authors].
*/
//! ZXSTATE is a library for the ZX Spectrum 48k/128k machine state: the memory banking unit,
//! the I/O port decoding and the persistence of the machine state in the **SNA** and **Z80**
//! snapshot formats.
//!
//! The [ZxMachine] binds all of the parts together:
//!
//! ```
//! use zxstate::{ZxMachineNMOS, MachineConfig, arch::Architecture};
//!
//! let mut machine = ZxMachineNMOS::new(MachineConfig::new(Architecture::Spectrum128));
//! machine.port_write(0x7FFD, 0b0001_0011);
//! assert_eq!(machine.memory().bank_latch(), 3);
//! let mut snapshot = Vec::new();
//! machine.save_z80(&mut snapshot).unwrap();
//! machine.reset();
//! let arch = machine.load_z80(&snapshot[..]).unwrap();
//! assert_eq!(arch, Architecture::Spectrum128);
//! assert_eq!(machine.memory().bank_latch(), 3);
//! ```
pub use zxstate_core::{arch, chip, cpu, memory, video, z80emu};
pub use zxstate_peripherals as peripherals;
pub use zxstate_formats as formats;

pub mod config;
pub mod gate;
pub mod machine;
pub mod ports;

pub use config::MachineConfig;
pub use machine::{ZxMachine, ZxMachineNMOS};
