/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of ZXSTATE, a Rust library for ZX Spectrum machine state.

    For the full copyright notice, see the lib.rs file.
*/
//! Runtime configuration of the emulated machine.
#[cfg(feature = "snapshot")]
use serde::{Serialize, Deserialize};

use crate::arch::Architecture;

/// The machine configuration.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "snapshot", serde(default, rename_all = "camelCase"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MachineConfig {
    /// The architecture of the running machine.
    pub arch: Architecture,
    /// If `true` the running machine switches to the architecture of a loaded 48k snapshot,
    /// otherwise the 48k BASIC ROM is paged in and the 128k architecture is kept.
    pub force_arch_on_load: bool,
    /// Is the AY-3-8912 sound processor present.
    pub sound: bool,
    /// Is the EAR input line connected.
    pub ear_input: bool
}

impl Default for MachineConfig {
    fn default() -> Self {
        MachineConfig {
            arch: Architecture::default(),
            force_arch_on_load: false,
            sound: true,
            ear_input: false
        }
    }
}

impl MachineConfig {
    pub fn new(arch: Architecture) -> Self {
        MachineConfig { arch, ..MachineConfig::default() }
    }

    pub fn with_force_arch_on_load(mut self, force: bool) -> Self {
        self.force_arch_on_load = force;
        self
    }

    pub fn with_sound(mut self, sound: bool) -> Self {
        self.sound = sound;
        self
    }

    pub fn with_ear_input(mut self, ear_input: bool) -> Self {
        self.ear_input = ear_input;
        self
    }
}
