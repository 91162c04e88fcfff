/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of ZXSTATE, a Rust library for ZX Spectrum machine state.

    For the full copyright notice, see the lib.rs file.
*/
//! Machine architecture and the snapshot architecture reconciliation policy.
use core::fmt;
use core::str::FromStr;

#[cfg(feature = "snapshot")]
use serde::{Serialize, Deserialize};

/// The emulated machine's memory architecture.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Architecture {
    /// 48k: ROM 0, RAM 5, RAM 2 and RAM 0 mapped, no paging.
    #[cfg_attr(feature = "snapshot", serde(rename = "48K"))]
    Spectrum48,
    /// 128k: switchable ROM and top RAM bank.
    #[cfg_attr(feature = "snapshot", serde(rename = "128K"))]
    Spectrum128
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseArchitectureError;

/// Changes to be applied to the machine after a snapshot has been loaded.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// The runtime architecture should be switched to this one.
    pub switch_to: Option<Architecture>,
    /// The ROM bank to be paged in at `0x0000`.
    pub rom_in_use: Option<u8>
}

impl Default for Architecture {
    fn default() -> Self {
        Architecture::Spectrum128
    }
}

impl Architecture {
    /// Returns the number of RAM banks addressable by this architecture.
    pub fn ram_bank_count(self) -> usize {
        match self {
            Architecture::Spectrum48 => 3,
            Architecture::Spectrum128 => 8
        }
    }
    /// Returns `true` for the 128k architecture.
    #[inline]
    pub fn is_128k(self) -> bool {
        self == Architecture::Spectrum128
    }
    /// The paging lock state after a cold reset.
    ///
    /// The 48k machine has no paging hardware, so its latches are permanently locked.
    #[inline]
    pub fn initial_paging_lock(self) -> bool {
        self == Architecture::Spectrum48
    }
}

/// Decides what should happen to the running machine after a snapshot made for the `snapshot`
/// architecture was loaded into a machine running the `runtime` architecture.
///
/// * 128k runtime, 48k snapshot: ROM 1 (48k BASIC) is paged in, or if `force` is `true`
///   the runtime is switched to 48k with ROM 0.
/// * 48k runtime, 128k snapshot: the runtime is switched to 128k with ROM 1.
/// * Otherwise nothing changes.
pub fn reconcile(runtime: Architecture, snapshot: Architecture, force: bool) -> Reconciliation {
    use Architecture::*;
    match (runtime, snapshot) {
        (Spectrum128, Spectrum48) if force => Reconciliation {
            switch_to: Some(Spectrum48),
            rom_in_use: Some(0)
        },
        (Spectrum128, Spectrum48) => Reconciliation {
            switch_to: None,
            rom_in_use: Some(1)
        },
        (Spectrum48, Spectrum128) => Reconciliation {
            switch_to: Some(Spectrum128),
            rom_in_use: Some(1)
        },
        _ => Reconciliation::default()
    }
}

impl From<Architecture> for &'static str {
    fn from(arch: Architecture) -> &'static str {
        match arch {
            Architecture::Spectrum48 => "48K",
            Architecture::Spectrum128 => "128K"
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(<&str>::from(*self))
    }
}

impl std::error::Error for ParseArchitectureError {}

impl fmt::Display for ParseArchitectureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unrecognized machine architecture")
    }
}

impl FromStr for Architecture {
    type Err = ParseArchitectureError;
    /// Parses `48K` or `128K` using case insensitive matching.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        if name.eq_ignore_ascii_case("48k") {
            Ok(Architecture::Spectrum48)
        }
        else if name.eq_ignore_ascii_case("128k") {
            Ok(Architecture::Spectrum128)
        }
        else {
            Err(ParseArchitectureError)
        }
    }
}
