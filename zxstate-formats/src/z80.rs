/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of ZXSTATE, a Rust library for ZX Spectrum machine state.

    For the full copyright notice, see the lib.rs file.
*/
//! **Z80** snapshot format utilities.
//!
//! See the format reference on [World of Spectrum](https://worldofspectrum.org/faq/reference/z80format.htm).
//!
//! ## Implementation specifics
//!
//! When reading from the **Z80** file:
//!
//! * Hardware modes other than 48k, 128k and SamRam are loaded as 128k.
//! * SamRam snapshots are loaded as 48k, SamRam ROM and RAM blocks are skipped.
//! * Memory blocks with unknown page numbers are skipped.
//! * Truncated memory blocks are loaded as far as the data goes.
//! * The `0x1ffd` port value of the 55 bytes long extended header is restored on 128k.
//!
//! When writing to the **Z80** file:
//!
//! * ROMs are not being saved.
//! * Version 2 files are never created.
mod common;
mod compress;
mod decompress;
mod loader;
mod saver;

pub use loader::*;
pub use saver::*;
