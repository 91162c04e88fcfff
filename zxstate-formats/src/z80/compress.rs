/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of ZXSTATE, a Rust library for ZX Spectrum machine state.

    For the full copyright notice, see the lib.rs file.
*/
use std::io::{Write, Result};

const ESCAPE: u8 = 0xED;
const MAX_RUN: usize = u8::MAX as usize;

/// Writes `data` encoded with the **Z80** run-length encoding into `wr`.
///
/// Runs of at least 5 identical bytes and runs of at least 2 `ED` bytes become
/// `ED ED count value`. A byte directly following a single `ED` is always written verbatim.
pub(super) fn compress_write_all<W: Write>(data: &[u8], mut wr: W) -> Result<()> {
    let mut index = 0;
    let mut pos = 0;
    while let Some(&byte) = data.get(pos) {
        let run = data[pos..].iter().take(MAX_RUN).take_while(|&&b| b == byte).count();
        if run >= 5 || (byte == ESCAPE && run >= 2) {
            if pos > index {
                wr.write_all(&data[index..pos])?;
            }
            wr.write_all(&[ESCAPE, ESCAPE, run as u8, byte])?;
            pos += run;
            index = pos;
        }
        else if byte == ESCAPE {
            pos = (pos + 2).min(data.len());
        }
        else {
            pos += run;
        }
    }
    if index < data.len() {
        wr.write_all(&data[index..])?;
    }
    Ok(())
}
