/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of ZXSTATE, a Rust library for ZX Spectrum machine state.

    For the full copyright notice, see the lib.rs file.
*/
//! The keyboard matrix of 8 half-rows, 5 keys each.
//!
//! | Half-row | Selected by `A8-A15` | Keys (bit 0 - bit 4)     |
//! |----------|----------------------|--------------------------|
//! | 0        | `0xFE`               | CAPS SHIFT, Z, X, C, V   |
//! | 1        | `0xFD`               | A, S, D, F, G            |
//! | 2        | `0xFB`               | Q, W, E, R, T            |
//! | 3        | `0xF7`               | 1, 2, 3, 4, 5            |
//! | 4        | `0xEF`               | 0, 9, 8, 7, 6            |
//! | 5        | `0xDF`               | P, O, I, U, Y            |
//! | 6        | `0xBF`               | ENTER, L, K, J, H        |
//! | 7        | `0x7F`               | SPACE, SYM SHIFT, M, N, B|
#[cfg(feature = "snapshot")]
use serde::{Serialize, Deserialize};

pub const NUM_HALF_ROWS: usize = 8;

/// Selects one of the two key state layers of [KeyboardMatrix].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyLayer {
    /// Keys pressed on the keyboard.
    Keyboard,
    /// Keys pressed by controllers mapped onto the keyboard.
    Mapped
}

/// The state of the keyboard half-rows.
///
/// A bit is 0 when a key is pressed and 1 when released. The keyboard and the mapped layers are
/// combined with a bitwise AND when read, so a key is pressed if it's pressed in any layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
pub struct KeyboardMatrix {
    keys: [u8; NUM_HALF_ROWS],
    mapped: [u8; NUM_HALF_ROWS]
}

impl Default for KeyboardMatrix {
    fn default() -> Self {
        KeyboardMatrix { keys: [!0; NUM_HALF_ROWS], mapped: [!0; NUM_HALF_ROWS] }
    }
}

impl KeyboardMatrix {
    fn layer_mut(&mut self, layer: KeyLayer) -> &mut [u8; NUM_HALF_ROWS] {
        match layer {
            KeyLayer::Keyboard => &mut self.keys,
            KeyLayer::Mapped => &mut self.mapped
        }
    }
    /// Presses or releases a key at bit `key` (0 - 4) of `half_row` (0 - 7).
    ///
    /// Out of range arguments are ignored.
    pub fn set_key(&mut self, layer: KeyLayer, half_row: usize, key: u8, pressed: bool) {
        if key >= 5 {
            return
        }
        if let Some(row) = self.layer_mut(layer).get_mut(half_row) {
            if pressed {
                *row &= !(1 << key);
            }
            else {
                *row |= 1 << key;
            }
        }
    }
    /// Sets the raw state of a whole half-row.
    pub fn set_half_row(&mut self, layer: KeyLayer, half_row: usize, state: u8) {
        if let Some(row) = self.layer_mut(layer).get_mut(half_row) {
            *row = state;
        }
    }
    /// Returns the combined state of a single half-row.
    pub fn half_row(&self, half_row: usize) -> u8 {
        match (self.keys.get(half_row), self.mapped.get(half_row)) {
            (Some(keys), Some(mapped)) => keys & mapped,
            _ => !0
        }
    }
    /// Releases all keys in the given layer.
    pub fn release_all(&mut self, layer: KeyLayer) {
        *self.layer_mut(layer) = [!0; NUM_HALF_ROWS];
    }
    /// Reads the keyboard as seen by the ULA port with the upper address byte `high`.
    ///
    /// Every half-row whose selection bit in `high` is 0 is ANDed into the result.
    /// If no half-row is selected returns `0xFF`.
    pub fn read_rows(&self, high: u8) -> u8 {
        (0..NUM_HALF_ROWS).filter(|&row| high & (1 << row) == 0)
                          .fold(!0, |res, row| res & self.half_row(row))
    }
}
