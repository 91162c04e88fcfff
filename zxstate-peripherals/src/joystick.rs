/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of ZXSTATE, a Rust library for ZX Spectrum machine state.

    For the full copyright notice, see the lib.rs file.
*/
//! A joystick interface and the Kempston joystick.
use bitflags::bitflags;

#[cfg(feature = "snapshot")]
use serde::{Serialize, Deserialize};

bitflags! {
    /// Flags for reading and writing the current stick direction.
    /// * Bit = 1 a direction is active.
    /// * Bit = 0 a direction is inactive.
    #[derive(Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
    pub struct Directions: u8 {
        const UP    = 0b0001;
        const RIGHT = 0b0010;
        const DOWN  = 0b0100;
        const LEFT  = 0b1000;
    }
}

/// An interface for providing user input data for a joystick device.
pub trait JoystickInterface {
    /// Press or release a "fire" button.
    fn fire(&mut self, pressed: bool);
    /// Returns `true` if the "fire" button is being pressed, otherwise returns `false`.
    fn get_fire(&self) -> bool;
    /// Changes the stick direction using provided flags.
    fn set_directions(&mut self, dir: Directions);
    /// Returns the current stick direction.
    fn get_directions(&self) -> Directions;
}

                      // 000F_UDLR
const FIRE_MASK:  u8 = 0b0001_0000;
const RIGHT_MASK: u8 = 0b0000_0001;
const LEFT_MASK:  u8 = 0b0000_0010;
const DOWN_MASK:  u8 = 0b0000_0100;
const UP_MASK:    u8 = 0b0000_1000;

/// The Kempston joystick.
///
/// Decoded at any I/O port matching `xxxx_xxxx_000x_xxxx`, the input register is active high.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
pub struct KempstonJoystick {
    data: u8
}

impl KempstonJoystick {
    /// Returns the fixed input register.
    #[inline]
    pub fn port_read(&self) -> u8 {
        self.data
    }
}

impl JoystickInterface for KempstonJoystick {
    fn fire(&mut self, pressed: bool) {
        if pressed {
            self.data |= FIRE_MASK;
        }
        else {
            self.data &= !FIRE_MASK;
        }
    }

    fn get_fire(&self) -> bool {
        self.data & FIRE_MASK == FIRE_MASK
    }

    fn set_directions(&mut self, dir: Directions) {
        self.data = (self.data & FIRE_MASK) |
            if dir.intersects(Directions::UP)    { UP_MASK    } else { 0 } |
            if dir.intersects(Directions::RIGHT) { RIGHT_MASK } else { 0 } |
            if dir.intersects(Directions::DOWN)  { DOWN_MASK  } else { 0 } |
            if dir.intersects(Directions::LEFT)  { LEFT_MASK  } else { 0 };
    }

    fn get_directions(&self) -> Directions {
        let mut dir = Directions::empty();
        dir.set(Directions::UP, self.data & UP_MASK != 0);
        dir.set(Directions::RIGHT, self.data & RIGHT_MASK != 0);
        dir.set(Directions::DOWN, self.data & DOWN_MASK != 0);
        dir.set(Directions::LEFT, self.data & LEFT_MASK != 0);
        dir
    }
}
