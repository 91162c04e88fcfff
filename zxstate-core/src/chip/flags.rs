/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of ZXSTATE, a Rust library for ZX Spectrum machine state.

    For the full copyright notice, see the lib.rs file.
*/
use core::fmt;
use core::convert::TryFrom;

#[cfg(feature = "snapshot")]
use serde::{Serialize, Deserialize};

use bitflags::bitflags;

/// Creates `fn from_data(data: u8) -> Self` method for a [::bitflags] type.
///
/// The created function will avoid using `from_bits_truncate()` which can be pretty slow.
#[macro_export]
macro_rules! bitflags_from_data {
    ($bitflags:ty) => {
        impl $bitflags {
            /// Create flags from raw bits in `data` by truncating unused bits.
            #[inline]
            pub fn from_data(data: u8) -> Self {
                <$bitflags>::from_bits_retain(data) & <$bitflags>::all()
            }
        }
    };
}
pub use bitflags_from_data;

/// A macro for creating complex mask constants that won't get in the way of bitflags.
#[macro_export]
macro_rules! bitflags_masks {
    (@ pub const $mask:ident = $($flag:ident)|*;) => {
        pub const $mask: Self = Self::from_bits_retain($(Self::$flag.bits())|*);
    };
    (@#[doc = $doc:expr] pub const $mask:ident = $($flag:ident)|*;) => {
        #[doc = $doc] pub const $mask: Self = Self::from_bits_retain($(Self::$flag.bits())|*);
    };
    ($bitflags:ty {$($(#[doc = $doc:expr])? pub const $mask:ident = $($flag:ident)|*;)*}) => {
        impl $bitflags {$(
            bitflags_masks!(@$(#[doc = $doc])? pub const $mask = $($flag)|*;);
        )*}
    };
}
pub use bitflags_masks;

/// A macro for testing created flags, whether all bits up to `$nbits` are defined
/// and if all bitflags are a single bit-flags.
#[macro_export]
macro_rules! test_bitflags_all_bits_defined_no_masks {
    ($ty:ty, $nbits:expr) => {{
        type BITS = <$ty as bitflags::Flags>::Bits;
        let flags = <$ty as bitflags::Flags>::FLAGS;
        let mut last = 0;
        for f in flags.into_iter() {
            let bits = f.value().bits();
            assert!(bits == 0 || bits.is_power_of_two());
            assert!(bits >= last);
            last = bits;
        }
        let all: BITS = 1;
        let all = all.checked_shl($nbits - 1).expect("overflowed");
        let all = all | (all - 1);
        assert_eq!(<$ty>::all().bits(), all);
        for bit in 0..$nbits {
            assert_eq!(<$ty>::from_bits_truncate(1 << bit).bits(), 1 << bit);
        }
    }};
}
pub use test_bitflags_all_bits_defined_no_masks;

bitflags! {
    /// Packed auxiliary output lines driven by the ULA port.
    ///
    /// Bits `b3-b4` of the [UlaPortFlags] at the position of `b0-b1`.
    #[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
    #[cfg_attr(feature = "snapshot", serde(try_from = "u8", into = "u8"))]
    #[derive(Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
    pub struct EarMic: u8 {
        const MIC    = 0b01;
        const EAR    = 0b10;
    }
}
bitflags_from_data!(EarMic);
bitflags_masks!(EarMic {
    pub const EARMIC = EAR|MIC;
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TryFromU8EarMicError(pub u8);

bitflags! {
    /// ULA port flags.
    ///
    /// Any even-numbered I/O port (`xxxx_xxxx_xxxx_xxx0`):
    ///
    /// | Dir | b7  | b6  | b5  | b4  | b3  | b2  | b1  | b0  |
    /// |-----|-----|-----|-----|-----|-----|-----|-----|-----|
    /// | IN  |     | EAR |     | KB4 | KB3 | KB2 | KB1 | KB0 |
    /// | OUT |     |     |     | EAR | MIC | BO2 | BO1 | BO0 |
    ///
    /// Border color: `BO2 * 4 + BO1 * 2 + BO0`.
    ///
    /// The keyboard half-rows are selected by zero bits of the upper 8 bits of the I/O port.
    /// 0 - key pressed, 1 - key not pressed.
    #[derive(Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
    pub struct UlaPortFlags: u8 {
        const BORDER0       = 0b0000_0001;
        const BORDER1       = 0b0000_0010;
        const BORDER2       = 0b0000_0100;
        const MIC_OUT       = 0b0000_1000;
        const EAR_OUT       = 0b0001_0000;
        const UNUSED5       = 0b0010_0000;
        const EAR_IN        = 0b0100_0000;
        const UNUSED7       = 0b1000_0000;
    }
}
bitflags_from_data!(UlaPortFlags);
bitflags_masks!(UlaPortFlags {
    pub const BORDER_MASK = BORDER2|BORDER1|BORDER0;
    pub const EAR_MIC_MASK = MIC_OUT|EAR_OUT;
    pub const KEYBOARD_MASK = EAR_MIC_MASK|BORDER_MASK;
    pub const UNUSED_MASK = UNUSED5|UNUSED7;
});

bitflags! {
    /// 128k memory control flags.
    ///
    /// Any I/O port matching: `01xx_xxxx_xxxx_xx0x` (`0x7ffd`).
    ///
    /// | Dir | b7  | b6  | b5  | b4  | b3  | b2  | b1  | b0  |
    /// |-----|-----|-----|-----|-----|-----|-----|-----|-----|
    /// | OUT |     |     | LCK | ROM | SCR | RB2 | RB1 | RB0 |
    ///
    /// RAM bank: `RB2 * 4 + RB1 * 2 + RB0`.
    ///
    /// SCR bank: `0 in RAM5, 1 in RAM7`.
    ///
    /// | Start  | Top    | Memory Bank |
    /// |--------|--------|-------------|
    /// | 0x0000 | 0x3FFF | ROM0 - ROM3 |
    /// | 0x4000 | 0x7FFF | RAM5        |
    /// | 0x8000 | 0xBFFF | RAM2        |
    /// | 0xC000 | 0XFFFF | RAM0 - RAM7 |
    ///
    /// The same layout is used by the control byte of the 128k **SNA** format
    /// and the byte 35 of the **Z80** extended header.
    #[derive(Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
    pub struct MemCtrlFlags: u8 {
        const RAM_BANK0     = 0b00_0001;
        const RAM_BANK1     = 0b00_0010;
        const RAM_BANK2     = 0b00_0100;
        const SCREEN_BANK   = 0b00_1000;
        const ROM_BANK      = 0b01_0000;
        const LOCK_MMU      = 0b10_0000;
    }
}
bitflags_from_data!(MemCtrlFlags);
bitflags_masks!(MemCtrlFlags {
    pub const RAM_BANK_MASK = RAM_BANK2|RAM_BANK1|RAM_BANK0;
});

bitflags! {
    /// Extended (secondary) memory control flags.
    ///
    /// Any I/O port matching: `0001_xxxx_xxxx_xx0x` (`0x1ffd`).
    ///
    /// | Dir | b7  | b6  | b5  | b4  | b3  | b2  | b1  | b0  |
    /// |-----|-----|-----|-----|-----|-----|-----|-----|-----|
    /// | OUT |     |     |     | PRT | DSK | ROH |     | EXT |
    ///
    /// ROM bank: `ROH * 2 + ROM` where `ROM` is the [MemCtrlFlags::ROM_BANK] latch.
    #[derive(Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
    pub struct ExtCtrlFlags: u8 {
        const EXT_PAGING       = 0b0_0001;
        const PAGE_LAYOUT1     = 0b0_0010;
        const ROM_BANK_HI      = 0b0_0100;
        const DISC_MOTOR       = 0b0_1000;
        const PRINTER_STROBE   = 0b1_0000;
    }
}
bitflags_from_data!(ExtCtrlFlags);

impl std::error::Error for TryFromU8EarMicError {}

impl fmt::Display for TryFromU8EarMicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "converted integer ({}) out of range for `EarMic`", self.0)
    }
}

impl TryFrom<u8> for EarMic {
    type Error = TryFromU8EarMicError;
    fn try_from(earmic: u8) -> core::result::Result<Self, Self::Error> {
        EarMic::from_bits(earmic).ok_or(TryFromU8EarMicError(earmic))
    }
}

impl From<EarMic> for u8 {
    fn from(earmic: EarMic) -> u8 {
        earmic.bits()
    }
}

impl From<UlaPortFlags> for EarMic {
    #[inline]
    fn from(flags: UlaPortFlags) -> Self {
        EarMic::from_bits_truncate((flags & UlaPortFlags::EAR_MIC_MASK).bits() >> 3)
    }
}

impl MemCtrlFlags {
    /// Returns modified flags with the last memory page RAM bank index set to `bank`.
    pub fn with_last_ram_page_bank(mut self, bank: usize) -> Self {
        self.remove(MemCtrlFlags::RAM_BANK_MASK);
        self.insert(MemCtrlFlags::from_bits_retain(bank as u8) & MemCtrlFlags::RAM_BANK_MASK);
        self
    }
    /// Returns a RAM bank index mapped at the last memory page.
    pub fn last_ram_page_bank(self) -> usize {
        (self & MemCtrlFlags::RAM_BANK_MASK).bits().into()
    }
    /// Returns the ROM latch bit as a ROM bank index: 0 or 1.
    pub fn rom_page_bank(self) -> usize {
        self.intersects(MemCtrlFlags::ROM_BANK).into()
    }
    /// Returns `true` if a shadow screen bank bit is 1. Otherwise returns `false`.
    pub fn is_shadow_screen(self) -> bool {
        self.intersects(MemCtrlFlags::SCREEN_BANK)
    }
    /// Returns `true` if a mmu lock bit is 1. Otherwise returns `false`.
    pub fn is_mmu_locked(self) -> bool {
        self.intersects(MemCtrlFlags::LOCK_MMU)
    }
}

impl ExtCtrlFlags {
    /// Returns `true` if the extended paging mode bit is 1.
    pub fn has_ext_paging(self) -> bool {
        self.intersects(ExtCtrlFlags::EXT_PAGING)
    }
    /// Returns the high ROM bank bit as a ROM bank index offset: 0 or 2.
    pub fn rom_page_bank_hi(self) -> usize {
        ((self & ExtCtrlFlags::ROM_BANK_HI).bits() >> 1).into()
    }
}
