/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of ZXSTATE, a Rust library for ZX Spectrum machine state.

    For the full copyright notice, see the lib.rs file.
*/
use core::fmt;
use std::io;

use zxstate_core::memory::MemoryError;

/// Errors reported when loading or saving snapshots.
#[non_exhaustive]
#[derive(Debug)]
pub enum SnapshotError {
    /// An unrecognized version, length marker or field value.
    Format(&'static str),
    /// The source is shorter than the minimum valid size.
    Size { min: u64, found: u64 },
    /// A short read or write or any other error of the source or sink.
    Io(io::Error),
    /// A snapshot buffer of the given size could not be allocated.
    Allocation(usize),
    /// There is no quick snapshot to be restored.
    NothingToLoad
}

/// A type returned by snapshot loading and saving functions.
pub type Result<T> = core::result::Result<T, SnapshotError>;

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Io(err) => Some(err),
            _ => None
        }
    }
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Format(msg) => write!(f, "invalid snapshot format: {}", msg),
            SnapshotError::Size { min, found } => {
                write!(f, "snapshot too short: expected at least {} bytes, found {}", min, found)
            }
            SnapshotError::Io(err) => err.fmt(f),
            SnapshotError::Allocation(size) => {
                write!(f, "could not allocate {} bytes for a snapshot", size)
            }
            SnapshotError::NothingToLoad => f.write_str("no snapshot to load")
        }
    }
}

impl From<io::Error> for SnapshotError {
    fn from(err: io::Error) -> Self {
        SnapshotError::Io(err)
    }
}

impl From<MemoryError> for SnapshotError {
    fn from(err: MemoryError) -> Self {
        SnapshotError::Io(err.into())
    }
}

impl From<SnapshotError> for io::Error {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::Io(err) => err,
            e@SnapshotError::Allocation(..) => io::Error::new(io::ErrorKind::OutOfMemory, e),
            e@SnapshotError::NothingToLoad => io::Error::new(io::ErrorKind::NotFound, e),
            e => io::Error::new(io::ErrorKind::InvalidData, e)
        }
    }
}

impl SnapshotError {
    /// Returns `true` if the error was caused by a short write or another sink error.
    pub fn is_io(&self) -> bool {
        matches!(self, SnapshotError::Io(..))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_error_conversions() {
        let err = SnapshotError::from(io::Error::new(io::ErrorKind::WriteZero, "short write"));
        assert!(err.is_io());
        assert_eq!(io::Error::from(err).kind(), io::ErrorKind::WriteZero);
        let err = SnapshotError::Size { min: 49179, found: 100 };
        assert_eq!(err.to_string(), "snapshot too short: expected at least 49179 bytes, found 100");
        assert_eq!(io::Error::from(err).kind(), io::ErrorKind::InvalidData);
        assert_eq!(io::Error::from(SnapshotError::Allocation(1)).kind(), io::ErrorKind::OutOfMemory);
        assert_eq!(io::Error::from(SnapshotError::NothingToLoad).kind(), io::ErrorKind::NotFound);
        assert_eq!(SnapshotError::Format("bad").to_string(), "invalid snapshot format: bad");
    }
}
