/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of ZXSTATE, a Rust library for ZX Spectrum machine state.

    For the full copyright notice, see the lib.rs file.
*/
use std::io::{Read, Result};
use memchr::memchr;

const ESCAPE: u8 = 0xED;

/// Decodes the **Z80** run-length encoded memory block.
///
/// `ED ED count value` expands to `count` copies of `value`, any other byte is copied verbatim.
/// The decoder is lenient: an incomplete escape sequence (`ED ED` or `ED ED count`) at the end
/// of data is discarded, but a lone trailing `ED` is emitted as a literal `ED` byte instead of
/// being dropped, so data ending with a single `ED` byte is not shortened.
pub(super) struct RleDecoder<'a> {
    data: &'a [u8],
    fill: u8,
    repeat: usize
}

impl<'a> RleDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        RleDecoder { data, fill: 0, repeat: 0 }
    }
}

impl<'a> Read for RleDecoder<'a> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let buflen = buf.len();
        let mut pos = 0;
        while pos < buflen {
            let dst = &mut buf[pos..];
            if self.repeat != 0 {
                let len = self.repeat.min(dst.len());
                dst[..len].fill(self.fill);
                self.repeat -= len;
                pos += len;
                continue
            }
            match *self.data {
                [] => break,
                [ESCAPE, ESCAPE, count, fill, ..] => {
                    self.fill = fill;
                    self.repeat = count.into();
                    self.data = &self.data[4..];
                }
                [ESCAPE, ESCAPE] | [ESCAPE, ESCAPE, _] => {
                    self.data = &[];
                }
                [ESCAPE, ..] => {
                    // a single ED is a literal, the following byte is never an escape
                    let len = self.data.len().min(2).min(dst.len());
                    dst[..len].copy_from_slice(&self.data[..len]);
                    self.data = &self.data[len..];
                    pos += len;
                }
                _ => {
                    let span = memchr(ESCAPE, self.data).unwrap_or(self.data.len());
                    let len = span.min(dst.len());
                    dst[..len].copy_from_slice(&self.data[..len]);
                    self.data = &self.data[len..];
                    pos += len;
                }
            }
        }
        Ok(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_decompress(data: &[u8], expect: &[u8]) {
        let mut buffer = Vec::new();
        assert_eq!(RleDecoder::new(data).read(&mut []).unwrap(), 0);
        assert_eq!(expect.len(), RleDecoder::new(data).read_to_end(&mut buffer).unwrap());
        assert_eq!(expect, &buffer[..]);
        for n in 1..expect.len() {
            let mut decompress = RleDecoder::new(data);
            buffer.resize(n, 0);
            let mut expected = expect;
            while !expected.is_empty() {
                let len = decompress.read(&mut buffer[..]).unwrap();
                assert_eq!(len, buffer.len().min(expected.len()));
                assert_eq!(buffer[..len], expected[..len]);
                expected = &expected[len..];
            }
            assert_eq!(decompress.read(&mut buffer[..]).unwrap(), 0);
        }
    }

    #[test]
    fn decompress_works() {
        test_decompress(&[0xED,0xED,7,42,96,0xED,0xED,2,0xED],
                        &[42,42,42,42,42,42,42,96,0xED,0xED]);
        test_decompress(&[69,0xED,0xED,0,0xED,0xED,0,0xED,0xED,4,0xED],
                        &[69,0xED,0,0xED,0xED,0xED,0xED]);
        test_decompress(&[0,1,2,3,4,5,0xED], &[0,1,2,3,4,5,0xED]);
        test_decompress(&[0xED,0,1,2,3,4,5,0xED,0xED], &[0xED,0,1,2,3,4,5]);
        test_decompress(&[33,0xED,0xED,0xED], &[33]);
        test_decompress(&[0xED,0xED,0xED], &[]);
        test_decompress(&[0,0xED,0xED,0], &[0]);
        test_decompress(&[0xED,0xED,2,0xED,0xED,1,0xED,2,0xED],
                        &[0xED,0xED,0xED,1,0xED,2,0xED]);
        test_decompress(&[], &[]);
        test_decompress(&[0xED], &[0xED]);
    }

    #[test]
    fn decompress_literal_escape_works() {
        // ED 00 followed by a run of zeroes
        test_decompress(&[0xED,0,0xED,0xED,5,0], &[0xED,0,0,0,0,0,0]);
        test_decompress(&[1,0xED,0xED,3,0xED], &[1,0xED,0xED,0xED]);
    }

    #[test]
    fn decompress_trailing_escape_is_literal() {
        test_decompress(&[0xED], &[0xED]);
        test_decompress(&[7,7,0xED], &[7,7,0xED]);
        test_decompress(&[0xED,0xED,3,9,0xED], &[9,9,9,0xED]);
        // a cut off escape sequence is still dropped
        test_decompress(&[7,0xED,0xED], &[7]);
        test_decompress(&[7,0xED,0xED,3], &[7]);
    }

    #[test]
    fn decompress_stops_at_destination_end() {
        let mut decompress = RleDecoder::new(&[0xED,0xED,255,1,2,3]);
        let mut buf = [0u8;100];
        assert_eq!(decompress.read(&mut buf).unwrap(), 100);
        assert!(buf.iter().all(|&b| b == 1));
        let mut rest = Vec::new();
        decompress.read_to_end(&mut rest).unwrap();
        assert_eq!(rest.len(), 157);
        assert_eq!(&rest[155..], &[2,3]);
    }
}
