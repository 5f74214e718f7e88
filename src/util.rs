/*
    uft-core
    https://github.com/uft-project/uft-core

    Copyright 2026 UFT Project Developers

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    src/util.rs

    Byte-level helpers shared by every format adapter: a bounded slice reader
    for untrusted image data, CRC-16-CCITT and CRC-32 routines, and a
    per-byte bit-reversal table.

    All multi-byte field access into raw image bytes goes through ReadSlice.
    Nothing else in the crate performs unchecked offset arithmetic.
*/

/// A bounded accessor over a borrowed byte slice. Every read is checked
/// against the slice length and returns `None` on overflow, so adapters can
/// parse hostile input without out-of-bounds access.
#[derive(Copy, Clone)]
pub struct ReadSlice<'a> {
    data: &'a [u8],
}

impl<'a> ReadSlice<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn u8_at(&self, offset: usize) -> Option<u8> {
        self.data.get(offset).copied()
    }

    #[inline]
    pub fn u16_le_at(&self, offset: usize) -> Option<u16> {
        let b = self.bytes_at(offset, 2)?;
        Some(u16::from_le_bytes([b[0], b[1]]))
    }

    #[inline]
    pub fn u16_be_at(&self, offset: usize) -> Option<u16> {
        let b = self.bytes_at(offset, 2)?;
        Some(u16::from_be_bytes([b[0], b[1]]))
    }

    #[inline]
    pub fn u32_le_at(&self, offset: usize) -> Option<u32> {
        let b = self.bytes_at(offset, 4)?;
        Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    #[inline]
    pub fn u32_be_at(&self, offset: usize) -> Option<u32> {
        let b = self.bytes_at(offset, 4)?;
        Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Return `len` bytes starting at `offset`, or `None` if the range falls
    /// outside the slice.
    #[inline]
    pub fn bytes_at(&self, offset: usize, len: usize) -> Option<&'a [u8]> {
        let end = offset.checked_add(len)?;
        self.data.get(offset..end)
    }

    /// Compare the bytes at `offset` against an expected magic string.
    #[inline]
    pub fn matches_at(&self, offset: usize, expected: &[u8]) -> bool {
        self.bytes_at(offset, expected.len()) == Some(expected)
    }
}

/// CRC-16-CCITT, polynomial 0x1021, MSB-first. Used by MFM/FM address and
/// data fields (the FDC seeds it with 0xFFFF and runs it over the sync and
/// mark bytes before the payload).
pub fn crc16_ccitt(init: u16, data: &[u8]) -> u16 {
    let mut crc = init;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            }
            else {
                crc <<= 1;
            }
        }
    }
    crc
}

const fn make_crc32_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ 0xEDB8_8320 } else { crc >> 1 };
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

const CRC32_TABLE: [u32; 256] = make_crc32_table();

/// CRC-32 (IEEE 802.3, reflected), as used by gzip trailers and a handful of
/// container formats.
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        crc = (crc >> 8) ^ CRC32_TABLE[((crc ^ byte as u32) & 0xFF) as usize];
    }
    !crc
}

pub const fn reverse_bits(mut byte: u8) -> u8 {
    byte = (byte >> 4) | (byte << 4);
    byte = ((byte & 0x33) << 2) | ((byte & 0xCC) >> 2);
    byte = ((byte & 0x55) << 1) | ((byte & 0xAA) >> 1);
    byte
}

const fn generate_reverse_table() -> [u8; 256] {
    let mut table = [0; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = reverse_bits(i as u8);
        i += 1;
    }
    table
}

/// Per-byte bit reversal lookup. HFE images store track bits LSB-first, so
/// every byte is reversed on the way in and out.
pub const REVERSE_TABLE: [u8; 256] = generate_reverse_table();
