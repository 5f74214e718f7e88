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

    src/chs.rs

    Disk location primitives. DiskCh addresses a physical track (cylinder,
    head), DiskChs a sector within it, and DiskChsn adds the FDC size code
    'n' where sector size in bytes = 128 << n.
*/
use crate::MAXIMUM_SECTOR_SIZE;
use std::fmt::Display;

/// A physical track address: (cylinder, head).
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Default)]
pub struct DiskCh {
    c: u16,
    h: u8,
}

impl From<(u16, u8)> for DiskCh {
    fn from((c, h): (u16, u8)) -> Self {
        Self { c, h }
    }
}

impl Display for DiskCh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[c:{} h:{}]", self.c, self.h)
    }
}

impl DiskCh {
    pub fn new(c: u16, h: u8) -> Self {
        Self { c, h }
    }
    pub fn c(&self) -> u16 {
        self.c
    }
    pub fn h(&self) -> u8 {
        self.h
    }
}

/// A sector address: (cylinder, head, sector id). Sector ids are as recorded
/// in the address mark and are not necessarily zero- or one-based.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Default)]
pub struct DiskChs {
    ch: DiskCh,
    s:  u8,
}

impl From<(u16, u8, u8)> for DiskChs {
    fn from((c, h, s): (u16, u8, u8)) -> Self {
        Self {
            ch: DiskCh::new(c, h),
            s,
        }
    }
}

impl From<(DiskCh, u8)> for DiskChs {
    fn from((ch, s): (DiskCh, u8)) -> Self {
        Self { ch, s }
    }
}

impl From<DiskChs> for DiskCh {
    fn from(chs: DiskChs) -> Self {
        chs.ch
    }
}

impl Display for DiskChs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[c:{} h:{} s:{}]", self.c(), self.h(), self.s)
    }
}

impl DiskChs {
    pub fn new(c: u16, h: u8, s: u8) -> Self {
        Self {
            ch: DiskCh::new(c, h),
            s,
        }
    }
    pub fn get(&self) -> (u16, u8, u8) {
        (self.c(), self.h(), self.s)
    }
    pub fn c(&self) -> u16 {
        self.ch.c()
    }
    pub fn h(&self) -> u8 {
        self.ch.h()
    }
    pub fn s(&self) -> u8 {
        self.s
    }
    pub fn ch(&self) -> DiskCh {
        self.ch
    }
}

/// A sector address plus the FDC size code.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Default)]
pub struct DiskChsn {
    chs: DiskChs,
    n:   u8,
}

impl From<(u16, u8, u8, u8)> for DiskChsn {
    fn from((c, h, s, n): (u16, u8, u8, u8)) -> Self {
        Self {
            chs: DiskChs::from((c, h, s)),
            n,
        }
    }
}

impl From<(DiskChs, u8)> for DiskChsn {
    fn from((chs, n): (DiskChs, u8)) -> Self {
        Self { chs, n }
    }
}

impl From<DiskChsn> for DiskChs {
    fn from(chsn: DiskChsn) -> Self {
        chsn.chs
    }
}

impl Display for DiskChsn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[c:{} h:{} s:{} n:{}]", self.c(), self.h(), self.s(), self.n)
    }
}

impl DiskChsn {
    pub fn new(c: u16, h: u8, s: u8, n: u8) -> Self {
        Self {
            chs: DiskChs::from((c, h, s)),
            n,
        }
    }

    pub fn get(&self) -> (u16, u8, u8, u8) {
        (self.c(), self.h(), self.s(), self.n)
    }
    pub fn c(&self) -> u16 {
        self.chs.c()
    }
    pub fn h(&self) -> u8 {
        self.chs.h()
    }
    pub fn s(&self) -> u8 {
        self.chs.s()
    }
    pub fn n(&self) -> u8 {
        self.n
    }
    pub fn ch(&self) -> DiskCh {
        self.chs.ch()
    }

    /// Return the size of the 'n' parameter in bytes (128 << n), capped at
    /// the maximum supported sector size.
    pub fn n_size(&self) -> usize {
        Self::n_to_bytes(self.n)
    }

    pub fn n_to_bytes(n: u8) -> usize {
        std::cmp::min(MAXIMUM_SECTOR_SIZE, 128usize.overflowing_shl(n as u32).0)
    }

    pub fn bytes_to_n(size: usize) -> u8 {
        let mut n = 0;
        let mut size = size;
        while size > 128 {
            size >>= 1;
            n += 1;
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn n_size_round_trip() {
        for n in 0..=6u8 {
            let size = DiskChsn::n_to_bytes(n);
            assert_eq!(DiskChsn::bytes_to_n(size), n);
        }
        assert_eq!(DiskChsn::n_to_bytes(1), 256);
        assert_eq!(DiskChsn::n_to_bytes(2), 512);
        // n=7 would be 16384; capped at the maximum supported size.
        assert_eq!(DiskChsn::n_to_bytes(7), MAXIMUM_SECTOR_SIZE);
    }

    #[test]
    fn display_formats() {
        let chsn = DiskChsn::new(39, 1, 9, 2);
        assert_eq!(format!("{chsn}"), "[c:39 h:1 s:9 n:2]");
    }
}
