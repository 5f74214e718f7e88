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

    src/fdc.rs

    NEC uPD765-family layout math: GAP3 tables, track capacity computation
    and the translation of ST0/ST1/ST2 result registers into a symbolic
    error kind.
*/
use bitflags::bitflags;

/// Fallback GAP3 values when no table row matches.
pub const DEFAULT_GAP3_RW_MFM: u8 = 0x1B;
pub const DEFAULT_GAP3_FMT_MFM: u8 = 0x54;
pub const DEFAULT_GAP3_RW_FM: u8 = 0x07;
pub const DEFAULT_GAP3_FMT_FM: u8 = 0x1B;

/// Per-track overhead in bytes (index/gap4a/gap1 and sync fields).
pub const TRACK_OVERHEAD_MFM: usize = 146;
pub const TRACK_OVERHEAD_FM: usize = 73;

/// Per-sector overhead in bytes (IDAM, gaps 2, DAM, CRCs).
pub const SECTOR_OVERHEAD_MFM: usize = 62;
pub const SECTOR_OVERHEAD_FM: usize = 33;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FormFactor {
    /// 8" drives.
    EightInch,
    /// 5.25" and 3.5" drives share gap timing.
    FiveInch,
}

struct GapEntry {
    mfm:       bool,
    form:      FormFactor,
    size_code: u8,
    max_spt:   u8,
    gap3_rw:   u8,
    gap3_fmt:  u8,
}

// Gap values per the uPD765 datasheet recommendations plus the common PC
// BIOS media rows.
#[rustfmt::skip]
const GAP_TABLE: [GapEntry; 13] = [
    // FM, 8"
    GapEntry { mfm: false, form: FormFactor::EightInch, size_code: 0, max_spt: 26, gap3_rw: 0x07, gap3_fmt: 0x1B },
    GapEntry { mfm: false, form: FormFactor::EightInch, size_code: 1, max_spt: 15, gap3_rw: 0x0E, gap3_fmt: 0x2A },
    GapEntry { mfm: false, form: FormFactor::EightInch, size_code: 2, max_spt: 8,  gap3_rw: 0x1B, gap3_fmt: 0x3A },
    // FM, 5.25"/3.5"
    GapEntry { mfm: false, form: FormFactor::FiveInch,  size_code: 0, max_spt: 16, gap3_rw: 0x07, gap3_fmt: 0x1B },
    GapEntry { mfm: false, form: FormFactor::FiveInch,  size_code: 1, max_spt: 10, gap3_rw: 0x0E, gap3_fmt: 0x2A },
    // MFM, 8"
    GapEntry { mfm: true,  form: FormFactor::EightInch, size_code: 1, max_spt: 26, gap3_rw: 0x0E, gap3_fmt: 0x36 },
    GapEntry { mfm: true,  form: FormFactor::EightInch, size_code: 2, max_spt: 15, gap3_rw: 0x1B, gap3_fmt: 0x54 },
    GapEntry { mfm: true,  form: FormFactor::EightInch, size_code: 3, max_spt: 8,  gap3_rw: 0x35, gap3_fmt: 0x74 },
    // MFM, 5.25"/3.5"
    GapEntry { mfm: true,  form: FormFactor::FiveInch,  size_code: 2, max_spt: 8,  gap3_rw: 0x35, gap3_fmt: 0x74 },
    GapEntry { mfm: true,  form: FormFactor::FiveInch,  size_code: 2, max_spt: 9,  gap3_rw: 0x2A, gap3_fmt: 0x50 },
    GapEntry { mfm: true,  form: FormFactor::FiveInch,  size_code: 2, max_spt: 15, gap3_rw: 0x1B, gap3_fmt: 0x54 },
    GapEntry { mfm: true,  form: FormFactor::FiveInch,  size_code: 2, max_spt: 18, gap3_rw: 0x1B, gap3_fmt: 0x6C },
    GapEntry { mfm: true,  form: FormFactor::FiveInch,  size_code: 2, max_spt: 36, gap3_rw: 0x1B, gap3_fmt: 0x53 },
];

/// Look up (gap3_rw, gap3_fmt) for an encoding, form factor, size code and
/// sector count. Returns the tightest row whose max_spt covers `spt`;
/// outside the table, the encoding's default gaps.
pub fn gap3(mfm: bool, form: FormFactor, size_code: u8, spt: u8) -> (u8, u8) {
    let mut best: Option<&GapEntry> = None;
    for entry in GAP_TABLE.iter() {
        if entry.mfm == mfm && entry.form == form && entry.size_code == size_code && entry.max_spt >= spt {
            best = match best {
                Some(b) if b.max_spt <= entry.max_spt => Some(b),
                _ => Some(entry),
            };
        }
    }
    match best {
        Some(entry) => (entry.gap3_rw, entry.gap3_fmt),
        None if mfm => (DEFAULT_GAP3_RW_MFM, DEFAULT_GAP3_FMT_MFM),
        None => (DEFAULT_GAP3_RW_FM, DEFAULT_GAP3_FMT_FM),
    }
}

/// Bytes required to format a track: track overhead plus per-sector
/// overhead, payload and format gap.
pub fn track_capacity(nsect: usize, sector_size: usize, mfm: bool, gap3_fmt: u8) -> usize {
    let (track_oh, sector_oh) = if mfm {
        (TRACK_OVERHEAD_MFM, SECTOR_OVERHEAD_MFM)
    }
    else {
        (TRACK_OVERHEAD_FM, SECTOR_OVERHEAD_FM)
    };
    track_oh + nsect * (sector_oh + sector_size + gap3_fmt as usize)
}

bitflags! {
    /// ST0 result register.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct St0: u8 {
        const UNIT_SELECT_0    = 0b0000_0001;
        const UNIT_SELECT_1    = 0b0000_0010;
        const HEAD_ADDRESS     = 0b0000_0100;
        const NOT_READY        = 0b0000_1000;
        const EQUIPMENT_CHECK  = 0b0001_0000;
        const SEEK_END         = 0b0010_0000;
        const IC_ABNORMAL      = 0b0100_0000;
        const IC_INVALID       = 0b1000_0000;
    }
}

bitflags! {
    /// ST1 result register.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct St1: u8 {
        const MISSING_ADDRESS_MARK = 0b0000_0001;
        const NOT_WRITABLE         = 0b0000_0010;
        const NO_DATA              = 0b0000_0100;
        const OVERRUN              = 0b0001_0000;
        const DATA_ERROR           = 0b0010_0000;
        const END_OF_CYLINDER      = 0b1000_0000;
    }
}

bitflags! {
    /// ST2 result register.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct St2: u8 {
        const MISSING_DAM        = 0b0000_0001;
        const BAD_CYLINDER       = 0b0000_0010;
        const SCAN_NOT_SATISFIED = 0b0000_0100;
        const SCAN_EQUAL_HIT     = 0b0000_1000;
        const WRONG_CYLINDER     = 0b0001_0000;
        const DATA_ERROR_IN_DATA = 0b0010_0000;
        const CONTROL_MARK       = 0b0100_0000;
    }
}

/// Symbolic interpretation of a failed FDC result phase.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FdcError {
    IdCrc,
    MissingAddressMark,
    NoData,
    EndOfCylinder,
    WrongCylinder,
    DataCrc,
    MissingDam,
    WriteProtected,
    Overrun,
}

/// Translate ST0/ST1/ST2 into a symbolic error kind. Returns `None` for a
/// normal termination. The order reflects diagnostic priority: a data CRC
/// error is reported over the end-of-cylinder bit the controller also sets.
pub fn interpret_status(st0: St0, st1: St1, st2: St2) -> Option<FdcError> {
    if !st0.intersects(St0::IC_ABNORMAL | St0::IC_INVALID) && st1.is_empty() && st2.is_empty() {
        return None;
    }
    if st1.contains(St1::NOT_WRITABLE) {
        Some(FdcError::WriteProtected)
    }
    else if st2.contains(St2::MISSING_DAM) {
        Some(FdcError::MissingDam)
    }
    else if st1.contains(St1::MISSING_ADDRESS_MARK) {
        Some(FdcError::MissingAddressMark)
    }
    else if st2.contains(St2::DATA_ERROR_IN_DATA) {
        Some(FdcError::DataCrc)
    }
    else if st1.contains(St1::DATA_ERROR) {
        Some(FdcError::IdCrc)
    }
    else if st2.intersects(St2::WRONG_CYLINDER | St2::BAD_CYLINDER) {
        Some(FdcError::WrongCylinder)
    }
    else if st1.contains(St1::OVERRUN) {
        Some(FdcError::Overrun)
    }
    else if st1.contains(St1::NO_DATA) {
        Some(FdcError::NoData)
    }
    else if st1.contains(St1::END_OF_CYLINDER) {
        Some(FdcError::EndOfCylinder)
    }
    else {
        // Abnormal termination with no diagnostic bits; treat as no-data.
        Some(FdcError::NoData)
    }
}
