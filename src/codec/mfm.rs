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

    src/codec/mfm.rs

    MFM/FM cell coding over the PID VFO.

    `FluxDecoder` turns a stream of flux-reversal intervals into bit cells,
    one bit at a time, reporting decoded bits and recognized sync words to a
    `BitSink`. The encode half inserts MFM clock bits (or FM clocks) so the
    write path can rebuild a cell stream from sector bytes.
*/
use bit_vec::BitVec;

use crate::codec::vfo::{PidVfo, VfoGain};

/// The MFM A1 sync byte with a missing clock: data 0xA1, cells 0x4489.
pub const MFM_A1_SYNC: u16 = 0x4489;
/// The MFM C2 index sync byte with a missing clock: data 0xC2, cells 0x5224.
pub const MFM_C2_SYNC: u16 = 0x5224;

/// FM address marks carry clock violations, so data and clock together form
/// a unique 16-bit cell pattern.
pub const FM_IDAM_SYNC: u16 = 0xF57E; // data 0xFE, clock 0xC7
pub const FM_DAM_SYNC: u16 = 0xF56F; // data 0xFB, clock 0xC7
pub const FM_DDAM_SYNC: u16 = 0xF56A; // data 0xF8, clock 0xC7
pub const FM_IAM_SYNC: u16 = 0xF77A; // data 0xFC, clock 0xD7

/// A sync word recognized in the cell stream.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SyncMark {
    /// MFM 0xA1 with missing clock (0x4489).
    MfmA1,
    /// MFM 0xC2 with missing clock (0x5224).
    MfmC2,
    /// FM ID address mark (0xFE / clock 0xC7).
    FmIdam,
    /// FM data address mark (0xFB / clock 0xC7).
    FmDam,
    /// FM deleted data address mark (0xF8 / clock 0xC7).
    FmDdam,
    /// FM index address mark (0xFC / clock 0xD7).
    FmIam,
}

/// Consumer of the decoded cell stream. `sync` has a default no-op so sinks
/// that only collect bits need not care about marks.
pub trait BitSink {
    fn bit(&mut self, bit: bool);
    fn sync(&mut self, _mark: SyncMark) {}
}

/// A `BitSink` that collects cell bits into a `BitVec` and remembers the
/// offsets of sync marks.
#[derive(Default)]
pub struct BitCollector {
    pub bits:  BitVec,
    pub syncs: Vec<(usize, SyncMark)>,
}

impl BitSink for BitCollector {
    fn bit(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    fn sync(&mut self, mark: SyncMark) {
        self.syncs.push((self.bits.len(), mark));
    }
}

/// Flux-interval to bit-cell decoder.
///
/// Each flux reversal closes one or more bit cells: an interval spanning n
/// cells decodes as n-1 zero bits followed by a one. The residual phase of
/// the reversal within its final cell drives the VFO, and a 16-bit window
/// over the emitted cells detects sync words.
pub struct FluxDecoder {
    vfo:   PidVfo,
    shift: u16,
}

impl FluxDecoder {
    pub fn new(vfo: PidVfo) -> FluxDecoder {
        FluxDecoder { vfo, shift: 0 }
    }

    pub fn vfo(&self) -> &PidVfo {
        &self.vfo
    }

    pub fn vfo_mut(&mut self) -> &mut PidVfo {
        &mut self.vfo
    }

    /// Reset the cell tracker and the sync window for a new track.
    pub fn reset(&mut self) {
        self.vfo.reset();
        self.vfo.set_gain(VfoGain::High);
        self.shift = 0;
    }

    /// Feed one flux-reversal interval in sample-clock ticks. Decoded bits
    /// and sync marks are reported to `sink`; returns the number of cells
    /// the interval spanned.
    pub fn feed<S: BitSink>(&mut self, interval: f64, sink: &mut S) -> usize {
        let cell = self.vfo.cell_size();
        let cells = ((interval / cell).round() as usize).max(1);
        // Residual phase of the reversal against its cell centre.
        let phase = interval - cells as f64 * cell;
        self.vfo.update(cell / 2.0 + phase);

        for _ in 1..cells {
            self.emit(false, sink);
        }
        self.emit(true, sink);
        cells
    }

    fn emit<S: BitSink>(&mut self, bit: bool, sink: &mut S) {
        self.shift = (self.shift << 1) | bit as u16;
        sink.bit(bit);
        let mark = match self.shift {
            MFM_A1_SYNC => Some(SyncMark::MfmA1),
            MFM_C2_SYNC => Some(SyncMark::MfmC2),
            FM_IDAM_SYNC => Some(SyncMark::FmIdam),
            FM_DAM_SYNC => Some(SyncMark::FmDam),
            FM_DDAM_SYNC => Some(SyncMark::FmDdam),
            FM_IAM_SYNC => Some(SyncMark::FmIam),
            _ => None,
        };
        if let Some(mark) = mark {
            // Sync acquired: drop to the low gain until the next reset.
            self.vfo.set_gain(VfoGain::Low);
            sink.sync(mark);
        }
    }
}

/// Encode data bytes as MFM cells. The clock bit between two data bits is
/// set only when both neighbours are zero; `prev_bit` is the last data bit
/// already on the track.
pub fn encode_mfm(data: &[u8], prev_bit: bool) -> BitVec {
    let mut cells = BitVec::with_capacity(data.len() * 16);
    let mut prev = prev_bit;
    for &byte in data {
        for i in (0..8).rev() {
            let bit = (byte >> i) & 1 != 0;
            cells.push(!prev && !bit);
            cells.push(bit);
            prev = bit;
        }
    }
    cells
}

/// Encode data bytes as FM cells: every clock bit is a one.
pub fn encode_fm(data: &[u8]) -> BitVec {
    let mut cells = BitVec::with_capacity(data.len() * 16);
    for &byte in data {
        for i in (0..8).rev() {
            cells.push(true);
            cells.push((byte >> i) & 1 != 0);
        }
    }
    cells
}

/// Push a raw 16-cell sync word, clock violations included.
pub fn push_sync_word(cells: &mut BitVec, word: u16) {
    for i in (0..16).rev() {
        cells.push((word >> i) & 1 != 0);
    }
}

/// Recover data bytes from a cell stream, taking the data bit of each
/// clock/data pair. `offset` is the cell index of the first clock bit and
/// trailing partial bytes are dropped.
pub fn decode_cells(cells: &BitVec, offset: usize) -> Vec<u8> {
    let avail = cells.len().saturating_sub(offset);
    let mut out = Vec::with_capacity(avail / 16);
    let mut byte = 0u8;
    let mut nbits = 0;
    let mut i = offset + 1;
    while i < cells.len() {
        byte = (byte << 1) | cells[i] as u8;
        nbits += 1;
        if nbits == 8 {
            out.push(byte);
            byte = 0;
            nbits = 0;
        }
        i += 2;
    }
    out
}
