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

    src/codec/tap.rs

    CBM TAP pulse codec. A data byte 0x01-0xFF encodes a pulse of byte*8
    machine cycles. The byte 0x00 is extended: in version 0 it means a long
    pulse of undefined length; in version 1 it is followed by three
    little-endian bytes giving a 24-bit exact cycle count.
*/
use crate::UftError;

/// C64 PAL system clock.
pub const PAL_CLOCK_HZ: f64 = 985_248.0;
/// C64 NTSC system clock.
pub const NTSC_CLOCK_HZ: f64 = 1_022_727.0;

/// Machine field of the TAP header mapped to a system clock.
pub fn clock_for_video(video_standard: u8) -> f64 {
    match video_standard {
        // 0 = PAL, 1 = NTSC per the TAP v1 header definition.
        1 => NTSC_CLOCK_HZ,
        _ => PAL_CLOCK_HZ,
    }
}

/// One decoded tape pulse.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TapPulse {
    /// Machine cycles; 0 for a version-0 overflow pulse.
    pub cycles: u32,
    /// Duration in microseconds at the iterator's clock.
    pub micros: f64,
    /// True for an extended (0x00-prefixed) pulse.
    pub is_long: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum IterState {
    Start,
    ShortPulseSeen,
    LongPrefixSeen,
    Eof,
}

/// Streaming pulse iterator over TAP data bytes (after the 20-byte header).
pub struct TapPulseIter<'a> {
    data: &'a [u8],
    pos: usize,
    version: u8,
    clock_hz: f64,
    state: IterState,
}

impl<'a> TapPulseIter<'a> {
    pub fn new(data: &'a [u8], version: u8, clock_hz: f64) -> Self {
        Self {
            data,
            pos: 0,
            version,
            clock_hz,
            state: IterState::Start,
        }
    }

    fn pulse(&self, cycles: u32, is_long: bool) -> TapPulse {
        TapPulse {
            cycles,
            micros: cycles as f64 / self.clock_hz * 1_000_000.0,
            is_long,
        }
    }
}

impl Iterator for TapPulseIter<'_> {
    type Item = Result<TapPulse, UftError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == IterState::Eof {
            return None;
        }
        let Some(&byte) = self.data.get(self.pos) else {
            self.state = IterState::Eof;
            return None;
        };
        self.pos += 1;

        if byte != 0 {
            self.state = IterState::ShortPulseSeen;
            return Some(Ok(self.pulse(byte as u32 * 8, false)));
        }

        self.state = IterState::LongPrefixSeen;
        if self.version == 0 {
            // Version 0: long pulse of unspecified length.
            self.state = IterState::ShortPulseSeen;
            return Some(Ok(self.pulse(0, true)));
        }

        // Version 1: 24-bit little-endian exact cycle count follows.
        let Some(ext) = self.data.get(self.pos..self.pos + 3) else {
            self.state = IterState::Eof;
            return Some(Err(UftError::Corrupt));
        };
        self.pos += 3;
        self.state = IterState::ShortPulseSeen;
        let cycles = u32::from(ext[0]) | u32::from(ext[1]) << 8 | u32::from(ext[2]) << 16;
        Some(Ok(self.pulse(cycles, true)))
    }
}

/// Encode one pulse back to TAP bytes for the given version.
pub fn encode_pulse(cycles: u32, version: u8) -> Vec<u8> {
    let units = cycles / 8;
    if cycles % 8 == 0 && (1..=255).contains(&units) {
        return vec![units as u8];
    }
    if version == 0 {
        return vec![0x00];
    }
    let clamped = cycles.min(0x00FF_FFFF);
    vec![0x00, (clamped & 0xFF) as u8, (clamped >> 8 & 0xFF) as u8, (clamped >> 16 & 0xFF) as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_pulses() {
        let data = [0x2F, 0x42, 0x01, 0xFF];
        let pulses: Vec<_> = TapPulseIter::new(&data, 1, PAL_CLOCK_HZ)
            .map(|p| p.unwrap())
            .collect();
        assert_eq!(pulses.len(), 4);
        assert_eq!(pulses[0].cycles, 0x2F * 8);
        assert_eq!(pulses[3].cycles, 0xFF * 8);
        assert!(!pulses[0].is_long);
        // 0x2F * 8 = 376 cycles at PAL is ~381.6 us.
        assert!((pulses[0].micros - 381.63).abs() < 0.1);
    }

    #[test]
    fn version1_extended_pulse() {
        let data = [0x00, 0x10, 0x27, 0x00, 0x05];
        let pulses: Vec<_> = TapPulseIter::new(&data, 1, PAL_CLOCK_HZ)
            .map(|p| p.unwrap())
            .collect();
        assert_eq!(pulses.len(), 2);
        assert_eq!(pulses[0].cycles, 0x2710); // 10000 cycles
        assert!(pulses[0].is_long);
        assert_eq!(pulses[1].cycles, 0x05 * 8);
    }

    #[test]
    fn version0_long_pulse() {
        let data = [0x00, 0x05];
        let pulses: Vec<_> = TapPulseIter::new(&data, 0, PAL_CLOCK_HZ)
            .map(|p| p.unwrap())
            .collect();
        // Version 0 does not consume extension bytes.
        assert_eq!(pulses.len(), 2);
        assert!(pulses[0].is_long);
        assert_eq!(pulses[0].cycles, 0);
        assert_eq!(pulses[1].cycles, 40);
    }

    #[test]
    fn truncated_extension_is_corrupt() {
        let data = [0x01, 0x00, 0x10];
        let mut iter = TapPulseIter::new(&data, 1, PAL_CLOCK_HZ);
        assert!(iter.next().unwrap().is_ok());
        assert!(matches!(iter.next(), Some(Err(UftError::Corrupt))));
        assert!(iter.next().is_none());
    }

    #[test]
    fn ntsc_clock_selected_from_header() {
        assert_eq!(clock_for_video(0), PAL_CLOCK_HZ);
        assert_eq!(clock_for_video(1), NTSC_CLOCK_HZ);
    }

    #[test]
    fn encode_round_trip() {
        assert_eq!(encode_pulse(376, 1), vec![0x2F]);
        assert_eq!(encode_pulse(10_000, 1), vec![0x00, 0x10, 0x27, 0x00]);
        assert_eq!(encode_pulse(10_000, 0), vec![0x00]);
        let bytes = encode_pulse(10_000, 1);
        let pulse = TapPulseIter::new(&bytes, 1, PAL_CLOCK_HZ).next().unwrap().unwrap();
        assert_eq!(pulse.cycles, 10_000);
    }
}
