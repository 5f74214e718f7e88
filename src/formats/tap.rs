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

    src/formats/tap.rs

    Commodore C64 raw tape containers ("C64-TAPE-RAW"). The payload is a
    pulse stream decoded through the TAP codec; the single logical "track"
    carries pulse intervals rather than sectors.
*/
use std::io::Cursor;

use binrw::{BinRead, BinReaderExt, BinWrite};

use crate::{
    adapter::{FormatAdapter, FormatCaps, FormatDescriptor, FormatState},
    chs::DiskCh,
    codec::tap::{clock_for_video, encode_pulse, TapPulseIter},
    disk::{Track, TrackPayload},
    formats::FORMAT_TAP,
    geometry::Geometry,
    probe::{score_extension, score_magic, ProbeScore, WeightClass},
    TrackEncoding,
    UftError,
};

pub const TAP_MAGIC: &[u8; 12] = b"C64-TAPE-RAW";

#[derive(BinRead, BinWrite, Debug)]
#[brw(little, magic = b"C64-TAPE-RAW")]
pub struct TapHeader {
    pub version: u8,
    pub machine: u8,
    pub video:   u8,
    pub reserved: u8,
    pub data_len: u32,
}

static DESCRIPTOR: FormatDescriptor = FormatDescriptor {
    id:   FORMAT_TAP,
    name: "TAP",
    description: "Commodore raw tape image",
    extensions: &["tap"],
    caps: FormatCaps::CAN_READ
        .union(FormatCaps::CAN_WRITE)
        .union(FormatCaps::SUPPORTS_TIMING),
};

pub struct TapAdapter;

impl FormatAdapter for TapAdapter {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &DESCRIPTOR
    }

    fn probe(&self, bytes: &[u8], filename: Option<&str>) -> ProbeScore {
        let mut score = ProbeScore::new();
        score_magic(&mut score, bytes, TAP_MAGIC);
        if matches!(bytes.get(12), Some(0) | Some(1)) {
            score.add("version", WeightClass::Medium);
        }
        // Declared data length against the actual payload.
        if bytes.len() >= 20 {
            let declared = u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]) as usize;
            if declared == bytes.len() - 20 {
                score.add("data length", WeightClass::Medium);
            }
            else {
                score.against("data length", WeightClass::Medium);
            }
        }
        score_extension(&mut score, filename, DESCRIPTOR.extensions);
        score
    }

    fn open(&self, bytes: &[u8]) -> Result<Box<dyn FormatState>, UftError> {
        let mut cursor = Cursor::new(bytes);
        let header: TapHeader = cursor.read_le()?;
        if header.version > 1 {
            return Err(UftError::Format);
        }
        let data = bytes.get(20..).ok_or(UftError::Format)?;
        if data.len() != header.data_len as usize {
            return Err(UftError::Corrupt);
        }
        Ok(Box::new(TapState {
            geometry: Geometry::uniform(1, 1, 0, 0, 0),
            header,
            data: data.to_vec(),
        }))
    }
}

pub struct TapState {
    geometry: Geometry,
    header:   TapHeader,
    data:     Vec<u8>,
}

impl TapState {
    pub fn header(&self) -> &TapHeader {
        &self.header
    }

    /// Iterate the pulse stream at the header's clock.
    pub fn pulses(&self) -> TapPulseIter<'_> {
        TapPulseIter::new(&self.data, self.header.version, clock_for_video(self.header.video))
    }
}

impl FormatState for TapState {
    fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn read_track(&self, ch: DiskCh) -> Result<Track, UftError> {
        if ch.c() != 0 || ch.h() != 0 {
            return Err(UftError::Range);
        }
        let mut cycles = Vec::new();
        for pulse in self.pulses() {
            cycles.push(pulse?.cycles);
        }
        Ok(Track::new(ch, TrackEncoding::RawFlux, TrackPayload::Pulses { data: cycles }))
    }

    fn write_track(&mut self, track: &Track) -> Result<(), UftError> {
        let TrackPayload::Pulses { data } = &track.payload else {
            return Err(UftError::NotSupported);
        };
        if track.ch.c() != 0 || track.ch.h() != 0 {
            return Err(UftError::Range);
        }
        let mut out = Vec::with_capacity(data.len());
        for &cycles in data {
            out.extend_from_slice(&encode_pulse(cycles, self.header.version));
        }
        self.header.data_len = out.len() as u32;
        self.data = out;
        Ok(())
    }

    fn to_bytes(&self) -> Result<Vec<u8>, UftError> {
        let mut cursor = Cursor::new(Vec::new());
        self.header.write_le(&mut cursor)?;
        let mut out = cursor.into_inner();
        out.extend_from_slice(&self.data);
        Ok(out)
    }
}
