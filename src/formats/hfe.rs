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

    src/formats/hfe.rs

    HxC HFE v1 bitstream containers. A 512-byte header block is followed by
    a track lookup table (u16-LE block offset + u16-LE byte length per
    track) and track data in 512-byte blocks, each block interleaving 256
    bytes of side 0 with 256 bytes of side 1. Stored bytes are bit-reversed
    relative to read order.
*/
use std::io::Cursor;

use binrw::{BinRead, BinReaderExt};

use crate::{
    adapter::{FormatAdapter, FormatCaps, FormatDescriptor, FormatState},
    chs::DiskCh,
    disk::{Track, TrackPayload},
    formats::FORMAT_HFE,
    geometry::Geometry,
    probe::{score_extension, score_magic, ProbeScore, WeightClass},
    util::{ReadSlice, REVERSE_TABLE},
    TrackEncoding,
    UftError,
};

pub const HFE_MAGIC: &[u8; 8] = b"HXCPICFE";
const BLOCK: usize = 512;

#[derive(BinRead, Debug)]
#[br(little, magic = b"HXCPICFE")]
pub struct HfeHeader {
    pub revision:  u8,
    pub num_tracks: u8,
    pub num_sides:  u8,
    pub track_encoding: u8,
    pub bitrate_kbps: u16,
    pub rpm: u16,
    pub interface_mode: u8,
    pub reserved: u8,
    /// Offset of the track lookup table, in 512-byte blocks.
    pub track_list_block: u16,
    pub write_allowed: u8,
    pub single_step:   u8,
    pub track0s0_altencoding: u8,
    pub track0s0_encoding:    u8,
    pub track0s1_altencoding: u8,
    pub track0s1_encoding:    u8,
}

static DESCRIPTOR: FormatDescriptor = FormatDescriptor {
    id:   FORMAT_HFE,
    name: "HFE",
    description: "HxC floppy emulator bitstream image",
    extensions: &["hfe"],
    caps: FormatCaps::CAN_READ
        .union(FormatCaps::SUPPORTS_TIMING)
        .union(FormatCaps::IS_FLUX),
};

pub struct HfeAdapter;

impl FormatAdapter for HfeAdapter {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &DESCRIPTOR
    }

    fn probe(&self, bytes: &[u8], filename: Option<&str>) -> ProbeScore {
        let mut score = ProbeScore::new();
        score_magic(&mut score, bytes, HFE_MAGIC);
        let slice = ReadSlice::new(bytes);
        // Revision 0 and a believable track/side count.
        if slice.u8_at(8) == Some(0) {
            score.add("revision", WeightClass::Medium);
        }
        match (slice.u8_at(9), slice.u8_at(10)) {
            (Some(tracks), Some(sides)) if tracks > 0 && (1..=2).contains(&sides) => {
                score.add("track count", WeightClass::Medium);
            }
            _ => {
                score.against("track count", WeightClass::Medium);
            }
        }
        score_extension(&mut score, filename, DESCRIPTOR.extensions);
        score
    }

    fn open(&self, bytes: &[u8]) -> Result<Box<dyn FormatState>, UftError> {
        let mut cursor = Cursor::new(bytes);
        let header: HfeHeader = cursor.read_le()?;
        if header.num_tracks == 0 || header.num_sides == 0 || header.num_sides > 2 {
            return Err(UftError::Format);
        }

        let slice = ReadSlice::new(bytes);
        let table = header.track_list_block as usize * BLOCK;
        let mut tracks = Vec::with_capacity(header.num_tracks as usize * header.num_sides as usize);
        for t in 0..header.num_tracks as usize {
            let offset_blocks = slice.u16_le_at(table + t * 4).ok_or(UftError::Corrupt)? as usize;
            let byte_len = slice.u16_le_at(table + t * 4 + 2).ok_or(UftError::Corrupt)? as usize;
            let start = offset_blocks * BLOCK;
            let data = slice.bytes_at(start, byte_len).ok_or(UftError::Corrupt)?;

            // De-interleave the 512-byte blocks and un-reverse the bits.
            let mut sides: [Vec<u8>; 2] = [Vec::new(), Vec::new()];
            for block in data.chunks(BLOCK) {
                let half = block.len().min(BLOCK / 2);
                for &b in &block[..half] {
                    sides[0].push(REVERSE_TABLE[b as usize]);
                }
                for &b in block.get(half..).unwrap_or(&[]) {
                    sides[1].push(REVERSE_TABLE[b as usize]);
                }
            }
            for side in sides.iter().take(header.num_sides as usize) {
                tracks.push(side.clone());
            }
        }

        let geometry = Geometry::uniform(header.num_tracks as u16, header.num_sides, 0, 2, 1);
        Ok(Box::new(HfeState {
            header,
            geometry,
            tracks,
            original: bytes.to_vec(),
        }))
    }
}

pub struct HfeState {
    header:   HfeHeader,
    geometry: Geometry,
    /// Bit-corrected track streams, indexed c * sides + h.
    tracks: Vec<Vec<u8>>,
    original: Vec<u8>,
}

impl HfeState {
    pub fn header(&self) -> &HfeHeader {
        &self.header
    }
}

impl FormatState for HfeState {
    fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn read_track(&self, ch: DiskCh) -> Result<Track, UftError> {
        if ch.c() >= self.geometry.cylinders() || ch.h() >= self.geometry.heads() {
            return Err(UftError::Range);
        }
        let index = ch.c() as usize * self.geometry.heads() as usize + ch.h() as usize;
        let bits = self.tracks.get(index).ok_or(UftError::Corrupt)?.clone();
        let bit_len = bits.len() * 8;
        let encoding = match self.header.track_encoding {
            2 => TrackEncoding::Fm,
            _ => TrackEncoding::Mfm,
        };
        Ok(Track::new(ch, encoding, TrackPayload::RawBits { bits, bit_len }))
    }

    fn to_bytes(&self) -> Result<Vec<u8>, UftError> {
        Ok(self.original.clone())
    }
}
