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

    src/formats/msa.rs

    Atari ST Magic Shadow Archiver images: a big-endian header followed by
    one size-prefixed record per track and side. A record either stores the
    track raw (length == track size) or run-length encoded.
*/
use std::io::Cursor;

use binrw::{BinRead, BinReaderExt, BinWrite};

use crate::{
    adapter::{FormatAdapter, FormatCaps, FormatDescriptor, FormatState},
    chs::{DiskCh, DiskChsn},
    codec::rle,
    disk::{Sector, Track, TrackPayload},
    formats::FORMAT_MSA,
    geometry::Geometry,
    probe::{score_extension, score_magic, ProbeScore, WeightClass},
    util::ReadSlice,
    TrackEncoding,
    UftError,
};

pub const MSA_MAGIC: &[u8; 2] = &[0x0E, 0x0F];

#[derive(BinRead, BinWrite, Debug)]
#[brw(big, magic = b"\x0e\x0f")]
pub struct MsaHeader {
    pub sectors_per_track: u16,
    /// Side count minus one (0 or 1).
    pub sides_minus_one: u16,
    pub start_track: u16,
    pub end_track:   u16,
}

static DESCRIPTOR: FormatDescriptor = FormatDescriptor {
    id:   FORMAT_MSA,
    name: "MSA",
    description: "Atari ST Magic Shadow Archiver image",
    extensions: &["msa"],
    caps: FormatCaps::CAN_READ.union(FormatCaps::CAN_WRITE),
};

pub struct MsaAdapter;

impl FormatAdapter for MsaAdapter {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &DESCRIPTOR
    }

    fn probe(&self, bytes: &[u8], filename: Option<&str>) -> ProbeScore {
        let mut score = ProbeScore::new();
        score_magic(&mut score, bytes, MSA_MAGIC);
        let slice = ReadSlice::new(bytes);
        // ST media run 9 to 11 sectors per track, occasionally fewer.
        match slice.u16_be_at(2) {
            Some(spt) if (1..=11).contains(&spt) => {
                score.add("sectors per track", WeightClass::Medium);
            }
            _ => {
                score.against("sectors per track", WeightClass::Medium);
            }
        }
        match (slice.u16_be_at(4), slice.u16_be_at(6), slice.u16_be_at(8)) {
            (Some(sides), Some(start), Some(end)) if sides <= 1 && start <= end && end < 85 => {
                score.add("track range", WeightClass::Medium);
            }
            _ => {
                score.against("track range", WeightClass::Medium);
            }
        }
        score_extension(&mut score, filename, DESCRIPTOR.extensions);
        score
    }

    fn open(&self, bytes: &[u8]) -> Result<Box<dyn FormatState>, UftError> {
        let mut cursor = Cursor::new(bytes);
        let header: MsaHeader = cursor.read_be()?;
        if header.sides_minus_one > 1 || header.start_track > header.end_track || header.end_track >= 85 {
            return Err(UftError::Format);
        }
        let sides = header.sides_minus_one as u8 + 1;
        let track_size = header.sectors_per_track as usize * 512;
        if track_size == 0 {
            return Err(UftError::Format);
        }

        let slice = ReadSlice::new(bytes);
        let mut pos = 10usize;
        let mut tracks = Vec::new();
        for _ in header.start_track..=header.end_track {
            for _ in 0..sides {
                let len = slice.u16_be_at(pos).ok_or(UftError::Corrupt)? as usize;
                let record = slice.bytes_at(pos + 2, len).ok_or(UftError::Corrupt)?;
                pos += 2 + len;
                let (data, compressed) = if len == track_size {
                    (record.to_vec(), false)
                }
                else {
                    (rle::decode(record, track_size)?, true)
                };
                tracks.push(MsaTrack { data, compressed });
            }
        }

        let cylinders = header.end_track - header.start_track + 1;
        let geometry = Geometry::uniform(cylinders, sides, header.sectors_per_track as u8, 2, 1);
        Ok(Box::new(MsaState {
            header,
            geometry,
            tracks,
        }))
    }
}

struct MsaTrack {
    data: Vec<u8>,
    /// Stored compressed in the source image; preserved on re-encode.
    compressed: bool,
}

pub struct MsaState {
    header:   MsaHeader,
    geometry: Geometry,
    tracks:   Vec<MsaTrack>,
}

impl MsaState {
    fn index(&self, ch: DiskCh) -> Result<usize, UftError> {
        if ch.c() >= self.geometry.cylinders() || ch.h() >= self.geometry.heads() {
            return Err(UftError::Range);
        }
        Ok(ch.c() as usize * self.geometry.heads() as usize + ch.h() as usize)
    }
}

impl FormatState for MsaState {
    fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn read_track(&self, ch: DiskCh) -> Result<Track, UftError> {
        let track = &self.tracks[self.index(ch)?];
        let sectors = track
            .data
            .chunks_exact(512)
            .enumerate()
            .map(|(i, chunk)| Sector::new(DiskChsn::new(ch.c(), ch.h(), i as u8 + 1, 2), chunk.to_vec()))
            .collect();
        Ok(Track::new(ch, TrackEncoding::Mfm, TrackPayload::Sectors(sectors)))
    }

    fn write_track(&mut self, track: &Track) -> Result<(), UftError> {
        let TrackPayload::Sectors(sectors) = &track.payload else {
            return Err(UftError::NotSupported);
        };
        let index = self.index(track.ch)?;
        let spt = self.header.sectors_per_track as u8;
        for sector in sectors {
            let s = sector.id.s();
            if s < 1 || s > spt {
                return Err(UftError::Range);
            }
            if sector.data.len() != 512 {
                return Err(UftError::InvalidArg);
            }
            let start = (s as usize - 1) * 512;
            self.tracks[index].data[start..start + 512].copy_from_slice(&sector.data);
        }
        Ok(())
    }

    fn to_bytes(&self) -> Result<Vec<u8>, UftError> {
        let mut cursor = Cursor::new(Vec::new());
        self.header.write_be(&mut cursor)?;
        let mut out = cursor.into_inner();
        for track in &self.tracks {
            let encoded = if track.compressed { rle::encode(&track.data) } else { None };
            match encoded {
                Some(enc) => {
                    out.extend_from_slice(&(enc.len() as u16).to_be_bytes());
                    out.extend_from_slice(&enc);
                }
                None => {
                    out.extend_from_slice(&(track.data.len() as u16).to_be_bytes());
                    out.extend_from_slice(&track.data);
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Single-sided, tracks 0..=0, 9 sectors: one RLE track record.
    fn tiny_msa() -> Vec<u8> {
        let mut bytes = vec![0x0E, 0x0F];
        bytes.extend_from_slice(&9u16.to_be_bytes());
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes.extend_from_slice(&0u16.to_be_bytes());
        // RLE record: literal 0x12 then 4607 copies of 0x55.
        let record = [0x12, 0xE5, 0x55, 0x11, 0xFF];
        bytes.extend_from_slice(&(record.len() as u16).to_be_bytes());
        bytes.extend_from_slice(&record);
        bytes
    }

    #[test]
    fn probes_header_fields() {
        let score = MsaAdapter.probe(&tiny_msa(), Some("game.msa"));
        // Magic (60) + spt (25) + range (25) + extension (10).
        assert_eq!(score.score(), 120);
    }

    #[test]
    fn decompresses_rle_track_records() {
        let state = MsaAdapter.open(&tiny_msa()).unwrap();
        let track = state.read_track(DiskCh::new(0, 0)).unwrap();
        let TrackPayload::Sectors(sectors) = &track.payload else {
            panic!("expected sector payload");
        };
        assert_eq!(sectors.len(), 9);
        assert_eq!(sectors[0].data[0], 0x12);
        assert!(sectors[0].data[1..].iter().all(|&b| b == 0x55));
        assert!(sectors[8].data.iter().all(|&b| b == 0x55));
    }

    #[test]
    fn short_rle_expansion_zero_pads() {
        // Track record expanding to 8 bytes of a 4608-byte track.
        let mut bytes = tiny_msa();
        bytes.truncate(10);
        let record = [0x01, 0x12, 0xE5, 0x55, 0x00, 0x07];
        bytes.extend_from_slice(&(record.len() as u16).to_be_bytes());
        bytes.extend_from_slice(&record);

        let state = MsaAdapter.open(&bytes).unwrap();
        let track = state.read_track(DiskCh::new(0, 0)).unwrap();
        let TrackPayload::Sectors(sectors) = &track.payload else {
            panic!("expected sector payload");
        };
        assert_eq!(&sectors[0].data[..9], &[0x01, 0x12, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55]);
        assert!(sectors[0].data[9..].iter().all(|&b| b == 0));
    }

    #[test]
    fn round_trips_compressed_records() {
        let bytes = tiny_msa();
        let state = MsaAdapter.open(&bytes).unwrap();
        assert_eq!(state.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn truncated_record_is_corrupt() {
        let mut bytes = tiny_msa();
        bytes.truncate(bytes.len() - 2);
        assert!(matches!(MsaAdapter.open(&bytes), Err(UftError::Corrupt)));
    }
}
