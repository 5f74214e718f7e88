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

    src/formats/fdi.rs

    NEC PC-98 FDI images: a 32-byte little-endian header (padded out to its
    own declared header size) in front of a plain CHS-ordered sector dump.
*/
use std::io::Cursor;

use binrw::{BinRead, BinReaderExt, BinWrite};

use crate::{
    adapter::{FormatAdapter, FormatCaps, FormatDescriptor, FormatState},
    chs::{DiskCh, DiskChsn},
    disk::Track,
    formats::{read_flat_track, write_flat_track, FORMAT_FDI},
    geometry::Geometry,
    probe::{score_extension, score_foreign_magic, ProbeScore, WeightClass},
    util::ReadSlice,
    TrackEncoding,
    UftError,
};

#[derive(BinRead, BinWrite, Debug)]
#[brw(little)]
pub struct FdiHeader {
    pub reserved:    u32,
    pub fdd_type:    u32,
    pub header_size: u32,
    pub data_size:   u32,
    pub sector_size: u32,
    pub sectors_per_track: u32,
    pub heads: u32,
    pub cylinders: u32,
}

static DESCRIPTOR: FormatDescriptor = FormatDescriptor {
    id:   FORMAT_FDI,
    name: "FDI",
    description: "PC-98 FDI sector image",
    extensions: &["fdi"],
    caps: FormatCaps::CAN_READ.union(FormatCaps::CAN_WRITE),
};

fn header_consistent(h: &FdiHeader, file_len: usize) -> bool {
    h.reserved == 0
        && h.header_size >= 32
        && (h.header_size as usize) < file_len
        && h.sector_size.is_power_of_two()
        && (128..=8192).contains(&h.sector_size)
        && h.data_size as u64
            == h.sector_size as u64 * h.sectors_per_track as u64 * h.heads as u64 * h.cylinders as u64
        && h.header_size as usize + h.data_size as usize == file_len
}

pub struct FdiAdapter;

impl FormatAdapter for FdiAdapter {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &DESCRIPTOR
    }

    fn probe(&self, bytes: &[u8], filename: Option<&str>) -> ProbeScore {
        let mut score = ProbeScore::new();
        let slice = ReadSlice::new(bytes);
        // FDI has no magic; the reserved word and size arithmetic have to
        // carry the identification.
        match slice.u32_le_at(0) {
            Some(0) => {
                score.add("reserved word", WeightClass::Medium);
            }
            _ => {
                score.against("reserved word", WeightClass::Medium);
            }
        }
        let consistent = bytes.len() >= 32 && {
            let mut cursor = Cursor::new(bytes);
            cursor
                .read_le::<FdiHeader>()
                .map(|h| header_consistent(&h, bytes.len()))
                .unwrap_or(false)
        };
        if consistent {
            score.add("geometry arithmetic", WeightClass::High);
        }
        else {
            score.against("geometry arithmetic", WeightClass::Medium);
        }
        score_foreign_magic(&mut score, bytes);
        score_extension(&mut score, filename, DESCRIPTOR.extensions);
        score
    }

    fn open(&self, bytes: &[u8]) -> Result<Box<dyn FormatState>, UftError> {
        let mut cursor = Cursor::new(bytes);
        let header: FdiHeader = cursor.read_le()?;
        if !header_consistent(&header, bytes.len()) {
            return Err(UftError::Format);
        }
        if header.cylinders > u16::MAX as u32 || header.heads > u8::MAX as u32 || header.sectors_per_track > u8::MAX as u32
        {
            return Err(UftError::Format);
        }
        let geometry = Geometry::uniform(
            header.cylinders as u16,
            header.heads as u8,
            header.sectors_per_track as u8,
            DiskChsn::bytes_to_n(header.sector_size as usize),
            1,
        );
        let padding = header.header_size as usize - 32;
        Ok(Box::new(FdiState {
            data: bytes[header.header_size as usize..].to_vec(),
            header,
            geometry,
            padding,
        }))
    }
}

pub struct FdiState {
    header:   FdiHeader,
    geometry: Geometry,
    data:     Vec<u8>,
    /// Bytes between the 32-byte header and the data region.
    padding: usize,
}

impl FdiState {
    pub fn header(&self) -> &FdiHeader {
        &self.header
    }
}

impl FormatState for FdiState {
    fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn read_track(&self, ch: DiskCh) -> Result<Track, UftError> {
        read_flat_track(&self.data, &self.geometry, ch, TrackEncoding::Mfm)
    }

    fn write_track(&mut self, track: &Track) -> Result<(), UftError> {
        write_flat_track(&mut self.data, &self.geometry, track)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, UftError> {
        let mut cursor = Cursor::new(Vec::new());
        self.header.write_le(&mut cursor)?;
        let mut out = cursor.into_inner();
        out.resize(out.len() + self.padding, 0);
        out.extend_from_slice(&self.data);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::TrackPayload;

    fn fdi_image() -> Vec<u8> {
        // 8 cylinders x 2 heads x 8 spt x 1024 bytes, 4096-byte header.
        let header = FdiHeader {
            reserved:    0,
            fdd_type:    0x90,
            header_size: 4096,
            data_size:   8 * 2 * 8 * 1024,
            sector_size: 1024,
            sectors_per_track: 8,
            heads: 2,
            cylinders: 8,
        };
        let mut cursor = Cursor::new(Vec::new());
        header.write_le(&mut cursor).unwrap();
        let mut bytes = cursor.into_inner();
        bytes.resize(4096, 0);
        let mut data = vec![0u8; header.data_size as usize];
        for (i, chunk) in data.chunks_mut(1024).enumerate() {
            chunk.fill(i as u8);
        }
        bytes.extend_from_slice(&data);
        bytes
    }

    #[test]
    fn probes_size_arithmetic() {
        let score = FdiAdapter.probe(&fdi_image(), Some("disk.fdi"));
        // Reserved (25) + arithmetic (40) + extension (10).
        assert_eq!(score.score(), 75);
        assert_eq!(FdiAdapter.probe(&[0u8; 64], None).confidence(), 0);
    }

    #[test]
    fn reads_past_header_padding() {
        let state = FdiAdapter.open(&fdi_image()).unwrap();
        assert_eq!(state.geometry().cylinders(), 8);
        let track = state.read_track(DiskCh::new(1, 0)).unwrap();
        let TrackPayload::Sectors(sectors) = &track.payload else {
            panic!("expected sector payload");
        };
        assert_eq!(sectors.len(), 8);
        // Track (1, 0) starts at sector index 16.
        assert_eq!(sectors[0].data, vec![16u8; 1024]);
    }

    #[test]
    fn round_trips_header_and_padding() {
        let bytes = fdi_image();
        let state = FdiAdapter.open(&bytes).unwrap();
        assert_eq!(state.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn opens_minimal_unpadded_header() {
        // header_size == 32: the data region starts right after the header.
        let mut bytes = fdi_image();
        bytes.drain(32..4096);
        bytes[8..12].copy_from_slice(&32u32.to_le_bytes());
        let state = FdiAdapter.open(&bytes).unwrap();
        let track = state.read_track(DiskCh::new(0, 0)).unwrap();
        let TrackPayload::Sectors(sectors) = &track.payload else {
            panic!("expected sector payload");
        };
        assert_eq!(sectors[0].data, vec![0u8; 1024]);
        assert_eq!(state.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn inconsistent_header_is_rejected() {
        let mut bytes = fdi_image();
        bytes[16] = 0xFF; // sector size no longer a power of two
        assert!(matches!(FdiAdapter.open(&bytes), Err(UftError::Format)));
    }
}
