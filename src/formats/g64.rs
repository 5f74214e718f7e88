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

    src/formats/g64.rs

    Commodore G64/G71 GCR bitstream containers: a 12-byte header, a u32-LE
    track-offset table (0 = absent track), a per-track speed-zone table and
    size-prefixed raw GCR track data. "GCR-1541" images store half-tracks
    (two table slots per cylinder); "GCR-1571" stores 70 full tracks.

    Truncated offset tables occur in the wild and are read as absent tracks.
*/
use crate::{
    adapter::{FormatAdapter, FormatCaps, FormatDescriptor, FormatState},
    chs::DiskCh,
    disk::{Track, TrackPayload},
    formats::FORMAT_G64,
    geometry::{cbm, Geometry},
    probe::{score_extension, score_magic, ProbeScore, WeightClass},
    util::ReadSlice,
    TrackEncoding,
    UftError,
};

pub const G64_MAGIC: &[u8; 8] = b"GCR-1541";
pub const G71_MAGIC: &[u8; 8] = b"GCR-1571";

const HEADER_LEN: usize = 12;
/// Sanity cap: 84 half-tracks (1541) or 84 full tracks (1571 both sides).
const MAX_TRACKS: usize = 168;

static DESCRIPTOR: FormatDescriptor = FormatDescriptor {
    id:   FORMAT_G64,
    name: "G64",
    description: "Commodore GCR bitstream container (G64/G71)",
    extensions: &["g64", "g71"],
    caps: FormatCaps::CAN_READ
        .union(FormatCaps::SUPPORTS_TIMING)
        .union(FormatCaps::IS_FLUX),
};

pub struct G64Adapter;

impl FormatAdapter for G64Adapter {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &DESCRIPTOR
    }

    fn probe(&self, bytes: &[u8], filename: Option<&str>) -> ProbeScore {
        let mut score = ProbeScore::new();
        let slice = ReadSlice::new(bytes);
        if slice.matches_at(0, G71_MAGIC) {
            score.add("magic", WeightClass::Magic);
        }
        else {
            score_magic(&mut score, bytes, G64_MAGIC);
        }
        if slice.u8_at(8) == Some(0) {
            score.add("version", WeightClass::Medium);
        }
        match slice.u8_at(9) {
            Some(n) if n > 0 && n as usize <= MAX_TRACKS => {
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
        let slice = ReadSlice::new(bytes);
        let half_tracks = if slice.matches_at(0, G64_MAGIC) {
            true
        }
        else if slice.matches_at(0, G71_MAGIC) {
            false
        }
        else {
            return Err(UftError::Format);
        };
        if slice.u8_at(8) != Some(0) {
            return Err(UftError::Format);
        }
        let num_tracks = slice.u8_at(9).ok_or(UftError::Format)? as usize;
        if num_tracks == 0 || num_tracks > MAX_TRACKS {
            return Err(UftError::Format);
        }
        let max_track_size = slice.u16_le_at(10).ok_or(UftError::Format)? as usize;

        // Offset and speed tables. Both may be truncated; whatever is
        // missing reads as zero (absent track / default zone).
        let mut tracks = Vec::with_capacity(num_tracks);
        for i in 0..num_tracks {
            let offset = slice.u32_le_at(HEADER_LEN + i * 4).unwrap_or(0) as usize;
            if offset == 0 {
                tracks.push(None);
                continue;
            }
            let size = slice.u16_le_at(offset).ok_or(UftError::Corrupt)? as usize;
            if size > max_track_size {
                return Err(UftError::Corrupt);
            }
            let data = slice.bytes_at(offset + 2, size).ok_or(UftError::Corrupt)?;
            tracks.push(Some(data.to_vec()));
        }
        let speed_offset = HEADER_LEN + num_tracks * 4;
        let speeds: Vec<u8> = (0..num_tracks)
            .map(|i| slice.u8_at(speed_offset + i * 4).unwrap_or(0))
            .collect();

        let cylinders = if half_tracks {
            (num_tracks as u16).div_ceil(2)
        }
        else {
            num_tracks as u16
        };
        // A 1571 image lays the second side's 35 tracks after the first, so
        // its zone vector repeats per side.
        let zones = if cylinders <= cbm::MAX_TRACKS as u16 {
            cbm::zones(cylinders as u8)
        }
        else {
            let per_side = (cylinders / 2) as u8;
            let mut zones = cbm::zones(per_side);
            zones.extend(cbm::zones(per_side).into_iter().map(|mut z| {
                z.cyl_start += per_side as u16;
                z.cyl_end += per_side as u16;
                z
            }));
            zones
        };
        let geometry = Geometry::zoned(cylinders, 1, zones, 1, 0)?;

        Ok(Box::new(G64State {
            geometry,
            half_tracks,
            tracks,
            speeds,
            original: bytes.to_vec(),
        }))
    }
}

pub struct G64State {
    geometry:    Geometry,
    half_tracks: bool,
    tracks:      Vec<Option<Vec<u8>>>,
    speeds:      Vec<u8>,
    original:    Vec<u8>,
}

impl G64State {
    /// The raw track-table slot for a cylinder (slot = 2c for half-track
    /// images, c for full-track).
    fn slot(&self, c: u16) -> usize {
        if self.half_tracks {
            c as usize * 2
        }
        else {
            c as usize
        }
    }

    /// Speed-zone byte for a cylinder.
    pub fn speed(&self, c: u16) -> Option<u8> {
        self.speeds.get(self.slot(c)).copied()
    }
}

impl FormatState for G64State {
    fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn read_track(&self, ch: DiskCh) -> Result<Track, UftError> {
        if ch.c() >= self.geometry.cylinders() || ch.h() != 0 {
            return Err(UftError::Range);
        }
        let Some(Some(bits)) = self.tracks.get(self.slot(ch.c())) else {
            // Absent slot; sparse images are legal.
            return Err(UftError::NotSupported);
        };
        let bit_len = bits.len() * 8;
        Ok(Track::new(
            ch,
            TrackEncoding::Gcr54,
            TrackPayload::RawBits {
                bits: bits.clone(),
                bit_len,
            },
        ))
    }

    fn to_bytes(&self) -> Result<Vec<u8>, UftError> {
        Ok(self.original.clone())
    }
}
