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

    src/formats/d64.rs

    Commodore 1541/1571 sector images (D64/D71). Track lengths follow the
    21/19/18/17 CBM speed-zone vector; 35-, 40- and 42-track variants exist,
    each optionally followed by a one-byte-per-sector DOS error vector.
*/
use crate::{
    adapter::{FormatAdapter, FormatCaps, FormatDescriptor, FormatState},
    chs::{DiskCh, DiskChsn},
    disk::{Sector, Track, TrackPayload},
    formats::FORMAT_D64,
    geometry::{cbm, Geometry, Zone},
    probe::{score_extension, score_foreign_magic, score_size, ProbeScore, WeightClass},
    util::ReadSlice,
    TrackEncoding,
    UftError,
};

/// (base size, tracks, sides); the error-vector variant of each entry is
/// base size + total sectors.
const VARIANTS: [(usize, u8, u8); 4] = [
    (174_848, 35, 1),
    (196_608, 40, 1),
    (205_312, 42, 1),
    (349_696, 35, 2), // D71
];

/// Offset of the BAM / directory header block (track 18, sector 0).
const BAM_OFFSET: usize = 0x16500;

static DESCRIPTOR: FormatDescriptor = FormatDescriptor {
    id:   FORMAT_D64,
    name: "D64",
    description: "Commodore 1541/1571 sector image (D64/D71)",
    extensions: &["d64", "d71"],
    caps: FormatCaps::CAN_READ
        .union(FormatCaps::CAN_WRITE)
        .union(FormatCaps::SUPPORTS_ERRORS),
};

fn variant_for_size(size: usize) -> Option<(usize, u8, u8, bool)> {
    for &(base, tracks, sides) in &VARIANTS {
        let total = cbm::total_sectors(tracks)? * sides as usize;
        if size == base {
            return Some((base, tracks, sides, false));
        }
        if size == base + total {
            return Some((base, tracks, sides, true));
        }
    }
    None
}

/// Zone table for `tracks` tracks per side, repeated across `sides` so the
/// second side of a D71 continues after cylinder `tracks`.
fn zones(tracks: u8, sides: u8) -> Vec<Zone> {
    let mut out = Vec::new();
    for side in 0..sides as u16 {
        let shift = side * tracks as u16;
        out.extend(
            cbm::zones(tracks)
                .into_iter()
                .map(|z| Zone::new(z.cyl_start + shift, z.cyl_end + shift, z.sectors, z.data_rate_bps, z.nominal_rpm)),
        );
    }
    out
}

pub struct D64Adapter;

impl FormatAdapter for D64Adapter {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &DESCRIPTOR
    }

    fn probe(&self, bytes: &[u8], filename: Option<&str>) -> ProbeScore {
        let mut score = ProbeScore::new();
        let mut sizes = Vec::with_capacity(VARIANTS.len() * 2);
        for &(base, tracks, sides) in &VARIANTS {
            sizes.push(base);
            if let Some(total) = cbm::total_sectors(tracks) {
                sizes.push(base + total * sides as usize);
            }
        }
        score_size(&mut score, bytes.len(), &sizes);
        score_foreign_magic(&mut score, bytes);
        score_extension(&mut score, filename, DESCRIPTOR.extensions);

        // Directory header sanity: BAM block names track 18 sector 1 as the
        // first directory block and carries DOS version 'A'.
        let slice = ReadSlice::new(bytes);
        let bam_ok = slice.u8_at(BAM_OFFSET) == Some(18)
            && slice.u8_at(BAM_OFFSET + 1) == Some(1)
            && slice.u8_at(BAM_OFFSET + 2) == Some(0x41);
        if bam_ok {
            score.add("BAM header", WeightClass::Medium);
        }
        else {
            score.against("BAM header", WeightClass::Medium);
        }
        score
    }

    fn open(&self, bytes: &[u8]) -> Result<Box<dyn FormatState>, UftError> {
        let (base, tracks, sides, has_errors) = variant_for_size(bytes.len()).ok_or(UftError::Format)?;
        let cylinders = tracks as u16 * sides as u16;
        let geometry = Geometry::zoned(cylinders, 1, zones(tracks, sides), 1, 0)?;
        let error_map = has_errors.then(|| bytes[base..].to_vec());
        Ok(Box::new(D64State {
            geometry,
            data: bytes[..base].to_vec(),
            error_map,
        }))
    }
}

pub struct D64State {
    geometry:  Geometry,
    data:      Vec<u8>,
    error_map: Option<Vec<u8>>,
}

impl FormatState for D64State {
    fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn read_track(&self, ch: DiskCh) -> Result<Track, UftError> {
        let spt = self.geometry.sectors_per_cyl(ch.c())?;
        if ch.h() != 0 {
            return Err(UftError::Range);
        }
        let offset = self.geometry.track_offset(ch)?;
        let first_lba = offset / 256;

        let mut sectors = Vec::with_capacity(spt as usize);
        for s in 0..spt {
            let start = offset + s as usize * 256;
            let data = self.data.get(start..start + 256).ok_or(UftError::Corrupt)?;
            let mut sector = Sector::new(DiskChsn::new(ch.c(), 0, s, 1), data.to_vec());
            // DOS error code 0x01 is "no error"; anything else marks the
            // sector bad without failing the read.
            if let Some(map) = &self.error_map {
                let code = map.get(first_lba + s as usize).copied().unwrap_or(0x01);
                if code != 0x01 {
                    sector.crc_ok = false;
                    sector.confidence = 0;
                }
            }
            sectors.push(sector);
        }
        Ok(Track::new(ch, TrackEncoding::Gcr54, TrackPayload::Sectors(sectors)))
    }

    fn write_track(&mut self, track: &Track) -> Result<(), UftError> {
        let TrackPayload::Sectors(sectors) = &track.payload else {
            return Err(UftError::NotSupported);
        };
        let spt = self.geometry.sectors_per_cyl(track.ch.c())?;
        if track.ch.h() != 0 {
            return Err(UftError::Range);
        }
        let offset = self.geometry.track_offset(track.ch)?;
        for sector in sectors {
            if sector.id.s() >= spt {
                return Err(UftError::Range);
            }
            if sector.data.len() != 256 {
                return Err(UftError::InvalidArg);
            }
            let start = offset + sector.id.s() as usize * 256;
            let slot = self.data.get_mut(start..start + 256).ok_or(UftError::Corrupt)?;
            slot.copy_from_slice(&sector.data);
        }
        Ok(())
    }

    fn error_map(&self) -> Option<&[u8]> {
        self.error_map.as_deref()
    }

    fn to_bytes(&self) -> Result<Vec<u8>, UftError> {
        let mut out = self.data.clone();
        if let Some(map) = &self.error_map {
            out.extend_from_slice(map);
        }
        Ok(out)
    }
}
