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

    src/formats/raw.rs

    Headerless raw sector images (PC IMG/IMA, Atari ST, Amiga ADF, D81, MGT,
    VDK and friends). Geometry is resolved from the file size through the
    standard-format preset table; track data is the flat CHS-ordered slice.
*/
use strum::IntoEnumIterator;

use crate::{
    adapter::{FormatAdapter, FormatCaps, FormatDescriptor, FormatState},
    chs::DiskCh,
    disk::Track,
    formats::{read_flat_track, write_flat_track, FORMAT_RAW},
    geometry::Geometry,
    probe::{score_extension, score_foreign_magic, score_size, ProbeScore, WeightClass},
    standard_format::StandardFormat,
    util::ReadSlice,
    UftError,
};

static DESCRIPTOR: FormatDescriptor = FormatDescriptor {
    id:   FORMAT_RAW,
    name: "RAW",
    description: "Raw sector image (IMG/IMA/ST/ADF/D81/MGT/VDK)",
    extensions: &["img", "ima", "st", "adf", "d81", "mgt", "vdk", "dsk"],
    caps: FormatCaps::CAN_READ
        .union(FormatCaps::CAN_WRITE)
        .union(FormatCaps::CAN_CREATE),
};

pub struct RawAdapter;

impl FormatAdapter for RawAdapter {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &DESCRIPTOR
    }

    fn probe(&self, bytes: &[u8], filename: Option<&str>) -> ProbeScore {
        let mut score = ProbeScore::new();
        let sizes: Vec<usize> = StandardFormat::iter().map(|f| f.size()).collect();
        score_size(&mut score, bytes.len(), &sizes);
        score_foreign_magic(&mut score, bytes);
        score_extension(&mut score, filename, DESCRIPTOR.extensions);

        let slice = ReadSlice::new(bytes);
        // An x86 boot jump opens most PC-formatted images.
        if matches!(slice.u8_at(0), Some(0xEB) | Some(0xE9)) {
            score.add("x86 boot jump", WeightClass::Medium);
        }
        // FAT BPB plausibility: sector size, cluster size and media
        // descriptor all sit in the boot sector at fixed offsets.
        if let (Some(bps), Some(spc), Some(media)) = (slice.u16_le_at(11), slice.u8_at(13), slice.u8_at(21)) {
            if matches!(bps, 128 | 256 | 512 | 1024) && spc.is_power_of_two() && (media == 0xF0 || media >= 0xF8) {
                score.add("BPB sanity", WeightClass::Medium);
            }
        }
        // CP/M-style media leave the directory region filled with 0xE5.
        if let Some(dir) = slice.bytes_at(0, 128) {
            if dir.iter().filter(|&&b| b == 0xE5).count() >= 96 {
                score.add("0xE5 fill density", WeightClass::Medium);
            }
        }
        score
    }

    fn open(&self, bytes: &[u8]) -> Result<Box<dyn FormatState>, UftError> {
        let preset = StandardFormat::from_size(bytes.len()).ok_or(UftError::Format)?;
        Ok(Box::new(RawState {
            preset,
            geometry: preset.geometry(),
            data: bytes.to_vec(),
        }))
    }

    fn create(&self, geometry: &Geometry) -> Result<Box<dyn FormatState>, UftError> {
        let total = geometry.total_sectors() * crate::chs::DiskChsn::n_to_bytes(geometry.size_code());
        let preset = StandardFormat::from_size(total).ok_or(UftError::InvalidArg)?;
        Ok(Box::new(RawState {
            preset,
            geometry: geometry.clone(),
            data: vec![preset.fill_byte(); total],
        }))
    }
}

pub struct RawState {
    preset:   StandardFormat,
    geometry: Geometry,
    data:     Vec<u8>,
}

impl RawState {
    pub fn preset(&self) -> StandardFormat {
        self.preset
    }
}

impl FormatState for RawState {
    fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn read_track(&self, ch: DiskCh) -> Result<Track, UftError> {
        read_flat_track(&self.data, &self.geometry, ch, self.preset.encoding())
    }

    fn write_track(&mut self, track: &Track) -> Result<(), UftError> {
        write_flat_track(&mut self.data, &self.geometry, track)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, UftError> {
        Ok(self.data.clone())
    }
}
