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

    src/formats/apple.rs

    Apple II raw sector images (DSK/DO/PO). Headerless, so identification
    leans on the two canonical sizes; an unfamiliar size that still divides
    into 256-byte sectors keeps a weak claim, since Apple media are regularly
    dumped with nonstandard track counts.
*/
use crate::{
    adapter::{FormatAdapter, FormatCaps, FormatDescriptor, FormatState},
    chs::DiskCh,
    disk::Track,
    formats::{read_flat_track, write_flat_track, FORMAT_APPLE},
    geometry::Geometry,
    probe::{score_extension, score_foreign_magic, score_size, ProbeScore, WeightClass},
    TrackEncoding,
    UftError,
};

/// 5.25" DOS 3.3 (35 tracks x 16 x 256) and 3.5" 800K (80 x 2 x 10 x 512).
const DOS33_SIZE: usize = 143_360;
const MAC800_SIZE: usize = 819_200;

static DESCRIPTOR: FormatDescriptor = FormatDescriptor {
    id:   FORMAT_APPLE,
    name: "Apple DSK",
    description: "Apple II raw sector image",
    extensions: &["dsk", "do", "po"],
    caps: FormatCaps::CAN_READ.union(FormatCaps::CAN_WRITE),
};

pub struct AppleAdapter;

impl FormatAdapter for AppleAdapter {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &DESCRIPTOR
    }

    fn probe(&self, bytes: &[u8], filename: Option<&str>) -> ProbeScore {
        let mut score = ProbeScore::new();
        if bytes.len() == DOS33_SIZE || bytes.len() == MAC800_SIZE {
            score_size(&mut score, bytes.len(), &[DOS33_SIZE, MAC800_SIZE]);
        }
        else if !bytes.is_empty() && bytes.len() % 256 == 0 {
            score.add("sector granularity", WeightClass::Medium);
        }
        else {
            score.against("size", WeightClass::Low);
        }
        score_foreign_magic(&mut score, bytes);
        score_extension(&mut score, filename, DESCRIPTOR.extensions);
        score
    }

    fn open(&self, bytes: &[u8]) -> Result<Box<dyn FormatState>, UftError> {
        let geometry = match bytes.len() {
            DOS33_SIZE => Geometry::uniform(35, 1, 16, 1, 0),
            MAC800_SIZE => Geometry::uniform(80, 2, 10, 2, 0),
            _ => return Err(UftError::Format),
        };
        Ok(Box::new(AppleState {
            geometry,
            data: bytes.to_vec(),
        }))
    }
}

pub struct AppleState {
    geometry: Geometry,
    data:     Vec<u8>,
}

impl FormatState for AppleState {
    fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn read_track(&self, ch: DiskCh) -> Result<Track, UftError> {
        read_flat_track(&self.data, &self.geometry, ch, TrackEncoding::Gcr62)
    }

    fn write_track(&mut self, track: &Track) -> Result<(), UftError> {
        write_flat_track(&mut self.data, &self.geometry, track)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, UftError> {
        Ok(self.data.clone())
    }
}
