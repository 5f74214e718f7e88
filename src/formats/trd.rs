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

    src/formats/trd.rs

    TR-DOS (ZX Spectrum Beta Disk) raw sector images. The system sector is
    track 0 sector 9 (byte offset 0x800); its disk-type byte selects one of
    four 40/80-track, single/double-sided geometries and byte 0xE7 carries
    the TR-DOS id 0x10.
*/
use crate::{
    adapter::{FormatAdapter, FormatCaps, FormatDescriptor, FormatState},
    chs::DiskCh,
    disk::Track,
    formats::{read_flat_track, write_flat_track, FORMAT_TRD},
    geometry::Geometry,
    probe::{score_extension, score_foreign_magic, score_size, ProbeScore, WeightClass},
    util::ReadSlice,
    TrackEncoding,
    UftError,
};

/// Byte offset of the system sector (track 0, sector 9).
const SYSTEM_SECTOR: usize = 0x800;
/// Field offsets within the image (system sector + 0xE1..0xF5).
const OFF_FIRST_FREE_SECTOR: usize = SYSTEM_SECTOR + 0xE1;
const OFF_FIRST_FREE_TRACK: usize = SYSTEM_SECTOR + 0xE2;
const OFF_DISK_TYPE: usize = SYSTEM_SECTOR + 0xE3;
const OFF_FILE_COUNT: usize = SYSTEM_SECTOR + 0xE4;
const OFF_FREE_SECTORS: usize = SYSTEM_SECTOR + 0xE5;
const OFF_TRDOS_ID: usize = SYSTEM_SECTOR + 0xE7;
const OFF_LABEL: usize = SYSTEM_SECTOR + 0xF5;

pub const TRDOS_ID: u8 = 0x10;

/// Disk-type byte -> (tracks, sides).
fn layout_for_type(disk_type: u8) -> Option<(u16, u8)> {
    match disk_type {
        0x16 => Some((80, 2)),
        0x17 => Some((40, 2)),
        0x18 => Some((80, 1)),
        0x19 => Some((40, 1)),
        _ => None,
    }
}

const SECTORS_PER_TRACK: u8 = 16;
const SECTOR_SIZE: usize = 256;

static DESCRIPTOR: FormatDescriptor = FormatDescriptor {
    id:   FORMAT_TRD,
    name: "TRD",
    description: "TR-DOS Beta Disk sector image",
    extensions: &["trd"],
    caps: FormatCaps::CAN_READ.union(FormatCaps::CAN_WRITE),
};

pub struct TrdAdapter;

impl FormatAdapter for TrdAdapter {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &DESCRIPTOR
    }

    fn probe(&self, bytes: &[u8], filename: Option<&str>) -> ProbeScore {
        let mut score = ProbeScore::new();
        const SIZES: [usize; 4] = [
            80 * 2 * 16 * 256, // 655360
            40 * 2 * 16 * 256,
            80 * 16 * 256,
            40 * 16 * 256,
        ];
        score_size(&mut score, bytes.len(), &SIZES);
        score_foreign_magic(&mut score, bytes);

        let slice = ReadSlice::new(bytes);
        if slice.u8_at(OFF_TRDOS_ID) == Some(TRDOS_ID) {
            score.add("TR-DOS id", WeightClass::Medium);
        }
        else {
            score.against("TR-DOS id", WeightClass::Medium);
        }
        match slice.u8_at(OFF_DISK_TYPE) {
            Some(t) if layout_for_type(t).is_some() => {
                score.add("disk type", WeightClass::Medium);
            }
            _ => {
                score.against("disk type", WeightClass::Medium);
            }
        }
        score_extension(&mut score, filename, DESCRIPTOR.extensions);
        score
    }

    fn open(&self, bytes: &[u8]) -> Result<Box<dyn FormatState>, UftError> {
        Ok(Box::new(open_trd(bytes)?))
    }
}

/// Open a TRD image into its concrete state, exposing the system-sector
/// fields directly.
pub fn open_trd(bytes: &[u8]) -> Result<TrdState, UftError> {
    let slice = ReadSlice::new(bytes);
    if slice.u8_at(OFF_TRDOS_ID) != Some(TRDOS_ID) {
        return Err(UftError::Format);
    }
    let disk_type = slice.u8_at(OFF_DISK_TYPE).ok_or(UftError::Format)?;
    let (tracks, sides) = layout_for_type(disk_type).ok_or(UftError::Format)?;
    let expected = tracks as usize * sides as usize * SECTORS_PER_TRACK as usize * SECTOR_SIZE;
    if bytes.len() != expected {
        return Err(UftError::Corrupt);
    }
    Ok(TrdState {
        geometry: Geometry::uniform(tracks, sides, SECTORS_PER_TRACK, 1, 1),
        disk_type,
        data: bytes.to_vec(),
    })
}

pub struct TrdState {
    geometry:  Geometry,
    disk_type: u8,
    data:      Vec<u8>,
}

impl TrdState {
    fn system(&self, offset: usize) -> u8 {
        // Bounds were validated at open.
        self.data[offset]
    }

    pub fn disk_type(&self) -> u8 {
        self.disk_type
    }

    pub fn tracks(&self) -> u16 {
        self.geometry.cylinders()
    }

    pub fn sides(&self) -> u8 {
        self.geometry.heads()
    }

    pub fn first_free_sector(&self) -> u8 {
        self.system(OFF_FIRST_FREE_SECTOR)
    }

    pub fn first_free_track(&self) -> u8 {
        self.system(OFF_FIRST_FREE_TRACK)
    }

    pub fn file_count(&self) -> u8 {
        self.system(OFF_FILE_COUNT)
    }

    pub fn free_sectors(&self) -> u16 {
        u16::from_le_bytes([self.system(OFF_FREE_SECTORS), self.system(OFF_FREE_SECTORS + 1)])
    }

    /// Space-padded 8-character disk label.
    pub fn label(&self) -> &[u8] {
        &self.data[OFF_LABEL..OFF_LABEL + 8]
    }
}

impl FormatState for TrdState {
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
        Ok(self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::TrackPayload;

    fn trd_image(disk_type: u8) -> Vec<u8> {
        let (tracks, sides) = layout_for_type(disk_type).unwrap();
        let mut data = vec![0u8; tracks as usize * sides as usize * 16 * 256];
        data[OFF_FIRST_FREE_SECTOR] = 0x00;
        data[OFF_FIRST_FREE_TRACK] = 0x01;
        data[OFF_DISK_TYPE] = disk_type;
        data[OFF_FILE_COUNT] = 3;
        data[OFF_FREE_SECTORS..OFF_FREE_SECTORS + 2].copy_from_slice(&2544u16.to_le_bytes());
        data[OFF_TRDOS_ID] = TRDOS_ID;
        data[OFF_LABEL..OFF_LABEL + 8].copy_from_slice(b"testdisk");
        data
    }

    #[test]
    fn probes_system_sector() {
        let score = TrdAdapter.probe(&trd_image(0x16), None);
        // Exact size (50) + TR-DOS id (25) + disk type (25).
        assert_eq!(score.score(), 100);
        assert!(score.confidence() >= 85);
        assert_eq!(TrdAdapter.probe(&[0u8; 4096], None).confidence(), 0);
    }

    #[test]
    fn parses_system_sector_fields() {
        let state = open_trd(&trd_image(0x16)).unwrap();
        assert_eq!(state.disk_type(), 0x16);
        assert_eq!(state.tracks(), 80);
        assert_eq!(state.sides(), 2);
        assert_eq!(state.first_free_sector(), 0x00);
        assert_eq!(state.first_free_track(), 0x01);
        assert_eq!(state.file_count(), 3);
        assert_eq!(state.free_sectors(), 2544);
        assert_eq!(state.label(), b"testdisk");
    }

    #[test]
    fn layouts_follow_disk_type() {
        for (ty, tracks, sides) in [(0x16u8, 80u16, 2u8), (0x17, 40, 2), (0x18, 80, 1), (0x19, 40, 1)] {
            let state = open_trd(&trd_image(ty)).unwrap();
            assert_eq!((state.tracks(), state.sides()), (tracks, sides));
        }
        // Size not matching the declared type is inconsistent.
        let mut image = trd_image(0x16);
        image.truncate(40 * 2 * 16 * 256);
        assert!(matches!(open_trd(&image), Err(UftError::Corrupt)));
    }

    #[test]
    fn sector_write_round_trips() {
        let image = trd_image(0x16);
        let mut state = open_trd(&image).unwrap();
        let mut track = state.read_track(DiskCh::new(10, 1)).unwrap();
        if let TrackPayload::Sectors(sectors) = &mut track.payload {
            assert_eq!(sectors.len(), 16);
            sectors[0].data.fill(0x99);
        }
        state.write_track(&track).unwrap();
        let out = state.to_bytes().unwrap();
        assert_ne!(out, image);

        let reread = open_trd(&out).unwrap();
        let track = reread.read_track(DiskCh::new(10, 1)).unwrap();
        if let TrackPayload::Sectors(sectors) = &track.payload {
            assert_eq!(sectors[0].data, vec![0x99; 256]);
        }
    }
}
