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

    src/formats/scl.rs

    Sinclair SCL archives: a "SINCLAIR" magic, a file count, 14-byte catalog
    entries and sector-aligned file data. An SCL is a TR-DOS disk with the
    free space squeezed out; opening one lays the files back onto a standard
    80-track double-sided TR-DOS image.
*/
use crate::{
    adapter::{FormatAdapter, FormatCaps, FormatDescriptor, FormatState},
    chs::DiskCh,
    disk::Track,
    formats::{read_flat_track, FORMAT_SCL},
    geometry::Geometry,
    probe::{score_extension, score_magic, ProbeScore, WeightClass},
    util::ReadSlice,
    TrackEncoding,
    UftError,
};

pub const SCL_MAGIC: &[u8; 8] = b"SINCLAIR";
const ENTRY_LEN: usize = 14;
const SECTOR_SIZE: usize = 256;

/// One catalog entry plus its (sector-aligned) data.
#[derive(Clone, Debug, PartialEq)]
pub struct SclFile {
    /// Space-padded 8-character TR-DOS name.
    pub name: [u8; 8],
    pub file_type: u8,
    pub params: [u8; 3],
    pub data: Vec<u8>,
}

impl SclFile {
    pub fn sectors(&self) -> u8 {
        self.data.len().div_ceil(SECTOR_SIZE) as u8
    }

    /// Name with trailing padding removed.
    pub fn name_str(&self) -> String {
        String::from_utf8_lossy(&self.name).trim_end().to_string()
    }
}

/// Serialize a catalog back to SCL bytes. File data is padded with zeroes
/// to a multiple of 256 bytes.
pub fn build(files: &[SclFile]) -> Result<Vec<u8>, UftError> {
    if files.len() > 255 {
        return Err(UftError::InvalidArg);
    }
    let mut out = Vec::new();
    out.extend_from_slice(SCL_MAGIC);
    out.push(files.len() as u8);
    for file in files {
        out.extend_from_slice(&file.name);
        out.push(file.file_type);
        out.extend_from_slice(&file.params);
        out.push(0x00);
        out.push(file.sectors());
    }
    for file in files {
        out.extend_from_slice(&file.data);
        let pad = file.data.len().next_multiple_of(SECTOR_SIZE) - file.data.len();
        out.extend(std::iter::repeat(0u8).take(pad));
    }
    Ok(out)
}

static DESCRIPTOR: FormatDescriptor = FormatDescriptor {
    id:   FORMAT_SCL,
    name: "SCL",
    description: "Sinclair TR-DOS archive",
    extensions: &["scl"],
    caps: FormatCaps::CAN_READ,
};

pub struct SclAdapter;

impl FormatAdapter for SclAdapter {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &DESCRIPTOR
    }

    fn probe(&self, bytes: &[u8], filename: Option<&str>) -> ProbeScore {
        let mut score = ProbeScore::new();
        score_magic(&mut score, bytes, SCL_MAGIC);
        let slice = ReadSlice::new(bytes);
        // Catalog and data must fit the declared file count.
        if let Some(count) = slice.u8_at(8) {
            let catalog_end = 9 + count as usize * ENTRY_LEN;
            if bytes.len() >= catalog_end {
                score.add("catalog", WeightClass::Medium);
            }
            else {
                score.against("catalog", WeightClass::Medium);
            }
        }
        score_extension(&mut score, filename, DESCRIPTOR.extensions);
        score
    }

    fn open(&self, bytes: &[u8]) -> Result<Box<dyn FormatState>, UftError> {
        Ok(Box::new(open_scl(bytes)?))
    }
}

/// Parse an SCL archive into its concrete state.
pub fn open_scl(bytes: &[u8]) -> Result<SclState, UftError> {
    let slice = ReadSlice::new(bytes);
    if !slice.matches_at(0, SCL_MAGIC) {
        return Err(UftError::Format);
    }
    let count = slice.u8_at(8).ok_or(UftError::Format)? as usize;

    let mut files = Vec::with_capacity(count);
    let mut data_pos = 9 + count * ENTRY_LEN;
    for i in 0..count {
        let entry = 9 + i * ENTRY_LEN;
        let name: [u8; 8] = slice
            .bytes_at(entry, 8)
            .and_then(|b| b.try_into().ok())
            .ok_or(UftError::Corrupt)?;
        let file_type = slice.u8_at(entry + 8).ok_or(UftError::Corrupt)?;
        let params: [u8; 3] = slice
            .bytes_at(entry + 9, 3)
            .and_then(|b| b.try_into().ok())
            .ok_or(UftError::Corrupt)?;
        let sectors = slice.u8_at(entry + 13).ok_or(UftError::Corrupt)? as usize;
        let data = slice
            .bytes_at(data_pos, sectors * SECTOR_SIZE)
            .ok_or(UftError::Corrupt)?;
        data_pos += sectors * SECTOR_SIZE;
        files.push(SclFile {
            name,
            file_type,
            params,
            data: data.to_vec(),
        });
    }

    // Lay the files onto a standard 80x2 TR-DOS disk: catalog on track 0,
    // file data from track 1 on.
    let geometry = Geometry::uniform(80, 2, 16, 1, 1);
    let mut disk = vec![0u8; 80 * 2 * 16 * SECTOR_SIZE];
    let mut free_lba = 16usize; // first sector of track 1
    for (i, file) in files.iter().enumerate() {
        if free_lba + file.sectors() as usize > 80 * 2 * 16 || i >= 128 {
            return Err(UftError::Corrupt);
        }
        let dir = i * 16;
        disk[dir..dir + 8].copy_from_slice(&file.name);
        disk[dir + 8] = file.file_type;
        disk[dir + 9..dir + 12].copy_from_slice(&file.params);
        disk[dir + 13] = file.sectors();
        disk[dir + 14] = (free_lba % 16) as u8; // start sector
        disk[dir + 15] = (free_lba / 16) as u8; // start track
        let start = free_lba * SECTOR_SIZE;
        disk[start..start + file.data.len()].copy_from_slice(&file.data);
        free_lba += file.sectors() as usize;
    }
    // System sector fields.
    let sys = 0x800;
    disk[sys + 0xE1] = (free_lba % 16) as u8;
    disk[sys + 0xE2] = (free_lba / 16) as u8;
    disk[sys + 0xE3] = 0x16;
    disk[sys + 0xE4] = files.len() as u8;
    let free = (2544usize + 16).saturating_sub(free_lba) as u16;
    disk[sys + 0xE5..sys + 0xE7].copy_from_slice(&free.to_le_bytes());
    disk[sys + 0xE7] = 0x10;
    disk[sys + 0xF5..sys + 0xFD].copy_from_slice(b"        ");

    Ok(SclState { geometry, files, disk })
}

pub struct SclState {
    geometry: Geometry,
    files:    Vec<SclFile>,
    /// TR-DOS rendition of the archive, for track reads.
    disk: Vec<u8>,
}

impl SclState {
    pub fn files(&self) -> &[SclFile] {
        &self.files
    }
}

impl FormatState for SclState {
    fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn read_track(&self, ch: DiskCh) -> Result<Track, UftError> {
        read_flat_track(&self.disk, &self.geometry, ch, TrackEncoding::Mfm)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, UftError> {
        build(&self.files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::TrackPayload;

    fn one_file() -> Vec<SclFile> {
        vec![SclFile {
            name: *b"TEST    ",
            file_type: b'B',
            params: [0, 0, 0],
            data: vec![0u8; 256],
        }]
    }

    #[test]
    fn builds_minimal_archive() {
        let bytes = build(&one_file()).unwrap();
        // magic (8) + count (1) + entry (14) + one sector (256).
        assert_eq!(bytes.len(), 279);
        assert_eq!(&bytes[..8], SCL_MAGIC);
        assert_eq!(bytes[8], 1);
        assert_eq!(&bytes[9..17], b"TEST    ");
        assert_eq!(bytes[17], b'B');
        assert_eq!(bytes[22], 1); // sector count
    }

    #[test]
    fn reopens_built_archive() {
        let bytes = build(&one_file()).unwrap();
        let state = open_scl(&bytes).unwrap();
        assert_eq!(state.files().len(), 1);
        let file = &state.files()[0];
        assert_eq!(file.name_str(), "TEST");
        assert_eq!(file.sectors(), 1);
        assert_eq!(file.data, vec![0u8; 256]);
        // Round trip.
        assert_eq!(state.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn build_pads_to_sector_boundary() {
        let files = vec![SclFile {
            name: *b"CODE    ",
            file_type: b'C',
            params: [0x00, 0x80, 0x01],
            data: vec![0xAA; 300],
        }];
        let bytes = build(&files).unwrap();
        assert_eq!(bytes.len(), 9 + 14 + 512);
        let state = open_scl(&bytes).unwrap();
        assert_eq!(state.files()[0].sectors(), 2);
        assert_eq!(&state.files()[0].data[..300], &[0xAA; 300][..]);
        assert!(state.files()[0].data[300..].iter().all(|&b| b == 0));
    }

    #[test]
    fn lays_files_onto_trdos_tracks() {
        let bytes = build(&one_file()).unwrap();
        let state = open_scl(&bytes).unwrap();
        assert_eq!(state.geometry().cylinders(), 80);
        // File data starts on track 1 (cylinder 0 is head 0/1 catalog).
        let track = state.read_track(DiskCh::new(0, 1)).unwrap();
        assert!(matches!(track.payload, TrackPayload::Sectors(_)));
    }

    #[test]
    fn truncated_data_region_is_corrupt() {
        let mut bytes = build(&one_file()).unwrap();
        bytes.truncate(100);
        assert!(matches!(open_scl(&bytes), Err(UftError::Corrupt)));
    }
}
