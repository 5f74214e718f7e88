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

    src/formats/dsk.rs

    Amstrad CPC / Spectrum +3 DSK and EDSK containers: a 256-byte disk
    header, then per-track blocks opening with "Track-Info\r\n". Sector
    records carry the FDC's ST1/ST2 result bytes, preserving bad-CRC,
    deleted-mark and weak-sector copy-protection signals.
*/
use rand::Rng;

use crate::{
    adapter::{FormatAdapter, FormatCaps, FormatDescriptor, FormatState},
    chs::{DiskCh, DiskChsn},
    disk::{Sector, Track, TrackPayload},
    fdc::{interpret_status, FdcError, St0, St1, St2},
    formats::FORMAT_DSK,
    geometry::Geometry,
    probe::{score_extension, ProbeScore, WeightClass},
    util::ReadSlice,
    TrackEncoding,
    UftError,
};

pub const DSK_MAGIC: &[u8; 8] = b"MV - CPC";
pub const EDSK_MAGIC: &[u8; 8] = b"EXTENDED";
const TRACK_MAGIC: &[u8; 12] = b"Track-Info\r\n";

const HEADER_LEN: usize = 256;
const TRACK_HEADER_LEN: usize = 256;

static DESCRIPTOR: FormatDescriptor = FormatDescriptor {
    id:   FORMAT_DSK,
    name: "DSK",
    description: "Amstrad CPC / Spectrum +3 disk image (DSK/EDSK)",
    extensions: &["dsk"],
    caps: FormatCaps::CAN_READ.union(FormatCaps::SUPPORTS_ERRORS),
};

struct SectorInfo {
    id:       DiskChsn,
    st1:      St1,
    st2:      St2,
    data_len: usize,
}

pub struct DskAdapter;

impl FormatAdapter for DskAdapter {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &DESCRIPTOR
    }

    fn probe(&self, bytes: &[u8], filename: Option<&str>) -> ProbeScore {
        let mut score = ProbeScore::new();
        let slice = ReadSlice::new(bytes);
        if slice.matches_at(0, DSK_MAGIC) || slice.matches_at(0, EDSK_MAGIC) {
            score.add("magic", WeightClass::Magic);
        }
        else {
            score.against("magic", WeightClass::Magic);
        }
        if slice.matches_at(HEADER_LEN, TRACK_MAGIC) {
            score.add("track info block", WeightClass::Medium);
        }
        match (slice.u8_at(48), slice.u8_at(49)) {
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
        let slice = ReadSlice::new(bytes);
        let extended = if slice.matches_at(0, EDSK_MAGIC) {
            true
        }
        else if slice.matches_at(0, DSK_MAGIC) {
            false
        }
        else {
            return Err(UftError::Format);
        };
        let track_count = slice.u8_at(48).ok_or(UftError::Format)? as usize;
        let side_count = slice.u8_at(49).ok_or(UftError::Format)? as usize;
        if track_count == 0 || !(1..=2).contains(&side_count) {
            return Err(UftError::Format);
        }
        let uniform_track_size = slice.u16_le_at(50).ok_or(UftError::Format)? as usize;

        // Track sizes: one u16-LE for the standard format, a byte table in
        // units of 256 for EDSK (0 = track absent).
        let declared_size = |index: usize| -> Option<usize> {
            if extended {
                slice.u8_at(52 + index).map(|b| b as usize * 256)
            }
            else {
                Some(uniform_track_size)
            }
        };

        // Walk the track blocks: expect a Track-Info header at each step,
        // skip by the declared size when a block is missing, stop after
        // track_count * side_count entries. Trailing data is ignored.
        let mut tracks = Vec::with_capacity(track_count * side_count);
        let mut pos = HEADER_LEN;
        for index in 0..track_count * side_count {
            let size = declared_size(index).ok_or(UftError::Corrupt)?;
            if size == 0 {
                tracks.push(None);
                continue;
            }
            if !slice.matches_at(pos, TRACK_MAGIC) {
                // Header absent: advance by the declared size and carry on.
                log::warn!("dsk: missing Track-Info header for entry {index}");
                tracks.push(None);
                pos += size;
                continue;
            }
            tracks.push(Some(Self::parse_track(&slice, pos, extended)?));
            pos += size;
        }

        let geometry = Geometry::uniform(track_count as u16, side_count as u8, 0, 2, 1);
        Ok(Box::new(DskState {
            geometry,
            side_count,
            tracks,
            original: bytes.to_vec(),
        }))
    }
}

impl DskAdapter {
    fn parse_track(slice: &ReadSlice, base: usize, extended: bool) -> Result<Vec<Sector>, UftError> {
        let size_code = slice.u8_at(base + 0x14).ok_or(UftError::Corrupt)?;
        let sector_count = slice.u8_at(base + 0x15).ok_or(UftError::Corrupt)? as usize;

        let mut infos = Vec::with_capacity(sector_count);
        for i in 0..sector_count {
            let entry = base + 0x18 + i * 8;
            let id = DiskChsn::new(
                slice.u8_at(entry).ok_or(UftError::Corrupt)? as u16,
                slice.u8_at(entry + 1).ok_or(UftError::Corrupt)?,
                slice.u8_at(entry + 2).ok_or(UftError::Corrupt)?,
                slice.u8_at(entry + 3).ok_or(UftError::Corrupt)?,
            );
            let st1 = St1::from_bits_truncate(slice.u8_at(entry + 4).ok_or(UftError::Corrupt)?);
            let st2 = St2::from_bits_truncate(slice.u8_at(entry + 5).ok_or(UftError::Corrupt)?);
            let data_len = if extended {
                slice.u16_le_at(entry + 6).ok_or(UftError::Corrupt)? as usize
            }
            else {
                DiskChsn::n_to_bytes(size_code)
            };
            infos.push(SectorInfo { id, st1, st2, data_len });
        }

        let mut sectors = Vec::with_capacity(sector_count);
        let mut data_pos = base + TRACK_HEADER_LEN;
        for info in infos {
            let natural = info.id.n_size();
            let data = slice.bytes_at(data_pos, info.data_len).ok_or(UftError::Corrupt)?;
            let mut payload = data[..info.data_len.min(natural)].to_vec();
            // EDSK appends the two raw CRC bytes read off the disk when the
            // data field failed its CRC; keep the recorded value.
            let alternate_crc = (extended
                && info.data_len == natural + 2
                && info.st2.contains(St2::DATA_ERROR_IN_DATA))
            .then(|| u16::from_be_bytes([data[natural], data[natural + 1]]));
            // EDSK stores multiple copies of a weak sector back to back.
            // Bits that differ between copies read differently on every
            // revolution of the real disk, so each decode re-rolls them.
            let weak = info.data_len > natural && info.data_len % natural == 0;
            if weak {
                let copies = info.data_len / natural;
                let mut rng = rand::thread_rng();
                for (i, byte) in payload.iter_mut().enumerate() {
                    let mut diff = 0u8;
                    for copy in 1..copies {
                        diff |= *byte ^ data[copy * natural + i];
                    }
                    if diff != 0 {
                        *byte = (*byte & !diff) | (rng.gen::<u8>() & diff);
                    }
                }
            }
            let mut sector = Sector::new(info.id, payload);
            sector.weak = weak;
            sector.alternate_crc = alternate_crc;
            match interpret_status(St0::empty(), info.st1, info.st2) {
                None => {}
                Some(FdcError::DataCrc) | Some(FdcError::IdCrc) => {
                    sector.crc_ok = false;
                    sector.confidence = 5_000;
                }
                Some(FdcError::MissingDam) => {
                    sector.deleted = true;
                }
                Some(_) => {
                    sector.crc_ok = false;
                    sector.confidence = 2_500;
                }
            }
            // Deleted-mark flag travels in ST2 alongside any CRC state.
            if info.st2.contains(St2::CONTROL_MARK) {
                sector.deleted = true;
            }
            sectors.push(sector);
            data_pos += info.data_len;
        }
        Ok(sectors)
    }
}

pub struct DskState {
    geometry:   Geometry,
    side_count: usize,
    tracks:     Vec<Option<Vec<Sector>>>,
    original:   Vec<u8>,
}

impl FormatState for DskState {
    fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn read_track(&self, ch: DiskCh) -> Result<Track, UftError> {
        if ch.c() >= self.geometry.cylinders() || ch.h() as usize >= self.side_count {
            return Err(UftError::Range);
        }
        let index = ch.c() as usize * self.side_count + ch.h() as usize;
        let Some(Some(sectors)) = self.tracks.get(index) else {
            return Err(UftError::NotSupported);
        };
        Ok(Track::new(ch, TrackEncoding::Mfm, TrackPayload::Sectors(sectors.clone())))
    }

    fn to_bytes(&self) -> Result<Vec<u8>, UftError> {
        Ok(self.original.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One-track single-side standard DSK with two 512-byte sectors; the
    /// second sector carries a data CRC error and a deleted mark.
    fn tiny_dsk() -> Vec<u8> {
        let track_size = TRACK_HEADER_LEN + 2 * 512;
        let mut bytes = vec![0u8; HEADER_LEN + track_size];
        bytes[..8].copy_from_slice(DSK_MAGIC);
        bytes[48] = 1; // tracks
        bytes[49] = 1; // sides
        bytes[50..52].copy_from_slice(&(track_size as u16).to_le_bytes());

        let t = HEADER_LEN;
        bytes[t..t + 12].copy_from_slice(TRACK_MAGIC);
        bytes[t + 0x10] = 0; // cylinder
        bytes[t + 0x11] = 0; // head
        bytes[t + 0x14] = 2; // size code
        bytes[t + 0x15] = 2; // sectors
        for (i, (st1, st2)) in [(0u8, 0u8), (0x20, 0x60)].iter().enumerate() {
            let e = t + 0x18 + i * 8;
            bytes[e] = 0; // cylinder
            bytes[e + 1] = 0; // head
            bytes[e + 2] = i as u8 + 1; // sector id
            bytes[e + 3] = 2; // size code
            bytes[e + 4] = *st1;
            bytes[e + 5] = *st2;
        }
        for i in 0..512 {
            bytes[t + TRACK_HEADER_LEN + i] = 0x11;
            bytes[t + TRACK_HEADER_LEN + 512 + i] = 0x22;
        }
        bytes
    }

    #[test]
    fn probes_magic_and_structure() {
        let score = DskAdapter.probe(&tiny_dsk(), Some("game.dsk"));
        // Magic (60) + track info (25) + track count (25) + extension (10).
        assert_eq!(score.score(), 120);
        assert_eq!(DskAdapter.probe(&[0u8; 512], None).confidence(), 0);
    }

    #[test]
    fn preserves_fdc_status_signals() {
        let state = DskAdapter.open(&tiny_dsk()).unwrap();
        let track = state.read_track(DiskCh::new(0, 0)).unwrap();
        let TrackPayload::Sectors(sectors) = &track.payload else {
            panic!("expected sector payload");
        };
        assert_eq!(sectors.len(), 2);
        assert!(sectors[0].crc_ok);
        assert_eq!(sectors[0].data, vec![0x11; 512]);
        // ST1 0x20 / ST2 0x60: data CRC error on a deleted sector.
        assert!(!sectors[1].crc_ok);
        assert!(sectors[1].deleted);
        assert_eq!(sectors[1].data, vec![0x22; 512]);
    }

    /// One-track EDSK with a single 512-byte sector stored twice; the two
    /// copies differ only in byte 10.
    fn tiny_edsk() -> Vec<u8> {
        let track_size = TRACK_HEADER_LEN + 2 * 512;
        let mut bytes = vec![0u8; HEADER_LEN + track_size];
        bytes[..8].copy_from_slice(EDSK_MAGIC);
        bytes[48] = 1; // tracks
        bytes[49] = 1; // sides
        bytes[52] = (track_size / 256) as u8;

        let t = HEADER_LEN;
        bytes[t..t + 12].copy_from_slice(TRACK_MAGIC);
        bytes[t + 0x14] = 2; // size code
        bytes[t + 0x15] = 1; // sectors
        let e = t + 0x18;
        bytes[e + 2] = 1; // sector id
        bytes[e + 3] = 2; // size code
        bytes[e + 6..e + 8].copy_from_slice(&1024u16.to_le_bytes());
        for i in 0..1024 {
            bytes[t + TRACK_HEADER_LEN + i] = 0x55;
        }
        bytes[t + TRACK_HEADER_LEN + 512 + 10] = 0x5A;
        bytes
    }

    #[test]
    fn weak_sector_copies_randomize_only_differing_bits() {
        let state = DskAdapter.open(&tiny_edsk()).unwrap();
        let track = state.read_track(DiskCh::new(0, 0)).unwrap();
        let TrackPayload::Sectors(sectors) = &track.payload else {
            panic!("expected sector payload");
        };
        assert_eq!(sectors.len(), 1);
        let sector = &sectors[0];
        assert!(sector.weak);
        assert_eq!(sector.data.len(), 512);
        // Stable bytes read back verbatim.
        for (i, &b) in sector.data.iter().enumerate() {
            if i != 10 {
                assert_eq!(b, 0x55);
            }
        }
        // Byte 10 differs in bits 0x0F between copies; the rest is fixed.
        assert_eq!(sector.data[10] & 0xF0, 0x50);
    }

    /// One-track EDSK whose sector failed its data CRC; the two raw CRC
    /// bytes read off the disk follow the 512 data bytes.
    fn tiny_edsk_bad_crc() -> Vec<u8> {
        let track_size = 1024; // 256-byte header + 514 data bytes, padded
        let mut bytes = vec![0u8; HEADER_LEN + track_size];
        bytes[..8].copy_from_slice(EDSK_MAGIC);
        bytes[48] = 1; // tracks
        bytes[49] = 1; // sides
        bytes[52] = (track_size / 256) as u8;

        let t = HEADER_LEN;
        bytes[t..t + 12].copy_from_slice(TRACK_MAGIC);
        bytes[t + 0x14] = 2; // size code
        bytes[t + 0x15] = 1; // sectors
        let e = t + 0x18;
        bytes[e + 2] = 1; // sector id
        bytes[e + 3] = 2; // size code
        bytes[e + 4] = 0x20; // ST1: data error
        bytes[e + 5] = 0x20; // ST2: data error in data field
        bytes[e + 6..e + 8].copy_from_slice(&514u16.to_le_bytes());
        for i in 0..512 {
            bytes[t + TRACK_HEADER_LEN + i] = 0x33;
        }
        bytes[t + TRACK_HEADER_LEN + 512] = 0xDE;
        bytes[t + TRACK_HEADER_LEN + 513] = 0xAD;
        bytes
    }

    #[test]
    fn edsk_keeps_recorded_crc_of_bad_sector() {
        let state = DskAdapter.open(&tiny_edsk_bad_crc()).unwrap();
        let track = state.read_track(DiskCh::new(0, 0)).unwrap();
        let TrackPayload::Sectors(sectors) = &track.payload else {
            panic!("expected sector payload");
        };
        let sector = &sectors[0];
        assert!(!sector.crc_ok);
        assert!(!sector.weak);
        assert_eq!(sector.data, vec![0x33; 512]);
        assert_eq!(sector.alternate_crc, Some(0xDEAD));
        // A failed CRC drags the track confidence down with it.
        assert!(track.confidence < crate::CONFIDENCE_MAX);
    }

    #[test]
    fn sectorless_geometry_rejects_chs_mapping() {
        // DSK geometry only counts tracks; asking it to map an LBA must
        // come back as a range error.
        let state = DskAdapter.open(&tiny_dsk()).unwrap();
        assert!(matches!(state.geometry().chs(0), Err(UftError::Range)));
    }

    #[test]
    fn writes_are_not_supported() {
        let mut state = DskAdapter.open(&tiny_dsk()).unwrap();
        let track = state.read_track(DiskCh::new(0, 0)).unwrap();
        assert!(matches!(state.write_track(&track), Err(UftError::NotSupported)));
    }

    #[test]
    fn bad_magic_is_a_format_error() {
        let mut bytes = tiny_dsk();
        bytes[0] = b'X';
        assert!(matches!(DskAdapter.open(&bytes), Err(UftError::Format)));
    }
}
