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

    src/disk.rs

    The unified in-memory disk model every adapter decodes into: a sparse
    per-(cylinder, head) array of owned tracks, each holding decoded sectors,
    raw bitcells or raw pulse data, plus an optional per-sector error map.
*/
use crate::{
    adapter::FormatId,
    chs::{DiskCh, DiskChsn},
    geometry::Geometry,
    TrackEncoding,
    UftError,
};

/// Upper bound on a track's diagnostic note; longer notes are truncated at
/// a character boundary.
pub const MAX_DIAGNOSTIC_LEN: usize = 256;

/// One decoded sector and its health.
#[derive(Clone, Debug)]
pub struct Sector {
    /// Recorded sector id, which need not match its physical position.
    pub id:   DiskChsn,
    pub data: Vec<u8>,
    /// CRC over the data field verified (or declared good by the source).
    pub crc_ok: bool,
    /// Carried a deleted data address mark.
    pub deleted: bool,
    /// Read inconsistently across revolutions.
    pub weak: bool,
    /// The source recorded a CRC different from the computed one.
    pub alternate_crc: Option<u16>,
    /// Decode confidence, 0..=10000 in hundredths of a percent.
    pub confidence: u16,
}

impl Sector {
    pub fn new(id: DiskChsn, data: Vec<u8>) -> Sector {
        Sector {
            id,
            data,
            crc_ok: true,
            deleted: false,
            weak: false,
            alternate_crc: None,
            confidence: crate::CONFIDENCE_MAX,
        }
    }
}

/// Payload of one track, at whatever resolution the source format stores.
#[derive(Clone, Debug)]
pub enum TrackPayload {
    /// Fully decoded sectors.
    Sectors(Vec<Sector>),
    /// Raw bitcells; `bit_len` counts the valid bits of `bits`.
    RawBits { bits: Vec<u8>, bit_len: usize },
    /// Flux or tape pulse intervals.
    Pulses { data: Vec<u32> },
}

impl TrackPayload {
    pub fn sector_count(&self) -> usize {
        match self {
            TrackPayload::Sectors(sectors) => sectors.len(),
            _ => 0,
        }
    }
}

/// One physical track.
#[derive(Clone, Debug)]
pub struct Track {
    pub ch:       DiskCh,
    pub encoding: TrackEncoding,
    pub payload:  TrackPayload,
    /// Worst sector confidence on the track, 0..=10000.
    pub confidence: u16,
    diagnostic: Option<String>,
}

impl Track {
    pub fn new(ch: DiskCh, encoding: TrackEncoding, payload: TrackPayload) -> Track {
        let confidence = match &payload {
            TrackPayload::Sectors(sectors) => sectors
                .iter()
                .map(|s| s.confidence)
                .min()
                .unwrap_or(crate::CONFIDENCE_MAX),
            _ => crate::CONFIDENCE_MAX,
        };
        Track {
            ch,
            encoding,
            payload,
            confidence,
            diagnostic: None,
        }
    }

    /// Attach a bounded human-readable note about decode trouble.
    pub fn set_diagnostic(&mut self, note: &str) {
        let mut note = note.to_string();
        if note.len() > MAX_DIAGNOSTIC_LEN {
            let mut end = MAX_DIAGNOSTIC_LEN;
            while !note.is_char_boundary(end) {
                end -= 1;
            }
            note.truncate(end);
        }
        self.diagnostic = Some(note);
    }

    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    /// Find a decoded sector by its recorded id.
    pub fn sector(&self, sector_id: u8) -> Option<&Sector> {
        match &self.payload {
            TrackPayload::Sectors(sectors) => sectors.iter().find(|s| s.id.s() == sector_id),
            _ => None,
        }
    }
}

/// A complete disk image in the unified model.
#[derive(Clone, Debug)]
pub struct DiskImage {
    format:   FormatId,
    geometry: Geometry,
    encoding: TrackEncoding,
    /// Sparse, indexed by cylinder * heads + head.
    tracks: Vec<Option<Track>>,
    /// Flat per-sector status bytes in LBA order, when the source carries
    /// them.
    error_map: Option<Vec<u8>>,
}

impl DiskImage {
    pub fn new(format: FormatId, geometry: Geometry, encoding: TrackEncoding) -> DiskImage {
        let slots = geometry.cylinders() as usize * geometry.heads() as usize;
        DiskImage {
            format,
            geometry,
            encoding,
            tracks: vec![None; slots],
            error_map: None,
        }
    }

    pub fn format(&self) -> FormatId {
        self.format
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn encoding(&self) -> TrackEncoding {
        self.encoding
    }

    fn slot(&self, ch: DiskCh) -> Result<usize, UftError> {
        if ch.c() >= self.geometry.cylinders() || ch.h() >= self.geometry.heads() {
            return Err(UftError::Range);
        }
        Ok(ch.c() as usize * self.geometry.heads() as usize + ch.h() as usize)
    }

    /// Store a track, replacing any previous content at its position.
    pub fn put_track(&mut self, track: Track) -> Result<(), UftError> {
        let slot = self.slot(track.ch)?;
        self.tracks[slot] = Some(track);
        Ok(())
    }

    pub fn track(&self, ch: DiskCh) -> Result<Option<&Track>, UftError> {
        let slot = self.slot(ch)?;
        Ok(self.tracks[slot].as_ref())
    }

    pub fn track_mut(&mut self, ch: DiskCh) -> Result<Option<&mut Track>, UftError> {
        let slot = self.slot(ch)?;
        Ok(self.tracks[slot].as_mut())
    }

    /// Iterate over the tracks that are present, in (cylinder, head) order.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter().flatten()
    }

    pub fn track_count(&self) -> usize {
        self.tracks.iter().flatten().count()
    }

    pub fn set_error_map(&mut self, map: Vec<u8>) {
        self.error_map = Some(map);
    }

    pub fn error_map(&self) -> Option<&[u8]> {
        self.error_map.as_deref()
    }

    /// Worst track confidence across the image, 0..=10000.
    pub fn confidence(&self) -> u16 {
        self.tracks()
            .map(|t| t.confidence)
            .min()
            .unwrap_or(crate::CONFIDENCE_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;

    fn image() -> DiskImage {
        let geometry = Geometry::uniform(40, 2, 9, 2, 1);
        DiskImage::new(FormatId(1), geometry, TrackEncoding::Mfm)
    }

    fn sector_track(ch: DiskCh, confidences: &[u16]) -> Track {
        let sectors = confidences
            .iter()
            .enumerate()
            .map(|(i, &conf)| {
                let mut s = Sector::new(DiskChsn::from((ch.c(), ch.h(), i as u8 + 1, 2)), vec![0; 512]);
                s.confidence = conf;
                s
            })
            .collect();
        Track::new(ch, TrackEncoding::Mfm, TrackPayload::Sectors(sectors))
    }

    #[test]
    fn sparse_track_storage() {
        let mut img = image();
        assert_eq!(img.track_count(), 0);
        img.put_track(sector_track(DiskCh::new(5, 1), &[10_000])).unwrap();
        assert_eq!(img.track_count(), 1);
        assert!(img.track(DiskCh::new(5, 0)).unwrap().is_none());
        assert!(img.track(DiskCh::new(5, 1)).unwrap().is_some());
        // Replacement, not accumulation.
        img.put_track(sector_track(DiskCh::new(5, 1), &[9_000])).unwrap();
        assert_eq!(img.track_count(), 1);
    }

    #[test]
    fn out_of_range_is_rejected() {
        let mut img = image();
        assert!(matches!(
            img.put_track(sector_track(DiskCh::new(40, 0), &[10_000])),
            Err(UftError::Range)
        ));
        assert!(matches!(img.track(DiskCh::new(0, 2)), Err(UftError::Range)));
    }

    #[test]
    fn confidence_is_worst_case() {
        let mut img = image();
        img.put_track(sector_track(DiskCh::new(0, 0), &[10_000, 7_500, 9_000])).unwrap();
        img.put_track(sector_track(DiskCh::new(1, 0), &[10_000])).unwrap();
        assert_eq!(img.track(DiskCh::new(0, 0)).unwrap().unwrap().confidence, 7_500);
        assert_eq!(img.confidence(), 7_500);
    }

    #[test]
    fn diagnostic_is_bounded() {
        let mut track = sector_track(DiskCh::new(0, 0), &[10_000]);
        track.set_diagnostic(&"x".repeat(1000));
        assert_eq!(track.diagnostic().unwrap().len(), MAX_DIAGNOSTIC_LEN);
        track.set_diagnostic("id crc error in sector 3");
        assert_eq!(track.diagnostic(), Some("id crc error in sector 3"));
    }

    #[test]
    fn sector_lookup_by_id() {
        let track = sector_track(DiskCh::new(0, 0), &[10_000, 10_000, 10_000]);
        assert!(track.sector(2).is_some());
        assert!(track.sector(9).is_none());
        assert_eq!(track.payload.sector_count(), 3);
    }
}
