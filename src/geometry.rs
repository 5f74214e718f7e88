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

    src/geometry.rs

    CHS <-> LBA mapping over uniform and variable-geometry disks.

    Uniform geometry is the closed-form (c*H + h)*S + (s - base) mapping.
    Zoned geometry (Victor 9000, CBM speed zones) dispatches the per-cylinder
    sector count through a zone table and walks a cumulative prefix sum.
*/
use crate::{chs::DiskChs, DiskCh, UftError};

/// One row of a zone table. Zones must cover [0, cylinder_count) without
/// gaps or overlap; `Geometry::zoned` validates this at construction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Zone {
    pub cyl_start: u16,
    pub cyl_end:   u16, // exclusive
    pub sectors:   u8,
    pub data_rate_bps: u32,
    pub nominal_rpm:   f64,
}

impl Zone {
    pub const fn new(cyl_start: u16, cyl_end: u16, sectors: u8, data_rate_bps: u32, nominal_rpm: f64) -> Self {
        Self {
            cyl_start,
            cyl_end,
            sectors,
            data_rate_bps,
            nominal_rpm,
        }
    }
}

/// The declared geometry of a disk image.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    /// Every track carries the same number of sectors.
    Uniform {
        cylinders: u16,
        heads:     u8,
        sectors:   u8,
        size_code: u8,
        /// Id of the first sector on a track (1 for FDC formats, 0 for CBM).
        base: u8,
    },
    /// Sectors per track vary by cylinder according to a zone table.
    Zoned {
        cylinders: u16,
        heads:     u8,
        zones:     Vec<Zone>,
        size_code: u8,
        base:      u8,
    },
}

impl Geometry {
    pub fn uniform(cylinders: u16, heads: u8, sectors: u8, size_code: u8, base: u8) -> Self {
        Geometry::Uniform {
            cylinders,
            heads,
            sectors,
            size_code,
            base,
        }
    }

    /// Construct a zoned geometry, validating that the zone table covers
    /// [0, cylinders) exactly, in order, with no gaps or overlaps.
    pub fn zoned(cylinders: u16, heads: u8, zones: Vec<Zone>, size_code: u8, base: u8) -> Result<Self, UftError> {
        if cylinders == 0 || heads == 0 || zones.is_empty() {
            return Err(UftError::InvalidArg);
        }
        let mut expect = 0u16;
        for zone in &zones {
            if zone.cyl_start != expect || zone.cyl_end <= zone.cyl_start || zone.sectors == 0 {
                return Err(UftError::InvalidArg);
            }
            expect = zone.cyl_end;
        }
        if expect != cylinders {
            return Err(UftError::InvalidArg);
        }
        Ok(Geometry::Zoned {
            cylinders,
            heads,
            zones,
            size_code,
            base,
        })
    }

    pub fn cylinders(&self) -> u16 {
        match self {
            Geometry::Uniform { cylinders, .. } | Geometry::Zoned { cylinders, .. } => *cylinders,
        }
    }

    pub fn heads(&self) -> u8 {
        match self {
            Geometry::Uniform { heads, .. } | Geometry::Zoned { heads, .. } => *heads,
        }
    }

    pub fn size_code(&self) -> u8 {
        match self {
            Geometry::Uniform { size_code, .. } | Geometry::Zoned { size_code, .. } => *size_code,
        }
    }

    pub fn base(&self) -> u8 {
        match self {
            Geometry::Uniform { base, .. } | Geometry::Zoned { base, .. } => *base,
        }
    }

    /// Sectors per track on cylinder `c`. Total for every c in range.
    pub fn sectors_per_cyl(&self, c: u16) -> Result<u8, UftError> {
        if c >= self.cylinders() {
            return Err(UftError::Range);
        }
        match self {
            Geometry::Uniform { sectors, .. } => Ok(*sectors),
            Geometry::Zoned { zones, .. } => zones
                .iter()
                .find(|z| c >= z.cyl_start && c < z.cyl_end)
                .map(|z| z.sectors)
                .ok_or(UftError::Range),
        }
    }

    /// The zone covering cylinder `c`, for callers that need data rate or RPM.
    pub fn zone_for_cyl(&self, c: u16) -> Option<&Zone> {
        match self {
            Geometry::Uniform { .. } => None,
            Geometry::Zoned { zones, .. } => zones.iter().find(|z| c >= z.cyl_start && c < z.cyl_end),
        }
    }

    /// Total sectors across all cylinders and heads.
    pub fn total_sectors(&self) -> usize {
        match self {
            Geometry::Uniform {
                cylinders,
                heads,
                sectors,
                ..
            } => *cylinders as usize * *heads as usize * *sectors as usize,
            Geometry::Zoned {
                cylinders, heads, zones, ..
            } => {
                let per_cyl: usize = (0..*cylinders)
                    .map(|c| {
                        zones
                            .iter()
                            .find(|z| c >= z.cyl_start && c < z.cyl_end)
                            .map(|z| z.sectors as usize)
                            .unwrap_or(0)
                    })
                    .sum();
                per_cyl * *heads as usize
            }
        }
    }

    /// Linear block address of a sector. All heads of a cylinder precede the
    /// next cylinder, matching raw image track order.
    pub fn lba(&self, chs: DiskChs) -> Result<usize, UftError> {
        let (c, h, s) = chs.get();
        let spt = self.sectors_per_cyl(c)?;
        if h >= self.heads() || s < self.base() || s - self.base() >= spt {
            return Err(UftError::Range);
        }
        let sector_in_track = (s - self.base()) as usize;
        match self {
            Geometry::Uniform { heads, sectors, .. } => {
                Ok((c as usize * *heads as usize + h as usize) * *sectors as usize + sector_in_track)
            }
            Geometry::Zoned { heads, .. } => {
                // Prefix sum of whole cylinders, then completed heads of this one.
                let mut lba = 0usize;
                for cyl in 0..c {
                    lba += self.sectors_per_cyl(cyl)? as usize * *heads as usize;
                }
                lba += spt as usize * h as usize;
                Ok(lba + sector_in_track)
            }
        }
    }

    /// Inverse of `lba`.
    pub fn chs(&self, lba: usize) -> Result<DiskChs, UftError> {
        match self {
            Geometry::Uniform {
                cylinders,
                heads,
                sectors,
                base,
                ..
            } => {
                let spt = *sectors as usize;
                // Track-oriented formats declare zero sectors per track;
                // nothing maps to an LBA there.
                if spt == 0 || *heads == 0 {
                    return Err(UftError::Range);
                }
                let track = lba / spt;
                let s = (lba % spt) as u8 + base;
                let c = (track / *heads as usize) as u16;
                let h = (track % *heads as usize) as u8;
                if c >= *cylinders {
                    return Err(UftError::Range);
                }
                Ok(DiskChs::new(c, h, s))
            }
            Geometry::Zoned {
                cylinders, heads, base, ..
            } => {
                let mut remaining = lba;
                for c in 0..*cylinders {
                    let spt = self.sectors_per_cyl(c)? as usize;
                    let cyl_total = spt * *heads as usize;
                    if remaining < cyl_total {
                        let h = (remaining / spt) as u8;
                        let s = (remaining % spt) as u8 + base;
                        return Ok(DiskChs::new(c, h, s));
                    }
                    remaining -= cyl_total;
                }
                Err(UftError::Range)
            }
        }
    }

    /// Byte offset of the start of a track in a raw CHS-ordered image.
    pub fn track_offset(&self, ch: DiskCh) -> Result<usize, UftError> {
        let sector_size = crate::DiskChsn::n_to_bytes(self.size_code());
        let first = DiskChs::from((ch, self.base()));
        Ok(self.lba(first)? * sector_size)
    }

    /// Byte length of a track in a raw CHS-ordered image.
    pub fn track_len(&self, c: u16) -> Result<usize, UftError> {
        let sector_size = crate::DiskChsn::n_to_bytes(self.size_code());
        Ok(self.sectors_per_cyl(c)? as usize * sector_size)
    }
}

/// Commodore 1541/1571 track layout: track numbers are 1-based and sector
/// counts step down from 21 to 17 across the four speed zones. Tracks 36-42
/// repeat the innermost zone for extended images.
pub mod cbm {
    use super::Zone;

    pub const MAX_TRACKS: usize = 42;

    /// Sectors per track, indexed by track number - 1.
    pub const SECTORS_PER_TRACK: [u8; MAX_TRACKS] = [
        21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, // 1-17
        19, 19, 19, 19, 19, 19, 19, // 18-24
        18, 18, 18, 18, 18, 18, // 25-30
        17, 17, 17, 17, 17, // 31-35
        17, 17, 17, 17, 17, 17, 17, // 36-42
    ];

    const fn make_offsets() -> [u16; MAX_TRACKS + 1] {
        let mut offsets = [0u16; MAX_TRACKS + 1];
        let mut t = 0;
        while t < MAX_TRACKS {
            offsets[t + 1] = offsets[t] + SECTORS_PER_TRACK[t] as u16;
            t += 1;
        }
        offsets
    }

    /// Cumulative sector offsets; OFFSETS[t] is the number of sectors on
    /// tracks 1..=t. OFFSETS[t+1] - OFFSETS[t] == SECTORS_PER_TRACK[t].
    pub const OFFSETS: [u16; MAX_TRACKS + 1] = make_offsets();

    /// Sector count for a 1-based track number.
    pub fn sectors_for_track(track: u8) -> Option<u8> {
        if track == 0 || track as usize > MAX_TRACKS {
            return None;
        }
        Some(SECTORS_PER_TRACK[track as usize - 1])
    }

    /// Total sectors on a disk side of `tracks` tracks.
    pub fn total_sectors(tracks: u8) -> Option<usize> {
        if tracks as usize > MAX_TRACKS {
            return None;
        }
        Some(OFFSETS[tracks as usize] as usize)
    }

    /// Zone table equivalent of the track vector, truncated to `tracks`.
    pub fn zones(tracks: u8) -> Vec<Zone> {
        const BOUNDS: [(u16, u16, u8, u32); 4] = [
            (0, 17, 21, 307_692),
            (17, 24, 19, 285_714),
            (24, 30, 18, 266_667),
            (30, MAX_TRACKS as u16, 17, 250_000),
        ];
        let tracks = tracks as u16;
        BOUNDS
            .iter()
            .filter(|(start, _, _, _)| *start < tracks)
            .map(|&(start, end, sectors, rate)| Zone::new(start, end.min(tracks), sectors, rate, 300.0))
            .collect()
    }
}

/// Victor 9000 / Sirius 1 variable-speed zone table.
//
// Zone boundaries taken from surviving drive documentation; not yet
// cross-checked against reference hardware dumps.
pub const VICTOR9K_ZONES: [Zone; 8] = [
    Zone::new(0, 4, 19, 250_000, 667.0),
    Zone::new(4, 16, 18, 250_000, 613.0),
    Zone::new(16, 27, 17, 250_000, 565.0),
    Zone::new(27, 38, 16, 250_000, 529.0),
    Zone::new(38, 48, 15, 250_000, 493.0),
    Zone::new(48, 60, 14, 250_000, 465.0),
    Zone::new(60, 71, 13, 250_000, 431.0),
    Zone::new(71, 80, 12, 250_000, 403.0),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_lba_round_trip() {
        let geom = Geometry::uniform(40, 2, 9, 2, 1);
        assert_eq!(geom.total_sectors(), 720);
        for lba in [0usize, 8, 9, 17, 18, 719] {
            let chs = geom.chs(lba).unwrap();
            assert_eq!(geom.lba(chs).unwrap(), lba);
        }
        // (c*H + h)*S + (s - base)
        assert_eq!(geom.lba(DiskChs::new(1, 0, 1)).unwrap(), 18);
        assert_eq!(geom.lba(DiskChs::new(1, 1, 3)).unwrap(), 29);
        assert!(geom.lba(DiskChs::new(40, 0, 1)).is_err());
        assert!(geom.lba(DiskChs::new(0, 2, 1)).is_err());
        assert!(geom.lba(DiskChs::new(0, 0, 0)).is_err()); // below base
        assert!(geom.lba(DiskChs::new(0, 0, 10)).is_err());
    }

    #[test]
    fn sector_less_geometry_has_no_lba_mapping() {
        // Container formats that only model whole tracks declare spt 0;
        // CHS mapping over them is a range error.
        let geom = Geometry::uniform(40, 2, 0, 2, 1);
        assert!(matches!(geom.chs(0), Err(UftError::Range)));
        assert!(matches!(geom.lba(DiskChs::new(0, 0, 1)), Err(UftError::Range)));
        let geom = Geometry::uniform(1, 1, 0, 0, 0);
        assert!(matches!(geom.chs(0), Err(UftError::Range)));
    }

    #[test]
    fn zoned_requires_full_coverage() {
        let gap = vec![Zone::new(0, 4, 19, 250_000, 667.0), Zone::new(5, 80, 18, 250_000, 613.0)];
        assert!(Geometry::zoned(80, 1, gap, 2, 0).is_err());

        let short = vec![Zone::new(0, 40, 19, 250_000, 667.0)];
        assert!(Geometry::zoned(80, 1, short, 2, 0).is_err());

        assert!(Geometry::zoned(80, 1, VICTOR9K_ZONES.to_vec(), 2, 0).is_ok());
    }

    #[test]
    fn zoned_lba_round_trip() {
        let geom = Geometry::zoned(80, 1, VICTOR9K_ZONES.to_vec(), 2, 0).unwrap();
        let total = geom.total_sectors();
        // Sum over cylinders of sectors_per_track(c) * heads.
        let sum: usize = (0..80).map(|c| geom.sectors_per_cyl(c).unwrap() as usize).sum();
        assert_eq!(total, sum);
        for lba in [0usize, 18, 19, 76, 77, total - 1] {
            let chs = geom.chs(lba).unwrap();
            assert_eq!(geom.lba(chs).unwrap(), lba);
        }
        assert!(geom.chs(total).is_err());
    }

    #[test]
    fn cbm_track_table() {
        assert_eq!(cbm::sectors_for_track(1), Some(21));
        assert_eq!(cbm::sectors_for_track(17), Some(21));
        assert_eq!(cbm::sectors_for_track(18), Some(19));
        assert_eq!(cbm::sectors_for_track(25), Some(18));
        assert_eq!(cbm::sectors_for_track(31), Some(17));
        assert_eq!(cbm::sectors_for_track(0), None);
        assert_eq!(cbm::total_sectors(35), Some(683));
        assert_eq!(cbm::total_sectors(40), Some(768));
        assert_eq!(cbm::total_sectors(42), Some(802));
        // Offset vector round-trips against the sector-count vector.
        for t in 0..cbm::MAX_TRACKS {
            assert_eq!(
                cbm::OFFSETS[t + 1] - cbm::OFFSETS[t],
                cbm::SECTORS_PER_TRACK[t] as u16
            );
        }
    }

    #[test]
    fn cbm_zone_geometry_matches_track_table() {
        let geom = Geometry::zoned(35, 1, cbm::zones(35), 1, 0).unwrap();
        assert_eq!(geom.total_sectors(), 683);
        for c in 0..35u16 {
            assert_eq!(
                geom.sectors_per_cyl(c).unwrap(),
                cbm::sectors_for_track(c as u8 + 1).unwrap()
            );
        }
    }
}
