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

    src/adapter.rs

    The format-adapter contract. An adapter is a stateless description of
    one on-disk image format: it can score a byte buffer (probe), open it
    into a format state, and optionally create a blank image. The opened
    state serves track reads and writes against the unified disk model and
    serializes itself back to bytes.
*/
use std::fmt::Display;

use bitflags::bitflags;

use crate::{
    chs::DiskCh,
    disk::{DiskImage, Track},
    geometry::Geometry,
    probe::ProbeScore,
    registry,
    UftError,
};

/// Stable numeric identifier of a registered format.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct FormatId(pub u32);

impl Display for FormatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags! {
    /// Static capability flags of a format adapter.
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct FormatCaps: u32 {
        const CAN_READ        = 0b0000_0001;
        const CAN_WRITE       = 0b0000_0010;
        const CAN_CREATE      = 0b0000_0100;
        /// Carries a per-sector error map.
        const SUPPORTS_ERRORS = 0b0000_1000;
        /// Carries cell timing / speed-zone information.
        const SUPPORTS_TIMING = 0b0001_0000;
        /// Stores flux- or bit-level data rather than decoded sectors.
        const IS_FLUX         = 0b0010_0000;
    }
}

/// Immutable description of one image format.
#[derive(Clone, Debug)]
pub struct FormatDescriptor {
    pub id:   FormatId,
    pub name: &'static str,
    pub description: &'static str,
    /// Lower-case filename extensions, without the dot.
    pub extensions: &'static [&'static str],
    pub caps: FormatCaps,
}

/// One registered image format.
///
/// `probe` must never fail: on data it cannot possibly open it returns a
/// score of zero (or negative evidence) rather than an error, so the probe
/// engine can always evaluate every adapter.
pub trait FormatAdapter: Send + Sync {
    fn descriptor(&self) -> &'static FormatDescriptor;

    /// Score how well `bytes` (and optionally a filename) match this format.
    fn probe(&self, bytes: &[u8], filename: Option<&str>) -> ProbeScore;

    /// Parse `bytes` into an opened format state.
    fn open(&self, bytes: &[u8]) -> Result<Box<dyn FormatState>, UftError>;

    /// Create a blank image of this format.
    fn create(&self, _geometry: &Geometry) -> Result<Box<dyn FormatState>, UftError> {
        Err(UftError::NotSupported)
    }
}

/// An opened image. Not shared across threads without external
/// synchronization; the registry itself is the only process-wide state.
pub trait FormatState {
    fn geometry(&self) -> &Geometry;

    /// Decode one track into the unified model.
    fn read_track(&self, ch: DiskCh) -> Result<Track, UftError>;

    /// Replace one track. Read-only formats keep the default.
    fn write_track(&mut self, _track: &Track) -> Result<(), UftError> {
        Err(UftError::NotSupported)
    }

    /// Per-sector status bytes in LBA order, when the format carries them.
    fn error_map(&self) -> Option<&[u8]> {
        None
    }

    /// Serialize the current state back to image bytes.
    fn to_bytes(&self) -> Result<Vec<u8>, UftError>;
}

/// A user-facing handle to an opened disk image. Dropping the handle closes
/// it; serialization must happen before via `to_bytes`.
pub struct Disk {
    format: FormatId,
    state:  Box<dyn FormatState>,
}

impl Disk {
    /// Open `bytes` with the registered adapter for `format`. The adapter
    /// must advertise `CAN_READ`.
    pub fn open(format: FormatId, bytes: &[u8]) -> Result<Disk, UftError> {
        let adapter = registry::lookup_by_id(format).ok_or(UftError::NotSupported)?;
        if !adapter.descriptor().caps.contains(FormatCaps::CAN_READ) {
            return Err(UftError::NotSupported);
        }
        log::debug!("opening image as {} ({})", adapter.descriptor().name, format);
        let state = adapter.open(bytes)?;
        Ok(Disk { format, state })
    }

    /// Probe `bytes` and open with the best unambiguous candidate.
    pub fn open_detected(bytes: &[u8], filename: Option<&str>) -> Result<Disk, UftError> {
        let report = crate::probe::probe(bytes, filename);
        let best = report.best().ok_or(UftError::Format)?;
        Self::open(best.format, bytes)
    }

    /// Create a blank image in a format that advertises `CAN_CREATE`.
    pub fn create(format: FormatId, geometry: &Geometry) -> Result<Disk, UftError> {
        let adapter = registry::lookup_by_id(format).ok_or(UftError::NotSupported)?;
        if !adapter.descriptor().caps.contains(FormatCaps::CAN_CREATE) {
            return Err(UftError::NotSupported);
        }
        let state = adapter.create(geometry)?;
        Ok(Disk { format, state })
    }

    pub fn format(&self) -> FormatId {
        self.format
    }

    pub fn geometry(&self) -> &Geometry {
        self.state.geometry()
    }

    pub fn read_track(&self, ch: DiskCh) -> Result<Track, UftError> {
        self.state.read_track(ch)
    }

    pub fn write_track(&mut self, track: &Track) -> Result<(), UftError> {
        self.state.write_track(track)
    }

    pub fn error_map(&self) -> Option<&[u8]> {
        self.state.error_map()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, UftError> {
        self.state.to_bytes()
    }

    /// Decode every present track into a `DiskImage`. The image-level
    /// encoding is taken from the first decoded track.
    pub fn read_all(&self) -> Result<DiskImage, UftError> {
        let geometry = self.state.geometry().clone();
        let mut tracks = Vec::new();
        for c in 0..geometry.cylinders() {
            for h in 0..geometry.heads() {
                match self.state.read_track(DiskCh::new(c, h)) {
                    Ok(track) => tracks.push(track),
                    // Absent tracks are legal in sparse formats.
                    Err(UftError::NotSupported) | Err(UftError::Range) => {}
                    Err(e) => return Err(e),
                }
            }
        }
        let encoding = tracks.first().map(|t| t.encoding).unwrap_or_default();
        let mut image = DiskImage::new(self.format, geometry, encoding);
        for track in tracks {
            image.put_track(track)?;
        }
        if let Some(map) = self.state.error_map() {
            image.set_error_map(map.to_vec());
        }
        Ok(image)
    }
}
