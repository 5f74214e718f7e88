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

    src/lib.rs

    uft-core is a library for working with historical floppy disk images.
    It identifies an unknown image by multi-evidence probing, decodes its
    geometry and content into a unified in-memory disk model, and re-encodes
    that model back out to any writable target format.

    The crate takes in-memory byte slices; file I/O, hardware access and
    filesystem interpretation are the caller's concern.
*/

pub mod adapter;
pub mod chs;
pub mod codec;
pub mod disk;
pub mod fdc;
pub mod formats;
pub mod geometry;
pub mod probe;
pub mod registry;
pub mod standard_format;
pub mod util;

pub mod prelude;

use std::fmt::{Display, Formatter};

use strum::EnumIter;
use thiserror::Error;

pub use crate::{
    adapter::{Disk, FormatAdapter, FormatCaps, FormatDescriptor, FormatId, FormatState},
    chs::{DiskCh, DiskChs, DiskChsn},
    disk::{DiskImage, Sector, Track, TrackPayload},
    geometry::Geometry,
    probe::{probe, ProbeReport},
};

pub const MAXIMUM_SECTOR_SIZE: usize = 8192;
pub const DEFAULT_SECTOR_SIZE: usize = 512;

/// Sector and track confidence values range from 0 (unreadable) to 10_000
/// (perfect read).
pub const CONFIDENCE_MAX: u16 = 10_000;

#[derive(Debug, Error)]
pub enum UftError {
    #[error("Invalid parameters were specified to a library function")]
    InvalidArg,
    #[error("A cylinder, head or sector address fell outside the declared geometry")]
    Range,
    #[error("The image data violates the structure of the declared format")]
    Format,
    #[error("The image data is structurally plausible but locally inconsistent")]
    Corrupt,
    #[error("An allocation limit was exceeded")]
    NoMem,
    #[error("The operation is not in the format's capability set")]
    NotSupported,
    #[error("A codec error occurred decoding or encoding track data")]
    Codec,
    #[error("An I/O error occurred reading or writing image data")]
    Io,
}

impl From<std::io::Error> for UftError {
    fn from(_err: std::io::Error) -> Self {
        UftError::Io
    }
}

impl From<binrw::Error> for UftError {
    fn from(err: binrw::Error) -> Self {
        match err {
            binrw::Error::Io(_) => UftError::Io,
            _ => UftError::Format,
        }
    }
}

/// The recording scheme of a track's raw data.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, EnumIter)]
pub enum TrackEncoding {
    Fm,
    #[default]
    Mfm,
    AmigaMfm,
    /// Commodore 5-to-4 GCR.
    Gcr54,
    /// Apple 6-and-2 GCR.
    Gcr62,
    /// Unresolved flux-level data.
    RawFlux,
}

impl Display for TrackEncoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackEncoding::Fm => write!(f, "FM"),
            TrackEncoding::Mfm => write!(f, "MFM"),
            TrackEncoding::AmigaMfm => write!(f, "Amiga MFM"),
            TrackEncoding::Gcr54 => write!(f, "GCR 5:4"),
            TrackEncoding::Gcr62 => write!(f, "GCR 6:2"),
            TrackEncoding::RawFlux => write!(f, "Flux"),
        }
    }
}

/// Nominal media data rates.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum DataRate {
    Rate125Kbps,
    #[default]
    Rate250Kbps,
    Rate300Kbps,
    Rate500Kbps,
    Rate1000Kbps,
}

impl From<DataRate> for u32 {
    fn from(rate: DataRate) -> Self {
        match rate {
            DataRate::Rate125Kbps => 125_000,
            DataRate::Rate250Kbps => 250_000,
            DataRate::Rate300Kbps => 300_000,
            DataRate::Rate500Kbps => 500_000,
            DataRate::Rate1000Kbps => 1_000_000,
        }
    }
}

impl Display for DataRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} kbps", u32::from(*self) / 1000)
    }
}

/// Nominal spindle speeds.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum DiskRpm {
    #[default]
    Rpm300,
    Rpm360,
}

impl From<DiskRpm> for f64 {
    fn from(rpm: DiskRpm) -> Self {
        match rpm {
            DiskRpm::Rpm300 => 300.0,
            DiskRpm::Rpm360 => 360.0,
        }
    }
}

impl Display for DiskRpm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DiskRpm::Rpm300 => write!(f, "300 RPM"),
            DiskRpm::Rpm360 => write!(f, "360 RPM"),
        }
    }
}
