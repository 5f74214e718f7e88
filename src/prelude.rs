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

    src/prelude.rs

    Common imports for library consumers.
*/

pub use crate::{
    adapter::{Disk, FormatAdapter, FormatCaps, FormatDescriptor, FormatId, FormatState},
    chs::{DiskCh, DiskChs, DiskChsn},
    disk::{DiskImage, Sector, Track, TrackPayload},
    geometry::Geometry,
    probe::{probe, ProbeCandidate, ProbeReport, ProbeScore, WeightClass},
    registry,
    standard_format::StandardFormat,
    DataRate,
    DiskRpm,
    TrackEncoding,
    UftError,
    CONFIDENCE_MAX,
    DEFAULT_SECTOR_SIZE,
    MAXIMUM_SECTOR_SIZE,
};
