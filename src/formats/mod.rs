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

    src/formats/mod.rs

    The built-in adapter corpus. Each submodule implements one image format
    against the adapter contract; `builtin_adapters` hands the set to the
    registry for lazy registration.

    Format ids are stable and must never be reused.
*/
use std::sync::Arc;

use crate::adapter::{FormatAdapter, FormatId};

pub mod apple;
pub mod d64;
pub mod dsk;
pub mod fdi;
pub mod g64;
pub mod gz;
pub mod hfe;
pub mod msa;
pub mod raw;
pub mod scl;
pub mod tap;
pub mod trd;

pub const FORMAT_RAW: FormatId = FormatId(1);
pub const FORMAT_D64: FormatId = FormatId(2);
pub const FORMAT_G64: FormatId = FormatId(3);
pub const FORMAT_HFE: FormatId = FormatId(4);
pub const FORMAT_MSA: FormatId = FormatId(5);
pub const FORMAT_DSK: FormatId = FormatId(6);
pub const FORMAT_TRD: FormatId = FormatId(7);
pub const FORMAT_SCL: FormatId = FormatId(8);
pub const FORMAT_TAP: FormatId = FormatId(9);
pub const FORMAT_FDI: FormatId = FormatId(10);
pub const FORMAT_GZ: FormatId = FormatId(11);
pub const FORMAT_APPLE: FormatId = FormatId(12);

/// Every adapter shipped with the crate, in id order.
pub fn builtin_adapters() -> Vec<Arc<dyn FormatAdapter>> {
    vec![
        Arc::new(raw::RawAdapter),
        Arc::new(d64::D64Adapter),
        Arc::new(g64::G64Adapter),
        Arc::new(hfe::HfeAdapter),
        Arc::new(msa::MsaAdapter),
        Arc::new(dsk::DskAdapter),
        Arc::new(trd::TrdAdapter),
        Arc::new(scl::SclAdapter),
        Arc::new(tap::TapAdapter),
        Arc::new(fdi::FdiAdapter),
        Arc::new(gz::GzAdapter),
        Arc::new(apple::AppleAdapter),
    ]
}

use crate::{
    chs::{DiskCh, DiskChsn},
    disk::{Sector, Track, TrackPayload},
    geometry::Geometry,
    TrackEncoding,
    UftError,
};

/// Decode one track of a flat, headerless, CHS-ordered sector image.
pub(crate) fn read_flat_track(
    data: &[u8],
    geometry: &Geometry,
    ch: DiskCh,
    encoding: TrackEncoding,
) -> Result<Track, UftError> {
    let spt = geometry.sectors_per_cyl(ch.c())?;
    if ch.h() >= geometry.heads() {
        return Err(UftError::Range);
    }
    let sector_size = DiskChsn::n_to_bytes(geometry.size_code());
    let offset = geometry.track_offset(ch)?;
    let len = spt as usize * sector_size;
    let track_bytes = data.get(offset..offset + len).ok_or(UftError::Corrupt)?;

    let sectors = track_bytes
        .chunks_exact(sector_size)
        .enumerate()
        .map(|(i, chunk)| {
            let id = DiskChsn::new(ch.c(), ch.h(), i as u8 + geometry.base(), geometry.size_code());
            Sector::new(id, chunk.to_vec())
        })
        .collect();
    Ok(Track::new(ch, encoding, TrackPayload::Sectors(sectors)))
}

/// Splice one track of decoded sectors back into a flat sector image.
pub(crate) fn write_flat_track(data: &mut [u8], geometry: &Geometry, track: &Track) -> Result<(), UftError> {
    let TrackPayload::Sectors(sectors) = &track.payload else {
        return Err(UftError::NotSupported);
    };
    let spt = geometry.sectors_per_cyl(track.ch.c())?;
    if track.ch.h() >= geometry.heads() {
        return Err(UftError::Range);
    }
    let sector_size = DiskChsn::n_to_bytes(geometry.size_code());
    let base = geometry.track_offset(track.ch)?;
    for sector in sectors {
        let s = sector.id.s();
        if s < geometry.base() || s - geometry.base() >= spt {
            return Err(UftError::Range);
        }
        if sector.data.len() != sector_size {
            return Err(UftError::InvalidArg);
        }
        let offset = base + (s - geometry.base()) as usize * sector_size;
        let slot = data.get_mut(offset..offset + sector_size).ok_or(UftError::Corrupt)?;
        slot.copy_from_slice(&sector.data);
    }
    Ok(())
}
