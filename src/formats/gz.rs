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

    src/formats/gz.rs

    Gzip-wrapped raw images (ADZ, IMZ, plain .gz). The stream is inflated and
    handed to the raw adapter; the original compressed bytes are kept so that
    serialization is byte-exact.
*/
use std::io::Read;

use flate2::read::GzDecoder;

use crate::{
    adapter::{FormatAdapter, FormatCaps, FormatDescriptor, FormatState},
    chs::DiskCh,
    disk::Track,
    formats::{raw::RawAdapter, FORMAT_GZ},
    geometry::Geometry,
    probe::{score_extension, score_magic, ProbeScore},
    UftError,
};

pub const GZIP_MAGIC: &[u8; 2] = &[0x1F, 0x8B];

static DESCRIPTOR: FormatDescriptor = FormatDescriptor {
    id:   FORMAT_GZ,
    name: "GZ",
    description: "Gzip-compressed raw image (ADZ/IMZ)",
    extensions: &["adz", "imz", "gz"],
    caps: FormatCaps::CAN_READ,
};

pub struct GzAdapter;

impl FormatAdapter for GzAdapter {
    fn descriptor(&self) -> &'static FormatDescriptor {
        &DESCRIPTOR
    }

    fn probe(&self, bytes: &[u8], filename: Option<&str>) -> ProbeScore {
        let mut score = ProbeScore::new();
        score_magic(&mut score, bytes, GZIP_MAGIC);
        score_extension(&mut score, filename, DESCRIPTOR.extensions);
        score
    }

    fn open(&self, bytes: &[u8]) -> Result<Box<dyn FormatState>, UftError> {
        if bytes.len() < 2 || &bytes[..2] != GZIP_MAGIC {
            return Err(UftError::Format);
        }
        let mut inflated = Vec::new();
        GzDecoder::new(bytes)
            .read_to_end(&mut inflated)
            .map_err(|_| UftError::Corrupt)?;
        let inner = RawAdapter.open(&inflated)?;
        Ok(Box::new(GzState {
            original: bytes.to_vec(),
            inner,
        }))
    }
}

pub struct GzState {
    original: Vec<u8>,
    inner:    Box<dyn FormatState>,
}

impl FormatState for GzState {
    fn geometry(&self) -> &Geometry {
        self.inner.geometry()
    }

    fn read_track(&self, ch: DiskCh) -> Result<Track, UftError> {
        self.inner.read_track(ch)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, UftError> {
        Ok(self.original.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::{write::GzEncoder, Compression};

    use super::*;
    use crate::{disk::TrackPayload, standard_format::StandardFormat};

    fn gzipped_adf() -> Vec<u8> {
        let mut data = vec![0u8; StandardFormat::AmigaDd880.size()];
        for (i, chunk) in data.chunks_mut(512).enumerate() {
            chunk.fill(i as u8);
        }
        let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(&data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn probes_gzip_magic() {
        let bytes = gzipped_adf();
        let score = GzAdapter.probe(&bytes, Some("game.adz"));
        // Magic (60) + extension (10).
        assert_eq!(score.score(), 70);
        assert_eq!(GzAdapter.probe(&[0u8; 64], None).confidence(), 0);
    }

    #[test]
    fn reads_through_decompressed_image() {
        let state = GzAdapter.open(&gzipped_adf()).unwrap();
        assert_eq!(state.geometry().cylinders(), 80);
        let track = state.read_track(DiskCh::new(1, 0)).unwrap();
        let TrackPayload::Sectors(sectors) = &track.payload else {
            panic!("expected sector payload");
        };
        // 80 cyl, 2 heads, 11 spt: track (1, 0) starts at LBA 22.
        assert_eq!(sectors[0].data, vec![22u8; 512]);
    }

    #[test]
    fn serializes_original_compressed_bytes() {
        let bytes = gzipped_adf();
        let state = GzAdapter.open(&bytes).unwrap();
        assert_eq!(state.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn damaged_stream_is_corrupt() {
        let mut bytes = gzipped_adf();
        let mid = bytes.len() / 2;
        bytes.truncate(mid);
        assert!(matches!(GzAdapter.open(&bytes), Err(UftError::Corrupt)));
    }
}
