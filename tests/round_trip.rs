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

    tests/round_trip.rs

    Serialization laws over the whole Disk facade: opening an image and
    serializing it back is byte-exact, and a write followed by a read
    returns what was written.
*/
mod common;

use uft_core::{
    chs::DiskCh,
    disk::TrackPayload,
    formats::{trd::open_trd, FORMAT_D64, FORMAT_MSA, FORMAT_RAW, FORMAT_TRD},
    Disk,
    TrackEncoding,
};

#[test]
fn msa_reserializes_byte_exact() {
    common::init();
    let bytes = common::msa_image(5);
    let disk = Disk::open(FORMAT_MSA, &bytes).unwrap();
    assert_eq!(disk.geometry().cylinders(), 5);
    assert_eq!(disk.to_bytes().unwrap(), bytes);
}

#[test]
fn trd_write_read_is_identity() {
    common::init();
    let bytes = common::trd_image();
    let mut disk = Disk::open(FORMAT_TRD, &bytes).unwrap();
    let mut track = disk.read_track(DiskCh::new(7, 1)).unwrap();
    let TrackPayload::Sectors(sectors) = &mut track.payload else {
        panic!("expected sector payload");
    };
    sectors[4].data.fill(0xC7);
    disk.write_track(&track).unwrap();

    let reread = disk.read_track(DiskCh::new(7, 1)).unwrap();
    let TrackPayload::Sectors(sectors) = &reread.payload else {
        panic!("expected sector payload");
    };
    assert_eq!(sectors[4].data, vec![0xC7; 256]);

    // The system sector survives the edit.
    let state = open_trd(&disk.to_bytes().unwrap()).unwrap();
    assert_eq!(state.disk_type(), 0x16);
    assert_eq!(state.file_count(), 2);
    assert_eq!(state.label(), b"SPECTRUM");
}

#[test]
fn raw_create_then_serialize_has_declared_size() {
    common::init();
    let geometry = uft_core::Geometry::uniform(40, 2, 9, 2, 1);
    let disk = Disk::create(FORMAT_RAW, &geometry).unwrap();
    let bytes = disk.to_bytes().unwrap();
    assert_eq!(bytes.len(), 368_640);

    let reopened = Disk::open(FORMAT_RAW, &bytes).unwrap();
    assert_eq!(reopened.geometry(), &geometry);
}

#[test]
fn conversion_between_sector_formats_preserves_payloads() {
    common::init();
    // Build content in a raw 640K image, then splice every track into a
    // blank TR-DOS-sized buffer through the unified model.
    let mut src = vec![0u8; 655_360];
    for (i, chunk) in src.chunks_mut(256).enumerate() {
        chunk.fill((i % 251) as u8);
    }
    let sys = 0x800;
    src[sys + 0xE3] = 0x16;
    src[sys + 0xE7] = 0x10;
    let src_disk = Disk::open(FORMAT_TRD, &src).unwrap();

    let mut dst = Disk::open(FORMAT_TRD, &common::trd_image()).unwrap();
    for c in 0..src_disk.geometry().cylinders() {
        for h in 0..src_disk.geometry().heads() {
            let track = src_disk.read_track(DiskCh::new(c, h)).unwrap();
            dst.write_track(&track).unwrap();
        }
    }
    assert_eq!(dst.to_bytes().unwrap(), src);
}

#[test]
fn read_all_builds_sparse_model_with_confidence() {
    common::init();
    let bytes = common::g64_header();
    let disk = Disk::open_detected(&bytes, None).unwrap();
    let image = disk.read_all().unwrap();
    // All track slots are absent in an empty G64.
    assert_eq!(image.track_count(), 0);

    let disk = Disk::open(FORMAT_TRD, &common::trd_image()).unwrap();
    let image = disk.read_all().unwrap();
    assert_eq!(image.track_count(), 160);
    assert_eq!(image.confidence(), uft_core::CONFIDENCE_MAX);
    let track = image.track(DiskCh::new(0, 0)).unwrap().expect("missing track");
    assert_eq!(track.encoding, TrackEncoding::Mfm);
    assert_eq!(track.payload.sector_count(), 16);
    assert_eq!(image.encoding(), TrackEncoding::Mfm);
}

#[test]
fn read_all_reports_the_decoded_track_encoding() {
    common::init();
    // A GCR image must not come back labeled as an MFM disk.
    let disk = Disk::open(FORMAT_D64, &vec![0u8; 174_848]).unwrap();
    let image = disk.read_all().unwrap();
    assert_eq!(image.encoding(), TrackEncoding::Gcr54);
}
