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

    tests/common/mod.rs

    Shared fixtures for the integration suite: synthetic images built from
    their wire definitions, plus logger setup.
*/
#![allow(dead_code)]

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A G64 header with 84 half-track slots and an empty offset table, as
/// produced by nibtools when dumping an unformatted disk.
pub fn g64_header() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"GCR-1541");
    bytes.push(0x00); // version
    bytes.push(84); // half-track slots
    bytes.extend_from_slice(&7928u16.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 12]);
    bytes
}

/// An 80-track double-sided TR-DOS image with a populated system sector.
pub fn trd_image() -> Vec<u8> {
    let mut data = vec![0u8; 655_360];
    let sys = 0x800;
    data[sys + 0xE1] = 0x00; // first free sector
    data[sys + 0xE2] = 0x01; // first free track
    data[sys + 0xE3] = 0x16; // 80 tracks, double sided
    data[sys + 0xE4] = 2; // file count
    data[sys + 0xE5..sys + 0xE7].copy_from_slice(&2544u16.to_le_bytes());
    data[sys + 0xE7] = 0x10; // TR-DOS id
    data[sys + 0xF5..sys + 0xFD].copy_from_slice(b"SPECTRUM");
    data
}

/// An uncompressed single-sided 9-sector MSA with one track range.
pub fn msa_image(tracks: u16) -> Vec<u8> {
    let track_size = 9 * 512;
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&[0x0E, 0x0F]);
    bytes.extend_from_slice(&9u16.to_be_bytes()); // sectors per track
    bytes.extend_from_slice(&0u16.to_be_bytes()); // sides - 1
    bytes.extend_from_slice(&0u16.to_be_bytes()); // start track
    bytes.extend_from_slice(&(tracks - 1).to_be_bytes()); // end track
    for t in 0..tracks {
        bytes.extend_from_slice(&(track_size as u16).to_be_bytes());
        bytes.extend(std::iter::repeat(t as u8).take(track_size));
    }
    bytes
}
