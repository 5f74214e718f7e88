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

    tests/detect.rs

    End-to-end detection over the full registry: the probe engine must rank
    the right adapter first, surface its evidence, and flag genuinely
    ambiguous inputs instead of guessing.
*/
mod common;

use uft_core::{
    formats::{FORMAT_APPLE, FORMAT_D64, FORMAT_G64, FORMAT_MSA, FORMAT_RAW, FORMAT_TRD},
    probe::probe,
    Disk,
};

#[test]
fn g64_header_wins_decisively() {
    common::init();
    let bytes = common::g64_header();
    let report = probe(&bytes, None);
    let best = report.best().expect("no candidate");
    assert_eq!(best.format, FORMAT_G64);
    assert!(best.score.confidence() >= 90);
    assert!(!report.is_ambiguous);
    let text = best.explanation();
    assert!(text.contains("magic"));
    assert!(text.contains("version"));
    assert!(text.contains("track count"));

    let disk = Disk::open_detected(&bytes, None).unwrap();
    assert_eq!(disk.format(), FORMAT_G64);
    assert_eq!(disk.geometry().cylinders(), 42);
    assert_eq!(disk.geometry().heads(), 1);
}

#[test]
fn trd_system_sector_beats_raw_size_match() {
    common::init();
    let bytes = common::trd_image();
    let report = probe(&bytes, None);
    let best = report.best().expect("no candidate");
    // 655,360 bytes is also a valid raw 640K size; the TR-DOS system
    // sector must pull the TRD adapter decisively ahead.
    assert_eq!(best.format, FORMAT_TRD);
    assert!(best.score.confidence() >= 85);
    assert!(!report.is_ambiguous);

    let disk = Disk::open(FORMAT_TRD, &bytes).unwrap();
    assert_eq!(disk.geometry().cylinders(), 80);
    assert_eq!(disk.geometry().heads(), 2);
}

#[test]
fn oversized_dsk_blob_is_ambiguous() {
    common::init();
    // 174,848 bytes is exactly a 35-track D64, but a ".dsk" name and
    // 256-byte granularity also fit an odd Apple II dump. Neither case is
    // conclusive, so the report must say so rather than pick silently.
    let bytes = vec![0u8; 174_848];
    let report = probe(&bytes, Some("mystery.dsk"));
    assert!(report.candidates.len() >= 2);
    assert!(report.is_ambiguous);
    let ids: Vec<_> = report.candidates.iter().map(|c| c.format).collect();
    assert!(ids.contains(&FORMAT_APPLE));
    assert!(ids.contains(&FORMAT_D64));
    let warning = report.warning.as_deref().expect("no ambiguity warning");
    assert!(warning.contains("Apple"));
    assert!(warning.contains("D64"));
}

#[test]
fn msa_magic_dominates() {
    common::init();
    let bytes = common::msa_image(3);
    let report = probe(&bytes, Some("disk.msa"));
    assert_eq!(report.best().expect("no candidate").format, FORMAT_MSA);
    assert!(!report.is_ambiguous);
}

#[test]
fn zip_archive_never_passes_as_a_raw_image() {
    common::init();
    // Exactly 360K, but the ZIP local-file header disqualifies every
    // size-only claim.
    let mut bytes = vec![0u8; 368_640];
    bytes[..4].copy_from_slice(b"PK\x03\x04");
    let report = probe(&bytes, Some("floppy.img"));
    assert!(!report.candidates.iter().any(|c| c.format == FORMAT_RAW));
}

#[test]
fn unrecognizable_input_yields_no_candidates() {
    common::init();
    let report = probe(b"mary had a little lamb", None);
    assert!(report.best().is_none());
    assert!(!report.is_ambiguous);
}

#[test]
fn extension_lookup_resolves_registered_formats() {
    common::init();
    let adapters = uft_core::registry::lookup_by_extension("G64");
    assert!(adapters.iter().any(|a| a.descriptor().id == FORMAT_G64));
    let adapters = uft_core::registry::lookup_by_extension(".trd");
    assert!(adapters.iter().any(|a| a.descriptor().id == FORMAT_TRD));
    assert!(uft_core::registry::lookup_by_extension("docx").is_empty());
}
