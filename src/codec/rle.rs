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

    src/codec/rle.rs

    MSA track run-length codec. The marker byte 0xE5 introduces a run:
    `E5 <data> <hi> <lo>` expands to hi*256+lo copies of <data>. Any other
    byte is a literal. Because 0xE5 cannot appear as a literal, the encoder
    must emit even single 0xE5 bytes as runs.
*/
use crate::UftError;

pub const MSA_RLE_MARKER: u8 = 0xE5;

/// Minimum run length worth a 4-byte run sequence.
const MIN_RUN: usize = 4;

/// Decode an RLE'd track into exactly `track_size` bytes. A short expansion
/// is padded with zeroes and logged; overrun is a corrupt track.
pub fn decode(src: &[u8], track_size: usize) -> Result<Vec<u8>, UftError> {
    let mut out = Vec::with_capacity(track_size);
    let mut pos = 0usize;
    while pos < src.len() {
        let byte = src[pos];
        if byte == MSA_RLE_MARKER {
            if pos + 4 > src.len() {
                return Err(UftError::Corrupt);
            }
            let data = src[pos + 1];
            let run = u16::from_be_bytes([src[pos + 2], src[pos + 3]]) as usize;
            if out.len() + run > track_size {
                return Err(UftError::Corrupt);
            }
            out.resize(out.len() + run, data);
            pos += 4;
        }
        else {
            if out.len() >= track_size {
                return Err(UftError::Corrupt);
            }
            out.push(byte);
            pos += 1;
        }
    }
    if out.len() < track_size {
        log::warn!(
            "msa rle: track expanded to {} of {} bytes; zero padding",
            out.len(),
            track_size
        );
        out.resize(track_size, 0);
    }
    Ok(out)
}

/// Encode a raw track. Runs of 4 or more bytes are compressed; 0xE5 is
/// always emitted as a run, whatever its length. Returns `None` when the
/// encoding would not be smaller than the raw track, in which case the
/// caller stores the track uncompressed and marks it so.
pub fn encode(src: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(src.len());
    let mut pos = 0usize;
    while pos < src.len() {
        let byte = src[pos];
        let mut run = 1usize;
        while pos + run < src.len() && src[pos + run] == byte {
            run += 1;
        }
        if byte == MSA_RLE_MARKER || run >= MIN_RUN {
            // A run longer than a track cannot occur; u16 is plenty.
            let mut remaining = run;
            while remaining > 0 {
                let chunk = remaining.min(u16::MAX as usize);
                out.push(MSA_RLE_MARKER);
                out.push(byte);
                out.extend_from_slice(&(chunk as u16).to_be_bytes());
                remaining -= chunk;
            }
        }
        else {
            out.extend(std::iter::repeat(byte).take(run));
        }
        pos += run;
        if out.len() >= src.len() {
            return None;
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_literals_and_runs() {
        // One literal 0x12 then a run of seven 0x55.
        let src = [0x12, 0xE5, 0x55, 0x00, 0x07];
        let track = decode(&src, 8).unwrap();
        assert_eq!(track, [0x12, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55]);
    }

    #[test]
    fn decode_pads_short_expansion() {
        let src = [0x12, 0xE5, 0x55, 0x00, 0x07];
        let track = decode(&src, 4608).unwrap();
        assert_eq!(track.len(), 4608);
        assert_eq!(&track[0..8], &[0x12, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55]);
        assert!(track[8..].iter().all(|&b| b == 0));
    }

    #[test]
    fn decode_rejects_overrun_and_truncation() {
        // Run of 16 into an 8-byte track.
        assert!(matches!(decode(&[0xE5, 0x00, 0x00, 0x10], 8), Err(UftError::Corrupt)));
        // Marker with a truncated run header.
        assert!(matches!(decode(&[0x01, 0xE5, 0x55], 8), Err(UftError::Corrupt)));
    }

    #[test]
    fn encode_run_threshold() {
        // A run of three is left literal; four is compressed.
        let three = [0xAA, 0xAA, 0xAA, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
        assert!(encode(&three).is_none()); // no savings on this input
        let mut four = vec![0xAAu8; 600];
        four.extend_from_slice(&[1, 2, 3, 4]);
        let enc = encode(&four).unwrap();
        assert_eq!(&enc[0..4], &[0xE5, 0xAA, 0x02, 0x58]);
        assert_eq!(decode(&enc, four.len()).unwrap(), four);
    }

    #[test]
    fn encode_marker_always_escaped() {
        // A single 0xE5 must become a run of one; raw 0xE5 would corrupt
        // the stream.
        let src = {
            let mut v = vec![0u8; 600];
            v[0] = 0xE5;
            v
        };
        let enc = encode(&src).unwrap();
        assert_eq!(&enc[0..4], &[0xE5, 0xE5, 0x00, 0x01]);
        assert_eq!(decode(&enc, src.len()).unwrap(), src);
    }

    #[test]
    fn encode_declines_incompressible() {
        let src: Vec<u8> = (0..=255u8).cycle().take(1024).collect();
        assert!(encode(&src).is_none());
    }
}
