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

    src/codec/gcr.rs

    Group-Coded Recording tables and block codecs.

    CBM 5:4 maps each data nibble to a five-bit symbol and operates on
    40-bit groups: 4 data bytes <-> 5 GCR bytes. Apple 6:2 maps six data
    bits to one of 64 disk bytes. Symbols outside the valid set are a hard
    decode fault.
*/
use crate::UftError;

/// Commodore 1541 nibble-to-symbol table. Symbols satisfy the drive's RLL
/// constraint: no more than two consecutive zero bits, no ten consecutive
/// one bits across symbol boundaries.
pub const CBM_GCR_ENCODE: [u8; 16] = [
    0b01010, 0b01011, 0b10010, 0b10011, // 0-3
    0b01110, 0b01111, 0b10110, 0b10111, // 4-7
    0b01001, 0b11001, 0b11010, 0b11011, // 8-B
    0b01101, 0b11101, 0b11110, 0b10101, // C-F
];

const INVALID: u8 = 0xFF;

const fn make_cbm_decode() -> [u8; 32] {
    let mut table = [INVALID; 32];
    let mut i = 0;
    while i < 16 {
        table[CBM_GCR_ENCODE[i] as usize] = i as u8;
        i += 1;
    }
    table
}

/// Inverse of `CBM_GCR_ENCODE`; 0xFF marks an invalid symbol.
pub const CBM_GCR_DECODE: [u8; 32] = make_cbm_decode();

/// Encode 4 data bytes into 5 GCR bytes (one 40-bit group).
pub fn encode_5_4(data: &[u8; 4]) -> [u8; 5] {
    let mut bits = 0u64;
    for &byte in data.iter() {
        bits = (bits << 5) | CBM_GCR_ENCODE[(byte >> 4) as usize] as u64;
        bits = (bits << 5) | CBM_GCR_ENCODE[(byte & 0x0F) as usize] as u64;
    }
    let mut out = [0u8; 5];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = ((bits >> (32 - i * 8)) & 0xFF) as u8;
    }
    out
}

/// Decode 5 GCR bytes back into 4 data bytes. Any symbol outside the valid
/// set is a GCR decode fault.
pub fn decode_5_4(gcr: &[u8; 5]) -> Result<[u8; 4], UftError> {
    let mut bits = 0u64;
    for &byte in gcr.iter() {
        bits = (bits << 8) | byte as u64;
    }
    let mut out = [0u8; 4];
    for (i, slot) in out.iter_mut().enumerate() {
        let hi = CBM_GCR_DECODE[((bits >> (35 - i * 10)) & 0x1F) as usize];
        let lo = CBM_GCR_DECODE[((bits >> (30 - i * 10)) & 0x1F) as usize];
        if hi == INVALID || lo == INVALID {
            return Err(UftError::Codec);
        }
        *slot = (hi << 4) | lo;
    }
    Ok(out)
}

/// Encode a whole buffer; length must be a multiple of 4.
pub fn encode_block_5_4(data: &[u8]) -> Result<Vec<u8>, UftError> {
    if data.len() % 4 != 0 {
        return Err(UftError::InvalidArg);
    }
    let mut out = Vec::with_capacity(data.len() / 4 * 5);
    for chunk in data.chunks_exact(4) {
        let group: [u8; 4] = chunk.try_into().map_err(|_| UftError::InvalidArg)?;
        out.extend_from_slice(&encode_5_4(&group));
    }
    Ok(out)
}

/// Decode a whole buffer; length must be a multiple of 5.
pub fn decode_block_5_4(gcr: &[u8]) -> Result<Vec<u8>, UftError> {
    if gcr.len() % 5 != 0 {
        return Err(UftError::InvalidArg);
    }
    let mut out = Vec::with_capacity(gcr.len() / 5 * 4);
    for chunk in gcr.chunks_exact(5) {
        let group: [u8; 5] = chunk.try_into().map_err(|_| UftError::InvalidArg)?;
        out.extend_from_slice(&decode_5_4(&group)?);
    }
    Ok(out)
}

/// Apple "6 and 2" disk byte table. All 64 entries have the high bit set
/// and no more than one pair of adjacent zero bits.
pub const APPLE_GCR_ENCODE: [u8; 64] = [
    0x96, 0x97, 0x9A, 0x9B, 0x9D, 0x9E, 0x9F, 0xA6, //
    0xA7, 0xAB, 0xAC, 0xAD, 0xAE, 0xAF, 0xB2, 0xB3, //
    0xB4, 0xB5, 0xB6, 0xB7, 0xB9, 0xBA, 0xBB, 0xBC, //
    0xBD, 0xBE, 0xBF, 0xCB, 0xCD, 0xCE, 0xCF, 0xD3, //
    0xD6, 0xD7, 0xD9, 0xDA, 0xDB, 0xDC, 0xDD, 0xDE, //
    0xDF, 0xE5, 0xE6, 0xE7, 0xE9, 0xEA, 0xEB, 0xEC, //
    0xED, 0xEE, 0xEF, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, //
    0xF7, 0xF9, 0xFA, 0xFB, 0xFC, 0xFD, 0xFE, 0xFF, //
];

const fn make_apple_decode() -> [u8; 256] {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < 64 {
        table[APPLE_GCR_ENCODE[i] as usize] = i as u8;
        i += 1;
    }
    table
}

/// Inverse of `APPLE_GCR_ENCODE`; 0xFF marks an invalid disk byte.
pub const APPLE_GCR_DECODE: [u8; 256] = make_apple_decode();

/// Encode six data bits (0..64) as an Apple disk byte.
pub fn encode_6_2(six_bits: u8) -> Result<u8, UftError> {
    if six_bits >= 64 {
        return Err(UftError::InvalidArg);
    }
    Ok(APPLE_GCR_ENCODE[six_bits as usize])
}

/// Decode an Apple disk byte back to its six data bits.
pub fn decode_6_2(disk_byte: u8) -> Result<u8, UftError> {
    match APPLE_GCR_DECODE[disk_byte as usize] {
        INVALID => Err(UftError::Codec),
        bits => Ok(bits),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cbm_group_round_trip() {
        let data = [0x12u8, 0x34, 0x56, 0x78];
        let gcr = encode_5_4(&data);
        assert_eq!(decode_5_4(&gcr).unwrap(), data);
    }

    #[test]
    fn cbm_all_bytes_round_trip() {
        for b in 0..=255u8 {
            let data = [b, b ^ 0x55, b.wrapping_add(1), b.wrapping_mul(3)];
            assert_eq!(decode_5_4(&encode_5_4(&data)).unwrap(), data);
        }
    }

    #[test]
    fn cbm_invalid_symbol_faults() {
        // All-zero bits contain the invalid 00000 symbol.
        assert!(matches!(decode_5_4(&[0u8; 5]), Err(UftError::Codec)));
    }

    #[test]
    fn cbm_block_codec() {
        let data: Vec<u8> = (0..=255u8).collect();
        let gcr = encode_block_5_4(&data).unwrap();
        assert_eq!(gcr.len(), 320);
        assert_eq!(decode_block_5_4(&gcr).unwrap(), data);
        assert!(encode_block_5_4(&[0u8; 3]).is_err());
        assert!(decode_block_5_4(&[0u8; 4]).is_err());
    }

    #[test]
    fn cbm_symbols_obey_rll() {
        for &sym in CBM_GCR_ENCODE.iter() {
            // Five-bit symbols, never starting or ending with two zero bits,
            // no three consecutive zero bits inside.
            assert!(sym < 32);
            assert_ne!(sym & 0b11000, 0);
            assert_ne!(sym & 0b00011, 0);
        }
    }

    #[test]
    fn apple_round_trip() {
        for bits in 0..64u8 {
            let disk_byte = encode_6_2(bits).unwrap();
            assert!(disk_byte & 0x80 != 0);
            assert_eq!(decode_6_2(disk_byte).unwrap(), bits);
        }
        assert!(encode_6_2(64).is_err());
        assert!(matches!(decode_6_2(0x00), Err(UftError::Codec)));
        assert!(matches!(decode_6_2(0xD5), Err(UftError::Codec)));
    }
}
