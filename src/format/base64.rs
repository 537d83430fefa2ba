//! bcrypt's base64 dialect.
//!
//! Same bit packing as standard base64 (6 bits at a time, most significant
//! first, no `=` padding) but over the alphabet `./A-Za-z0-9`.

use crate::error::{Error, Field, Result};

const ALPHABET: &[u8; 64] = b"./ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

const INVALID: u8 = 0xff;

const DECODE: [u8; 256] = {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Length of the encoding of `len` bytes.
pub const fn encoded_len(len: usize) -> usize {
    (len * 8).div_ceil(6)
}

pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(encoded_len(bytes.len()));
    for chunk in bytes.chunks(3) {
        let b0 = chunk[0];
        let b1 = chunk.get(1).copied().unwrap_or(0);
        let b2 = chunk.get(2).copied().unwrap_or(0);

        out.push(ALPHABET[(b0 >> 2) as usize] as char);
        out.push(ALPHABET[(((b0 & 0x03) << 4) | (b1 >> 4)) as usize] as char);
        if chunk.len() > 1 {
            out.push(ALPHABET[(((b1 & 0x0f) << 2) | (b2 >> 6)) as usize] as char);
        }
        if chunk.len() > 2 {
            out.push(ALPHABET[(b2 & 0x3f) as usize] as char);
        }
    }
    out
}

/// Position of `c` in the alphabet.
pub fn index_of(c: u8) -> Option<u8> {
    match DECODE[c as usize] {
        INVALID => None,
        v => Some(v),
    }
}

/// Decodes `text` into exactly `N` bytes.
///
/// `text` must be exactly `encoded_len(N)` characters long. Leftover low
/// bits of the final character are dropped here; callers that need
/// canonical input check them separately.
pub fn decode<const N: usize>(text: &str, field: Field) -> Result<[u8; N]> {
    let text = text.as_bytes();
    if text.len() != encoded_len(N) {
        return Err(Error::salt(field, "wrong length"));
    }

    let mut out = [0u8; N];
    let mut acc = 0u32;
    let mut bits = 0;
    let mut n = 0;
    for &c in text {
        let v = index_of(c)
            .ok_or_else(|| Error::salt(field, "character outside ./A-Za-z0-9"))?;
        acc = (acc << 6) | u32::from(v);
        bits += 6;
        if bits >= 8 {
            bits -= 8;
            if n < N {
                out[n] = (acc >> bits) as u8;
                n += 1;
            }
        }
        acc &= (1 << bits) - 1;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_lengths() {
        assert_eq!(encoded_len(16), 22);
        assert_eq!(encoded_len(23), 31);
    }

    #[test]
    fn alphabet_order_is_not_standard() {
        assert_eq!(encode(&[0, 0, 0]), "....");
        assert_eq!(encode(&[0xff, 0xff, 0xff]), "9999");
        assert_eq!(index_of(b'.'), Some(0));
        assert_eq!(index_of(b'/'), Some(1));
        assert_eq!(index_of(b'A'), Some(2));
        assert_eq!(index_of(b'9'), Some(63));
        assert_eq!(index_of(b'+'), None);
        assert_eq!(index_of(b'='), None);
    }

    #[test]
    fn salt_bytes_decode() {
        // 'C' is 4: a run of them repeats the bit pattern 000100.
        let salt: [u8; 16] = decode("CCCCCCCCCCCCCCCCCCCCC.", Field::Salt).unwrap();
        assert_eq!(salt[0], 0x10);
        assert_eq!(salt[1], 0x41);
        assert_eq!(salt[2], 0x04);
        assert_eq!(encode(&salt), "CCCCCCCCCCCCCCCCCCCCC.");
    }

    #[test]
    fn partial_groups_zero_pad() {
        assert_eq!(encode(&[0xff]), "9u");
        assert_eq!(encode(&[0xff, 0xff]), "996");
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            decode::<16>("CCCC", Field::Salt),
            Err(Error::salt(Field::Salt, "wrong length"))
        );
        assert!(matches!(
            decode::<16>("CCCCCCCCCCCCCCCCCCCC$.", Field::Salt),
            Err(Error::Salt {
                field: Field::Salt,
                ..
            })
        ));
        assert!(matches!(
            decode::<23>("CCCCCCCCCCCCCCCCCCCCCCCCCCCCCC\u{e9}", Field::Digest),
            Err(Error::Salt { .. })
        ));
    }
}
