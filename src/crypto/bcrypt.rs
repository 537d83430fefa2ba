//! Hashing engine: digest computation and constant-time verification.

use subtle::ConstantTimeEq;
use tracing::debug;

use super::blowfish::CipherState;
use super::eks::build_state;
use super::DIGEST_LEN;
use crate::error::Result;
use crate::format::{HashRecord, Salt};

/// "OrpheanBeholderScryDoubt", the fixed plaintext.
const MAGIC: &[u8; 24] = b"OrpheanBeholderScryDoubt";
/// Passes of the fixed plaintext through the cipher.
const PASSES: usize = 64;

/// Encrypts the fixed plaintext 64 times in ECB mode, each pass feeding on
/// the previous output, and keeps the first 23 of the 24 output bytes.
pub fn compute_digest(state: &CipherState) -> [u8; DIGEST_LEN] {
    let mut words = [0u32; 6];
    for (word, chunk) in words.iter_mut().zip(MAGIC.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    for _ in 0..PASSES {
        for block in words.chunks_exact_mut(2) {
            let (l, r) = state.encrypt_block(block[0], block[1]);
            block[0] = l;
            block[1] = r;
        }
    }

    let mut out = [0u8; DIGEST_LEN + 1];
    for (chunk, word) in out.chunks_exact_mut(4).zip(words) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
    let mut digest = [0u8; DIGEST_LEN];
    digest.copy_from_slice(&out[..DIGEST_LEN]);
    digest
}

/// Hashes `password` (already converted to bytes) under `salt`.
pub fn hash(password: &[u8], salt: &Salt) -> HashRecord {
    debug!(prefix = %salt.prefix(), cost = salt.cost().get(), "computing bcrypt hash");
    let state = build_state(password, salt.bytes(), salt.cost());
    HashRecord::new(salt.clone(), compute_digest(&state))
}

/// Recomputes the hash under the stored salt and compares the encoded
/// strings without exiting early on the first difference.
pub fn verify(password: &[u8], hash_text: &str) -> Result<bool> {
    let stored: HashRecord = hash_text.parse()?;
    let computed = hash(password, stored.salt());
    Ok(matches(&stored, &computed))
}

pub(crate) fn matches(stored: &HashRecord, computed: &HashRecord) -> bool {
    let matched: bool = stored
        .to_string()
        .as_bytes()
        .ct_eq(computed.to_string().as_bytes())
        .into();
    debug!(matched, "bcrypt comparison finished");
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Field};

    #[test]
    fn known_digests() {
        let salt: Salt = "$2a$04$......................".parse().unwrap();
        assert_eq!(
            hash(b"password", &salt).to_string(),
            "$2a$04$......................LAtw7/ohmmBAhnXqmkuIz83Rl5Qdjhm"
        );
        assert_eq!(
            hash(b"", &salt).to_string(),
            "$2a$04$......................w74bL5gU7LSJClZClCa.Pkz14aTv/XO"
        );
    }

    #[test]
    fn verify_known_hashes() {
        let uu = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";
        let empty = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.7uG0VCzI2bS7j6ymqJi9CdcdxiRTWNy";
        assert!(verify(b"U*U", uu).unwrap());
        assert!(verify(b"", empty).unwrap());
        assert!(!verify(b"U*U*", uu).unwrap());
        assert!(!verify(b"U*U", empty).unwrap());
    }

    #[test]
    fn verify_propagates_parse_errors() {
        assert_eq!(
            verify(b"pw", "$2a$04$......................"),
            Err(Error::salt(Field::Digest, "missing"))
        );
        assert!(matches!(
            verify(b"pw", "$2z$04$......................LAtw7/ohmmBAhnXqmkuIz83Rl5Qdjhm"),
            Err(Error::Salt {
                field: Field::Prefix,
                ..
            })
        ));
    }

    #[test]
    fn long_passwords_truncate_at_72() {
        let salt: Salt = "$2a$04$abcdefghijklmnopqrstuu".parse().unwrap();
        let long = [b'x'; 100];
        assert_eq!(hash(&long, &salt), hash(&long[..72], &salt));
        assert_ne!(hash(&long[..71], &salt), hash(&long[..72], &salt));
    }
}
