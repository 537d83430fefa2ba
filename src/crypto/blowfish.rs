//! The Blowfish block cipher as used by bcrypt.
//!
//! Only encryption is needed. Key material enters exclusively through the
//! expensive schedule in [`super::eks`], which rewrites the state in place.

use zeroize::Zeroize;

use super::tables::{P_INIT, S_INIT};

const ROUNDS: usize = 16;

/// Subkeys and substitution boxes driving the cipher.
///
/// Each hashing operation owns exactly one state; it is never shared,
/// and it is wiped when dropped.
pub struct CipherState {
    pub(crate) p: [u32; ROUNDS + 2],
    pub(crate) s: [[u32; 256]; 4],
}

impl CipherState {
    /// State initialised from the digits of pi, before any key mixing.
    pub fn new() -> Self {
        Self {
            p: P_INIT,
            s: S_INIT,
        }
    }

    #[inline(always)]
    fn f(&self, x: u32) -> u32 {
        let [a, b, c, d] = x.to_be_bytes();
        (self.s[0][a as usize].wrapping_add(self.s[1][b as usize]) ^ self.s[2][c as usize])
            .wrapping_add(self.s[3][d as usize])
    }

    /// Encrypts one 64-bit block given as its big-endian halves.
    #[inline]
    pub fn encrypt_block(&self, mut l: u32, mut r: u32) -> (u32, u32) {
        l ^= self.p[0];
        for i in (1..=ROUNDS).step_by(2) {
            r ^= self.f(l) ^ self.p[i];
            l ^= self.f(r) ^ self.p[i + 1];
        }
        r ^= self.p[ROUNDS + 1];
        (r, l)
    }
}

impl Default for CipherState {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CipherState {
    fn drop(&mut self) {
        self.p.zeroize();
        self.s.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_match_pi_digits() {
        let state = CipherState::new();
        assert_eq!(state.p[0], 0x243f6a88);
        assert_eq!(state.p[17], 0x8979fb1b);
        assert_eq!(state.s[0][0], 0xd1310ba6);
        assert_eq!(state.s[3][255], 0x3ac372e6);
    }

    #[test]
    fn encryption_is_deterministic_and_mixes() {
        let state = CipherState::new();
        let a = state.encrypt_block(0, 0);
        assert_eq!(a, state.encrypt_block(0, 0));
        assert_ne!(a, (0, 0));
        assert_ne!(a, state.encrypt_block(0, 1));
    }
}
