//! Expensive key schedule (EksBlowfishSetup).
//!
//! [`KeySchedule`] holds the loop counter next to the partially mixed
//! state, so the `2^cost` loop can be run to completion in one call or
//! advanced a slice at a time by the cooperative scheduler.

use zeroize::Zeroizing;

use super::blowfish::CipherState;
use super::cost::Cost;
use super::SALT_LEN;

/// Key bytes consumed by the schedule, terminator included.
pub const MAX_KEY_LEN: usize = 72;

/// Terminated and truncated copy of the password.
///
/// Bytes past offset 72 never reach the schedule. A password shorter than
/// that keeps its trailing NUL, so the empty password becomes `[0]`.
pub(crate) fn key_bytes(password: &[u8]) -> Zeroizing<Vec<u8>> {
    let mut key = Zeroizing::new(Vec::with_capacity(MAX_KEY_LEN));
    key.extend_from_slice(&password[..password.len().min(MAX_KEY_LEN)]);
    if key.len() < MAX_KEY_LEN {
        key.push(0);
    }
    key
}

/// Reads the next big-endian word from `data`, wrapping around its end.
fn next_word(data: &[u8], pos: &mut usize) -> u32 {
    let mut word = 0u32;
    for _ in 0..4 {
        word = (word << 8) | u32::from(data[*pos]);
        *pos = (*pos + 1) % data.len();
    }
    word
}

impl CipherState {
    /// XORs the subkeys with `key`, then re-derives every subkey and
    /// S-box word by chained self-encryption. With `salt` present the
    /// running block is mixed with successive salt words before each
    /// encryption.
    fn expand(&mut self, key: &[u8], salt: Option<&[u8; SALT_LEN]>) {
        let mut pos = 0;
        for p in self.p.iter_mut() {
            *p ^= next_word(key, &mut pos);
        }

        let mut pos = 0;
        let (mut l, mut r) = (0u32, 0u32);
        let mut mix = |state: &CipherState, l: u32, r: u32| match salt {
            Some(salt) => {
                let l = l ^ next_word(salt, &mut pos);
                let r = r ^ next_word(salt, &mut pos);
                state.encrypt_block(l, r)
            }
            None => state.encrypt_block(l, r),
        };

        for i in (0..self.p.len()).step_by(2) {
            (l, r) = mix(&*self, l, r);
            self.p[i] = l;
            self.p[i + 1] = r;
        }
        for b in 0..self.s.len() {
            for i in (0..256).step_by(2) {
                (l, r) = mix(&*self, l, r);
                self.s[b][i] = l;
                self.s[b][i + 1] = r;
            }
        }
    }
}

/// Resumable form of the key schedule.
pub struct KeySchedule {
    state: CipherState,
    key: Zeroizing<Vec<u8>>,
    salt: [u8; SALT_LEN],
    completed: u64,
    total: u64,
}

impl KeySchedule {
    /// Initialises the state and runs the salted expansion. The `2^cost`
    /// loop has not started yet.
    pub fn new(password: &[u8], salt: &[u8; SALT_LEN], cost: Cost) -> Self {
        let key = key_bytes(password);
        let mut state = CipherState::new();
        state.expand(&key, Some(salt));

        Self {
            state,
            key,
            salt: *salt,
            completed: 0,
            total: cost.rounds(),
        }
    }

    /// Runs at most `max_rounds` loop iterations and returns how many ran.
    pub fn advance(&mut self, max_rounds: u64) -> u64 {
        let rounds = max_rounds.min(self.total - self.completed);
        for _ in 0..rounds {
            self.state.expand(&self.key, None);
            self.state.expand(&self.salt, None);
        }
        self.completed += rounds;
        rounds
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Completed share of the loop, in `(0, 1]` once any round has run.
    pub fn progress(&self) -> f64 {
        self.completed as f64 / self.total as f64
    }

    /// Finishes any remaining rounds and hands over the state.
    pub fn finish(mut self) -> CipherState {
        self.advance(u64::MAX);
        self.state
    }
}

/// Blocking form: the whole schedule in one go.
pub fn build_state(password: &[u8], salt: &[u8; SALT_LEN], cost: Cost) -> CipherState {
    KeySchedule::new(password, salt, cost).finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cost4() -> Cost {
        Cost::new(4).unwrap()
    }

    #[test]
    fn key_bytes_terminates_and_truncates() {
        assert_eq!(*key_bytes(b""), vec![0]);
        assert_eq!(*key_bytes(b"ab"), vec![b'a', b'b', 0]);

        let long = [7u8; 100];
        let key = key_bytes(&long);
        assert_eq!(key.len(), MAX_KEY_LEN);
        assert!(key.iter().all(|&b| b == 7));

        let exact = [7u8; 71];
        assert_eq!(key_bytes(&exact).last(), Some(&0));
    }

    #[test]
    fn next_word_wraps() {
        let mut pos = 0;
        assert_eq!(next_word(&[1, 2, 3], &mut pos), 0x01020301);
        assert_eq!(pos, 1);
        let mut pos = 0;
        assert_eq!(next_word(&[0xaa], &mut pos), 0xaaaaaaaa);
    }

    #[test]
    fn sliced_schedule_matches_blocking() {
        let salt = [3u8; SALT_LEN];
        let whole = build_state(b"secret", &salt, cost4());

        let mut sliced = KeySchedule::new(b"secret", &salt, cost4());
        let mut slices = 0;
        while !sliced.is_complete() {
            let remaining = sliced.total() - sliced.completed();
            assert_eq!(sliced.advance(3), remaining.min(3));
            slices += 1;
        }
        assert_eq!(slices, 6);
        assert_eq!(sliced.progress(), 1.0);
        let sliced = sliced.finish();

        assert_eq!(whole.p, sliced.p);
        assert_eq!(whole.s, sliced.s);
    }

    #[test]
    fn advance_never_overshoots() {
        let mut schedule = KeySchedule::new(b"x", &[0u8; SALT_LEN], cost4());
        assert_eq!(schedule.advance(10), 10);
        assert_eq!(schedule.advance(10), 6);
        assert_eq!(schedule.advance(10), 0);
        assert!(schedule.is_complete());
    }
}
