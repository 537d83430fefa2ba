//! Cryptographic core: the Blowfish cipher, the expensive key schedule
//! built on it, and the bcrypt digest computed from the resulting state.

pub mod bcrypt;
pub mod blowfish;
pub mod cost;
pub mod eks;
pub mod random;
mod tables;

pub use bcrypt::{compute_digest, hash, verify};
pub use blowfish::CipherState;
pub use cost::Cost;
pub use eks::{KeySchedule, MAX_KEY_LEN, build_state};

/// Length of the raw salt (16 bytes).
pub const SALT_LEN: usize = 16;
/// Length of the digest kept in the hash string (23 of the 24 output bytes).
pub const DIGEST_LEN: usize = 23;
