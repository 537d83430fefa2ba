use getrandom::fill;
use tracing::warn;

use super::SALT_LEN;
use crate::error::{Error, Result};

/// Fill buffer with cryptographically secure random bytes
fn secure_random(buf: &mut [u8]) -> Result<()> {
    fill(buf).map_err(|e| {
        warn!(error = %e, "OS random generator failed");
        Error::Random
    })
}

/// Generate raw salt bytes
pub fn salt_bytes() -> Result<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    secure_random(&mut salt)?;
    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salts_differ() {
        let a = salt_bytes().unwrap();
        let b = salt_bytes().unwrap();
        assert_ne!(a, b);
    }
}
