//! Conversion of caller-supplied passwords into the bytes the key schedule
//! consumes.

use std::str::FromStr;

use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// How text passwords become bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// UTF-8 bytes of the text.
    #[default]
    Utf8,
    /// The low byte of every character, one byte per character.
    ///
    /// Lets text carry arbitrary octets, e.g. `"\u{ff}\u{a3}"` hashes as
    /// the two bytes `ff a3`.
    Raw,
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "raw" | "binary" => Ok(Encoding::Raw),
            _ => Err(Error::Argument("encoding must be 'utf8' or 'raw'")),
        }
    }
}

/// Anything that can be hashed as a password.
///
/// Byte slices are passed through untouched whatever the encoding.
pub trait PasswordInput {
    fn to_password_bytes(&self, encoding: Encoding) -> Zeroizing<Vec<u8>>;
}

impl PasswordInput for str {
    fn to_password_bytes(&self, encoding: Encoding) -> Zeroizing<Vec<u8>> {
        match encoding {
            Encoding::Utf8 => Zeroizing::new(self.as_bytes().to_vec()),
            Encoding::Raw => Zeroizing::new(self.chars().map(|c| c as u32 as u8).collect()),
        }
    }
}

impl PasswordInput for String {
    fn to_password_bytes(&self, encoding: Encoding) -> Zeroizing<Vec<u8>> {
        self.as_str().to_password_bytes(encoding)
    }
}

impl PasswordInput for [u8] {
    fn to_password_bytes(&self, _encoding: Encoding) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.to_vec())
    }
}

impl<const N: usize> PasswordInput for [u8; N] {
    fn to_password_bytes(&self, _encoding: Encoding) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.to_vec())
    }
}

impl PasswordInput for Vec<u8> {
    fn to_password_bytes(&self, _encoding: Encoding) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.clone())
    }
}

impl<T: PasswordInput + ?Sized> PasswordInput for &T {
    fn to_password_bytes(&self, encoding: Encoding) -> Zeroizing<Vec<u8>> {
        (**self).to_password_bytes(encoding)
    }
}

impl PasswordInput for Zeroizing<String> {
    fn to_password_bytes(&self, encoding: Encoding) -> Zeroizing<Vec<u8>> {
        self.as_str().to_password_bytes(encoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_keeps_multibyte_sequences() {
        assert_eq!(*"\u{e9}".to_password_bytes(Encoding::Utf8), vec![0xc3, 0xa9]);
    }

    #[test]
    fn raw_takes_low_byte() {
        assert_eq!(
            *"\u{ff}\u{ff}\u{a3}".to_password_bytes(Encoding::Raw),
            vec![0xff, 0xff, 0xa3]
        );
        assert_eq!(*"\u{20ac}".to_password_bytes(Encoding::Raw), vec![0xac]);
    }

    #[test]
    fn bytes_pass_through() {
        let raw = [0xffu8, 0x00, 0x41];
        assert_eq!(*raw.to_password_bytes(Encoding::Utf8), raw.to_vec());
        assert_eq!(*raw[..].to_password_bytes(Encoding::Raw), raw.to_vec());
    }

    #[test]
    fn parses_encoding_names() {
        assert_eq!("UTF8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("raw".parse::<Encoding>().unwrap(), Encoding::Raw);
        assert!("latin1".parse::<Encoding>().is_err());
    }
}
