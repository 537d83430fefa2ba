//! Encoded hash strings.
//!
//! Grammar:
//! ```text
//! $<prefix>$<cost: 2 digits>$<salt: 22 chars><digest: 31 chars>
//! ```
//! A *setting* is the same string without the digest (29 characters).

use std::fmt;
use std::str::FromStr;

use crate::crypto::{Cost, DIGEST_LEN, SALT_LEN, random};
use crate::error::{Error, Field, Result};

pub mod base64;

/// Length of an encoded salt.
pub const SALT_CHARS: usize = base64::encoded_len(SALT_LEN);
/// Length of an encoded digest.
pub const DIGEST_CHARS: usize = base64::encoded_len(DIGEST_LEN);
/// Length of `$2a$NN$` plus the encoded salt.
pub const SETTING_LEN: usize = 7 + SALT_CHARS;
/// Length of a complete hash string.
pub const HASH_LEN: usize = SETTING_LEN + DIGEST_CHARS;

/// Scheme-version tag.
///
/// `2a`, `2b` and `2y` are computed identically here. `2x` marks hashes
/// made by an implementation with a sign-extension bug and is refused,
/// as is every other tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Prefix {
    #[default]
    V2a,
    V2b,
    V2y,
}

impl Prefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Prefix::V2a => "2a",
            Prefix::V2b => "2b",
            Prefix::V2y => "2y",
        }
    }
}

impl FromStr for Prefix {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "2a" => Ok(Prefix::V2a),
            "2b" => Ok(Prefix::V2b),
            "2y" => Ok(Prefix::V2y),
            _ => Err(Error::salt(Field::Prefix, "unsupported scheme version")),
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prefix, cost and 16 salt bytes: everything needed to hash a password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Salt {
    prefix: Prefix,
    cost: Cost,
    bytes: [u8; SALT_LEN],
}

impl Salt {
    pub fn new(prefix: Prefix, cost: Cost, bytes: [u8; SALT_LEN]) -> Self {
        Self {
            prefix,
            cost,
            bytes,
        }
    }

    /// Fresh random salt under the canonical prefix.
    pub fn generate(cost: Cost) -> Result<Self> {
        Ok(Self::new(Prefix::default(), cost, random::salt_bytes()?))
    }

    pub fn prefix(&self) -> Prefix {
        self.prefix
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    pub fn bytes(&self) -> &[u8; SALT_LEN] {
        &self.bytes
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${}${}${}",
            self.prefix,
            self.cost,
            base64::encode(&self.bytes)
        )
    }
}

/// Accepts a setting or a complete hash; a trailing digest is validated
/// and then ignored.
impl FromStr for Salt {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse(s).map(|(salt, _)| salt)
    }
}

/// A parsed or freshly computed hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashRecord {
    salt: Salt,
    digest: [u8; DIGEST_LEN],
}

impl HashRecord {
    pub fn new(salt: Salt, digest: [u8; DIGEST_LEN]) -> Self {
        Self { salt, digest }
    }

    pub fn salt(&self) -> &Salt {
        &self.salt
    }

    pub fn digest(&self) -> &[u8; DIGEST_LEN] {
        &self.digest
    }
}

impl fmt::Display for HashRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.salt, base64::encode(&self.digest))
    }
}

impl FromStr for HashRecord {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match parse(s)? {
            (salt, Some(digest)) => Ok(Self::new(salt, digest)),
            (_, None) => Err(Error::salt(Field::Digest, "missing")),
        }
    }
}

/// Splits `text` into its salt and, when present, its digest.
pub fn parse(text: &str) -> Result<(Salt, Option<[u8; DIGEST_LEN]>)> {
    let rest = text
        .strip_prefix('$')
        .ok_or_else(|| Error::salt(Field::Prefix, "must start with '$'"))?;
    let (tag, rest) = rest
        .split_once('$')
        .ok_or_else(|| Error::salt(Field::Prefix, "missing '$' separator"))?;
    let prefix: Prefix = tag.parse()?;

    let (cost, rest) = rest
        .split_once('$')
        .ok_or_else(|| Error::salt(Field::Cost, "missing '$' separator"))?;
    let cost = parse_cost(cost)?;

    let salt = rest
        .get(..SALT_CHARS)
        .ok_or_else(|| Error::salt(Field::Salt, "wrong length"))?;
    let bytes = base64::decode::<SALT_LEN>(salt, Field::Salt)?;
    check_padding(salt, 0x0f, Field::Salt)?;

    let digest = match &rest[SALT_CHARS..] {
        "" => None,
        digest => {
            let bytes = base64::decode::<DIGEST_LEN>(digest, Field::Digest)?;
            check_padding(digest, 0x03, Field::Digest)?;
            Some(bytes)
        }
    };

    Ok((Salt::new(prefix, cost, bytes), digest))
}

fn parse_cost(text: &str) -> Result<Cost> {
    if text.len() != 2 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::salt(Field::Cost, "expected two decimal digits"));
    }
    text.parse::<u32>()
        .ok()
        .and_then(|cost| Cost::new(cost).ok())
        .ok_or_else(|| Error::salt(Field::Cost, "cost must be between 04 and 31"))
}

/// The low bits of the last character carry no data and must be zero,
/// otherwise a second spelling of the same bytes would exist.
fn check_padding(text: &str, mask: u8, field: Field) -> Result<()> {
    let last = text.as_bytes().last().copied().and_then(base64::index_of);
    match last {
        Some(v) if v & mask == 0 => Ok(()),
        _ => Err(Error::salt(field, "nonzero padding bits in final character")),
    }
}
