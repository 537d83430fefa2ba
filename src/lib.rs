//! bcrypt password hashing.
//!
//! Produces and checks `$2a$NN$<salt><digest>` strings. Every entry point
//! exists in a blocking form and in an asynchronous form that runs the
//! expensive key schedule in slices, yielding to the tokio scheduler in
//! between and optionally reporting progress.
//!
//! ```no_run
//! let hash = pwcrypt::hash_sync("hunter2", None)?;
//! assert!(pwcrypt::compare_sync("hunter2", &hash)?);
//! # Ok::<(), pwcrypt::Error>(())
//! ```

mod config;
pub mod crypto;
mod error;
pub mod format;
mod password;
pub mod request;
pub mod scheduler;

pub use crate::config::Config;
pub use crate::crypto::Cost;
pub use crate::error::{Error, Field, Result};
pub use crate::format::{HashRecord, Prefix, Salt};
pub use crate::password::{Encoding, PasswordInput};
pub use crate::request::{CompareRequest, HashRequest};

/// Where the salt of a new hash comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaltOrCost {
    /// An existing setting such as `$2a$10$N9qo8uLOickgx2ZMRZoMye`.
    Salt(String),
    /// Generate a fresh salt with this cost.
    Cost(Cost),
}

impl From<Cost> for SaltOrCost {
    fn from(cost: Cost) -> Self {
        SaltOrCost::Cost(cost)
    }
}

impl From<&str> for SaltOrCost {
    fn from(salt: &str) -> Self {
        SaltOrCost::Salt(salt.to_string())
    }
}

impl From<String> for SaltOrCost {
    fn from(salt: String) -> Self {
        SaltOrCost::Salt(salt)
    }
}

impl From<&Salt> for SaltOrCost {
    fn from(salt: &Salt) -> Self {
        SaltOrCost::Salt(salt.to_string())
    }
}

pub(crate) fn resolve_salt(config: &Config, salt: Option<SaltOrCost>) -> Result<Salt> {
    match salt {
        Some(SaltOrCost::Salt(text)) => text.parse(),
        Some(SaltOrCost::Cost(cost)) => Salt::generate(cost),
        None => Salt::generate(config.default_cost()),
    }
}

/// Hashing engine bound to one [`Config`].
#[derive(Debug, Clone, Default)]
pub struct Bcrypt {
    config: Config,
}

impl Bcrypt {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Random setting, with the configured default cost when `cost` is `None`.
    pub fn gen_salt(&self, cost: Option<Cost>) -> Result<String> {
        let salt = Salt::generate(cost.unwrap_or(self.config.default_cost()))?;
        Ok(salt.to_string())
    }

    /// Blocks for the whole key schedule.
    pub fn hash_sync<P>(&self, password: &P, salt: Option<SaltOrCost>) -> Result<String>
    where
        P: PasswordInput + ?Sized,
    {
        let password = password.to_password_bytes(self.config.encoding());
        let salt = resolve_salt(&self.config, salt)?;
        Ok(crypto::hash(&password, &salt).to_string())
    }

    pub fn compare_sync<P>(&self, password: &P, hash: &str) -> Result<bool>
    where
        P: PasswordInput + ?Sized,
    {
        let password = password.to_password_bytes(self.config.encoding());
        crypto::verify(&password, hash)
    }

    /// Asynchronous [`hash_sync`](Self::hash_sync); `on_progress` sees the
    /// completed fraction after every slice.
    pub async fn hash<P, F>(
        &self,
        password: &P,
        salt: Option<SaltOrCost>,
        on_progress: F,
    ) -> Result<String>
    where
        P: PasswordInput + ?Sized,
        F: FnMut(f64),
    {
        let password = password.to_password_bytes(self.config.encoding());
        let salt = resolve_salt(&self.config, salt)?;
        let record = scheduler::hash(
            &password,
            &salt,
            self.config.rounds_per_slice(),
            on_progress,
        )
        .await;
        Ok(record.to_string())
    }

    pub async fn compare<P, F>(&self, password: &P, hash: &str, on_progress: F) -> Result<bool>
    where
        P: PasswordInput + ?Sized,
        F: FnMut(f64),
    {
        let password = password.to_password_bytes(self.config.encoding());
        scheduler::verify(&password, hash, self.config.rounds_per_slice(), on_progress).await
    }

    /// Callback-style hashing; see [`HashRequest`].
    pub fn hash_request(&self) -> HashRequest {
        HashRequest::new(self.config)
    }

    /// Callback-style comparison; see [`CompareRequest`].
    pub fn compare_request(&self) -> CompareRequest {
        CompareRequest::new(self.config)
    }
}

/// Random setting with [`Cost::DEFAULT`] unless `cost` is given.
pub fn gen_salt(cost: Option<Cost>) -> Result<String> {
    Bcrypt::default().gen_salt(cost)
}

/// Hashes a password with the default configuration.
pub fn hash_sync<P>(password: &P, salt: Option<SaltOrCost>) -> Result<String>
where
    P: PasswordInput + ?Sized,
{
    Bcrypt::default().hash_sync(password, salt)
}

/// Checks a password against a stored hash with the default configuration.
pub fn compare_sync<P>(password: &P, hash: &str) -> Result<bool>
where
    P: PasswordInput + ?Sized,
{
    Bcrypt::default().compare_sync(password, hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALT4: &str = "$2a$04$......................";
    const HASH4: &str = "$2a$04$......................LAtw7/ohmmBAhnXqmkuIz83Rl5Qdjhm";

    fn cost(c: u32) -> Cost {
        Cost::new(c).unwrap()
    }

    fn assert_setting(text: &str, cost: &str) {
        assert_eq!(text.len(), format::SETTING_LEN);
        assert!(text.starts_with(&format!("$2a${cost}$")), "{text}");
        assert!(text.parse::<Salt>().is_ok(), "{text}");
    }

    #[test]
    fn gen_salt_encodes_cost() {
        for c in 4..=31 {
            assert_setting(&gen_salt(Some(cost(c))).unwrap(), &format!("{c:02}"));
        }
        assert_setting(&gen_salt(None).unwrap(), "10");
    }

    #[test]
    fn gen_salt_uses_configured_default() {
        let bcrypt = Bcrypt::new(Config::default().with_default_cost(cost(12)));
        assert_setting(&bcrypt.gen_salt(None).unwrap(), "12");
    }

    #[test]
    fn hash_with_explicit_salt() {
        assert_eq!(hash_sync("password", Some(SALT4.into())).unwrap(), HASH4);
        assert_eq!(
            hash_sync("", Some(SALT4.into())).unwrap(),
            "$2a$04$......................w74bL5gU7LSJClZClCa.Pkz14aTv/XO"
        );
    }

    #[test]
    fn hash_with_cost_generates_salt() {
        let hash = hash_sync("password", Some(cost(4).into())).unwrap();
        assert_eq!(hash.len(), format::HASH_LEN);
        assert!(hash.starts_with("$2a$04$"));
        assert!(compare_sync("password", &hash).unwrap());
        assert!(!compare_sync("Password", &hash).unwrap());
    }

    #[test]
    fn cost_as_text_is_not_a_salt() {
        let err = hash_sync("password", Some("4".into())).unwrap_err();
        assert!(err.to_string().contains("salt"));
    }

    #[test]
    fn bad_salts_are_rejected() {
        for salt in [
            "$2a$03$CCCCCCCCCCCCCCCCCCCCC.",
            "$2a$32$CCCCCCCCCCCCCCCCCCCCC.",
            "$2z$05$CCCCCCCCCCCCCCCCCCCCC.",
            "$2`$05$CCCCCCCCCCCCCCCCCCCCC.",
            "$2{$05$CCCCCCCCCCCCCCCCCCCCC.",
        ] {
            let err = hash_sync("some password", Some(salt.into())).unwrap_err();
            assert!(matches!(err, Error::Salt { .. }), "{salt}");
        }
    }

    #[test]
    fn raw_encoding_hashes_low_bytes() {
        let raw = Bcrypt::new(Config::default().with_encoding(Encoding::Raw));
        let hash = "$2y$05$/OK.fbVrR/bpIqNJ5ianF.CE5elHaaO4EbggVDjb8P19RukzXSM3e";
        assert!(raw.compare_sync("\u{ff}\u{ff}\u{a3}", hash).unwrap());
        assert!(!compare_sync("\u{ff}\u{ff}\u{a3}", hash).unwrap());
        assert!(compare_sync(&[0xffu8, 0xff, 0xa3], hash).unwrap());
    }

    #[test]
    fn flipping_a_digest_character_fails() {
        let hash = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";
        let mut chars: Vec<char> = hash.chars().collect();
        chars[40] = if chars[40] == 'a' { 'b' } else { 'a' };
        let tampered: String = chars.into_iter().collect();
        assert!(!compare_sync("U*U", &tampered).unwrap());
    }

    #[tokio::test]
    async fn async_hash_matches_sync() {
        let bcrypt = Bcrypt::default();
        let mut calls = 0;
        let hash = bcrypt
            .hash("password", Some(SALT4.into()), |_| calls += 1)
            .await
            .unwrap();
        assert_eq!(hash, HASH4);
        assert_eq!(calls, 2);

        assert!(bcrypt.compare("password", HASH4, |_| {}).await.unwrap());
        assert!(!bcrypt.compare("passwort", HASH4, |_| {}).await.unwrap());
    }

    #[tokio::test]
    async fn async_errors_are_returned() {
        let err = Bcrypt::default()
            .hash("password", Some("$2a$04$.............".into()), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Salt { field: Field::Salt, .. }));
    }
}
