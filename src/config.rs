//! Engine configuration.

use std::env;

use crate::crypto::Cost;
use crate::error::{Error, Result};
use crate::password::Encoding;

/// Environment variable holding the default cost.
pub const ENV_COST: &str = "PWCRYPT_COST";
/// Environment variable holding the password encoding (`utf8` or `raw`).
pub const ENV_ENCODING: &str = "PWCRYPT_ENCODING";
/// Environment variable holding the scheduler slice size.
pub const ENV_ROUNDS_PER_SLICE: &str = "PWCRYPT_ROUNDS_PER_SLICE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    default_cost: Cost,
    encoding: Encoding,
    rounds_per_slice: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_cost: Cost::DEFAULT,
            encoding: Encoding::Utf8,
            // key-schedule rounds between two yields of the async path
            rounds_per_slice: 8,
        }
    }
}

impl Config {
    pub fn new(default_cost: Cost, encoding: Encoding, rounds_per_slice: u32) -> Result<Self> {
        let config = Self {
            default_cost,
            encoding,
            rounds_per_slice,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads overrides from the environment; unset variables keep defaults.
    pub fn from_env() -> Result<Self> {
        let default = Self::default();

        let default_cost = match env::var(ENV_COST) {
            Ok(v) => v.parse()?,
            Err(_) => default.default_cost,
        };
        let encoding = match env::var(ENV_ENCODING) {
            Ok(v) => v.parse()?,
            Err(_) => default.encoding,
        };
        let rounds_per_slice = match env::var(ENV_ROUNDS_PER_SLICE) {
            Ok(v) => v
                .trim()
                .parse()
                .map_err(|_| Error::Argument("rounds per slice must be a positive integer"))?,
            Err(_) => default.rounds_per_slice,
        };

        Self::new(default_cost, encoding, rounds_per_slice)
    }

    pub fn with_default_cost(mut self, cost: Cost) -> Self {
        self.default_cost = cost;
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_rounds_per_slice(mut self, rounds: u32) -> Result<Self> {
        self.rounds_per_slice = rounds;
        self.validate()?;
        Ok(self)
    }

    pub fn default_cost(&self) -> Cost {
        self.default_cost
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn rounds_per_slice(&self) -> u32 {
        self.rounds_per_slice
    }

    pub fn validate(&self) -> Result<()> {
        self.default_cost.validate()?;
        if self.rounds_per_slice < 1 {
            return Err(Error::Argument("rounds per slice must be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cost_is_decent() {
        let config = Config::default();
        assert!((10..=15).contains(&config.default_cost().get()));
        assert_eq!(config.encoding(), Encoding::Utf8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_slice_is_rejected() {
        assert!(Config::default().with_rounds_per_slice(0).is_err());
        assert!(Config::new(Cost::new(4).unwrap(), Encoding::Raw, 0).is_err());
    }

    #[test]
    fn builders_override_fields() {
        let config = Config::default()
            .with_default_cost(Cost::new(5).unwrap())
            .with_encoding(Encoding::Raw)
            .with_rounds_per_slice(2)
            .unwrap();
        assert_eq!(config.default_cost().get(), 5);
        assert_eq!(config.encoding(), Encoding::Raw);
        assert_eq!(config.rounds_per_slice(), 2);
    }
}
