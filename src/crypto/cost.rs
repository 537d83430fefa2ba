use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Base-2 logarithm of the number of key-schedule rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cost(u32);

impl Cost {
    pub const MIN: Cost = Cost(4);
    pub const MAX: Cost = Cost(31);
    /// Recommended work factor used when the caller does not pick one.
    pub const DEFAULT: Cost = Cost(10);

    pub fn new(cost: u32) -> Result<Self> {
        let cost = Self(cost);
        cost.validate()?;
        Ok(cost)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Number of expensive key-schedule iterations, `2^cost`.
    pub fn rounds(&self) -> u64 {
        1u64 << self.0
    }

    pub fn validate(&self) -> Result<()> {
        if !(Self::MIN.0..=Self::MAX.0).contains(&self.0) {
            return Err(Error::Cost(self.0.to_string()));
        }
        Ok(())
    }
}

impl Default for Cost {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl TryFrom<u32> for Cost {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<i64> for Cost {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        let cost = u32::try_from(value).map_err(|_| Error::Cost(value.to_string()))?;
        Self::new(cost)
    }
}

/// Fractional costs are truncated toward zero, so `4.8` means cost 4.
impl TryFrom<f64> for Cost {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        if !value.is_finite() || value < 0.0 || value >= f64::from(u32::MAX) {
            return Err(Error::Cost(value.to_string()));
        }
        Self::new(value.trunc() as u32)
    }
}

impl FromStr for Cost {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(cost) = s.parse::<i64>() {
            return Self::try_from(cost);
        }
        match s.parse::<f64>() {
            Ok(cost) => Self::try_from(cost),
            Err(_) => Err(Error::Cost(s.to_string())),
        }
    }
}
