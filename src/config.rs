//! Construction parameters
//!
//! The only tunable in this crate is the B-Tree's minimum degree `t`, which
//! bounds every non-root node to `t - 1 ..= 2t - 1` keys.

use std::fmt;

/// Smallest minimum degree for which node splitting is well defined
pub const MIN_DEGREE_FLOOR: usize = 2;

/// Error type for invalid construction parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The requested minimum degree is below [`MIN_DEGREE_FLOOR`]
    DegreeTooSmall(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::DegreeTooSmall(t) => write!(
                f,
                "minimum degree must be at least {MIN_DEGREE_FLOOR}, got {t}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validated B-Tree minimum degree
///
/// # Example
///
/// ```rust
/// use rust_balanced_collections::config::MinDegree;
///
/// let t = MinDegree::new(3).unwrap();
/// assert_eq!(t.min_keys(), 2);
/// assert_eq!(t.max_keys(), 5);
/// assert!(MinDegree::new(1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MinDegree(usize);

impl MinDegree {
    /// Validates `t`
    pub fn new(t: usize) -> Result<Self, ConfigError> {
        if t < MIN_DEGREE_FLOOR {
            return Err(ConfigError::DegreeTooSmall(t));
        }
        Ok(MinDegree(t))
    }

    /// The raw value of `t`
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }

    /// Fewest keys a non-root node may hold (`t - 1`)
    #[inline]
    pub fn min_keys(self) -> usize {
        self.0 - 1
    }

    /// Most keys any node may hold (`2t - 1`)
    #[inline]
    pub fn max_keys(self) -> usize {
        2 * self.0 - 1
    }
}

impl Default for MinDegree {
    fn default() -> Self {
        MinDegree(MIN_DEGREE_FLOOR)
    }
}

impl TryFrom<usize> for MinDegree {
    type Error = ConfigError;

    fn try_from(t: usize) -> Result<Self, Self::Error> {
        MinDegree::new(t)
    }
}
