//! Dice descriptors in `NdS` notation.
//!
//! A table is rolled with `count` dice of `sides` faces each. The descriptor
//! fixes the domain of obtainable sums and the odds of each one.

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::error::{TableError, TableResult};

/// Largest `count × possible sums` accepted for pools of two or more dice.
///
/// Exact odds come from a convolution whose time and memory grow with this
/// product. A single die needs no convolution and is not limited.
pub const MAX_POOL_WORK: u64 = 4_000_000;

/// A pool of identical dice, written `NdS` (e.g. `2d6`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiceSpec {
    count: u32,
    sides: u32,
}

impl DiceSpec {
    /// Create a descriptor, rejecting zero dice, zero sides, a maximum sum
    /// that does not fit in a `u32`, or a pool past [`MAX_POOL_WORK`].
    pub fn new(count: u32, sides: u32) -> TableResult<Self> {
        if count < 1 {
            return Err(TableError::InvalidDice(format!(
                "{count}d{sides}: need at least one die"
            )));
        }
        if sides < 1 {
            return Err(TableError::InvalidDice(format!(
                "{count}d{sides}: need at least one side"
            )));
        }
        if count.checked_mul(sides).is_none() {
            return Err(TableError::InvalidDice(format!(
                "{count}d{sides}: sum too large"
            )));
        }
        if count > 1 {
            let sums = u64::from(count) * u64::from(sides - 1) + 1;
            if u64::from(count).saturating_mul(sums) > MAX_POOL_WORK {
                return Err(TableError::InvalidDice(format!(
                    "{count}d{sides}: too many possible sums to compute odds"
                )));
            }
        }
        Ok(Self { count, sides })
    }

    /// Number of dice rolled.
    pub fn count(self) -> u32 {
        self.count
    }

    /// Faces on each die.
    pub fn sides(self) -> u32 {
        self.sides
    }

    /// Smallest obtainable sum.
    pub fn min(self) -> u32 {
        self.count
    }

    /// Largest obtainable sum.
    pub fn max(self) -> u32 {
        self.count * self.sides
    }

    /// Roll every die and return the sum.
    pub fn roll<R: Rng + ?Sized>(self, rng: &mut R) -> u32 {
        (0..self.count).map(|_| rng.random_range(1..=self.sides)).sum()
    }
}

impl FromStr for DiceSpec {
    type Err = TableError;

    /// Parse `NdS`. A bare `dS` means one die.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let (count, sides) = lower
            .split_once('d')
            .ok_or_else(|| TableError::InvalidDice(s.to_string()))?;
        let count = if count.is_empty() {
            1
        } else {
            count
                .parse::<u32>()
                .map_err(|_| TableError::InvalidDice(s.to_string()))?
        };
        let sides = sides
            .parse::<u32>()
            .map_err(|_| TableError::InvalidDice(s.to_string()))?;
        Self::new(count, sides)
    }
}

impl fmt::Display for DiceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)
    }
}
