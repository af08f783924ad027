//! Inclusive count ranges used to declare what a calculator accepts

use std::fmt;
use std::marker::PhantomData;

use crate::error::{Result, SkillError};

/// Marker for ranges over the number of teams in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Teams {}

/// Marker for ranges over the number of players on one team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Players {}

pub type TeamsRange = Range<Teams>;
pub type PlayersRange = Range<Players>;

/// Inclusive `[min, max]` range of counts, tagged with what it counts so a
/// teams range cannot be passed where a players range is expected.
#[derive(Debug, PartialEq, Eq)]
pub struct Range<U> {
    min: usize,
    max: usize,
    _unit: PhantomData<U>,
}

impl<U> Clone for Range<U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<U> Copy for Range<U> {}

impl<U> Range<U> {
    pub fn inclusive(min: usize, max: usize) -> Result<Self> {
        if min > max {
            return Err(SkillError::invalid_argument(format!(
                "range minimum {} exceeds maximum {}",
                min, max
            )));
        }

        Ok(Self {
            min,
            max,
            _unit: PhantomData,
        })
    }

    pub fn exactly(value: usize) -> Self {
        Self {
            min: value,
            max: value,
            _unit: PhantomData,
        }
    }

    pub fn at_least(minimum: usize) -> Self {
        Self {
            min: minimum,
            max: usize::MAX,
            _unit: PhantomData,
        }
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn is_in_range(&self, value: usize) -> bool {
        self.min <= value && value <= self.max
    }
}

impl<U> fmt::Display for Range<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.max == usize::MAX {
            write!(f, "at least {}", self.min)
        } else if self.min == self.max {
            write!(f, "exactly {}", self.min)
        } else {
            write!(f, "{}..={}", self.min, self.max)
        }
    }
}
