//! Star rating attached to a comment (`-1` means "no rating")

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// A comment's star rating in `-1..=5`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Rating(i8);

impl Rating {
    /// Sentinel for a comment without a rating
    pub const NONE: Self = Self(-1);
    pub const MAX_STARS: u8 = 5;

    /// Validate a raw rating value
    pub fn new(value: i32) -> Result<Self, DomainError> {
        if (-1..=i32::from(Self::MAX_STARS)).contains(&value) {
            Ok(Self(value as i8))
        } else {
            Err(DomainError::RatingOutOfRange(value))
        }
    }

    /// Star value when the comment carries a rating
    #[inline]
    pub fn stars(self) -> Option<u8> {
        u8::try_from(self.0).ok()
    }

    #[inline]
    pub fn is_rated(self) -> bool {
        self.0 >= 0
    }

    #[inline]
    pub fn value(self) -> i32 {
        i32::from(self.0)
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self::NONE
    }
}

impl TryFrom<i32> for Rating {
    type Error = DomainError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for i32 {
    fn from(rating: Rating) -> Self {
        rating.value()
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
