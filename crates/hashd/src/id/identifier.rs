use crate::error::Error;
use core::{fmt, num::NonZeroU64, str::FromStr};

/// A submission identifier.
///
/// Identifiers are positive integers handed out by an
/// [`IdAllocator`](crate::IdAllocator) in strictly increasing order starting
/// at `1`. The zero value is unrepresentable, so an `Option<Identifier>` costs
/// no extra space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Identifier(NonZeroU64);

impl Identifier {
    /// The first identifier an allocator hands out.
    pub const FIRST: Self = Self(NonZeroU64::MIN);

    /// Creates an identifier from a raw value, returning `None` for zero.
    pub const fn new(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    /// Returns the raw integer value.
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Identifier> for u64 {
    fn from(id: Identifier) -> Self {
        id.get()
    }
}

impl TryFrom<u64> for Identifier {
    type Error = Error;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or_else(|| Error::InvalidInput {
            reason: "id must be greater than 0".to_string(),
        })
    }
}

/// Parses the decimal form of an identifier.
///
/// Only plain ASCII digits are accepted: signs, whitespace and zero are all
/// rejected with [`Error::InvalidInput`].
impl FromStr for Identifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidInput {
                reason: format!("invalid id: {s:?}"),
            });
        }
        let raw: u64 = s.parse().map_err(|_| Error::InvalidInput {
            reason: format!("id out of range: {s:?}"),
        })?;
        Self::try_from(raw)
    }
}
