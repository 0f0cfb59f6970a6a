//! Canonical base-36 SLID item identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SlidError;

const BASE36_DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A positive 64-bit item identifier in canonical upper-case base 36.
///
/// Textually different spellings of the same number (case, leading zeros,
/// an explicit `+`) canonicalize to the same value.
///
/// # Examples
///
/// ```
/// use sip_attestation::Slid36;
///
/// let slid = Slid36::parse("00abc").unwrap();
/// assert_eq!(slid.as_str(), "ABC");
/// assert_eq!(slid.value(), 13368);
///
/// assert!(Slid36::parse("0").is_err());
/// assert!(Slid36::parse("-1").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slid36(String);

impl Slid36 {
    /// Parses a base-36 integer and returns its canonical form.
    ///
    /// # Errors
    ///
    /// Returns `SlidError::NotBase36` if the input is empty, contains
    /// non-base-36 characters, or overflows a signed 64-bit integer, and
    /// `SlidError::NotPositive` if the value is zero or negative.
    pub fn parse(input: &str) -> Result<Self, SlidError> {
        let value = i64::from_str_radix(input, 36).map_err(|e| SlidError::NotBase36 {
            input: input.to_string(),
            reason: e.to_string(),
        })?;
        let value = u64::try_from(value)
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| SlidError::NotPositive {
                input: input.to_string(),
            })?;
        Ok(Self(to_base36(value)))
    }

    /// Returns the canonical string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the numeric value.
    #[must_use]
    pub fn value(&self) -> u64 {
        // Canonical strings only hold digits of a positive i64.
        self.0
            .bytes()
            .fold(0u64, |acc, b| acc * 36 + u64::from(digit_value(b)))
    }
}

fn digit_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        _ => b - b'A' + 10,
    }
}

fn to_base36(mut value: u64) -> String {
    let mut digits = Vec::with_capacity(13);
    while value > 0 {
        // value % 36 < 36, the index is always in range
        #[allow(clippy::cast_possible_truncation)]
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    digits.into_iter().map(char::from).collect()
}

impl fmt::Display for Slid36 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Slid36 {
    type Err = SlidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Slid36 {
    type Error = SlidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Slid36> for String {
    fn from(slid: Slid36) -> Self {
        slid.0
    }
}

impl AsRef<str> for Slid36 {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
