//! Postal code type.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when parsing an invalid postal code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid postal code {input:?}: {reason}")]
pub struct InvalidCode {
    input: String,
    reason: &'static str,
}

impl InvalidCode {
    fn new(input: impl Into<String>, reason: &'static str) -> Self {
        Self {
            input: input.into(),
            reason,
        }
    }

    /// The rejected input.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// A valid 5-digit postal code.
///
/// Stored numerically so codes order the way ranges expect, and always
/// displayed zero-padded to 5 characters.
///
/// # Examples
///
/// ```
/// use zipcoder::domain::Code;
///
/// let code = Code::parse("78701").unwrap();
/// assert_eq!(code.to_string(), "78701");
///
/// // Integers are zero-padded
/// assert_eq!(Code::from_number(705).unwrap().to_string(), "00705");
///
/// // Wrong length is rejected
/// assert!(Code::parse("787").is_err());
/// assert!(Code::parse("787011").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Code(u32);

impl Code {
    /// Largest representable code (`99999`).
    pub const MAX: u32 = 99_999;

    /// Parse a code from a string.
    ///
    /// The input must be exactly 5 ASCII digits.
    pub fn parse(s: &str) -> Result<Self, InvalidCode> {
        let bytes = s.as_bytes();

        if bytes.len() != 5 {
            return Err(InvalidCode::new(s, "must be exactly 5 characters"));
        }

        let mut value = 0u32;
        for &b in bytes {
            if !b.is_ascii_digit() {
                return Err(InvalidCode::new(s, "must be ASCII digits 0-9"));
            }
            value = value * 10 + u32::from(b - b'0');
        }

        Ok(Code(value))
    }

    /// Build a code from its numeric value, zero-padding on display.
    pub fn from_number(n: u32) -> Result<Self, InvalidCode> {
        if n > Self::MAX {
            return Err(InvalidCode::new(n.to_string(), "must be at most 99999"));
        }
        Ok(Code(n))
    }

    /// Numeric value of the code.
    pub fn value(self) -> u32 {
        self.0
    }

    /// The code immediately after this one, if any.
    pub fn next(self) -> Option<Code> {
        if self.0 < Self::MAX {
            Some(Code(self.0 + 1))
        } else {
            None
        }
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code({:05})", self.0)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05}", self.0)
    }
}

impl Serialize for Code {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Code {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Code::parse(&s).map_err(serde::de::Error::custom)
    }
}
