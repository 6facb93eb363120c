//! Stop and station code types.

use std::fmt;

/// Error returned when parsing an invalid CRS code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid CRS code: {reason}")]
pub struct InvalidCrs {
    reason: &'static str,
}

/// A valid 3-letter CRS (Computer Reservation System) station code.
///
/// CRS codes are always 3 uppercase ASCII letters. This type guarantees
/// that any `Crs` value is valid by construction.
///
/// # Examples
///
/// ```
/// use departures_server::domain::Crs;
///
/// let lst = Crs::parse("LST").unwrap();
/// assert_eq!(lst.as_str(), "LST");
///
/// // Lowercase is rejected by the strict parser
/// assert!(Crs::parse("lst").is_err());
///
/// // but accepted from user input
/// assert_eq!(Crs::parse_normalized(" lst ").unwrap(), lst);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crs([u8; 3]);

impl Crs {
    /// Parse a CRS code from a string.
    ///
    /// The input must be exactly 3 uppercase ASCII letters (A-Z).
    pub fn parse(s: &str) -> Result<Self, InvalidCrs> {
        let bytes = s.as_bytes();

        if bytes.len() != 3 {
            return Err(InvalidCrs {
                reason: "must be exactly 3 characters",
            });
        }

        for &b in bytes {
            if !b.is_ascii_uppercase() {
                return Err(InvalidCrs {
                    reason: "must be uppercase ASCII letters A-Z",
                });
            }
        }

        Ok(Crs([bytes[0], bytes[1], bytes[2]]))
    }

    /// Parse a CRS code typed by a user: surrounding whitespace is trimmed
    /// and letters are upper-cased first.
    pub fn parse_normalized(s: &str) -> Result<Self, InvalidCrs> {
        Self::parse(&s.trim().to_ascii_uppercase())
    }

    /// Returns the CRS code as a string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII uppercase letters are ever stored
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Debug for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Crs({})", self.as_str())
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an invalid ATCO stop code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid ATCO code: {reason}")]
pub struct InvalidAtcoCode {
    reason: &'static str,
}

/// Longest ATCO code in the NaPTAN dataset.
const MAX_ATCO_LEN: usize = 12;

/// A bus stop identifier from the national stop register (NaPTAN).
///
/// ATCO codes are 1-12 ASCII letters and digits, e.g. `450010441` or
/// `0100BRP90312`. Letters are stored upper-cased.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AtcoCode(String);

impl AtcoCode {
    /// Parse an ATCO code, trimming whitespace and upper-casing letters.
    pub fn parse(s: &str) -> Result<Self, InvalidAtcoCode> {
        let s = s.trim();

        if s.is_empty() {
            return Err(InvalidAtcoCode {
                reason: "must not be empty",
            });
        }

        if s.len() > MAX_ATCO_LEN {
            return Err(InvalidAtcoCode {
                reason: "must be at most 12 characters",
            });
        }

        if !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(InvalidAtcoCode {
                reason: "must be ASCII letters and digits",
            });
        }

        Ok(AtcoCode(s.to_ascii_uppercase()))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AtcoCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AtcoCode({})", self.0)
    }
}

impl fmt::Display for AtcoCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
