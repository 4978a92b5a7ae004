//! ISIN normalization and checksum validation.
//!
//! A candidate only becomes an [`Isin`] after it has been normalized and has
//! passed the Luhn check over its digit-expanded form. Term sheets are full of
//! 12-character alphanumeric tokens, the checksum is what filters them out.

use crate::error::IsinError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Length of a canonical ISIN
pub const ISIN_LEN: usize = 12;

/// A validated ISIN, stored upper-case without separators
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Isin(String);

impl Isin {
    /// Normalize `candidate` and validate it
    pub fn parse(candidate: &str) -> Result<Self, IsinError> {
        let code = normalize(candidate);
        if !is_normalized_form(&code) {
            return Err(IsinError::Malformed(candidate.to_string()));
        }
        if !checksum_valid(&code) {
            return Err(IsinError::Checksum(code));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical file name, `<ISIN>.pdf`
    pub fn file_name(&self) -> String {
        format!("{}.pdf", self.0)
    }
}

impl fmt::Display for Isin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Isin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Isin {
    type Err = IsinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Isin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// True iff `s` is 2 letters + 9 alphanumerics + 1 digit (ASCII, any case)
pub fn is_normalized_form(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == ISIN_LEN
        && bytes[..2].iter().all(u8::is_ascii_alphabetic)
        && bytes[2..11].iter().all(u8::is_ascii_alphanumeric)
        && bytes[11].is_ascii_digit()
}

/// Strip whitespace and hyphens, then upper-case
pub fn normalize(candidate: &str) -> String {
    candidate
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_uppercase()
}

/// Luhn check over the digit-expanded code (A=10 .. Z=35)
pub fn checksum_valid(code: &str) -> bool {
    if !is_normalized_form(code) {
        return false;
    }

    let mut digits: Vec<u32> = Vec::with_capacity(ISIN_LEN * 2);
    for b in code.bytes() {
        if b.is_ascii_digit() {
            digits.push(u32::from(b - b'0'));
        } else {
            let value = u32::from(b.to_ascii_uppercase() - b'A') + 10;
            digits.push(value / 10);
            digits.push(value % 10);
        }
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(pos, &d)| {
            if pos % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &[&str] = &[
        "US0378331005",
        "US5949181045",
        "DE000BAY0017",
        "GB0002634946",
        "AU0000XVGZA3",
        "CH0012032048",
        "XS1234567896",
        "RU000A0JX0J2",
    ];

    #[test]
    fn test_known_isins_are_valid() {
        for code in VALID {
            assert!(checksum_valid(code), "{} should be valid", code);
        }
    }

    #[test]
    fn test_corruption_is_detected() {
        assert!(!checksum_valid("US0378331006"));
        assert!(!checksum_valid("US0378331015"));
        assert!(!checksum_valid("US0387331005"));
        assert!(!checksum_valid("XS1234567890"));

        // Every valid code has at least one position whose change is caught
        for code in VALID {
            let caught = (0..ISIN_LEN).any(|i| {
                let mut bytes = code.as_bytes().to_vec();
                bytes[i] = if bytes[i] == b'1' { b'2' } else { b'1' };
                let corrupted = String::from_utf8(bytes).unwrap();
                !checksum_valid(&corrupted)
            });
            assert!(caught, "no corruption detected for {}", code);
        }
    }

    #[test]
    fn test_checksum_rejects_wrong_shape() {
        assert!(!checksum_valid(""));
        assert!(!checksum_valid("US037833100"));
        assert!(!checksum_valid("US03783310055"));
        assert!(!checksum_valid("1S0378331005"));
        assert!(!checksum_valid("US037833100X"));
        assert!(!checksum_valid("US-378331005"));
    }

    #[test]
    fn test_checksum_accepts_lowercase() {
        assert!(checksum_valid("us0378331005"));
        assert!(checksum_valid("de000bay0017"));
    }

    #[test]
    fn test_is_normalized_form() {
        assert!(is_normalized_form("US0378331005"));
        assert!(is_normalized_form("us0378331005"));
        assert!(is_normalized_form("XS12345678Z9"));
        assert!(!is_normalized_form("US037833100Z"));
        assert!(!is_normalized_form("U10378331005"));
        assert!(!is_normalized_form("US 378331005"));
        assert!(!is_normalized_form("ÜS0378331005"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("us-037833 1005"), "US0378331005");
        assert_eq!(normalize(" \tDE000\nBAY0017 "), "DE000BAY0017");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for s in ["us-0378 331005", "a - b\tc", "ß-ü x", "--", "US0378331005", "ǆ  e"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_parse() {
        let isin = Isin::parse("us-037833-1005").unwrap();
        assert_eq!(isin.as_str(), "US0378331005");
        assert_eq!(isin.file_name(), "US0378331005.pdf");
        assert_eq!(isin.to_string(), "US0378331005");

        assert_eq!(
            Isin::parse("US0378331006"),
            Err(IsinError::Checksum("US0378331006".to_string()))
        );
        assert!(matches!(Isin::parse("hello"), Err(IsinError::Malformed(_))));
        assert!("GB0002634946".parse::<Isin>().is_ok());
    }
}
