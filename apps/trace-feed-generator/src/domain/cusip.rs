//! CUSIP identifier generation and check-digit arithmetic.
//!
//! A CUSIP is a 9-character security identifier: an 8-character base drawn
//! from digits, letters, and the special characters `*`, `@`, `#`, plus a
//! final check digit computed with a modulus-10 double-add-double scheme.
//! Generated identifiers always self-validate, so downstream consumers that
//! verify checksums accept the synthetic feed.

use rand::Rng;
use thiserror::Error;

/// Characters eligible for randomly generated CUSIP bases.
///
/// Real bases may also contain `*`, `@`, and `#`; the checksum handles those,
/// but generated identifiers stick to the alphanumeric subset.
const BASE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of the CUSIP base, before the check digit.
const BASE_LEN: usize = 8;

/// Errors from CUSIP checksum computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CusipError {
    /// A base character outside digits, letters, `*`, `@`, or `#`.
    #[error("invalid CUSIP character: {0:?}")]
    InvalidCharacter(char),
}

/// Numeric value of one CUSIP base character.
///
/// Digits map to themselves, letters to alphabetic position + 9
/// (`A` = 10 ... `Z` = 35, case-insensitive), then `*` = 36, `@` = 37,
/// `#` = 38.
fn char_value(c: char) -> Result<u32, CusipError> {
    match c {
        '0'..='9' => Ok(c as u32 - '0' as u32),
        'A'..='Z' | 'a'..='z' => Ok(c.to_ascii_uppercase() as u32 - 'A' as u32 + 10),
        '*' => Ok(36),
        '@' => Ok(37),
        '#' => Ok(38),
        other => Err(CusipError::InvalidCharacter(other)),
    }
}

/// Computes the check digit for a CUSIP base.
///
/// Character values at odd 0-based positions are doubled, each value
/// contributes its tens digit plus its ones digit to a running total, and
/// the check digit is `(10 - total % 10) % 10`.
///
/// # Errors
///
/// Returns [`CusipError::InvalidCharacter`] if the base contains a character
/// outside the recognized alphabet.
pub fn check_digit(base: &str) -> Result<char, CusipError> {
    let mut total = 0;
    for (i, c) in base.chars().enumerate() {
        let mut value = char_value(c)?;
        if i % 2 == 1 {
            value *= 2;
        }
        total += value / 10 + value % 10;
    }
    let digit = (10 - total % 10) % 10;
    // digit is 0..=9 by construction.
    #[allow(clippy::expect_used)]
    let check = char::from_digit(digit, 10).expect("check digit is a single decimal digit");
    Ok(check)
}

/// Generates a random 9-character CUSIP with a valid check digit.
#[must_use]
pub fn random_cusip(rng: &mut impl Rng) -> String {
    let mut cusip: String = (0..BASE_LEN)
        .map(|_| BASE_ALPHABET[rng.random_range(0..BASE_ALPHABET.len())] as char)
        .collect();
    // The base is drawn from the recognized alphabet, so the checksum
    // cannot see an invalid character.
    #[allow(clippy::expect_used)]
    let check = check_digit(&cusip).expect("generated base contains only valid CUSIP characters");
    cusip.push(check);
    cusip
}
