//! National identifier checksums
//!
//! Two algorithms are supported:
//!
//! - **National identity number**: 11 digits `d0..d10`, first digit non-zero.
//!   `d9 = (7 * (d0+d2+d4+d6+d8) - (d1+d3+d5+d7)) mod 10` and
//!   `d10 = (d0 + ... + d9) mod 10`.
//! - **Tax number**: 10 digits `d0..d9`. For `i` in `0..=8`,
//!   `sum += ((d[i] + 10 - i) mod 10) * (10 - i)`; the check digit is
//!   `(10 - sum mod 10) mod 10`.
//!
//! Shape is checked before any checksum, so callers always see `FormatError`
//! for empty, short, long or non-numeric input.
//!
//! The tenth-digit intermediate can be negative. It is reduced with a floored
//! modulo (`rem_euclid`), which always yields a digit in `[0, 9]`.

use crate::error::ErrorKind;
use crate::validation::{FieldName, ValidationOutcome};

pub const NATIONAL_ID_LENGTH: usize = 11;
pub const TAX_NUMBER_LENGTH: usize = 10;

pub const NATIONAL_ID_LENGTH_MESSAGE: &str = "National identity number must be 11 digits";
pub const NATIONAL_ID_INVALID_MESSAGE: &str = "National identity number is not valid";
pub const TAX_NUMBER_LENGTH_MESSAGE: &str = "Tax number must be 10 digits";
pub const TAX_NUMBER_INVALID_MESSAGE: &str = "Tax number is not valid";

/// Stateless validator for national identity numbers and tax numbers
///
/// # Examples
///
/// ```rust
/// use domain_customer::identifier::IdentifierValidator;
///
/// assert!(IdentifierValidator::validate_national_id("12345678950").is_valid());
/// assert!(IdentifierValidator::validate_tax_number("1234567896").is_valid());
/// assert!(!IdentifierValidator::validate_national_id("02345678950").is_valid());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentifierValidator;

impl IdentifierValidator {
    pub fn validate_national_id(value: &str) -> ValidationOutcome {
        let Some(digits) = parse_digits::<NATIONAL_ID_LENGTH>(value) else {
            return ValidationOutcome::fail(
                FieldName::NationalId,
                ErrorKind::Format,
                NATIONAL_ID_LENGTH_MESSAGE,
            );
        };

        if digits[0] == 0 {
            return ValidationOutcome::fail(
                FieldName::NationalId,
                ErrorKind::Checksum,
                NATIONAL_ID_INVALID_MESSAGE,
            );
        }

        let body = body_of(&digits);
        let (tenth, eleventh) = national_id_check_digits(&body);
        if digits[9] != tenth || digits[10] != eleventh {
            return ValidationOutcome::fail(
                FieldName::NationalId,
                ErrorKind::Checksum,
                NATIONAL_ID_INVALID_MESSAGE,
            );
        }

        ValidationOutcome::Valid
    }

    pub fn validate_tax_number(value: &str) -> ValidationOutcome {
        let Some(digits) = parse_digits::<TAX_NUMBER_LENGTH>(value) else {
            return ValidationOutcome::fail(
                FieldName::TaxNumber,
                ErrorKind::Format,
                TAX_NUMBER_LENGTH_MESSAGE,
            );
        };

        if digits[9] != tax_number_check_digit(&body_of(&digits)) {
            return ValidationOutcome::fail(
                FieldName::TaxNumber,
                ErrorKind::Checksum,
                TAX_NUMBER_INVALID_MESSAGE,
            );
        }

        ValidationOutcome::Valid
    }
}

/// Computes the tenth and eleventh digits of a national identity number
/// from its first nine digits
pub fn national_id_check_digits(body: &[u8; 9]) -> (u8, u8) {
    let odd_sum: i32 = body.iter().step_by(2).map(|&d| i32::from(d)).sum();
    let even_sum: i32 = body.iter().skip(1).step_by(2).map(|&d| i32::from(d)).sum();

    let tenth = (odd_sum * 7 - even_sum).rem_euclid(10) as u8;
    let total: u32 = body.iter().map(|&d| u32::from(d)).sum::<u32>() + u32::from(tenth);
    let eleventh = (total % 10) as u8;

    (tenth, eleventh)
}

/// Computes the check digit of a tax number from its first nine digits
pub fn tax_number_check_digit(body: &[u8; 9]) -> u8 {
    let sum: u32 = body
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            let weight = 10 - i as u32;
            ((u32::from(d) + weight) % 10) * weight
        })
        .sum();

    match sum % 10 {
        0 => 0,
        last => (10 - last) as u8,
    }
}

/// Parses exactly `N` ASCII digits; anything else is a format error
fn parse_digits<const N: usize>(value: &str) -> Option<[u8; N]> {
    if value.trim().is_empty() || value.chars().count() != N {
        return None;
    }

    let mut digits = [0u8; N];
    for (slot, c) in digits.iter_mut().zip(value.chars()) {
        *slot = c.to_digit(10).filter(|_| c.is_ascii_digit())? as u8;
    }
    Some(digits)
}

fn body_of<const N: usize>(digits: &[u8; N]) -> [u8; 9] {
    let mut body = [0u8; 9];
    body.copy_from_slice(&digits[..9]);
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    mod national_id {
        use super::*;

        #[test]
        fn test_known_valid_number() {
            assert_eq!(
                IdentifierValidator::validate_national_id("12345678950"),
                ValidationOutcome::Valid
            );
        }

        #[test]
        fn test_check_digits_for_known_body() {
            assert_eq!(national_id_check_digits(&[1, 2, 3, 4, 5, 6, 7, 8, 9]), (5, 0));
        }

        #[test]
        fn test_negative_intermediate_uses_floored_modulo() {
            // odd sum 1, even sum 36: 7 - 36 = -29, floored mod 10 = 1
            let body = [1, 9, 0, 9, 0, 9, 0, 9, 0];
            let (tenth, eleventh) = national_id_check_digits(&body);
            assert_eq!(tenth, 1);
            assert_eq!(eleventh, 8);
            assert!(IdentifierValidator::validate_national_id("19090909018").is_valid());
        }

        #[test]
        fn test_format_errors() {
            for input in ["", "   ", "1234567895", "123456789501", "1234567895a", "１２３４５６７８９５０"] {
                assert_eq!(
                    IdentifierValidator::validate_national_id(input).kind(),
                    Some(ErrorKind::Format),
                    "input {input:?}"
                );
            }
        }

        #[test]
        fn test_leading_zero_is_checksum_error() {
            assert_eq!(
                IdentifierValidator::validate_national_id("02345678950").kind(),
                Some(ErrorKind::Checksum)
            );
        }

        #[test]
        fn test_wrong_tenth_digit() {
            let outcome = IdentifierValidator::validate_national_id("12345678960");
            let failure = outcome.failures().unwrap().first();
            assert_eq!(failure.field, FieldName::NationalId);
            assert_eq!(failure.kind, ErrorKind::Checksum);
            assert_eq!(failure.message, NATIONAL_ID_INVALID_MESSAGE);
        }

        #[test]
        fn test_wrong_eleventh_digit() {
            assert_eq!(
                IdentifierValidator::validate_national_id("12345678951").kind(),
                Some(ErrorKind::Checksum)
            );
        }
    }

    mod tax_number {
        use super::*;

        #[test]
        fn test_known_valid_number() {
            assert_eq!(
                IdentifierValidator::validate_tax_number("1234567896"),
                ValidationOutcome::Valid
            );
            assert_eq!(tax_number_check_digit(&[1, 2, 3, 4, 5, 6, 7, 8, 9]), 6);
        }

        #[test]
        fn test_check_digit_edges() {
            // every term is ((0 + w) % 10) * w: 0*10 + 9*9 + 8*8 + ... + 2*2 = 284
            assert_eq!(tax_number_check_digit(&[0; 9]), 6);
            // last term becomes ((8 + 2) % 10) * 2 = 0, total 280
            assert_eq!(tax_number_check_digit(&[0, 0, 0, 0, 0, 0, 0, 0, 8]), 0);
            assert!(IdentifierValidator::validate_tax_number("0000000080").is_valid());
        }

        #[test]
        fn test_format_errors() {
            for input in ["", "123456789", "12345678901", "12345-7896", " 234567896"] {
                assert_eq!(
                    IdentifierValidator::validate_tax_number(input).kind(),
                    Some(ErrorKind::Format),
                    "input {input:?}"
                );
            }
        }

        #[test]
        fn test_checksum_error() {
            let outcome = IdentifierValidator::validate_tax_number("1234567890");
            assert_eq!(outcome.kind(), Some(ErrorKind::Checksum));
            assert_eq!(outcome.failures().unwrap().first().field, FieldName::TaxNumber);
        }
    }
}
