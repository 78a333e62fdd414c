//! Property tests for identifier checksums and age bounds

use chrono::{Datelike, Days, NaiveDate};
use proptest::prelude::*;

use domain_customer::age::{age_in_years, AgeBoundValidator, COMPANY_AGE, INDIVIDUAL_AGE};
use domain_customer::identifier::{
    national_id_check_digits, tax_number_check_digit, IdentifierValidator,
};
use domain_customer::{ErrorKind, ValidationOutcome};

fn digits_to_string(digits: &[u8]) -> String {
    digits.iter().map(|d| char::from(b'0' + d)).collect()
}

fn national_id_from(body: [u8; 9]) -> String {
    let (tenth, eleventh) = national_id_check_digits(&body);
    let mut digits = body.to_vec();
    digits.extend([tenth, eleventh]);
    digits_to_string(&digits)
}

fn tax_number_from(body: [u8; 9]) -> String {
    let mut digits = body.to_vec();
    digits.push(tax_number_check_digit(&body));
    digits_to_string(&digits)
}

fn body_strategy() -> impl Strategy<Value = [u8; 9]> {
    proptest::array::uniform9(0u8..10)
}

// ============================================================================
// National identity number
// ============================================================================

mod national_id_tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_numbers_with_nonzero_lead_are_valid(body in body_strategy(), lead in 1u8..10) {
            let mut body = body;
            body[0] = lead;
            let id = national_id_from(body);
            prop_assert_eq!(IdentifierValidator::validate_national_id(&id), ValidationOutcome::Valid);
        }

        #[test]
        fn leading_zero_is_never_valid(body in body_strategy(), tail in proptest::array::uniform2(0u8..10)) {
            let mut digits = body.to_vec();
            digits[0] = 0;
            digits.extend(tail);
            let outcome = IdentifierValidator::validate_national_id(&digits_to_string(&digits));
            prop_assert_eq!(outcome.kind(), Some(ErrorKind::Checksum));
        }

        #[test]
        fn altered_check_digit_is_checksum_error(body in body_strategy(), position in 9usize..11, delta in 1u8..10) {
            let mut body = body;
            body[0] = body[0].max(1);
            let mut digits: Vec<u8> = national_id_from(body).bytes().map(|b| b - b'0').collect();
            digits[position] = (digits[position] + delta) % 10;
            let outcome = IdentifierValidator::validate_national_id(&digits_to_string(&digits));
            prop_assert_eq!(outcome.kind(), Some(ErrorKind::Checksum));
        }

        #[test]
        fn wrong_length_is_format_error(digits in proptest::collection::vec(0u8..10, 0..20)) {
            prop_assume!(digits.len() != 11);
            let outcome = IdentifierValidator::validate_national_id(&digits_to_string(&digits));
            prop_assert_eq!(outcome.kind(), Some(ErrorKind::Format));
        }

        #[test]
        fn non_digit_is_format_error(id in "[0-9]{5}[a-zA-Z -][0-9]{5}") {
            let outcome = IdentifierValidator::validate_national_id(&id);
            prop_assert_eq!(outcome.kind(), Some(ErrorKind::Format));
        }

        #[test]
        fn tenth_digit_is_always_a_digit(body in body_strategy()) {
            let (tenth, eleventh) = national_id_check_digits(&body);
            prop_assert!(tenth <= 9);
            prop_assert!(eleventh <= 9);
        }
    }
}

// ============================================================================
// Tax number
// ============================================================================

mod tax_number_tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_numbers_are_valid(body in body_strategy()) {
            let number = tax_number_from(body);
            prop_assert!(IdentifierValidator::validate_tax_number(&number).is_valid());
        }

        #[test]
        fn altered_check_digit_is_checksum_error(body in body_strategy(), delta in 1u8..10) {
            let mut digits: Vec<u8> = tax_number_from(body).bytes().map(|b| b - b'0').collect();
            digits[9] = (digits[9] + delta) % 10;
            let outcome = IdentifierValidator::validate_tax_number(&digits_to_string(&digits));
            prop_assert_eq!(outcome.kind(), Some(ErrorKind::Checksum));
        }

        #[test]
        fn wrong_length_is_format_error(digits in proptest::collection::vec(0u8..10, 0..20)) {
            prop_assume!(digits.len() != 10);
            let outcome = IdentifierValidator::validate_tax_number(&digits_to_string(&digits));
            prop_assert_eq!(outcome.kind(), Some(ErrorKind::Format));
        }
    }
}

// ============================================================================
// Age bounds
// ============================================================================

mod age_tests {
    use super::*;

    fn date_strategy() -> impl Strategy<Value = NaiveDate> {
        (0u64..60_000).prop_map(|offset| {
            NaiveDate::from_ymd_opt(1900, 1, 1).unwrap() + Days::new(offset)
        })
    }

    proptest! {
        #[test]
        fn validation_is_idempotent(birth in date_strategy(), today in date_strategy()) {
            let first = AgeBoundValidator::validate_age(&INDIVIDUAL_AGE, birth, today);
            let second = AgeBoundValidator::validate_age(&INDIVIDUAL_AGE, birth, today);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn exactly_min_years_is_valid(today in date_strategy()) {
            prop_assume!(!(today.month() == 2 && today.day() == 29));
            let birth = today.with_year(today.year() - 18).unwrap();
            prop_assert!(AgeBoundValidator::validate_age(&INDIVIDUAL_AGE, birth, today).is_valid());

            let short = birth.succ_opt().unwrap();
            let outcome = AgeBoundValidator::validate_age(&INDIVIDUAL_AGE, short, today);
            prop_assert_eq!(outcome.kind(), Some(ErrorKind::Range));
        }

        #[test]
        fn age_is_monotonic_in_today(birth in date_strategy(), days in 0u64..2_000) {
            let today = birth + Days::new(days);
            let later = today + Days::new(1);
            prop_assert!(age_in_years(birth, later) >= age_in_years(birth, today));
        }

        #[test]
        fn company_age_outcome_matches_bounds(founded in date_strategy(), today in date_strategy()) {
            let age = age_in_years(founded, today);
            let valid = AgeBoundValidator::validate_age(&COMPANY_AGE, founded, today).is_valid();
            prop_assert_eq!(valid, (1..=200).contains(&age));
        }
    }
}
