//! Property-Based Test Generators
//!
//! Provides proptest strategies for identifiers and dates that keep (or
//! deliberately break) domain invariants, plus `fake`-backed contact data.

use chrono::{Datelike, Days, NaiveDate};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use proptest::prelude::*;

use domain_customer::identifier::{national_id_check_digits, tax_number_check_digit};
use domain_customer::ContactInfo;

fn digits_to_string(digits: &[u8]) -> String {
    digits.iter().map(|d| char::from(b'0' + d)).collect()
}

/// Completes a nine-digit body into a national identity number
pub fn national_id_from_body(body: [u8; 9]) -> String {
    let (tenth, eleventh) = national_id_check_digits(&body);
    let mut digits = body.to_vec();
    digits.extend([tenth, eleventh]);
    digits_to_string(&digits)
}

/// Completes a nine-digit body into a tax number
pub fn tax_number_from_body(body: [u8; 9]) -> String {
    let mut digits = body.to_vec();
    digits.push(tax_number_check_digit(&body));
    digits_to_string(&digits)
}

/// Strategy for nine-digit bodies without a leading zero
pub fn nonzero_body_strategy() -> impl Strategy<Value = [u8; 9]> {
    (1u8..10, proptest::array::uniform8(0u8..10)).prop_map(|(lead, rest)| {
        let mut body = [0u8; 9];
        body[0] = lead;
        body[1..].copy_from_slice(&rest);
        body
    })
}

/// Strategy for valid national identity numbers
pub fn valid_national_id_strategy() -> impl Strategy<Value = String> {
    nonzero_body_strategy().prop_map(national_id_from_body)
}

/// Strategy for 11-digit strings whose final check digit is wrong
pub fn bad_checksum_national_id_strategy() -> impl Strategy<Value = String> {
    (nonzero_body_strategy(), 1u8..10).prop_map(|(body, delta)| {
        let valid = national_id_from_body(body);
        let mut digits: Vec<u8> = valid.bytes().map(|b| b - b'0').collect();
        digits[10] = (digits[10] + delta) % 10;
        digits_to_string(&digits)
    })
}

/// Strategy for valid tax numbers
pub fn valid_tax_number_strategy() -> impl Strategy<Value = String> {
    proptest::array::uniform9(0u8..10).prop_map(tax_number_from_body)
}

/// Strategy for a birth date giving an age in `min..=max` on `today`
///
/// Births on Feb 29 are avoided so the age is exact in every year.
pub fn birth_date_for_age_strategy(
    today: NaiveDate,
    min: i32,
    max: i32,
) -> impl Strategy<Value = NaiveDate> {
    (min..=max, 0u64..365).prop_filter_map("valid birth date", move |(age, days_back)| {
        let anniversary = today.with_year(today.year() - age)?;
        // step back less than a year, staying past the previous anniversary
        let birth = anniversary.checked_sub_days(Days::new(days_back))?;
        let previous = today.with_year(today.year() - age - 1)?;
        (birth > previous && !(birth.month() == 2 && birth.day() == 29)).then_some(birth)
    })
}

/// Random contact information
pub fn random_contact() -> ContactInfo {
    let first: String = FirstName().fake();
    let last: String = LastName().fake();
    let email: String = SafeEmail().fake();
    let phone_suffix: u32 = (1_000_000..9_999_999).fake();

    ContactInfo {
        email: format!("{}.{}", first.to_lowercase(), email),
        phone_number: format!("+90555{}", phone_suffix),
        address: format!("{} Sokak No:{}, {}", last, (1..200).fake::<u32>(), "Ankara"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_customer::age::{age_in_years, INDIVIDUAL_AGE};
    use domain_customer::{AgeBoundValidator, IdentifierValidator};

    proptest! {
        #[test]
        fn valid_national_ids_validate(id in valid_national_id_strategy()) {
            prop_assert!(IdentifierValidator::validate_national_id(&id).is_valid());
        }

        #[test]
        fn bad_checksum_ids_do_not_validate(id in bad_checksum_national_id_strategy()) {
            prop_assert!(!IdentifierValidator::validate_national_id(&id).is_valid());
        }

        #[test]
        fn valid_tax_numbers_validate(number in valid_tax_number_strategy()) {
            prop_assert!(IdentifierValidator::validate_tax_number(&number).is_valid());
        }

        #[test]
        fn birth_dates_have_requested_age(
            birth in birth_date_for_age_strategy(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(), 18, 100)
        ) {
            let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
            let age = age_in_years(birth, today);
            prop_assert!((18..=100).contains(&age));
            prop_assert!(AgeBoundValidator::validate_age(&INDIVIDUAL_AGE, birth, today).is_valid());
        }
    }

    #[test]
    fn test_random_contacts_differ() {
        let first = random_contact();
        let second = random_contact();
        assert!(first.email.contains('@'));
        assert!(first.phone_number.starts_with("+90555"));
        assert!(first.email != second.email || first.phone_number != second.phone_number);
    }
}
