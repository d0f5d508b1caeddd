use regex::Regex;

use crate::domain::contact::Contact;
use crate::errors::AppError;

pub const MIN_PHONE_DIGITS: usize = 10;
pub const MAX_PHONE_DIGITS: usize = 15;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

pub fn validate_name(name: &str) -> Result<String, AppError> {
    // Surrounding whitespace is dropped, anything else is kept as typed
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name cannot be empty".to_string()));
    }
    Ok(name.to_string())
}

/// Reduce a phone input to its digits and re-format it for display.
///
/// Ten digits become `(XXX) XXX-XXXX`. Longer numbers keep the excess leading
/// digits as a country code: `+CC-XXX-XXX-XXXX`.
pub fn normalize_phone(phone: &str) -> Result<String, AppError> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return Err(AppError::Validation(
            "Phone number must be 10-15 digits long".to_string(),
        ));
    }

    if digits.len() == MIN_PHONE_DIGITS {
        return Ok(format!(
            "({}) {}-{}",
            &digits[..3],
            &digits[3..6],
            &digits[6..]
        ));
    }

    let split = digits.len() - MIN_PHONE_DIGITS;
    let (code, local) = digits.split_at(split);
    Ok(format!(
        "+{}-{}-{}-{}",
        code,
        &local[..3],
        &local[3..6],
        &local[6..]
    ))
}

pub fn validate_email(email: &str) -> Result<bool, AppError> {
    // Email is optional
    if email.is_empty() {
        return Ok(true);
    }
    let re = Regex::new(EMAIL_PATTERN)?;
    Ok(re.is_match(email))
}

/// Phone without brackets, dashes or spaces, used for phone substring search.
pub fn strip_phone_formatting(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '-' | ' '))
        .collect()
}

pub fn name_taken<'a>(name: &str, contacts: impl IntoIterator<Item = &'a Contact>) -> bool {
    contacts
        .into_iter()
        .any(|cont| cont.name.to_lowercase() == name.to_lowercase())
}

pub fn phone_taken<'a>(phone: &str, contacts: impl IntoIterator<Item = &'a Contact>) -> bool {
    contacts.into_iter().any(|cont| cont.phone == phone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_digit_numbers_use_domestic_format() -> Result<(), AppError> {
        assert_eq!(normalize_phone("5551234567")?, "(555) 123-4567");
        assert_eq!(normalize_phone("555-123-4567")?, "(555) 123-4567");
        assert_eq!(normalize_phone("(555) 123 4567")?, "(555) 123-4567");
        assert_eq!(normalize_phone(" 555.123.4567 ")?, "(555) 123-4567");
        Ok(())
    }

    #[test]
    fn every_ten_digit_input_matches_domestic_pattern() -> Result<(), AppError> {
        let re = Regex::new(r"^\(\d{3}\) \d{3}-\d{4}$")?;
        for seed in [0u64, 1, 42, 999_999_999, 5_551_234_567, 9_999_999_999] {
            let raw = format!("{:010}", seed);
            assert!(re.is_match(&normalize_phone(&raw)?), "{raw}");
        }
        Ok(())
    }

    #[test]
    fn long_numbers_keep_country_code() -> Result<(), AppError> {
        assert_eq!(normalize_phone("+44 7314843721")?, "+44-731-484-3721");
        assert_eq!(normalize_phone("+234 803 123 4567")?, "+234-803-123-4567");
        assert_eq!(normalize_phone("12345678901")?, "+1-234-567-8901");
        assert_eq!(normalize_phone("123456789012345")?, "+12345-678-901-2345");
        Ok(())
    }

    #[test]
    fn digit_counts_outside_range_fail() {
        for len in [0usize, 1, 5, 9, 16, 20] {
            let raw = "7".repeat(len);
            assert!(normalize_phone(&raw).is_err(), "{len} digits accepted");
        }
        assert!(normalize_phone("call me maybe").is_err());
    }

    #[test]
    fn email_validation() -> Result<(), AppError> {
        assert!(validate_email("")?);
        assert!(validate_email("alice@example.com")?);
        assert!(validate_email("a.b+tag@mail.example.co")?);

        assert!(!validate_email("foo@bar")?);
        assert!(!validate_email("alice.example.com")?);
        assert!(!validate_email("alice@example.c")?);
        assert!(!validate_email("al ice@example.com")?);
        Ok(())
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(validate_name("   ").is_err());
        assert_eq!(validate_name("  Ada Lovelace ").ok().as_deref(), Some("Ada Lovelace"));
    }

    #[test]
    fn phone_formatting_is_stripped_for_search() {
        assert_eq!(strip_phone_formatting("(555) 123-4567"), "5551234567");
        assert_eq!(strip_phone_formatting("+44-731-484-3721"), "+447314843721");
    }
}
