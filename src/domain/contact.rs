use super::*;
pub use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::validation::{normalize_phone, validate_email, validate_name};

pub const DEFAULT_CATEGORY: &str = "Other";

const DETAIL_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One entry of the contact book.
///
/// Field order is the column order of CSV export, so keep it stable.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Contact {
    pub name: String,
    pub phone: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub address: String,

    #[serde(
        default = "default_category",
        deserialize_with = "deserialize_category"
    )]
    pub category: String,

    #[serde(
        default = "default_timestamp",
        deserialize_with = "deserialize_timestamp"
    )]
    pub created_date: NaiveDateTime,
}

impl Contact {
    pub fn new(name: String, phone: String, email: String, address: String, category: String) -> Self {
        Contact {
            name,
            phone,
            email,
            address,
            category: if category.trim().is_empty() {
                default_category()
            } else {
                category
            },
            created_date: default_timestamp(),
        }
    }

    /// Build a contact from raw user input, validating every field.
    ///
    /// The phone is normalized, blank email/address stay empty and a blank
    /// category falls back to `Other`.
    pub fn from_input(
        name: &str,
        phone: &str,
        email: Option<&str>,
        address: Option<&str>,
        category: Option<&str>,
    ) -> Result<Self, AppError> {
        let name = validate_name(name)?;
        let phone = normalize_phone(phone)?;

        let email = email.unwrap_or_default().trim();
        if !validate_email(email)? {
            return Err(AppError::Validation("Invalid email format".to_string()));
        }

        Ok(Contact::new(
            name,
            phone,
            email.to_string(),
            address.unwrap_or_default().trim().to_string(),
            category.unwrap_or_default().trim().to_string(),
        ))
    }

    pub fn has_email(&self) -> bool {
        !self.email.is_empty()
    }

    pub fn has_address(&self) -> bool {
        !self.address.is_empty()
    }

    /// Labeled multi-line rendering, one field per line.
    pub fn details(&self) -> String {
        format!(
            "Name: {}\n\
            Phone: {}\n\
            Email: {}\n\
            Address: {}\n\
            Category: {}\n\
            Added: {}",
            self.name,
            self.phone,
            or_not_provided(&self.email),
            or_not_provided(&self.address),
            self.category,
            self.created_date.format(DETAIL_DATE_FORMAT)
        )
    }
}

/// Field changes for an existing contact. `None` or blank keeps the current value.
#[derive(Debug, Default, Clone)]
pub struct ContactUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub category: Option<String>,
}

impl ContactUpdate {
    pub fn name(&self) -> Option<&str> {
        non_blank(&self.name)
    }

    pub fn phone(&self) -> Option<&str> {
        non_blank(&self.phone)
    }

    pub fn email(&self) -> Option<&str> {
        non_blank(&self.email)
    }

    pub fn address(&self) -> Option<&str> {
        non_blank(&self.address)
    }

    pub fn category(&self) -> Option<&str> {
        non_blank(&self.category)
    }

    pub fn is_empty(&self) -> bool {
        self.name().is_none()
            && self.phone().is_none()
            && self.email().is_none()
            && self.address().is_none()
            && self.category().is_none()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn or_not_provided(value: &str) -> &str {
    if value.is_empty() { "Not provided" } else { value }
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_timestamp() -> NaiveDateTime {
    Local::now().naive_local()
}

fn deserialize_category<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value {
        Some(c) if !c.trim().is_empty() => Ok(c),
        _ => Ok(default_category()),
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => parse_timestamp(s).map_err(serde::de::Error::custom),
        _ => Ok(default_timestamp()), // records written without a creation date
    }
}

/// Accepts naive ISO-8601 (`2024-05-01T09:30:12.5`) or RFC 3339 with an offset.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    match value.parse::<NaiveDateTime>() {
        Ok(dt) => Ok(dt),
        Err(_) => chrono::DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Local).naive_local()),
    }
}

// TEST
#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn builds_normalized_contact_from_input() -> Result<(), AppError> {
        let contact = Contact::from_input(
            "  Alice ",
            "555.123.4567",
            Some("alice@example.com"),
            None,
            Some(" "),
        )?;

        assert_eq!(contact.name, "Alice");
        assert_eq!(contact.phone, "(555) 123-4567");
        assert_eq!(contact.email, "alice@example.com");
        assert_eq!(contact.address, "");
        assert_eq!(contact.category, DEFAULT_CATEGORY);
        Ok(())
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Contact::from_input("", "5551234567", None, None, None).is_err());
        assert!(Contact::from_input("Bob", "12345", None, None, None).is_err());
        assert!(
            Contact::from_input("Bob", "5551234567", Some("foo@bar"), None, None)
                .unwrap_err()
                .is_validation()
        );
    }

    #[test]
    fn reads_records_with_missing_fields() -> Result<(), AppError> {
        let data = r#"[
            {"name": "Uche", "phone": "(012) 345-6789"},
            {"name": "Mom", "phone": "(987) 654-3210", "email": "mom@home.org",
             "category": "Family", "created_date": "2023-04-05T06:07:08.123456"}
        ]"#;

        let contacts: Vec<Contact> = serde_json::from_str(data)?;

        assert_eq!(contacts[0].email, "");
        assert_eq!(contacts[0].address, "");
        assert_eq!(contacts[0].category, DEFAULT_CATEGORY);
        assert_eq!(contacts[1].category, "Family");
        assert_eq!(
            contacts[1].created_date.format("%Y-%m-%d %H:%M:%S").to_string(),
            "2023-04-05 06:07:08"
        );
        Ok(())
    }

    #[test]
    fn timestamp_survives_serialization() -> Result<(), AppError> {
        let contact = Contact::from_input("Ada", "5551234567", None, None, None)?;
        let json = serde_json::to_string(&contact)?;
        let back: Contact = serde_json::from_str(&json)?;

        assert_eq!(back, contact);
        Ok(())
    }

    #[test]
    fn accepts_rfc3339_timestamps() {
        assert!(parse_timestamp("2024-01-02T03:04:05+00:00").is_ok());
        assert!(parse_timestamp("2024-01-02T03:04:05").is_ok());
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn blank_update_fields_are_ignored() {
        let update = ContactUpdate {
            name: Some("   ".to_string()),
            email: Some(String::new()),
            ..Default::default()
        };
        assert!(update.is_empty());
        assert_eq!(update.name(), None);
    }

    #[test]
    fn details_mark_missing_fields() -> Result<(), AppError> {
        let contact = Contact::from_input("Ada", "5551234567", None, None, Some("Work"))?;
        let details = contact.details();

        assert!(details.contains("Email: Not provided"));
        assert!(details.contains("Address: Not provided"));
        assert!(details.contains("Category: Work"));
        Ok(())
    }
}
