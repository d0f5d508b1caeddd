use serde::Deserialize;

use super::*;
use crate::domain::contact::{Local, parse_timestamp};
use crate::validation::{normalize_phone, validate_email, validate_name};
use csv::Reader;

/// A record as it appears in an import file, before validation.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawContact {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub created_date: Option<String>,
}

impl RawContact {
    /// Validate name, phone and email and fill in defaults for the rest.
    ///
    /// An unreadable `created_date` is replaced by the current time.
    pub fn into_contact(self) -> Result<Contact, AppError> {
        let name = validate_name(self.name.as_deref().unwrap_or_default())?;
        let phone = normalize_phone(self.phone.as_deref().unwrap_or_default())?;

        let email = self.email.unwrap_or_default().trim().to_string();
        if !validate_email(&email)? {
            return Err(AppError::Validation("Invalid email format".to_string()));
        }

        let mut contact = Contact::new(
            name,
            phone,
            email,
            self.address.unwrap_or_default().trim().to_string(),
            self.category.unwrap_or_default().trim().to_string(),
        );

        contact.created_date = self
            .created_date
            .as_deref()
            .and_then(|s| parse_timestamp(s.trim()).ok())
            .unwrap_or_else(|| Local::now().naive_local());

        Ok(contact)
    }
}

/// Parse an import file. The format follows the extension: `.json` or `.csv`.
pub fn read_contacts(path: &Path) -> Result<Vec<RawContact>, AppError> {
    if !fs::exists(path)? {
        return Err(AppError::NotFound(format!("File '{}'", path.display())));
    }

    match ExportFormat::importable_from(path)? {
        ExportFormat::Json => {
            let data = fs::read_to_string(path)?;
            if data.trim().is_empty() {
                return Ok(Vec::new());
            }
            serde_json::from_str(&data).map_err(|e| {
                AppError::Format(format!("Expected a JSON array of contacts: {e}"))
            })
        }
        ExportFormat::Csv => {
            let mut reader = Reader::from_path(path)?;

            let headers = reader.headers()?;
            if !headers.iter().any(|h| h == "name") || !headers.iter().any(|h| h == "phone") {
                return Err(AppError::Format(format!(
                    "CSV header must contain the columns {}",
                    CSV_HEADERS.join(",")
                )));
            }

            let mut records = Vec::new();
            for result in reader.deserialize() {
                let record: RawContact = result?;
                records.push(record);
            }
            Ok(records)
        }
        ExportFormat::Txt => Err(AppError::Format(
            "Text exports cannot be imported".to_string(),
        )),
    }
}
