pub mod backup;
pub mod port;
pub mod stores;

use crate::config::Config;
use crate::prelude::{AppError, Contact};
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

pub trait ContactStore {
    fn load(&self) -> Result<Vec<Contact>, AppError>;

    fn save(&self, contacts: &[Contact]) -> Result<(), AppError>;

    fn get_medium(&self) -> &str;

    /// Backing file of this medium, if it has one
    fn path(&self) -> Option<&Path> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMediums {
    Json,
    Mem,
}

impl StorageMediums {
    pub fn is_json(&self) -> bool {
        matches!(self, StorageMediums::Json)
    }

    pub fn is_mem(&self) -> bool {
        matches!(self, StorageMediums::Mem)
    }

    pub fn is_which(&self) -> &str {
        if self.is_json() { "json" } else { "mem" }
    }

    pub fn from(str: &str) -> Result<Self, AppError> {
        match str.trim().to_lowercase().as_str() {
            "json" => Ok(StorageMediums::Json),
            "mem" => Ok(StorageMediums::Mem),
            _ => Err(AppError::Validation(format!(
                "Not a recognized storage medium: '{}'",
                str
            ))),
        }
    }
}

pub fn parse_storage_type(config: &Config) -> Result<Box<dyn ContactStore>, AppError> {
    match config.storage {
        StorageMediums::Json => Ok(Box::new(stores::JsonStorage::new(&config.data_file))),
        StorageMediums::Mem => Ok(Box::new(stores::MemStorage::new())),
    }
}

pub fn create_file_parent(path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Read a JSON array of contacts. A missing or blank file is an empty list.
pub fn read_json_contacts(path: &Path) -> Result<Vec<Contact>, AppError> {
    if !fs::exists(path)? {
        return Ok(Vec::new());
    }

    let mut file = OpenOptions::new().read(true).open(path)?;
    let mut data = String::new();
    file.read_to_string(&mut data)?;

    // serde_json will give an error if data is empty
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }

    Ok(serde_json::from_str(&data)?)
}

/// Overwrite `path` with the pretty-printed JSON array of `contacts`.
pub fn write_json_contacts(path: &Path, contacts: &[Contact]) -> Result<(), AppError> {
    create_file_parent(path)?;

    let json_contacts = serde_json::to_string_pretty(contacts)?;

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    file.write_all(json_contacts.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_storage_medium() -> Result<(), AppError> {
        assert!(StorageMediums::from("json")?.is_json());
        assert!(StorageMediums::from(" MEM ")?.is_mem());
        assert_eq!(StorageMediums::from("mem")?.is_which(), "mem");
        assert!(StorageMediums::from("txt").is_err());
        Ok(())
    }

    #[test]
    fn missing_or_blank_file_reads_empty() -> Result<(), AppError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("contacts.json");

        assert!(read_json_contacts(&path)?.is_empty());

        fs::write(&path, "  \n")?;
        assert!(read_json_contacts(&path)?.is_empty());
        Ok(())
    }

    #[test]
    fn writes_pretty_json_and_creates_parents() -> Result<(), AppError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("contacts.json");
        let contacts = vec![Contact::from_input("Ada", "5551234567", None, None, None)?];

        write_json_contacts(&path, &contacts)?;

        let text = fs::read_to_string(&path)?;
        assert!(text.starts_with("[\n  {"));
        assert_eq!(read_json_contacts(&path)?, contacts);
        Ok(())
    }

    #[test]
    fn malformed_json_is_an_error() -> Result<(), AppError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("contacts.json");
        fs::write(&path, "{not json")?;

        assert!(matches!(read_json_contacts(&path), Err(AppError::Json(_))));
        Ok(())
    }
}
