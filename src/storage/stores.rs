use super::*;

use std::cell::RefCell;
use std::path::PathBuf;
use tracing::debug;

pub struct JsonStorage {
    pub medium: String,
    pub path: PathBuf,
}

impl JsonStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            medium: "json".to_string(),
            path: path.into(),
        }
    }
}

impl ContactStore for JsonStorage {
    fn load(&self) -> Result<Vec<Contact>, AppError> {
        let contacts = read_json_contacts(&self.path)?;
        debug!(path = %self.path.display(), count = contacts.len(), "loaded contacts");
        Ok(contacts)
    }

    fn save(&self, contacts: &[Contact]) -> Result<(), AppError> {
        write_json_contacts(&self.path, contacts)?;
        debug!(path = %self.path.display(), count = contacts.len(), "saved contacts");
        Ok(())
    }

    fn get_medium(&self) -> &str {
        &self.medium
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// Volatile storage: contacts live only as long as the process.
pub struct MemStorage {
    pub medium: String,
    data: RefCell<Vec<Contact>>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::with_contacts(Vec::new())
    }

    pub fn with_contacts(contacts: Vec<Contact>) -> Self {
        Self {
            medium: "mem".to_string(),
            data: RefCell::new(contacts),
        }
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactStore for MemStorage {
    fn load(&self) -> Result<Vec<Contact>, AppError> {
        Ok(self.data.borrow().clone())
    }

    fn save(&self, contacts: &[Contact]) -> Result<(), AppError> {
        *self.data.borrow_mut() = contacts.to_vec();
        Ok(())
    }

    fn get_medium(&self) -> &str {
        &self.medium
    }
}
