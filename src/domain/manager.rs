use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::*;
use crate::config::Config;
use crate::domain::contact::{Contact, ContactUpdate};
use crate::domain::listing::{self, ContactStats, SortKey};
use crate::domain::search::{self, Matches, SearchField};
use crate::storage::backup::{BackupInfo, BackupManager};
use crate::storage::port::{self, ExportFormat};
use crate::storage::{self, ContactStore};
use crate::validation::{name_taken, normalize_phone, phone_taken, validate_email};

/// Result of a mutation: the in-memory change always stands, `Unsaved` means
/// it did not reach the backing store.
#[derive(Debug)]
#[must_use]
pub enum Outcome<T> {
    Saved(T),
    Unsaved { value: T, error: AppError },
}

impl<T> Outcome<T> {
    pub fn is_saved(&self) -> bool {
        matches!(self, Outcome::Saved(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Saved(value) | Outcome::Unsaved { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Saved(value) | Outcome::Unsaved { value, .. } => value,
        }
    }

    /// Treat a failed save as an error, dropping the value.
    pub fn into_result(self) -> Result<T, AppError> {
        match self {
            Outcome::Saved(value) => Ok(value),
            Outcome::Unsaved { error, .. } => Err(error),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

pub struct ContactManager {
    mem: Vec<Contact>,
    storage: Box<dyn ContactStore>,
    backups: BackupManager,
}

impl ContactManager {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let storage = storage::parse_storage_type(config)?;
        let backups = BackupManager::new(&config.backup_dir, config.backup_keep);
        Self::with_storage(storage, backups)
    }

    pub fn with_storage(
        storage: Box<dyn ContactStore>,
        backups: BackupManager,
    ) -> Result<Self, AppError> {
        let mut manager = Self {
            mem: Vec::new(),
            storage,
            backups,
        };
        manager.load()?;
        Ok(manager)
    }

    pub fn load(&mut self) -> Result<(), AppError> {
        self.mem = self.storage.load()?;
        info!(
            medium = self.storage.get_medium(),
            count = self.mem.len(),
            "contacts loaded"
        );
        Ok(())
    }

    pub fn save(&self) -> Result<(), AppError> {
        self.storage.save(&self.mem)
    }

    fn persist<T>(&self, value: T, action: &str) -> Outcome<T> {
        match self.save() {
            Ok(()) => Outcome::Saved(value),
            Err(error) => {
                warn!(%error, action, "change kept in memory but not saved");
                Outcome::Unsaved { value, error }
            }
        }
    }

    pub fn storage_medium(&self) -> &str {
        self.storage.get_medium()
    }

    pub fn contact_list(&self) -> &[Contact] {
        &self.mem
    }

    pub fn len(&self) -> usize {
        self.mem.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mem.is_empty()
    }

    /// Contact at a 1-based position.
    pub fn get(&self, index: usize) -> Result<&Contact, AppError> {
        let position = self.position(index)?;
        Ok(&self.mem[position])
    }

    fn position(&self, index: usize) -> Result<usize, AppError> {
        if index == 0 || index > self.mem.len() {
            return Err(AppError::NotFound(format!("Contact #{index}")));
        }
        Ok(index - 1)
    }

    fn check_duplicate(&self, contact: &Contact, skip: Option<usize>) -> Result<(), AppError> {
        let others = || {
            self.mem
                .iter()
                .enumerate()
                .filter(move |(i, _)| Some(*i) != skip)
                .map(|(_, c)| c)
        };

        if name_taken(&contact.name, others()) {
            return Err(AppError::Duplicate(format!(
                "Contact with the name '{}' already exists",
                contact.name
            )));
        }
        if phone_taken(&contact.phone, others()) {
            return Err(AppError::Duplicate(format!(
                "Contact with the phone number {} already exists",
                contact.phone
            )));
        }
        Ok(())
    }

    /// Validate and append a new contact, then save.
    pub fn create(
        &mut self,
        name: &str,
        phone: &str,
        email: Option<&str>,
        address: Option<&str>,
        category: Option<&str>,
    ) -> Result<Outcome<Contact>, AppError> {
        let contact = Contact::from_input(name, phone, email, address, category)?;
        self.add_contact(contact)
    }

    /// Append an already validated contact, then save.
    pub fn add_contact(&mut self, contact: Contact) -> Result<Outcome<Contact>, AppError> {
        self.check_duplicate(&contact, None)?;

        self.mem.push(contact.clone());
        debug!(name = %contact.name, "contact added");
        Ok(self.persist(contact, "create"))
    }

    /// Apply `changes` to the contact at a 1-based position, all or nothing.
    pub fn update(
        &mut self,
        index: usize,
        changes: &ContactUpdate,
    ) -> Result<Outcome<Contact>, AppError> {
        let position = self.position(index)?;

        // Changes land on a copy; the stored record is replaced only after every check passes
        let mut updated = self.mem[position].clone();

        if let Some(name) = changes.name() {
            updated.name = name.to_string();
        }
        if let Some(phone) = changes.phone() {
            updated.phone = normalize_phone(phone)?;
        }
        if let Some(email) = changes.email()
            && email != updated.email
        {
            if !validate_email(email)? {
                return Err(AppError::Validation("Invalid email format".to_string()));
            }
            updated.email = email.to_string();
        }
        if let Some(address) = changes.address() {
            updated.address = address.to_string();
        }
        if let Some(category) = changes.category() {
            updated.category = category.to_string();
        }

        self.check_duplicate(&updated, Some(position))?;

        self.mem[position] = updated.clone();
        debug!(index, name = %updated.name, "contact updated");
        Ok(self.persist(updated, "update"))
    }

    /// Remove the contact at a 1-based position.
    ///
    /// A snapshot is taken first. If the save fails the contact is put back
    /// where it was and the save error is returned.
    pub fn delete(&mut self, index: usize) -> Result<Contact, AppError> {
        let position = self.position(index)?;

        if let Err(error) = self.create_backup() {
            warn!(%error, "could not back up before delete");
        }

        let deleted = self.mem.remove(position);

        if let Err(error) = self.save() {
            self.mem.insert(position, deleted);
            warn!(%error, index, "delete rolled back");
            return Err(error);
        }

        debug!(index, name = %deleted.name, "contact deleted");
        Ok(deleted)
    }

    pub fn search(&self, term: &str, field: SearchField) -> Result<Matches<'_>, AppError> {
        search::search(&self.mem, term, field)
    }

    pub fn sorted(&self, key: Option<SortKey>) -> Vec<&Contact> {
        listing::sort_contacts(&self.mem, key)
    }

    pub fn filter_by_category(&self, category: &str) -> Vec<&Contact> {
        listing::filter_by_category(&self.mem, category)
    }

    pub fn categories(&self) -> Vec<(String, usize)> {
        listing::categories(&self.mem)
    }

    pub fn statistics(&self) -> ContactStats<'_> {
        listing::statistics(&self.mem)
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    /// Snapshot the backing file.
    pub fn create_backup(&self) -> Result<PathBuf, AppError> {
        let source = self.storage.path().ok_or_else(|| {
            AppError::NotFound(format!(
                "Data file for '{}' storage",
                self.storage.get_medium()
            ))
        })?;
        self.backups.create_backup(source)
    }

    pub fn list_backups(&self) -> Result<Vec<BackupInfo>, AppError> {
        self.backups.list_backups()
    }

    pub fn prune_backups(&self, keep: usize) -> Result<usize, AppError> {
        self.backups.prune_backups(keep)
    }

    /// Replace every contact with the content of a snapshot and save.
    ///
    /// A snapshot repeating a name or phone is refused and nothing changes.
    pub fn restore_from_backup(&mut self, path: &Path) -> Result<Outcome<usize>, AppError> {
        let contacts = self.backups.load_backup(path)?;

        for (i, contact) in contacts.iter().enumerate() {
            let earlier = &contacts[..i];
            if name_taken(&contact.name, earlier) || phone_taken(&contact.phone, earlier) {
                return Err(AppError::Duplicate(format!(
                    "Backup '{}' repeats the name or phone of '{}'",
                    path.display(),
                    contact.name
                )));
            }
        }

        self.mem = contacts;
        info!(backup = %path.display(), count = self.mem.len(), "contacts restored");
        Ok(self.persist(self.mem.len(), "restore"))
    }

    /// Import contacts from a `.json` or `.csv` file, skipping duplicates and
    /// invalid records, then save once.
    pub fn import_from(&mut self, path: &Path) -> Result<Outcome<ImportSummary>, AppError> {
        let candidates = port::read_contacts(path)?;
        let mut summary = ImportSummary::default();

        for candidate in candidates {
            let contact = match candidate.into_contact() {
                Ok(contact) => contact,
                Err(error) => {
                    debug!(%error, "import candidate rejected");
                    summary.skipped += 1;
                    continue;
                }
            };

            if self.check_duplicate(&contact, None).is_err() {
                summary.skipped += 1;
                continue;
            }

            self.mem.push(contact);
            summary.imported += 1;
        }

        info!(
            path = %path.display(),
            imported = summary.imported,
            skipped = summary.skipped,
            "import finished"
        );
        Ok(self.persist(summary, "import"))
    }

    /// Write every contact to `des` (or a timestamped file in `export_dir`).
    pub fn export_to(
        &self,
        des: Option<&Path>,
        format: ExportFormat,
        export_dir: &Path,
    ) -> Result<(PathBuf, usize), AppError> {
        port::export_contacts(&self.mem, des, format, export_dir)
    }
}
