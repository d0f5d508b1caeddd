use dotenv::dotenv;
use std::env;
use std::path::PathBuf;

use crate::errors::AppError;
use crate::storage::StorageMediums;
use crate::storage::backup::DEFAULT_KEEP;

pub const DEFAULT_DATA_FILE: &str = "contacts.json";
pub const DEFAULT_BACKUP_DIR: &str = "backups";
pub const DEFAULT_EXPORT_DIR: &str = ".";
pub const DEFAULT_PAGE_SIZE: usize = 10;

pub const DATA_FILE_VAR: &str = "CONTACTS_DATA_FILE";
pub const BACKUP_DIR_VAR: &str = "CONTACTS_BACKUP_DIR";
pub const EXPORT_DIR_VAR: &str = "CONTACTS_EXPORT_DIR";
pub const PAGE_SIZE_VAR: &str = "CONTACTS_PAGE_SIZE";
pub const BACKUP_KEEP_VAR: &str = "CONTACTS_BACKUP_KEEP";
pub const STORAGE_VAR: &str = "STORAGE_CHOICE";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_file: PathBuf,
    pub backup_dir: PathBuf,
    pub export_dir: PathBuf,
    pub page_size: usize,
    pub backup_keep: usize,
    pub storage: StorageMediums,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            backup_dir: PathBuf::from(DEFAULT_BACKUP_DIR),
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            page_size: DEFAULT_PAGE_SIZE,
            backup_keep: DEFAULT_KEEP,
            storage: StorageMediums::Json,
        }
    }
}

impl Config {
    /// Defaults overridden by the process environment and a `.env` file.
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(path) = lookup(DATA_FILE_VAR) {
            config.data_file = PathBuf::from(path);
        }
        if let Some(path) = lookup(BACKUP_DIR_VAR) {
            config.backup_dir = PathBuf::from(path);
        }
        if let Some(path) = lookup(EXPORT_DIR_VAR) {
            config.export_dir = PathBuf::from(path);
        }
        if let Some(size) = lookup(PAGE_SIZE_VAR) {
            config.page_size = size.trim().parse()?;
        }
        if let Some(keep) = lookup(BACKUP_KEEP_VAR) {
            config.backup_keep = keep.trim().parse()?;
        }
        if let Some(choice) = lookup(STORAGE_VAR) {
            config.storage = StorageMediums::from(&choice)?;
        }

        if config.page_size == 0 {
            return Err(AppError::Validation(format!(
                "{PAGE_SIZE_VAR} must be at least 1"
            )));
        }

        Ok(config)
    }
}
