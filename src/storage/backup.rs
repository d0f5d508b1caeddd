//! Timestamped snapshots of the contact data file.
//!
//! A snapshot is a plain copy of the data file named
//! `contacts_backup_YYYYMMDD_HHMMSS.json`. Snapshots taken within the same
//! second get a `_N` counter, compared numerically when listing.
//! Snapshots are never rewritten once created; [`BackupManager::prune_backups`]
//! is the only code that removes them.

use super::*;

use chrono::{DateTime, Local};
use std::cmp::Reverse;
use std::path::PathBuf;
use std::time::SystemTime;
use tracing::{debug, info};

pub const BACKUP_PREFIX: &str = "contacts_backup_";
pub const BACKUP_EXTENSION: &str = "json";
pub const DEFAULT_KEEP: usize = 5;
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub path: PathBuf,
    pub file_name: String,
    pub modified: SystemTime,
}

impl BackupInfo {
    pub fn modified_local(&self) -> DateTime<Local> {
        DateTime::<Local>::from(self.modified)
    }
}

#[derive(Debug, Clone)]
pub struct BackupManager {
    pub dir: PathBuf,
    pub keep: usize,
}

impl BackupManager {
    pub fn new(dir: impl Into<PathBuf>, keep: usize) -> Self {
        Self {
            dir: dir.into(),
            keep,
        }
    }

    /// Copy `source` into the backup directory under a timestamped name.
    pub fn create_backup(&self, source: &Path) -> Result<PathBuf, AppError> {
        if !fs::exists(source)? {
            return Err(AppError::NotFound(format!(
                "Data file '{}'",
                source.display()
            )));
        }

        fs::create_dir_all(&self.dir)?;

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let target = self.free_snapshot_path(&timestamp)?;

        fs::copy(source, &target)?;
        info!(backup = %target.display(), "backup created");
        Ok(target)
    }

    // Two snapshots in the same second get a counter suffix
    fn free_snapshot_path(&self, timestamp: &str) -> Result<PathBuf, AppError> {
        let mut target = self
            .dir
            .join(format!("{BACKUP_PREFIX}{timestamp}.{BACKUP_EXTENSION}"));

        let mut counter = 1;
        while fs::exists(&target)? {
            target = self.dir.join(format!(
                "{BACKUP_PREFIX}{timestamp}_{counter}.{BACKUP_EXTENSION}"
            ));
            counter += 1;
        }
        Ok(target)
    }

    /// Snapshots in the backup directory, newest name first.
    pub fn list_backups(&self) -> Result<Vec<BackupInfo>, AppError> {
        if !fs::exists(&self.dir)? {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().to_string();

            if !file_name.starts_with(BACKUP_PREFIX) || !entry.file_type()?.is_file() {
                continue;
            }

            backups.push(BackupInfo {
                path: entry.path(),
                file_name,
                modified: entry.metadata()?.modified()?,
            });
        }

        // Newest first
        backups.sort_by(|a, b| {
            snapshot_order(&b.file_name).cmp(&snapshot_order(&a.file_name))
        });
        Ok(backups)
    }

    /// Delete every snapshot except the newest `keep` by modification time.
    /// Returns how many files were removed.
    pub fn prune_backups(&self, keep: usize) -> Result<usize, AppError> {
        let mut backups = self.list_backups()?;
        if backups.len() <= keep {
            debug!(count = backups.len(), keep, "no backups to prune");
            return Ok(0);
        }

        // file_name breaks ties between snapshots sharing an mtime
        backups.sort_by_key(|b| Reverse((b.modified, b.file_name.clone())));

        let stale = backups.split_off(keep);
        for backup in &stale {
            fs::remove_file(&backup.path)?;
            debug!(backup = %backup.path.display(), "backup removed");
        }

        info!(removed = stale.len(), kept = backups.len(), "backups pruned");
        Ok(stale.len())
    }

    pub fn prune_to_default(&self) -> Result<usize, AppError> {
        self.prune_backups(self.keep)
    }

    /// Contacts stored in a snapshot.
    pub fn load_backup(&self, path: &Path) -> Result<Vec<Contact>, AppError> {
        if !fs::exists(path)? {
            return Err(AppError::NotFound(format!("Backup '{}'", path.display())));
        }
        read_json_contacts(path)
    }
}

impl Default for BackupManager {
    fn default() -> Self {
        Self::new("backups", DEFAULT_KEEP)
    }
}

/// Sort key of a snapshot name: its timestamp, then its same-second counter.
fn snapshot_order(file_name: &str) -> (&str, u32, &str) {
    let stem = file_name
        .strip_prefix(BACKUP_PREFIX)
        .and_then(|rest| rest.strip_suffix(&format!(".{BACKUP_EXTENSION}")))
        .unwrap_or(file_name);

    let split = stem.find('_').map_or(stem.len(), |i| {
        // YYYYMMDD_HHMMSS holds one underscore, the counter adds a second one
        stem[i + 1..].find('_').map_or(stem.len(), |j| i + 1 + j)
    });
    let (timestamp, counter) = stem.split_at(split);
    let counter = counter
        .strip_prefix('_')
        .and_then(|n| n.parse().ok())
        .unwrap_or(0);

    (timestamp, counter, file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    fn snapshot(dir: &Path, name: &str, age_secs: u64) -> Result<PathBuf, AppError> {
        let path = dir.join(name);
        let file = File::create(&path)?;
        file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))?;
        Ok(path)
    }

    #[test]
    fn creates_timestamped_copy() -> Result<(), AppError> {
        let dir = tempfile::tempdir()?;
        let source = dir.path().join("contacts.json");
        fs::write(&source, "[]")?;

        let manager = BackupManager::new(dir.path().join("backups"), DEFAULT_KEEP);
        let first = manager.create_backup(&source)?;
        let second = manager.create_backup(&source)?;

        assert_ne!(first, second);
        assert_eq!(fs::read_to_string(&first)?, "[]");

        let name = first
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        assert!(name.starts_with(BACKUP_PREFIX));
        assert!(name.ends_with(".json"));
        // contacts_backup_YYYYMMDD_HHMMSS.json
        assert_eq!(name.len(), BACKUP_PREFIX.len() + 15 + 5);

        assert_eq!(manager.list_backups()?.len(), 2);
        Ok(())
    }

    #[test]
    fn missing_source_fails() -> Result<(), AppError> {
        let dir = tempfile::tempdir()?;
        let manager = BackupManager::new(dir.path().join("backups"), DEFAULT_KEEP);

        let err = manager
            .create_backup(&dir.path().join("nope.json"))
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(manager.list_backups()?.is_empty());
        Ok(())
    }

    #[test]
    fn list_ignores_foreign_files() -> Result<(), AppError> {
        let dir = tempfile::tempdir()?;
        snapshot(dir.path(), "contacts_backup_20240101_000000.json", 10)?;
        snapshot(dir.path(), "contacts_backup_20240301_000000.json", 5)?;
        snapshot(dir.path(), "notes.txt", 1)?;
        fs::create_dir(dir.path().join("contacts_backup_dir"))?;

        let manager = BackupManager::new(dir.path(), DEFAULT_KEEP);
        let names: Vec<String> = manager
            .list_backups()?
            .into_iter()
            .map(|b| b.file_name)
            .collect();

        assert_eq!(
            names,
            vec![
                "contacts_backup_20240301_000000.json",
                "contacts_backup_20240101_000000.json"
            ]
        );
        Ok(())
    }

    #[test]
    fn same_second_counters_list_numerically() -> Result<(), AppError> {
        let dir = tempfile::tempdir()?;
        for name in [
            "contacts_backup_20240101_000000.json",
            "contacts_backup_20240101_000000_2.json",
            "contacts_backup_20240101_000000_9.json",
            "contacts_backup_20240101_000000_10.json",
            "contacts_backup_20231231_235959_11.json",
        ] {
            snapshot(dir.path(), name, 0)?;
        }

        let manager = BackupManager::new(dir.path(), DEFAULT_KEEP);
        let names: Vec<String> = manager
            .list_backups()?
            .into_iter()
            .map(|b| b.file_name)
            .collect();

        assert_eq!(
            names,
            vec![
                "contacts_backup_20240101_000000_10.json",
                "contacts_backup_20240101_000000_9.json",
                "contacts_backup_20240101_000000_2.json",
                "contacts_backup_20240101_000000.json",
                "contacts_backup_20231231_235959_11.json",
            ]
        );
        Ok(())
    }

    #[test]
    fn prune_keeps_newest_by_mtime() -> Result<(), AppError> {
        let dir = tempfile::tempdir()?;
        // Names deliberately disagree with mtimes for two of the files
        for (i, age) in [70u64, 10, 60, 20, 50, 30, 40].iter().enumerate() {
            snapshot(
                dir.path(),
                &format!("contacts_backup_2024010{i}_000000.json"),
                *age,
            )?;
        }

        let manager = BackupManager::new(dir.path(), 5);
        assert_eq!(manager.prune_to_default()?, 2);

        let mut kept: Vec<String> = manager
            .list_backups()?
            .into_iter()
            .map(|b| b.file_name)
            .collect();
        kept.sort();

        assert_eq!(
            kept,
            vec![
                "contacts_backup_20240101_000000.json",
                "contacts_backup_20240103_000000.json",
                "contacts_backup_20240104_000000.json",
                "contacts_backup_20240105_000000.json",
                "contacts_backup_20240106_000000.json",
            ]
        );
        Ok(())
    }

    #[test]
    fn prune_never_drops_below_keep() -> Result<(), AppError> {
        let dir = tempfile::tempdir()?;
        for i in 0..3 {
            snapshot(dir.path(), &format!("contacts_backup_2024010{i}_000000.json"), i)?;
        }

        let manager = BackupManager::new(dir.path(), 5);
        assert_eq!(manager.prune_backups(5)?, 0);
        assert_eq!(manager.prune_backups(3)?, 0);
        assert_eq!(manager.list_backups()?.len(), 3);

        assert_eq!(manager.prune_backups(1)?, 2);
        let left = manager.list_backups()?;
        assert_eq!(left.len(), 1);
        // age 0 is the newest
        assert_eq!(left[0].file_name, "contacts_backup_20240100_000000.json");
        Ok(())
    }

    #[test]
    fn loading_missing_backup_fails() -> Result<(), AppError> {
        let dir = tempfile::tempdir()?;
        let manager = BackupManager::new(dir.path(), DEFAULT_KEEP);

        assert!(
            manager
                .load_backup(&dir.path().join("contacts_backup_x.json"))
                .unwrap_err()
                .is_not_found()
        );
        Ok(())
    }
}
