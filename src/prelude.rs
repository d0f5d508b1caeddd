pub use crate::cli::{command, run_app};
pub use crate::config::Config;
pub use crate::domain::{
    contact::{self, Contact, ContactUpdate},
    listing::{self, SortKey},
    manager::{ContactManager, ImportSummary, Outcome},
    search::{self, SearchField},
};
pub use crate::errors::AppError;
pub use crate::storage::{
    self, ContactStore, StorageMediums,
    backup::{BackupInfo, BackupManager},
    port::ExportFormat,
    stores::{JsonStorage, MemStorage},
};
