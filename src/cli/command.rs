use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::listing::SortKey;
use crate::domain::search::SearchField;
use crate::storage::port::ExportFormat;

#[derive(Parser, Debug)]
#[command(name = "contact-book", version, about = "Contact book with backups")]
pub struct Cli {
    /// Contact data file (defaults to $CONTACTS_DATA_FILE or ./contacts.json)
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    /// Backup directory (defaults to $CONTACTS_BACKUP_DIR or ./backups)
    #[arg(long, global = true)]
    pub backup_dir: Option<PathBuf>,

    /// Default directory for exports without a path
    #[arg(long, global = true)]
    pub export_dir: Option<PathBuf>,

    /// Storage choice (json, mem) are available
    #[arg(long, global = true)]
    pub storage: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommand and their flags
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a new contact
    Add {
        /// Contact name
        #[arg(long)]
        name: String,

        /// Contact phone number, 10 to 15 digits in any format
        #[arg(long)]
        phone: String,

        /// Contact email address
        #[arg(long)]
        email: Option<String>,

        /// Postal address
        #[arg(long)]
        address: Option<String>,

        /// Category (Family, Friends, Work, Other...)
        #[arg(long)]
        category: Option<String>,
    },
    /// List contacts
    List {
        /// Sort ordering (default is insertion order)
        #[arg(long)]
        sort: Option<SortKey>,

        /// List only one category
        #[arg(long)]
        category: Option<String>,

        /// Page to show, starting at 1
        #[arg(long)]
        page: Option<usize>,

        /// Contacts per page
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Search contacts by a case-insensitive substring
    Search {
        /// Text to look for
        term: String,

        /// Field to search in
        #[arg(long, value_enum, default_value_t = SearchField::All)]
        by: SearchField,
    },
    /// Update a contact by its number in the listing.
    /// Only the given fields change
    Update {
        /// Contact number as shown by `list`
        index: usize,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        category: Option<String>,
    },
    /// Delete a contact by its number in the listing
    Delete {
        /// Contact number as shown by `list`
        index: usize,
    },
    /// Show categories and how many contacts each has
    Categories,
    /// Show contact statistics
    Stats,
    /// Export contacts to a .csv, .txt or .json file
    Export {
        /// File format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// File path to the destination location for export file
        #[arg(short, long)]
        des: Option<PathBuf>,
    },
    /// Import contacts from a .json or .csv file
    Import {
        /// File path to the source file
        #[arg(short, long)]
        src: PathBuf,
    },
    /// Create, list, restore or prune backups
    Backup {
        #[command(subcommand)]
        action: BackupAction,
    },
    /// Interactive menu
    Menu,
}

#[derive(Subcommand, Debug)]
pub enum BackupAction {
    /// Snapshot the data file now
    Create,
    /// List snapshots, newest first
    List,
    /// Replace all contacts with a snapshot
    Restore {
        /// Snapshot number as shown by `backup list`
        number: usize,
    },
    /// Delete all but the newest snapshots
    Prune {
        /// How many snapshots to keep
        #[arg(long)]
        keep: Option<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_nested_backup_command() {
        let cli = Cli::parse_from(["contact-book", "--data-file", "x.json", "backup", "restore", "2"]);

        assert_eq!(cli.data_file, Some(PathBuf::from("x.json")));
        assert!(matches!(
            cli.command,
            Commands::Backup {
                action: BackupAction::Restore { number: 2 }
            }
        ));
    }

    #[test]
    fn search_defaults_to_all_fields() {
        let cli = Cli::parse_from(["contact-book", "search", "ali"]);
        assert!(matches!(
            cli.command,
            Commands::Search { by: SearchField::All, .. }
        ));
    }
}
