use crate::{
    cli::{
        self,
        command::{BackupAction, Cli, Commands},
        menu,
    },
    config::Config,
    domain::contact::{Contact, ContactUpdate},
    domain::listing::{self, ContactStats, Page},
    domain::manager::{ContactManager, Outcome},
    errors::AppError,
    storage::{StorageMediums, backup::BackupInfo},
};
use clap::Parser;
use tracing::debug;

pub fn run_app() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let mut manager = ContactManager::new(&config)?;
    debug!(?config, medium = manager.storage_medium(), "contact book ready");

    execute(cli.command, &mut manager, &config)
}

/// Environment and `.env` settings, overridden by command line flags.
pub fn resolve_config(cli: &Cli) -> Result<Config, AppError> {
    let mut config = Config::from_env()?;

    if let Some(path) = &cli.data_file {
        config.data_file = path.clone();
    }
    if let Some(path) = &cli.backup_dir {
        config.backup_dir = path.clone();
    }
    if let Some(path) = &cli.export_dir {
        config.export_dir = path.clone();
    }
    if let Some(choice) = &cli.storage {
        config.storage = StorageMediums::from(choice)?;
    }
    Ok(config)
}

pub fn execute(
    command: Commands,
    manager: &mut ContactManager,
    config: &Config,
) -> Result<(), AppError> {
    match command {
        Commands::Add {
            name,
            phone,
            email,
            address,
            category,
        } => {
            let outcome = manager.create(
                &name,
                &phone,
                email.as_deref(),
                address.as_deref(),
                category.as_deref(),
            )?;
            finish(outcome, |c| format!("Contact '{}' added successfully", c.name))
        }

        // Listing contacts
        Commands::List {
            sort,
            category,
            page,
            page_size,
        } => {
            if page_size == Some(0) {
                return Err(AppError::Validation(
                    "Page size must be at least 1".to_string(),
                ));
            }

            if manager.is_empty() {
                println!("No contacts found.");
                return Ok(());
            }

            let mut rows = listing::sort_indexed(manager.contact_list(), sort);
            if let Some(category) = &category {
                rows.retain(|(_, c)| &c.category == category);
                if rows.is_empty() {
                    println!("Found no contact in the '{}' category", category);
                    return Ok(());
                }
            }

            match page {
                Some(number) => {
                    let pages = listing::paginate(&rows, page_size.unwrap_or(config.page_size))?;
                    let page = number
                        .checked_sub(1)
                        .and_then(|i| pages.get(i))
                        .ok_or_else(|| AppError::NotFound(format!("Page {number}")))?;
                    print_page(page);
                }
                None => print_rows(&rows),
            }
            Ok(())
        }

        // Search for a contact
        Commands::Search { term, by } => {
            let found: Vec<&Contact> = manager.search(&term, by)?.collect();
            print_search_results(&found);
            Ok(())
        }

        // Edit Contact
        Commands::Update {
            index,
            name,
            phone,
            email,
            address,
            category,
        } => {
            let changes = ContactUpdate {
                name,
                phone,
                email,
                address,
                category,
            };
            if changes.is_empty() {
                println!("Nothing to update");
                return Ok(());
            }

            let outcome = manager.update(index, &changes)?;
            finish(outcome, |c| format!("Contact '{}' updated successfully", c.name))
        }

        // Delete Contact
        Commands::Delete { index } => {
            let deleted = manager.delete(index)?;
            println!("Contact '{}' deleted successfully", deleted.name);
            Ok(())
        }

        Commands::Categories => {
            print_categories(&manager.categories());
            Ok(())
        }

        Commands::Stats => {
            print_statistics(&manager.statistics());
            Ok(())
        }

        Commands::Export { format, des } => {
            let (path, total) = manager.export_to(des.as_deref(), format, &config.export_dir)?;
            println!("Successfully exported {} contacts to {:?}.", total, path);
            Ok(())
        }

        // Import contacts into storage from .json or .csv file
        Commands::Import { src } => {
            let outcome = manager.import_from(&src)?;
            finish(outcome, |summary| {
                format!(
                    "Import completed!\n  - Imported: {} contacts\n  - Skipped (duplicates): {} contacts",
                    summary.imported, summary.skipped
                )
            })
        }

        Commands::Backup { action } => match action {
            BackupAction::Create => {
                let path = manager.create_backup()?;
                println!("Backup created: {}", path.display());
                Ok(())
            }
            BackupAction::List => {
                print_backups(&manager.list_backups()?);
                Ok(())
            }
            BackupAction::Restore { number } => {
                let backup = select_backup(manager, number)?;
                let outcome = manager.restore_from_backup(&backup.path)?;
                finish(outcome, |total| {
                    format!(
                        "Restored {} contacts from {}",
                        total, backup.file_name
                    )
                })
            }
            BackupAction::Prune { keep } => {
                let removed = manager.prune_backups(keep.unwrap_or(config.backup_keep))?;
                report_pruned(removed, keep.unwrap_or(config.backup_keep));
                Ok(())
            }
        },

        Commands::Menu => menu::run_menu(manager, config),
    }
}

/// Print the success message, or surface the save error of an unsaved change.
pub(crate) fn finish<T>(
    outcome: Outcome<T>,
    message: impl FnOnce(&T) -> String,
) -> Result<(), AppError> {
    match outcome {
        Outcome::Saved(value) => {
            println!("{}", message(&value));
            Ok(())
        }
        Outcome::Unsaved { value, error } => {
            eprintln!(
                "Warning: {} in memory, but could not be saved to file!",
                message(&value)
            );
            Err(error)
        }
    }
}

/// Snapshot at a 1-based position of `backup list`.
pub(crate) fn select_backup(
    manager: &ContactManager,
    number: usize,
) -> Result<BackupInfo, AppError> {
    let mut backups = manager.list_backups()?;
    if number == 0 || number > backups.len() {
        return Err(AppError::NotFound(format!("Backup #{number}")));
    }
    Ok(backups.swap_remove(number - 1))
}

pub(crate) fn report_pruned(removed: usize, keep: usize) {
    if removed == 0 {
        println!("No cleanup needed. Only keeping latest {keep} backups.");
    } else {
        println!("Deleted {removed} old backup files.");
    }
}

pub(crate) fn print_rows(rows: &[(usize, &Contact)]) {
    println!("{}", cli::list_header());
    for (position, contact) in rows {
        println!("{}", cli::list_row(*position, contact));
    }
}

pub(crate) fn print_page(page: &Page<'_, (usize, &Contact)>) {
    let (first, last) = page.span();
    println!(
        "\nPage {} of {} (Contacts {}-{} of {})",
        page.number, page.total_pages, first, last, page.total_items
    );
    print_rows(page.items);
}

pub(crate) fn print_search_results(found: &[&Contact]) {
    if found.is_empty() {
        println!("No contacts found matching your search.");
        return;
    }

    println!("\nFound {} contact(s):", found.len());
    println!("{}", "-".repeat(60));
    for contact in found {
        println!("{}", cli::display_contact(contact));
    }
}

pub(crate) fn print_categories(categories: &[(String, usize)]) {
    if categories.is_empty() {
        println!("No contacts found.");
        return;
    }
    for (i, (category, count)) in categories.iter().enumerate() {
        println!("{}. {} ({} contacts)", i + 1, category, count);
    }
}

pub(crate) fn print_statistics(stats: &ContactStats<'_>) {
    if stats.total == 0 {
        println!("No contacts found.");
        return;
    }

    println!("Total Contacts: {}", stats.total);
    println!("Contacts with Email: {}", stats.with_email);
    println!("Contacts with Address: {}", stats.with_address);

    println!("\nContacts by Category:");
    for (category, count) in &stats.by_category {
        println!(
            "  {}: {} ({:.1}%)",
            category,
            count,
            stats.percentage(*count)
        );
    }

    println!("\nRecently Added (Last {}):", listing::RECENT_CONTACTS);
    for contact in &stats.recent {
        println!(
            "  {} - {}",
            contact.name,
            contact.created_date.format("%Y-%m-%d")
        );
    }
}

pub(crate) fn print_backups(backups: &[BackupInfo]) {
    if backups.is_empty() {
        println!("No backup files found.");
        return;
    }

    println!("\nAvailable backups:");
    for (i, backup) in backups.iter().enumerate() {
        println!(
            "{}. {} (Created: {})",
            i + 1,
            backup.file_name,
            backup.modified_local().format("%Y-%m-%d %H:%M:%S")
        );
    }
}
