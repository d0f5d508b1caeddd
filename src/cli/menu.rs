use std::path::PathBuf;

use clap::ValueEnum;
use tracing::{info, warn};

use crate::cli::{self, MenuChoice, run};
use crate::config::Config;
use crate::domain::contact::{ContactUpdate, DEFAULT_CATEGORY};
use crate::domain::listing;
use crate::domain::manager::ContactManager;
use crate::domain::search::SearchField;
use crate::errors::AppError;
use crate::storage::port::ExportFormat;

const SUGGESTED_CATEGORIES: [&str; 4] = ["Family", "Friends", "Work", DEFAULT_CATEGORY];

/// What to do after a page of the contact listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageStep {
    Show(usize),
    Stay,
    Quit,
}

/// Next page index for a `n`/`p`/`q` answer. Moving past either end stays put.
fn step_page(current: usize, total: usize, answer: &str) -> PageStep {
    match answer {
        "n" | "next" if current + 1 < total => PageStep::Show(current + 1),
        "p" | "prev" | "previous" if current > 0 => PageStep::Show(current - 1),
        "q" | "quit" => PageStep::Quit,
        _ => PageStep::Stay,
    }
}

/// Field for a numbered answer of the search prompt. Blank searches everything.
fn search_field(answer: &str) -> Result<SearchField, AppError> {
    if answer.is_empty() {
        return Ok(SearchField::All);
    }
    let number: usize = answer.parse()?;
    number
        .checked_sub(1)
        .and_then(|i| SearchField::value_variants().get(i).copied())
        .ok_or_else(|| AppError::ParseCommand(answer.to_string()))
}

fn export_format(answer: &str) -> Result<ExportFormat, AppError> {
    if answer.is_empty() {
        return Ok(ExportFormat::Csv);
    }
    ExportFormat::from_str(answer, true).map_err(|_| AppError::Format(answer.to_string()))
}

fn optional(answer: String) -> Option<String> {
    if answer.is_empty() { None } else { Some(answer) }
}

/// Interactive loop. Leaves on the Exit entry or when input ends.
pub fn run_menu(manager: &mut ContactManager, config: &Config) -> Result<(), AppError> {
    println!("\n\n--- CONTACT BOOK ---\n");

    loop {
        cli::show_menu()?;

        let answer = match cli::get_input() {
            Ok(answer) => answer,
            Err(e) if cli::is_end_of_input(&e) => break,
            Err(e) => return Err(e),
        };

        let choice = match MenuChoice::parse(&answer) {
            Ok(choice) => choice,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        if choice == MenuChoice::Exit {
            break;
        }

        match handle(choice, manager, config) {
            Ok(()) => {}
            Err(e) if cli::is_end_of_input(&e) => break,
            Err(e) => println!("Error: {e}"),
        }
    }

    backup_on_exit(manager);
    println!("\nBye!");
    Ok(())
}

fn backup_on_exit(manager: &ContactManager) {
    if manager.is_empty() {
        return;
    }

    match manager.create_backup() {
        Ok(path) => {
            info!(backup = %path.display(), "exit backup created");
            println!("Backup created: {}", path.display());
            if let Err(error) = manager.backups().prune_to_default() {
                warn!(%error, "could not prune old backups");
            }
        }
        Err(error) => warn!(%error, "exit backup failed"),
    }
}

fn handle(choice: MenuChoice, manager: &mut ContactManager, config: &Config) -> Result<(), AppError> {
    match choice {
        MenuChoice::AddContact => add_contact(manager),
        MenuChoice::ViewContacts => view_contacts(manager, config.page_size),
        MenuChoice::SearchContacts => search_contacts(manager),
        MenuChoice::UpdateContact => update_contact(manager),
        MenuChoice::DeleteContact => delete_contact(manager),
        MenuChoice::FilterByCategory => filter_by_category(manager),
        MenuChoice::ExportContacts => export_contacts(manager, config),
        MenuChoice::ImportContacts => import_contacts(manager),
        MenuChoice::ManageBackups => manage_backups(manager, config),
        MenuChoice::Statistics => {
            run::print_statistics(&manager.statistics());
            Ok(())
        }
        MenuChoice::Exit => Ok(()),
    }
}

fn add_contact(manager: &mut ContactManager) -> Result<(), AppError> {
    println!("\n--- Add New Contact ---");
    let name = cli::prompt("Name: ")?;
    let phone = cli::prompt("Phone: ")?;
    let email = cli::prompt("Email (optional): ")?;
    let address = cli::prompt("Address (optional): ")?;

    println!("Categories: {}", SUGGESTED_CATEGORIES.join(", "));
    let category = cli::prompt(&format!("Category (default {DEFAULT_CATEGORY}): "))?;

    let outcome = manager.create(
        &name,
        &phone,
        Some(email.as_str()),
        Some(address.as_str()),
        Some(category.as_str()),
    )?;
    run::finish(outcome, |c| format!("Contact '{}' added successfully", c.name))
}

fn view_contacts(manager: &ContactManager, page_size: usize) -> Result<(), AppError> {
    if manager.is_empty() {
        println!("No contacts found.");
        return Ok(());
    }

    let rows = listing::sort_indexed(manager.contact_list(), None);
    let pages = listing::paginate(&rows, page_size)?;

    let mut current = 0;
    loop {
        run::print_page(&pages[current]);

        if pages.len() == 1 {
            return Ok(());
        }

        let answer = cli::prompt("\n[n]ext, [p]revious, [q]uit: ")?.to_lowercase();
        match step_page(current, pages.len(), &answer) {
            PageStep::Show(page) => current = page,
            PageStep::Stay => {}
            PageStep::Quit => return Ok(()),
        }
    }
}

fn search_contacts(manager: &ContactManager) -> Result<(), AppError> {
    println!("\n--- Search Contacts ---");
    for (i, field) in SearchField::value_variants().iter().enumerate() {
        println!("{}. {:?}", i + 1, field);
    }
    let field = search_field(&cli::prompt("Search in (default All): ")?)?;
    let term = cli::prompt("Search term: ")?;

    let found: Vec<_> = manager.search(&term, field)?.collect();
    run::print_search_results(&found);
    Ok(())
}

fn update_contact(manager: &mut ContactManager) -> Result<(), AppError> {
    if manager.is_empty() {
        println!("No contacts found.");
        return Ok(());
    }

    run::print_rows(&listing::sort_indexed(manager.contact_list(), None));
    let index: usize = cli::prompt("\nContact number to update: ")?.parse()?;

    let current = manager.get(index)?;
    println!("\n{}", cli::display_contact(current));
    println!("Press Enter to keep the current value.");

    let changes = ContactUpdate {
        name: optional(cli::prompt(&format!("Name [{}]: ", current.name))?),
        phone: optional(cli::prompt(&format!("Phone [{}]: ", current.phone))?),
        email: optional(cli::prompt(&format!("Email [{}]: ", current.email))?),
        address: optional(cli::prompt(&format!("Address [{}]: ", current.address))?),
        category: optional(cli::prompt(&format!("Category [{}]: ", current.category))?),
    };

    if changes.is_empty() {
        println!("Nothing to update");
        return Ok(());
    }

    let outcome = manager.update(index, &changes)?;
    run::finish(outcome, |c| format!("Contact '{}' updated successfully", c.name))
}

fn delete_contact(manager: &mut ContactManager) -> Result<(), AppError> {
    if manager.is_empty() {
        println!("No contacts found.");
        return Ok(());
    }

    run::print_rows(&listing::sort_indexed(manager.contact_list(), None));
    let index: usize = cli::prompt("\nContact number to delete: ")?.parse()?;

    let message = format!(
        "delete this contact\n{}",
        cli::display_contact(manager.get(index)?)
    );
    if !cli::confirm_action(&message)? {
        println!("Delete cancelled");
        return Ok(());
    }

    let deleted = manager.delete(index)?;
    println!("Contact '{}' deleted successfully", deleted.name);
    Ok(())
}

fn filter_by_category(manager: &ContactManager) -> Result<(), AppError> {
    let categories = manager.categories();
    run::print_categories(&categories);
    if categories.is_empty() {
        return Ok(());
    }

    let category = cli::prompt("\nCategory: ")?;
    let rows: Vec<_> = listing::sort_indexed(manager.contact_list(), None)
        .into_iter()
        .filter(|(_, c)| c.category == category)
        .collect();

    if rows.is_empty() {
        println!("Found no contact in the '{}' category", category);
    } else {
        run::print_rows(&rows);
    }
    Ok(())
}

fn export_contacts(manager: &ContactManager, config: &Config) -> Result<(), AppError> {
    let format = export_format(&cli::prompt("Format csv, txt or json (default csv): ")?)?;
    let des = optional(cli::prompt("File path (leave blank for default): ")?).map(PathBuf::from);

    let (path, total) = manager.export_to(des.as_deref(), format, &config.export_dir)?;
    println!("Successfully exported {} contacts to {:?}.", total, path);
    Ok(())
}

fn import_contacts(manager: &mut ContactManager) -> Result<(), AppError> {
    let src = PathBuf::from(cli::prompt("Path of the .json or .csv file: ")?);

    let outcome = manager.import_from(&src)?;
    run::finish(outcome, |summary| {
        format!(
            "Import completed!\n  - Imported: {} contacts\n  - Skipped (duplicates): {} contacts",
            summary.imported, summary.skipped
        )
    })
}

fn manage_backups(manager: &mut ContactManager, config: &Config) -> Result<(), AppError> {
    println!("\n--- Backup Management ---");
    println!("1. Create backup");
    println!("2. List backups");
    println!("3. Restore from backup");
    println!("4. Clean old backups");
    println!("5. Back");

    match cli::prompt("> ")?.as_str() {
        "1" => {
            let path = manager.create_backup()?;
            println!("Backup created: {}", path.display());
        }
        "2" => run::print_backups(&manager.list_backups()?),
        "3" => {
            let backups = manager.list_backups()?;
            run::print_backups(&backups);
            if backups.is_empty() {
                return Ok(());
            }

            let number: usize = cli::prompt("\nBackup number to restore: ")?.parse()?;
            let backup = run::select_backup(manager, number)?;
            if !cli::confirm_action("replace all current contacts with this backup")? {
                println!("Restore cancelled");
                return Ok(());
            }

            let outcome = manager.restore_from_backup(&backup.path)?;
            run::finish(outcome, |total| {
                format!("Restored {} contacts from {}", total, backup.file_name)
            })?;
        }
        "4" => {
            let answer = cli::prompt(&format!(
                "How many backups to keep (default {}): ",
                config.backup_keep
            ))?;
            let keep = if answer.is_empty() {
                config.backup_keep
            } else {
                answer.parse()?
            };
            run::report_pruned(manager.prune_backups(keep)?, keep);
        }
        "5" | "" => {}
        other => println!("{}", AppError::ParseCommand(other.to_string())),
    }
    Ok(())
}
