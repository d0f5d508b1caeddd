pub mod command;
pub mod menu;
pub mod run;

use crate::domain::contact::Contact;
use crate::errors::AppError;
use std::io::{self, BufRead, Write};

pub use run::run_app;

/// Entries of the interactive menu, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    AddContact,
    ViewContacts,
    SearchContacts,
    UpdateContact,
    DeleteContact,
    FilterByCategory,
    ExportContacts,
    ImportContacts,
    ManageBackups,
    Statistics,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 11] = [
        MenuChoice::AddContact,
        MenuChoice::ViewContacts,
        MenuChoice::SearchContacts,
        MenuChoice::UpdateContact,
        MenuChoice::DeleteContact,
        MenuChoice::FilterByCategory,
        MenuChoice::ExportContacts,
        MenuChoice::ImportContacts,
        MenuChoice::ManageBackups,
        MenuChoice::Statistics,
        MenuChoice::Exit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuChoice::AddContact => "Add Contact",
            MenuChoice::ViewContacts => "View All Contacts",
            MenuChoice::SearchContacts => "Search Contacts",
            MenuChoice::UpdateContact => "Update Contact",
            MenuChoice::DeleteContact => "Delete Contact",
            MenuChoice::FilterByCategory => "Filter by Category",
            MenuChoice::ExportContacts => "Export Contacts",
            MenuChoice::ImportContacts => "Import Contacts",
            MenuChoice::ManageBackups => "Backup Management",
            MenuChoice::Statistics => "Contact Statistics",
            MenuChoice::Exit => "Exit",
        }
    }

    pub fn parse(input: &str) -> Result<Self, AppError> {
        let number: usize = input
            .trim()
            .parse()
            .map_err(|_| AppError::ParseCommand(input.trim().to_string()))?;

        number
            .checked_sub(1)
            .and_then(|i| MenuChoice::ALL.get(i).copied())
            .ok_or_else(|| AppError::ParseCommand(input.trim().to_string()))
    }
}

// OUTPUT FUNCTIONS
pub fn show_menu() -> Result<(), AppError> {
    println!("\n{}", "=".repeat(60));
    println!("{:^60}", "CONTACT BOOK");
    println!("{}", "=".repeat(60));
    for (i, choice) in MenuChoice::ALL.iter().enumerate() {
        println!("{:<3} {}", format!("{}.", i + 1), choice.label());
    }
    println!("{}", "=".repeat(60));
    print!("> ");
    io::stdout().flush()?;
    Ok(())
}

pub fn confirm_action(action: &str) -> Result<bool, AppError> {
    println!("\nAre you sure you want to {}? (y/n)", action);
    print!("> ");
    io::stdout().flush()?;

    let consent = get_input_to_lower()?;
    Ok(consent == "y" || consent == "yes")
}

pub fn list_header() -> String {
    format!(
        "{:<3} {:<20} {:<17} {:<25} {:<12}\n{}",
        "No.",
        "Name",
        "Phone",
        "Email",
        "Category",
        "-".repeat(80)
    )
}

/// One table row; long values are cut to fit their column.
pub fn list_row(position: usize, contact: &Contact) -> String {
    format!(
        "{:<3} {:<20} {:<17} {:<25} {:<12}",
        position,
        truncate(&contact.name, 19),
        contact.phone,
        truncate(&contact.email, 24),
        truncate(&contact.category, 11)
    )
}

fn truncate(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

pub fn display_contact(contact: &Contact) -> String {
    format!("{}\n{}", contact.details(), "-".repeat(40))
}

// INPUT FUNCTIONS
pub fn get_input() -> Result<String, AppError> {
    read_trimmed_line(&mut io::stdin().lock())
}

pub fn get_input_to_lower() -> Result<String, AppError> {
    Ok(get_input()?.to_lowercase())
}

pub fn get_input_as_int() -> Result<usize, AppError> {
    Ok(get_input()?.parse::<usize>()?)
}

pub fn prompt(message: &str) -> Result<String, AppError> {
    print!("{message}");
    io::stdout().flush()?;
    get_input()
}

/// Read one line. End of input is reported as `UnexpectedEof`.
pub fn read_trimmed_line<R: BufRead>(reader: &mut R) -> Result<String, AppError> {
    let mut input = String::new();
    if reader.read_line(&mut input)? == 0 {
        return Err(AppError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input closed",
        )));
    }
    Ok(input.trim().to_string())
}

pub fn is_end_of_input(err: &AppError) -> bool {
    matches!(err, AppError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof)
}
