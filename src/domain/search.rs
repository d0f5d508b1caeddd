use clap::ValueEnum;

use super::*;
use crate::domain::contact::Contact;
use crate::validation::strip_phone_formatting;

/// Which field a search term is matched against.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SearchField {
    Name,
    Phone,
    Email,
    Address,
    Category,
    All,
}

impl SearchField {
    pub fn matches(&self, contact: &Contact, term: &str) -> bool {
        match self {
            SearchField::Name => contains(&contact.name, term),
            SearchField::Phone => strip_phone_formatting(&contact.phone).contains(term),
            SearchField::Email => contains(&contact.email, term),
            SearchField::Address => contains(&contact.address, term),
            SearchField::Category => contains(&contact.category, term),
            SearchField::All => [
                SearchField::Name,
                SearchField::Phone,
                SearchField::Email,
                SearchField::Address,
                SearchField::Category,
            ]
            .iter()
            .any(|field| field.matches(contact, term)),
        }
    }
}

fn contains(haystack: &str, term: &str) -> bool {
    haystack.to_lowercase().contains(term)
}

/// Lazy, single-pass iterator over the contacts matching a search.
pub struct Matches<'a> {
    inner: std::slice::Iter<'a, Contact>,
    term: String,
    field: SearchField,
}

impl<'a> Iterator for Matches<'a> {
    type Item = &'a Contact;

    fn next(&mut self) -> Option<Self::Item> {
        let (term, field) = (&self.term, self.field);
        self.inner.by_ref().find(|contact| field.matches(contact, term))
    }
}

/// Case-insensitive substring search over `contacts`, in their original order.
pub fn search<'a>(
    contacts: &'a [Contact],
    term: &str,
    field: SearchField,
) -> Result<Matches<'a>, AppError> {
    let term = term.trim().to_lowercase();

    if term.is_empty() {
        return Err(AppError::Validation(
            "Search term cannot be empty".to_string(),
        ));
    }

    Ok(Matches {
        inner: contacts.iter(),
        term,
        field,
    })
}
