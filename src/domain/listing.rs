use std::collections::BTreeMap;

use clap::ValueEnum;

use super::*;
use crate::domain::contact::Contact;

pub const RECENT_CONTACTS: usize = 5;

/// Supported sort keys
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    Name,
    Phone,
    Email,
    Category,
    /// Newest first
    Created,
}

/// Order `contacts` by `key`. `None` keeps insertion order. The sort is stable.
pub fn sort_contacts<'a>(contacts: &'a [Contact], key: Option<SortKey>) -> Vec<&'a Contact> {
    sort_indexed(contacts, key)
        .into_iter()
        .map(|(_, contact)| contact)
        .collect()
}

/// Like [`sort_contacts`], keeping each contact's 1-based position in the store.
pub fn sort_indexed<'a>(contacts: &'a [Contact], key: Option<SortKey>) -> Vec<(usize, &'a Contact)> {
    let mut sorted: Vec<(usize, &Contact)> = contacts
        .iter()
        .enumerate()
        .map(|(i, contact)| (i + 1, contact))
        .collect();

    if let Some(key) = key {
        match key {
            SortKey::Name => sorted.sort_by_key(|(_, c)| c.name.to_lowercase()),
            SortKey::Phone => sorted.sort_by(|(_, a), (_, b)| a.phone.cmp(&b.phone)),
            SortKey::Email => sorted.sort_by_key(|(_, c)| c.email.to_lowercase()),
            SortKey::Category => sorted.sort_by(|(_, a), (_, b)| a.category.cmp(&b.category)),
            SortKey::Created => {
                sorted.sort_by(|(_, a), (_, b)| b.created_date.cmp(&a.created_date))
            }
        }
    }

    sorted
}

/// A window of a paginated listing.
#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    /// 1-based page number
    pub number: usize,
    pub total_pages: usize,
    /// Position of the first item of this page in the whole listing
    pub offset: usize,
    pub total_items: usize,
    pub items: &'a [T],
}

impl<T> Page<'_, T> {
    /// 1-based positions of the first and last item on this page
    pub fn span(&self) -> (usize, usize) {
        (self.offset + 1, self.offset + self.items.len())
    }
}

/// Split `items` into pages of `page_size`. Only the last page may be short.
pub fn paginate<T>(items: &[T], page_size: usize) -> Result<Vec<Page<'_, T>>, AppError> {
    if page_size == 0 {
        return Err(AppError::Validation(
            "Page size must be at least 1".to_string(),
        ));
    }

    let total_pages = items.len().div_ceil(page_size);

    Ok(items
        .chunks(page_size)
        .enumerate()
        .map(|(i, chunk)| Page {
            number: i + 1,
            total_pages,
            offset: i * page_size,
            total_items: items.len(),
            items: chunk,
        })
        .collect())
}

pub fn filter_by_category<'a>(contacts: &'a [Contact], category: &str) -> Vec<&'a Contact> {
    contacts.iter().filter(|c| c.category == category).collect()
}

/// Distinct categories in sorted order with the number of contacts in each.
pub fn categories(contacts: &[Contact]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for contact in contacts {
        *counts.entry(contact.category.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(category, count)| (category.to_string(), count))
        .collect()
}

#[derive(Debug)]
pub struct ContactStats<'a> {
    pub total: usize,
    pub with_email: usize,
    pub with_address: usize,
    pub by_category: Vec<(String, usize)>,
    /// Most recently created first
    pub recent: Vec<&'a Contact>,
}

impl ContactStats<'_> {
    pub fn percentage(&self, count: usize) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        count as f64 * 100.0 / self.total as f64
    }
}

pub fn statistics(contacts: &[Contact]) -> ContactStats<'_> {
    let mut recent = sort_contacts(contacts, Some(SortKey::Created));
    recent.truncate(RECENT_CONTACTS);

    ContactStats {
        total: contacts.len(),
        with_email: contacts.iter().filter(|c| c.has_email()).count(),
        with_address: contacts.iter().filter(|c| c.has_address()).count(),
        by_category: categories(contacts),
        recent,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn contact(name: &str, phone: &str, email: &str, category: &str, age_days: i64) -> Contact {
        let mut c = Contact::new(
            name.to_string(),
            phone.to_string(),
            email.to_string(),
            String::new(),
            category.to_string(),
        );
        c.created_date -= Duration::days(age_days);
        c
    }

    fn sample() -> Vec<Contact> {
        vec![
            contact("wayne", "(806) 286-6694", "jackie73@lopez.com", "Friends", 3),
            contact("Alice", "(803) 123-4567", "", "Work", 1),
            contact("bob", "(801) 927-1836", "Bob@yahoo.com", "Family", 2),
        ]
    }

    fn names(contacts: &[&Contact]) -> Vec<String> {
        contacts.iter().map(|c| c.name.clone()).collect()
    }

    #[test]
    fn no_key_keeps_insertion_order() {
        let contacts = sample();
        assert_eq!(names(&sort_contacts(&contacts, None)), ["wayne", "Alice", "bob"]);
    }

    #[test]
    fn sorts_by_each_key() {
        let contacts = sample();

        assert_eq!(
            names(&sort_contacts(&contacts, Some(SortKey::Name))),
            ["Alice", "bob", "wayne"]
        );
        assert_eq!(
            names(&sort_contacts(&contacts, Some(SortKey::Phone))),
            ["bob", "Alice", "wayne"]
        );
        // empty email first
        assert_eq!(
            names(&sort_contacts(&contacts, Some(SortKey::Email))),
            ["Alice", "bob", "wayne"]
        );
        assert_eq!(
            names(&sort_contacts(&contacts, Some(SortKey::Category))),
            ["bob", "wayne", "Alice"]
        );
        assert_eq!(
            names(&sort_contacts(&contacts, Some(SortKey::Created))),
            ["Alice", "bob", "wayne"]
        );
    }

    #[test]
    fn paginates_twenty_three_items_by_ten() -> Result<(), AppError> {
        let items: Vec<usize> = (0..23).collect();
        let pages = paginate(&items, 10)?;

        let sizes: Vec<usize> = pages.iter().map(|p| p.items.len()).collect();
        assert_eq!(sizes, vec![10, 10, 3]);
        assert!(pages.iter().all(|p| p.total_pages == 3 && p.total_items == 23));
        assert_eq!(pages[2].number, 3);
        assert_eq!(pages[2].span(), (21, 23));
        assert_eq!(pages[2].items, &[20, 21, 22]);
        Ok(())
    }

    #[test]
    fn paginate_edge_cases() -> Result<(), AppError> {
        let empty: Vec<u8> = Vec::new();
        assert!(paginate(&empty, 10)?.is_empty());

        let exact: Vec<u8> = vec![0; 20];
        assert_eq!(paginate(&exact, 10)?.len(), 2);

        assert!(paginate(&exact, 0).is_err());
        Ok(())
    }

    #[test]
    fn filters_and_counts_categories() {
        let mut contacts = sample();
        contacts.push(contact("Zed", "(809) 000-0000", "", "Work", 0));

        assert_eq!(
            categories(&contacts),
            vec![
                ("Family".to_string(), 1),
                ("Friends".to_string(), 1),
                ("Work".to_string(), 2)
            ]
        );
        assert_eq!(
            names(&filter_by_category(&contacts, "Work")),
            ["Alice", "Zed"]
        );
        assert!(filter_by_category(&contacts, "work").is_empty());
    }

    #[test]
    fn statistics_summarize_store() {
        let contacts = sample();
        let stats = statistics(&contacts);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.with_email, 2);
        assert_eq!(stats.with_address, 0);
        assert_eq!(names(&stats.recent), ["Alice", "bob", "wayne"]);
        assert!((stats.percentage(1) - 33.333).abs() < 0.01);
    }
}
