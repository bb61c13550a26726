//! Filter criteria over the ledger

use super::models::Entry;
use super::types::{CategoryFilter, TypeFilter};

/// View criteria; never persisted
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    /// Inclusive lower date bound, empty for none
    pub from_date: String,
    /// Inclusive upper date bound, empty for none
    pub to_date: String,
    pub category: CategoryFilter,
    pub entry_type: TypeFilter,
}

impl FilterCriteria {
    /// True when no predicate is active
    pub fn is_default(&self) -> bool {
        self.from_date.is_empty()
            && self.to_date.is_empty()
            && self.category == CategoryFilter::All
            && self.entry_type == TypeFilter::All
    }

    /// All active predicates hold for the entry.
    ///
    /// Dates compare as strings; zero-padded YYYY-MM-DD sorts chronologically.
    pub fn matches(&self, entry: &Entry) -> bool {
        if !self.from_date.is_empty() && entry.date.as_str() < self.from_date.as_str() {
            return false;
        }
        if !self.to_date.is_empty() && entry.date.as_str() > self.to_date.as_str() {
            return false;
        }
        self.category.matches(entry.category) && self.entry_type.matches(entry.entry_type)
    }
}

/// Entries satisfying the criteria, in ledger order
pub fn filter<'a>(entries: &'a [Entry], criteria: &FilterCriteria) -> Vec<&'a Entry> {
    entries.iter().filter(|e| criteria.matches(e)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, EntryType};

    fn entry(id: &str, date: &str, entry_type: EntryType, category: Category) -> Entry {
        Entry {
            id: id.to_string(),
            title: id.to_string(),
            date: date.to_string(),
            entry_type,
            category,
            amount: 10.0,
        }
    }

    fn sample() -> Vec<Entry> {
        vec![
            entry("a", "2024-03-01", EntryType::Expense, Category::Food),
            entry("b", "2024-02-15", EntryType::Income, Category::Other),
            entry("c", "2024-01-31", EntryType::Expense, Category::Bill),
            entry("d", "2024-02-01", EntryType::Expense, Category::Transport),
        ]
    }

    fn ids(entries: Vec<&Entry>) -> Vec<&str> {
        entries.into_iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_default_criteria_keep_everything_in_order() {
        let entries = sample();
        let criteria = FilterCriteria::default();
        assert!(criteria.is_default());
        assert_eq!(ids(filter(&entries, &criteria)), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_inclusive_date_range() {
        let entries = sample();
        let criteria = FilterCriteria {
            from_date: "2024-02-01".to_string(),
            to_date: "2024-02-29".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(filter(&entries, &criteria)), vec!["b", "d"]);
    }

    #[test]
    fn test_open_ended_bounds() {
        let entries = sample();
        let from_only = FilterCriteria {
            from_date: "2024-02-15".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(filter(&entries, &from_only)), vec!["a", "b"]);

        let to_only = FilterCriteria {
            to_date: "2024-02-01".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(filter(&entries, &to_only)), vec!["c", "d"]);
    }

    #[test]
    fn test_category_and_type_combine() {
        let entries = sample();
        let criteria = FilterCriteria {
            category: CategoryFilter::Only(Category::Bill),
            entry_type: TypeFilter::Only(EntryType::Expense),
            ..Default::default()
        };
        assert_eq!(ids(filter(&entries, &criteria)), vec!["c"]);

        let none = FilterCriteria {
            category: CategoryFilter::Only(Category::Bill),
            entry_type: TypeFilter::Only(EntryType::Income),
            ..Default::default()
        };
        assert!(filter(&entries, &none).is_empty());
    }
}
