//! Aggregates and response structures for API responses

use serde::{Deserialize, Serialize};

use super::models::Entry;
use super::types::EntryType;

/// Totals over a set of entries
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub total_income: f64,
    pub total_expense: f64,
    /// total_income - total_expense
    pub balance: f64,
    pub count: usize,
}

/// Sum income and expense amounts; empty input gives all zeros
pub fn aggregate<'a, I>(entries: I) -> Totals
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut totals = Totals::default();
    for entry in entries {
        match entry.entry_type {
            EntryType::Income => totals.total_income += entry.amount,
            EntryType::Expense => totals.total_expense += entry.amount,
        }
        totals.count += 1;
    }
    totals.balance = totals.total_income - totals.total_expense;
    totals
}

/// Entries list response for API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntriesResponse {
    pub entries: Vec<Entry>,
    pub total_count: usize,
    pub totals: Totals,
}

/// Result of a create request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResponse {
    pub created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<Entry>,
}

/// Result of a delete request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}
