//! Core data models for the ledger

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::types::{Category, EntryType};

static DATE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

/// One financial record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Unique identifier, assigned at creation
    pub id: String,
    pub title: String,
    /// Entry date (YYYY-MM-DD format)
    pub date: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub category: Category,
    /// Non-negative amount
    pub amount: f64,
}

impl Entry {
    /// Get the entry date as NaiveDate
    pub fn date_naive(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    pub fn is_income(&self) -> bool {
        self.entry_type == EntryType::Income
    }

    /// Check a decoded entry holds the same rules `EntryDraft::to_entry`
    /// enforces; an empty date is not defaulted here
    pub fn check(&self) -> Result<(), Rejection> {
        if self.title.trim().is_empty() {
            return Err(Rejection::EmptyTitle);
        }
        if !(self.amount.is_finite() && self.amount >= 0.0) {
            return Err(Rejection::InvalidAmount {
                raw: self.amount.to_string(),
            });
        }
        if !DATE_SHAPE.is_match(&self.date) || self.date_naive().is_none() {
            return Err(Rejection::InvalidDate {
                raw: self.date.clone(),
            });
        }
        Ok(())
    }
}

/// Why a draft was not turned into an entry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("title is empty")]
    EmptyTitle,

    #[error("amount is not a non-negative number: {raw:?}")]
    InvalidAmount { raw: String },

    #[error("date is not a YYYY-MM-DD calendar date: {raw:?}")]
    InvalidDate { raw: String },
}

/// Transient creation-form state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDraft {
    #[serde(default)]
    pub title: String,
    /// Empty means today
    #[serde(default)]
    pub date: String,
    #[serde(rename = "type", default)]
    pub entry_type: EntryType,
    #[serde(default)]
    pub category: Category,
    /// Raw amount text as typed
    #[serde(default, deserialize_with = "amount_text")]
    pub amount: String,
}

impl Default for EntryDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            date: today(),
            entry_type: EntryType::Expense,
            category: Category::Food,
            amount: String::new(),
        }
    }
}

impl EntryDraft {
    /// Build the entry this draft describes, or say why it cannot
    pub fn to_entry(&self, id: String) -> Result<Entry, Rejection> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(Rejection::EmptyTitle);
        }

        let amount = parse_amount(&self.amount).ok_or_else(|| Rejection::InvalidAmount {
            raw: self.amount.clone(),
        })?;

        let date = normalize_date(&self.date).ok_or_else(|| Rejection::InvalidDate {
            raw: self.date.clone(),
        })?;

        Ok(Entry {
            id,
            title: title.to_string(),
            date,
            entry_type: self.entry_type,
            category: self.category,
            amount,
        })
    }

    /// Reset the fields that do not carry over to the next entry
    pub fn clear_transient(&mut self) {
        self.title.clear();
        self.amount.clear();
    }
}

/// Parse amount text; only finite, non-negative numbers pass
pub fn parse_amount(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
}

/// Today's local date as YYYY-MM-DD
pub fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Check a date is zero-padded YYYY-MM-DD and exists on the calendar;
/// empty input means today
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(today());
    }
    if !DATE_SHAPE.is_match(raw) {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|_| raw.to_string())
}

/// Accept the amount as JSON text or number
fn amount_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
