//! Closed value sets for entries and filters

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

fn invalid(what: &str, raw: &str) -> CoreError {
    CoreError::InvalidFormat {
        message: format!("Invalid {}: {}", what, raw),
    }
}

/// Entry type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Money coming in
    Income,
    /// Money going out
    #[default]
    Expense,
}

impl EntryType {
    pub const ALL: [EntryType; 2] = [EntryType::Income, EntryType::Expense];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Income => "income",
            EntryType::Expense => "expense",
        }
    }
}

impl std::str::FromStr for EntryType {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(EntryType::Income),
            "expense" => Ok(EntryType::Expense),
            _ => Err(invalid("entry type", s)),
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry category enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Food,
    Transport,
    Bill,
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Food,
        Category::Transport,
        Category::Bill,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Bill => "bill",
            Category::Other => "other",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "food" => Ok(Category::Food),
            "transport" => Ok(Category::Transport),
            "bill" => Ok(Category::Bill),
            "other" => Ok(Category::Other),
            _ => Err(invalid("category", s)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category criterion: `all` or one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }
}

impl std::str::FromStr for CategoryFilter {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            s.parse().map(CategoryFilter::Only)
        }
    }
}

impl std::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryFilter::All => write!(f, "all"),
            CategoryFilter::Only(c) => write!(f, "{}", c),
        }
    }
}

/// Type criterion: `all`, `income` or `expense`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(EntryType),
}

impl TypeFilter {
    pub fn matches(&self, entry_type: EntryType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(t) => *t == entry_type,
        }
    }
}

impl std::str::FromStr for TypeFilter {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(TypeFilter::All)
        } else {
            s.parse().map(TypeFilter::Only)
        }
    }
}

impl std::fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeFilter::All => write!(f, "all"),
            TypeFilter::Only(t) => write!(f, "{}", t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_type_from_str() {
        assert_eq!("income".parse::<EntryType>().unwrap(), EntryType::Income);
        assert_eq!(" Expense ".parse::<EntryType>().unwrap(), EntryType::Expense);
        assert!("transfer".parse::<EntryType>().is_err());
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("bill".parse::<Category>().unwrap(), Category::Bill);
        assert_eq!("TRANSPORT".parse::<Category>().unwrap(), Category::Transport);
        assert!("rent".parse::<Category>().is_err());
        assert!("all".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_filter() {
        assert_eq!("all".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!("".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        let food: CategoryFilter = "food".parse().unwrap();
        assert!(food.matches(Category::Food));
        assert!(!food.matches(Category::Other));
        assert!(CategoryFilter::All.matches(Category::Other));
        let err = "groceries".parse::<CategoryFilter>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidFormat { ref message } if message == "Invalid category: groceries"));
    }

    #[test]
    fn test_type_filter() {
        let income: TypeFilter = "income".parse().unwrap();
        assert!(income.matches(EntryType::Income));
        assert!(!income.matches(EntryType::Expense));
        assert_eq!(TypeFilter::All.to_string(), "all");
        assert_eq!(income.to_string(), "income");
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&EntryType::Income).unwrap(), "\"income\"");
        assert_eq!(serde_json::to_string(&Category::Transport).unwrap(), "\"transport\"");
        assert!(serde_json::from_str::<Category>("\"rent\"").is_err());
    }
}
