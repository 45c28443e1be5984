use std::{fmt, str::FromStr};

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::LedgerError;

/// Stable opaque identifier stamped on an entry when it is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Placeholder carried by entries that have not been appended yet.
    pub const fn unassigned() -> Self {
        Self(Uuid::nil())
    }

    pub fn is_unassigned(&self) -> bool {
        self.0.is_nil()
    }

    /// First eight hex digits, used as the display handle in tables.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }

    pub fn matches_prefix(&self, prefix: &str) -> bool {
        let needle = prefix.trim().to_ascii_lowercase();
        !needle.is_empty() && self.0.simple().to_string().starts_with(&needle)
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::unassigned()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of a transaction. Determines the sign used when aggregating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub const ALL: [EntryKind; 2] = [EntryKind::Income, EntryKind::Expense];

    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::Income => "Income",
            EntryKind::Expense => "Expense",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EntryKind {
    type Err = LedgerError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "income" | "in" | "+" => Ok(EntryKind::Income),
            "expense" | "out" | "-" => Ok(EntryKind::Expense),
            other => Err(LedgerError::InvalidInput(format!(
                "unknown entry kind `{other}` (expected income or expense)"
            ))),
        }
    }
}

/// Spending category. `Custom` holds free text outside the recognized set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transport,
    Health,
    Leisure,
    Education,
    Other,
    Custom(String),
}

impl Category {
    pub const STANDARD: [Category; 6] = [
        Category::Food,
        Category::Transport,
        Category::Health,
        Category::Leisure,
        Category::Education,
        Category::Other,
    ];

    pub fn label(&self) -> &str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Health => "Health",
            Category::Leisure => "Leisure",
            Category::Education => "Education",
            Category::Other => "Other",
            Category::Custom(name) => name,
        }
    }

    /// Matches a recognized category by label, ignoring case.
    pub fn standard(input: &str) -> Option<Category> {
        let needle = input.trim();
        Self::STANDARD
            .iter()
            .find(|category| category.label().eq_ignore_ascii_case(needle))
            .cloned()
    }

    /// Builds a free-text category. Recognized labels still map to their variant.
    pub fn custom(input: &str) -> Result<Category, LedgerError> {
        let name = input.trim();
        if name.is_empty() {
            return Err(LedgerError::InvalidInput(
                "category name cannot be empty".into(),
            ));
        }
        Ok(Self::standard(name).unwrap_or_else(|| Category::Custom(name.to_string())))
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Category::Custom(_))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How an entry was paid. `Custom` holds free text outside the recognized set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    CreditCard,
    Debit,
    Cash,
    InstantTransfer,
    Custom(String),
}

impl PaymentMethod {
    pub const STANDARD: [PaymentMethod; 4] = [
        PaymentMethod::CreditCard,
        PaymentMethod::Debit,
        PaymentMethod::Cash,
        PaymentMethod::InstantTransfer,
    ];

    pub fn label(&self) -> &str {
        match self {
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::Debit => "Debit",
            PaymentMethod::Cash => "Cash",
            PaymentMethod::InstantTransfer => "Instant Transfer",
            PaymentMethod::Custom(name) => name,
        }
    }

    /// Matches a recognized method by label or short alias, ignoring case.
    pub fn standard(input: &str) -> Option<PaymentMethod> {
        let needle = input.trim().to_ascii_lowercase();
        match needle.as_str() {
            "credit" | "credit-card" | "credit_card" | "card" => Some(PaymentMethod::CreditCard),
            "instant" | "instant-transfer" | "instant_transfer" | "pix" => {
                Some(PaymentMethod::InstantTransfer)
            }
            _ => Self::STANDARD
                .iter()
                .find(|method| method.label().eq_ignore_ascii_case(&needle))
                .cloned(),
        }
    }

    pub fn custom(input: &str) -> Result<PaymentMethod, LedgerError> {
        let name = input.trim();
        if name.is_empty() {
            return Err(LedgerError::InvalidInput(
                "payment method cannot be empty".into(),
            ));
        }
        Ok(Self::standard(name).unwrap_or_else(|| PaymentMethod::Custom(name.to_string())))
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, PaymentMethod::Custom(_))
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One recorded transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub id: EntryId,
    pub date: NaiveDate,
    pub kind: EntryKind,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    pub payment_method: PaymentMethod,
    pub amount: Decimal,
}

impl Entry {
    /// Creates an entry dated today. The id is stamped by [`Ledger::append`].
    ///
    /// [`Ledger::append`]: super::Ledger::append
    pub fn new(
        kind: EntryKind,
        description: impl Into<String>,
        category: Category,
        payment_method: PaymentMethod,
        amount: Decimal,
    ) -> Self {
        Self {
            id: EntryId::unassigned(),
            date: Local::now().date_naive(),
            kind,
            description: description.into(),
            category,
            payment_method,
            amount,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Amount with the sign implied by the kind.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            EntryKind::Income => self.amount,
            EntryKind::Expense => -self.amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_aliases() {
        assert_eq!("Income".parse::<EntryKind>().unwrap(), EntryKind::Income);
        assert_eq!("out".parse::<EntryKind>().unwrap(), EntryKind::Expense);
        assert!("refund".parse::<EntryKind>().is_err());
    }

    #[test]
    fn standard_category_lookup_ignores_case() {
        assert_eq!(Category::standard("food"), Some(Category::Food));
        assert_eq!(Category::standard(" EDUCATION "), Some(Category::Education));
        assert_eq!(Category::standard("Pets"), None);
    }

    #[test]
    fn custom_category_keeps_recognized_labels() {
        assert_eq!(Category::custom("health").unwrap(), Category::Health);
        assert_eq!(
            Category::custom("Pets").unwrap(),
            Category::Custom("Pets".into())
        );
        assert!(Category::custom("   ").is_err());
    }

    #[test]
    fn payment_aliases_resolve() {
        assert_eq!(
            PaymentMethod::standard("pix"),
            Some(PaymentMethod::InstantTransfer)
        );
        assert_eq!(
            PaymentMethod::standard("credit card"),
            Some(PaymentMethod::CreditCard)
        );
        assert_eq!(PaymentMethod::standard("cheque"), None);
    }

    #[test]
    fn signed_amount_follows_kind() {
        let amount = Decimal::new(2550, 2);
        let expense = Entry::new(
            EntryKind::Expense,
            "Lunch",
            Category::Food,
            PaymentMethod::CreditCard,
            amount,
        );
        assert_eq!(expense.signed_amount(), -amount);
        assert!(expense.id.is_unassigned());
    }

    #[test]
    fn short_id_is_prefix_of_full_id() {
        let id = EntryId::new();
        let short = id.short();
        assert_eq!(short.len(), 8);
        assert!(id.matches_prefix(&short));
        assert!(!id.matches_prefix(""));
    }
}
