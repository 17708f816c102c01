use chrono::NaiveDate;
use sqlx::FromRow;
use serde::{Serialize, Deserialize};

/// A payment obligation ("vencimiento").
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
pub struct DueItem {
    pub id: u32,
    pub due_date: NaiveDate,
    pub description: String,
    pub debt_amount: f64,
    pub payment_date: Option<NaiveDate>,
    pub paid_amount: Option<f64>,
    pub responsible: Option<String>,
}

impl DueItem {
    /// An item counts as paid when a positive amount
    /// was recorded. There is no separate flag.
    pub fn is_paid(&self) -> bool {
        self.paid_amount.is_some_and(|amount| amount > 0.0)
    }
}

/// A due item that was not stored yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewDueItem {
    pub due_date: NaiveDate,
    pub description: String,
    pub debt_amount: f64,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub paid_amount: Option<f64>,
    #[serde(default)]
    pub responsible: Option<String>,
}

impl NewDueItem {
    /// Attach the id assigned by the store
    pub fn with_id(self, id: u32) -> DueItem {
        DueItem {
            id,
            due_date: self.due_date,
            description: self.description,
            debt_amount: self.debt_amount,
            payment_date: self.payment_date,
            paid_amount: self.paid_amount,
            responsible: self.responsible,
        }
    }
}

/// All filters are optional and combined with AND.
#[derive(Debug, Default, Clone)]
pub struct DueItemFilter {
    pub id: Option<u32>,
    /// Inclusive lower bound of the due date
    pub due_from: Option<NaiveDate>,
    /// Inclusive upper bound of the due date
    pub due_to: Option<NaiveDate>,
    pub paid: Option<bool>,
    /// Exact match. An empty name does not filter.
    pub responsible: Option<String>,
}

impl DueItemFilter {
    /// The responsible name to match, if any.
    pub fn responsible(&self) -> Option<&str> {
        self.responsible.as_deref().filter(|name| !name.is_empty())
    }

    /// Check if an item passes all set filters.
    pub fn matches(&self, item: &DueItem) -> bool {
        if self.id.is_some_and(|id| id != item.id) {
            return false;
        }
        if self.due_from.is_some_and(|from| item.due_date < from) {
            return false;
        }
        if self.due_to.is_some_and(|to| item.due_date > to) {
            return false;
        }
        if self.paid.is_some_and(|paid| paid != item.is_paid()) {
            return false;
        }
        if let Some(name) = self.responsible() {
            if item.responsible.as_deref() != Some(name) {
                return false;
            }
        }
        true
    }
}

/// The ways a stored due item may change.
#[derive(Debug, Clone, PartialEq)]
pub enum DueItemChange {
    DueDate(NaiveDate),
    Responsible(String),
    /// Record a payment of the given amount today.
    /// Without an amount the item is left as is.
    Payment(Option<f64>),
}
