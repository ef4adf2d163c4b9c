//! Entity types shared across the store, record API, and aggregation engine.
//!
//! Timestamps are stored as RFC 3339 strings and parsed with chrono at
//! comparison sites. Serialized field names are camelCase to match the
//! persisted blob layout.

use serde::{Deserialize, Serialize};

/// Customer segmentation label driving insight-bucket eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Gold,
    Silver,
    Bronze,
    Dead,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Gold => "Gold",
            Tier::Silver => "Silver",
            Tier::Bronze => "Bronze",
            Tier::Dead => "Dead",
        }
    }

    /// Parse a tier label. Unknown labels return `None`; bulk import maps
    /// those to `Bronze` as the default.
    pub fn parse(label: &str) -> Option<Tier> {
        match label {
            "Gold" => Some(Tier::Gold),
            "Silver" => Some(Tier::Silver),
            "Bronze" => Some(Tier::Bronze),
            "Dead" => Some(Tier::Dead),
            _ => None,
        }
    }

    /// All tiers in display order (Gold first, Dead last).
    pub fn all() -> [Tier; 4] {
        [Tier::Gold, Tier::Silver, Tier::Bronze, Tier::Dead]
    }
}

/// Sentiment classification attached to remarks by the insight adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    Mixed,
}

/// A customer record with derived metrics.
///
/// `sales_this_month` and `days_since_last_order` are recomputed from the
/// full sale history after every sale (see `records::recompute_metrics`).
/// `outstanding_balance` is event-driven: bills minus payments, never
/// reconciled against the sale history, and may go negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_contact: Option<String>,
    pub avatar: String,
    pub tier: Tier,
    pub state: String,
    pub district: String,
    pub sales_this_month: f64,
    #[serde(rename = "avg6MoSales")]
    pub avg_6mo_sales: f64,
    pub outstanding_balance: f64,
    pub days_since_last_order: i64,
    /// RFC 3339, bumped on every mutation touching this customer.
    pub last_updated: String,
}

/// An immutable sale event. `customer_id` is an unvalidated foreign key;
/// sales survive deletion of their customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub customer_id: String,
    pub amount: f64,
    /// RFC 3339.
    pub date: String,
}

/// A free-text interaction note. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Remark {
    pub id: String,
    pub customer_id: String,
    pub remark: String,
    /// RFC 3339.
    pub timestamp: String,
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

/// A reminder tied to a customer. Only the completion flag ever changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub customer_id: String,
    /// Denormalized for display; may drift from the customer record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    pub task: String,
    /// RFC 3339.
    pub due_date: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalStatus {
    InProgress,
    Achieved,
    Missed,
}

/// A target-amount goal for a customer. `current_amount` is a static field,
/// updated only where explicitly set; it is not derived from sales.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub customer_id: String,
    pub title: String,
    pub target_amount: f64,
    pub current_amount: f64,
    /// RFC 3339.
    pub deadline: String,
    pub status: GoalStatus,
}

/// A child step of a goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub goal_id: String,
    pub description: String,
    /// RFC 3339.
    pub target_date: String,
    pub completed: bool,
}

/// Create/update payload for a customer. Derived metrics are never settable
/// through this form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerForm {
    pub name: String,
    pub contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_contact: Option<String>,
    pub state: String,
    pub district: String,
    pub tier: Tier,
}

/// Partial customer update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub alternate_contact: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub tier: Option<Tier>,
}

/// Bulk-import payload: form fields plus the metric snapshot carried in the
/// CSV. Unlike `CustomerForm`, imports may seed non-zero metrics.
#[derive(Debug, Clone)]
pub struct CustomerDraft {
    pub name: String,
    pub contact: String,
    pub alternate_contact: Option<String>,
    pub state: String,
    pub district: String,
    pub tier: Tier,
    pub sales_this_month: f64,
    pub avg_6mo_sales: f64,
    pub outstanding_balance: f64,
    pub days_since_last_order: i64,
}
