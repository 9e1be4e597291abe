//! Core types and data structures for the booking system

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A client of the business.
///
/// `total_orders` and `total_spent` are derived ledger fields maintained
/// exclusively by [`crate::ledger::ClientLedger`] reconciliation; they are
/// never edited directly. Both are clamped at zero after every adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// Unique identifier, assigned at creation and immutable
    pub id: Uuid,
    /// Display name, also used as a case-insensitive secondary match key
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// Company registration / tax identifier, free text
    #[serde(default)]
    pub tax_id: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub notes: String,
    /// When the client record was created
    pub created_date: NaiveDateTime,
    /// Number of orders attributed to this client
    #[serde(default)]
    pub total_orders: i64,
    /// Sum of paid amounts across orders attributed to this client
    #[serde(default)]
    pub total_spent: BigDecimal,
}

impl Client {
    /// Create a new client with zeroed ledger fields
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email: String::new(),
            phone: String::new(),
            tax_id: String::new(),
            address: String::new(),
            notes: String::new(),
            created_date: chrono::Utc::now().naive_utc(),
            total_orders: 0,
            total_spent: BigDecimal::from(0),
        }
    }

    /// Create a client from the denormalized contact snapshot on an order
    pub fn from_order(order: &Order) -> Self {
        let mut client = Self::new(order.client_name.clone());
        client.email = order.client_email.clone();
        client.phone = order.client_phone.clone();
        client.tax_id = order.client_tax_id.clone();
        client.address = order.client_address.clone();
        client
    }
}

/// A photo session order.
///
/// Client contact fields are a denormalized snapshot captured at creation
/// time for display and invoicing, independent of the live client record.
/// `client_id` is a weak reference: older orders predate the linking
/// feature and carry `None`, so every consumer must also support the
/// case-insensitive name fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub client_name: String,
    /// Weak reference to a client; `None` for legacy records
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub client_email: String,
    #[serde(default)]
    pub client_phone: String,
    #[serde(default)]
    pub client_tax_id: String,
    #[serde(default)]
    pub client_address: String,
    #[serde(default)]
    pub location: String,
    /// Scheduled start of the session
    pub date: NaiveDateTime,
    /// Session length in minutes
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    pub price: BigDecimal,
    /// Deposit requested up front; by convention at most `price`
    #[serde(default)]
    pub deposit: BigDecimal,
    #[serde(default)]
    pub is_deposit_paid: bool,
    #[serde(default)]
    pub is_final_payment_paid: bool,
    #[serde(default)]
    pub status: OrderStatus,
    /// Number of delivered photos, informational
    #[serde(default)]
    pub photo_count: u32,
    #[serde(default)]
    pub notes: String,
}

fn default_duration() -> u32 {
    60
}

impl Order {
    /// Create an order with default lifecycle state (planned, unpaid)
    pub fn new(name: String, date: NaiveDateTime, price: BigDecimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            client_name: String::new(),
            client_id: None,
            client_email: String::new(),
            client_phone: String::new(),
            client_tax_id: String::new(),
            client_address: String::new(),
            location: String::new(),
            date,
            duration_minutes: default_duration(),
            price,
            deposit: BigDecimal::from(0),
            is_deposit_paid: false,
            is_final_payment_paid: false,
            status: OrderStatus::Planned,
            photo_count: 0,
            notes: String::new(),
        }
    }

    /// Portion of the price not covered by the deposit
    pub fn remaining_amount(&self) -> BigDecimal {
        &self.price - &self.deposit
    }

    /// The portion of the price actually collected, per the payment flags.
    ///
    /// Shared by ledger reconciliation and the statistics engine. With a
    /// deposit, the paid deposit and the paid remainder each count on their
    /// own; a deposit equal to the full price therefore counts as fully
    /// paid without the final-payment flag. Without a deposit, the final
    /// payment covers the whole price.
    pub fn paid_amount(&self) -> BigDecimal {
        let zero = BigDecimal::from(0);
        let mut paid = BigDecimal::from(0);

        if self.deposit == zero {
            if self.is_final_payment_paid {
                paid += &self.price;
            }
        } else {
            if self.is_deposit_paid {
                paid += &self.deposit;
            }
            let remaining = self.remaining_amount();
            if remaining > zero && self.is_final_payment_paid {
                paid += remaining;
            }
        }

        paid
    }

    /// Whether this order belongs to the given client.
    ///
    /// A present `client_id` decides on its own, even when dangling after a
    /// client deletion; only linkless legacy orders fall back to the
    /// case-insensitive name match.
    pub fn matches_client(&self, client: &Client) -> bool {
        match self.client_id {
            Some(client_id) => client_id == client.id,
            None => names_match(&self.client_name, &client.name),
        }
    }

    /// Session length for display, e.g. "2h 30min"
    pub fn formatted_duration(&self) -> String {
        let hours = self.duration_minutes / 60;
        let minutes = self.duration_minutes % 60;

        if hours > 0 && minutes > 0 {
            format!("{}h {}min", hours, minutes)
        } else if hours > 0 {
            format!("{}h", hours)
        } else {
            format!("{}min", minutes)
        }
    }
}

/// Trimmed, case-insensitive name equality used by all client matching
pub(crate) fn names_match(a: &str, b: &str) -> bool {
    let a = a.trim();
    !a.is_empty() && a.to_lowercase() == b.trim().to_lowercase()
}

/// Lifecycle status of an order.
///
/// There is no enforced transition graph; any status is reachable from any
/// other via explicit user action. The terminal statuses suppress reminder
/// notifications but remain mutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Statuses that cancel any pending reminder notification
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Delivered | OrderStatus::Cancelled
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OrderStatus::Planned => "Planned",
            OrderStatus::InProgress => "In progress",
            OrderStatus::Completed => "Completed",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        };
        write!(f, "{}", label)
    }
}

/// A business expense. Has no cross-entity effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub name: String,
    pub amount: BigDecimal,
    pub category: ExpenseCategory,
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: String,
    /// Informational flag; recurring expenses are not expanded into
    /// per-period instances
    #[serde(default)]
    pub is_recurring: bool,
}

impl Expense {
    /// Create a new expense
    pub fn new(
        name: String,
        amount: BigDecimal,
        category: ExpenseCategory,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            amount,
            category,
            date,
            notes: String::new(),
            is_recurring: false,
        }
    }
}

/// Expense categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Equipment,
    Travel,
    Software,
    Marketing,
    Education,
    Office,
    Other,
}

impl ExpenseCategory {
    /// All categories, in display order
    pub fn all() -> [ExpenseCategory; 7] {
        [
            ExpenseCategory::Equipment,
            ExpenseCategory::Travel,
            ExpenseCategory::Software,
            ExpenseCategory::Marketing,
            ExpenseCategory::Education,
            ExpenseCategory::Office,
            ExpenseCategory::Other,
        ]
    }
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ExpenseCategory::Equipment => "Equipment",
            ExpenseCategory::Travel => "Travel",
            ExpenseCategory::Software => "Software",
            ExpenseCategory::Marketing => "Marketing",
            ExpenseCategory::Education => "Education",
            ExpenseCategory::Office => "Office",
            ExpenseCategory::Other => "Other",
        };
        write!(f, "{}", label)
    }
}

/// Static preset used to prefill the order creation form.
///
/// Templates have no lifecycle and no persistence beyond the built-in list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTemplate {
    pub name: String,
    pub duration_minutes: u32,
    pub price: BigDecimal,
    pub deposit: BigDecimal,
    pub description: String,
}

impl OrderTemplate {
    /// The built-in preset list
    pub fn defaults() -> Vec<OrderTemplate> {
        vec![
            OrderTemplate {
                name: "Full-day wedding".to_string(),
                duration_minutes: 720,
                price: BigDecimal::from(18000),
                deposit: BigDecimal::from(2000),
                description: "Complete wedding coverage from preparations to the evening party"
                    .to_string(),
            },
            OrderTemplate {
                name: "Half-day wedding".to_string(),
                duration_minutes: 360,
                price: BigDecimal::from(14000),
                deposit: BigDecimal::from(2000),
                description: "Wedding coverage of the ceremony and celebration".to_string(),
            },
            OrderTemplate {
                name: "Portrait session".to_string(),
                duration_minutes: 120,
                price: BigDecimal::from(5000),
                deposit: BigDecimal::from(0),
                description: "Individual portrait session".to_string(),
            },
            OrderTemplate {
                name: "Family session".to_string(),
                duration_minutes: 90,
                price: BigDecimal::from(3500),
                deposit: BigDecimal::from(0),
                description: "Outdoor family session".to_string(),
            },
            OrderTemplate {
                name: "Corporate event".to_string(),
                duration_minutes: 240,
                price: BigDecimal::from(8000),
                deposit: BigDecimal::from(1000),
                description: "Company event and team-building coverage".to_string(),
            },
        ]
    }
}

/// Errors that can occur in the booking system
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("failed to load collection: {0}")]
    LoadFailed(String),
    #[error("failed to save collection: {0}")]
    SaveFailed(String),
    #[error("notification scheduling failed: {0}")]
    Notification(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("client not found: {0}")]
    ClientNotFound(String),
    #[error("order not found: {0}")]
    OrderNotFound(String),
    #[error("expense not found: {0}")]
    ExpenseNotFound(String),
}

impl BookingError {
    /// Icon hint paired with the message on the user-facing error surface
    pub fn icon(&self) -> &'static str {
        match self {
            BookingError::LoadFailed(_) | BookingError::SaveFailed(_) => {
                "externaldrive.badge.exclamationmark"
            }
            BookingError::Notification(_) => "bell.badge.exclamationmark",
            BookingError::Validation(_) => "exclamationmark.triangle",
            BookingError::ClientNotFound(_) => "person.badge.exclamationmark",
            BookingError::OrderNotFound(_) | BookingError::ExpenseNotFound(_) => {
                "doc.badge.exclamationmark"
            }
        }
    }
}

/// Result type for booking operations
pub type BookingResult<T> = Result<T, BookingError>;
