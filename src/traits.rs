//! Boundary traits for persistence, notifications, and validation

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::ledger::{NewOrder, OrderUpdate};
use crate::types::*;

/// Collection key for clients
pub const CLIENTS_COLLECTION: &str = "clients";
/// Collection key for orders
pub const ORDERS_COLLECTION: &str = "orders";
/// Collection key for expenses
pub const EXPENSES_COLLECTION: &str = "expenses";

/// Durable key-value document store for homogeneous entity collections.
///
/// Implementations persist whole collections keyed by name. The encoding
/// layered on top (see [`load_collection`] / [`save_collection`]) is
/// self-describing JSON, so records written by older application versions
/// decode with documented defaults instead of failing the whole load.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Load a collection's raw document; `None` when it was never saved
    async fn load(&self, collection: &str) -> BookingResult<Option<Vec<u8>>>;

    /// Save a collection's raw document, replacing any previous one
    async fn save(&mut self, collection: &str, data: &[u8]) -> BookingResult<()>;
}

/// Decode a collection from the store; a never-saved collection is empty
pub async fn load_collection<S, T>(store: &S, collection: &str) -> BookingResult<Vec<T>>
where
    S: DocumentStore + ?Sized,
    T: DeserializeOwned,
{
    match store.load(collection).await? {
        None => Ok(Vec::new()),
        Some(data) => serde_json::from_slice(&data)
            .map_err(|err| BookingError::LoadFailed(format!("{collection}: {err}"))),
    }
}

/// Encode and save a collection to the store
pub async fn save_collection<S, T>(store: &mut S, collection: &str, items: &[T]) -> BookingResult<()>
where
    S: DocumentStore + ?Sized,
    T: Serialize,
{
    let data = serde_json::to_vec(items)
        .map_err(|err| BookingError::SaveFailed(format!("{collection}: {err}")))?;
    store.save(collection, &data).await
}

/// Load a collection, recovering from failure with an empty one.
///
/// Load failures never crash startup; the in-memory state simply begins
/// empty and the failure is logged.
pub async fn load_or_empty<S, T>(store: &S, collection: &str) -> Vec<T>
where
    S: DocumentStore + ?Sized,
    T: DeserializeOwned,
{
    match load_collection(store, collection).await {
        Ok(items) => items,
        Err(err) => {
            warn!(collection, %err, "load failed, starting from an empty collection");
            Vec::new()
        }
    }
}

/// Scheduler for local reminder notifications.
///
/// Owned by the host platform; the core only computes fire times and
/// identifies reminders by order id. Scheduling is fire-and-forget: a
/// failure is logged by the caller but never aborts the mutation that
/// triggered it.
#[async_trait]
pub trait NotificationScheduler: Send + Sync {
    /// Schedule a reminder for an order; replaces any pending one
    async fn schedule(
        &mut self,
        order_id: Uuid,
        fire_at: NaiveDateTime,
        title: &str,
        body: &str,
    ) -> BookingResult<()>;

    /// Cancel the pending reminder for an order, if any
    async fn cancel(&mut self, order_id: Uuid) -> BookingResult<()>;

    /// Cancel every pending reminder
    async fn cancel_all(&mut self) -> BookingResult<()>;
}

/// Trait for implementing custom client validation rules
pub trait ClientValidator: Send + Sync {
    /// Validate a client before saving
    fn validate_client(&self, client: &Client) -> BookingResult<()>;
}

/// Trait for implementing custom order validation rules
pub trait OrderValidator: Send + Sync {
    /// Validate the fields of an order about to be created
    fn validate_new_order(&self, order: &NewOrder) -> BookingResult<()>;

    /// Validate the replacement fields of an order update
    fn validate_update(&self, update: &OrderUpdate) -> BookingResult<()>;

    /// Validate a deposit amount on its own
    fn validate_deposit(&self, deposit: &BigDecimal) -> BookingResult<()>;
}

/// Trait for implementing custom expense validation rules
pub trait ExpenseValidator: Send + Sync {
    /// Validate an expense before saving
    fn validate_expense(&self, expense: &Expense) -> BookingResult<()>;
}

/// Default client validator with basic rules
pub struct DefaultClientValidator;

impl ClientValidator for DefaultClientValidator {
    fn validate_client(&self, client: &Client) -> BookingResult<()> {
        if client.name.trim().is_empty() {
            return Err(BookingError::Validation(
                "Client name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default order validator with basic rules.
///
/// A deposit above the price is allowed by convention (full prepayment is
/// recorded that way), so it is deliberately not rejected here.
pub struct DefaultOrderValidator;

impl DefaultOrderValidator {
    fn validate_money_and_duration(
        &self,
        price: &BigDecimal,
        deposit: &BigDecimal,
        duration_minutes: u32,
    ) -> BookingResult<()> {
        if *price < BigDecimal::from(0) {
            return Err(BookingError::Validation(
                "Order price cannot be negative".to_string(),
            ));
        }
        self.validate_deposit(deposit)?;
        if duration_minutes == 0 {
            return Err(BookingError::Validation(
                "Order duration must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl OrderValidator for DefaultOrderValidator {
    fn validate_new_order(&self, order: &NewOrder) -> BookingResult<()> {
        if order.name.trim().is_empty() {
            return Err(BookingError::Validation(
                "Order name cannot be empty".to_string(),
            ));
        }
        let deposit = order.deposit.clone().unwrap_or_else(|| BigDecimal::from(0));
        self.validate_money_and_duration(&order.price, &deposit, order.duration_minutes)
    }

    fn validate_update(&self, update: &OrderUpdate) -> BookingResult<()> {
        if update.name.trim().is_empty() {
            return Err(BookingError::Validation(
                "Order name cannot be empty".to_string(),
            ));
        }
        self.validate_money_and_duration(&update.price, &update.deposit, update.duration_minutes)
    }

    fn validate_deposit(&self, deposit: &BigDecimal) -> BookingResult<()> {
        if *deposit < BigDecimal::from(0) {
            return Err(BookingError::Validation(
                "Deposit cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default expense validator with basic rules
pub struct DefaultExpenseValidator;

impl ExpenseValidator for DefaultExpenseValidator {
    fn validate_expense(&self, expense: &Expense) -> BookingResult<()> {
        if expense.name.trim().is_empty() {
            return Err(BookingError::Validation(
                "Expense name cannot be empty".to_string(),
            ));
        }
        if expense.amount < BigDecimal::from(0) {
            return Err(BookingError::Validation(
                "Expense amount cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}
