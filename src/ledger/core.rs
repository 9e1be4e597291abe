//! Booking system facade coordinating clients, orders, and expenses

use bigdecimal::BigDecimal;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::BookingConfig;
use crate::ledger::{ClientLedger, NewOrder, OrderBook, OrderUpdate};
use crate::stats;
use crate::traits::*;
use crate::types::*;

/// Main booking system that orchestrates clients, orders, expenses, and
/// the derived statistics.
///
/// All mutation operations are synchronous from the caller's point of
/// view: mutate, persist, reconcile, return. There is exactly one writer
/// per collection.
pub struct BookingSystem<S: DocumentStore, N: NotificationScheduler> {
    clients: ClientLedger<S>,
    orders: OrderBook<S, N>,
    expenses: Vec<Expense>,
    store: S,
    expense_validator: Box<dyn ExpenseValidator>,
}

impl<S: DocumentStore + Clone, N: NotificationScheduler> BookingSystem<S, N> {
    /// Create an empty booking system
    pub fn new(store: S, scheduler: N, config: BookingConfig) -> Self {
        Self {
            clients: ClientLedger::new(store.clone()),
            orders: OrderBook::new(store.clone(), scheduler, config),
            expenses: Vec::new(),
            store,
            expense_validator: Box::new(DefaultExpenseValidator),
        }
    }

    /// Load all collections from the store and bring them up to date.
    ///
    /// Load failures fall back to empty collections rather than failing
    /// startup. Afterwards legacy orders get their client links backfilled
    /// and client totals are rebuilt, so derived state is consistent before
    /// the first user action.
    pub async fn load(store: S, scheduler: N, config: BookingConfig) -> BookingResult<Self> {
        let clients: Vec<Client> = load_or_empty(&store, CLIENTS_COLLECTION).await;
        let orders: Vec<Order> = load_or_empty(&store, ORDERS_COLLECTION).await;
        let expenses: Vec<Expense> = load_or_empty(&store, EXPENSES_COLLECTION).await;
        info!(
            clients = clients.len(),
            orders = orders.len(),
            expenses = expenses.len(),
            "loaded collections"
        );

        let mut system = Self {
            clients: ClientLedger::with_collection(store.clone(), clients),
            orders: OrderBook::with_collection(store.clone(), scheduler, config, orders),
            expenses,
            store,
            expense_validator: Box::new(DefaultExpenseValidator),
        };

        if system.orders.migrate_client_ids(&system.clients).await? {
            debug!("client links backfilled during load");
        }
        let orders = system.orders.orders().to_vec();
        system.clients.recalculate_all(&orders).await?;

        Ok(system)
    }

    // Client operations

    /// All clients
    pub fn clients(&self) -> &[Client] {
        self.clients.clients()
    }

    /// Get a client by id
    pub fn get_client(&self, client_id: Uuid) -> Option<&Client> {
        self.clients.get(client_id)
    }

    /// Find a client by case-insensitive name
    pub fn find_client_by_name(&self, name: &str) -> Option<&Client> {
        self.clients.find_by_name(name)
    }

    /// Create a new client
    pub async fn create_client(&mut self, client: Client) -> BookingResult<Client> {
        self.clients.create(client).await
    }

    /// Update a client
    pub async fn update_client(&mut self, client: Client) -> BookingResult<()> {
        self.clients.update(client).await
    }

    /// Delete a client; their orders keep the denormalized snapshot
    pub async fn delete_client(&mut self, client_id: Uuid) -> BookingResult<()> {
        self.clients.delete(client_id).await
    }

    /// What a client still owes across their orders
    pub fn unpaid_balance(&self, client_id: Uuid) -> BookingResult<BigDecimal> {
        let client = self
            .clients
            .get(client_id)
            .ok_or_else(|| BookingError::ClientNotFound(client_id.to_string()))?;
        Ok(self.clients.unpaid_balance(client, self.orders.orders()))
    }

    /// A client's orders, id-linked or name-matched
    pub fn order_history(&self, client_id: Uuid) -> BookingResult<Vec<Order>> {
        let client = self
            .clients
            .get(client_id)
            .ok_or_else(|| BookingError::ClientNotFound(client_id.to_string()))?;
        Ok(self.clients.order_history(client, self.orders.orders()))
    }

    // Order operations

    /// All orders
    pub fn orders(&self) -> &[Order] {
        self.orders.orders()
    }

    /// Get an order by id
    pub fn get_order(&self, order_id: Uuid) -> Option<&Order> {
        self.orders.get(order_id)
    }

    /// Create an order, resolving or creating its client
    pub async fn add_order(&mut self, fields: NewOrder) -> BookingResult<Order> {
        self.orders.add(fields, &mut self.clients).await
    }

    /// Change an order's status
    pub async fn update_order_status(
        &mut self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> BookingResult<()> {
        self.orders.update_status(order_id, status).await
    }

    /// Change an order's deposit amount
    pub async fn update_order_deposit(
        &mut self,
        order_id: Uuid,
        deposit: BigDecimal,
    ) -> BookingResult<()> {
        self.orders.update_deposit(order_id, deposit).await
    }

    /// Mark an order's deposit as paid or unpaid
    pub async fn set_deposit_paid(&mut self, order_id: Uuid, paid: bool) -> BookingResult<()> {
        self.orders
            .set_deposit_paid(order_id, paid, &mut self.clients)
            .await
    }

    /// Mark an order's final payment as paid or unpaid
    pub async fn set_final_payment_paid(&mut self, order_id: Uuid, paid: bool) -> BookingResult<()> {
        self.orders
            .set_final_payment_paid(order_id, paid, &mut self.clients)
            .await
    }

    /// Replace an order's mutable fields
    pub async fn update_order(&mut self, order_id: Uuid, update: OrderUpdate) -> BookingResult<Order> {
        self.orders.update(order_id, update, &mut self.clients).await
    }

    /// Delete an order
    pub async fn delete_order(&mut self, order_id: Uuid) -> BookingResult<()> {
        self.orders.delete(order_id, &mut self.clients).await
    }

    /// Delete several orders in one batch
    pub async fn delete_orders(&mut self, order_ids: &[Uuid]) -> BookingResult<()> {
        self.orders.delete_many(order_ids, &mut self.clients).await
    }

    // Expense operations

    /// All expenses
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Record a new expense
    pub async fn add_expense(&mut self, expense: Expense) -> BookingResult<Expense> {
        self.expense_validator.validate_expense(&expense)?;
        self.expenses.push(expense.clone());
        self.persist_expenses().await?;
        Ok(expense)
    }

    /// Update an expense by id
    pub async fn update_expense(&mut self, expense: Expense) -> BookingResult<()> {
        self.expense_validator.validate_expense(&expense)?;
        let index = self
            .expenses
            .iter()
            .position(|e| e.id == expense.id)
            .ok_or_else(|| BookingError::ExpenseNotFound(expense.id.to_string()))?;
        self.expenses[index] = expense;
        self.persist_expenses().await
    }

    /// Delete an expense by id
    pub async fn delete_expense(&mut self, expense_id: Uuid) -> BookingResult<()> {
        let before = self.expenses.len();
        self.expenses.retain(|e| e.id != expense_id);
        if self.expenses.len() == before {
            return Err(BookingError::ExpenseNotFound(expense_id.to_string()));
        }
        self.persist_expenses().await
    }

    // Reporting surface

    /// Monthly revenue series for the selected period
    pub fn monthly_revenue(&self, year: Option<i32>) -> Vec<stats::MonthlyRevenue> {
        stats::monthly_revenue(self.orders.orders(), year)
    }

    /// Paid amounts collected across all orders in the period
    pub fn actual_revenue(&self, year: Option<i32>) -> BigDecimal {
        stats::actual_revenue(self.orders.orders(), year)
    }

    /// Total expenses in the period
    pub fn total_expenses(&self, year: Option<i32>) -> BigDecimal {
        stats::total_expenses(&self.expenses, year)
    }

    /// Actual revenue minus total expenses for the period
    pub fn net_profit(&self, year: Option<i32>) -> BigDecimal {
        stats::net_profit(self.orders.orders(), &self.expenses, year)
    }

    /// Number of orders dated in the period, regardless of status
    pub fn order_count(&self, year: Option<i32>) -> usize {
        stats::order_count(self.orders.orders(), year)
    }

    /// Years that have orders, newest first
    pub fn available_years(&self) -> Vec<i32> {
        stats::available_years(self.orders.orders())
    }

    /// Expense totals per category for the period
    pub fn expenses_by_category(&self, year: Option<i32>) -> HashMap<ExpenseCategory, BigDecimal> {
        stats::expenses_by_category(&self.expenses, year)
    }

    async fn persist_expenses(&mut self) -> BookingResult<()> {
        save_collection(&mut self.store, EXPENSES_COLLECTION, &self.expenses).await
    }
}
