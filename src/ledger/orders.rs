//! Order collection ownership, lifecycle, and reconciliation triggers

use bigdecimal::BigDecimal;
use chrono::{Duration, NaiveDateTime};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::config::BookingConfig;
use crate::ledger::ClientLedger;
use crate::traits::*;
use crate::types::*;

/// Fields for creating an order
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub name: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub client_tax_id: String,
    pub client_address: String,
    pub location: String,
    pub date: NaiveDateTime,
    pub duration_minutes: u32,
    pub price: BigDecimal,
    /// `None` falls back to the configured default deposit
    pub deposit: Option<BigDecimal>,
    pub notes: String,
}

impl NewOrder {
    /// Create order fields with the usual defaults
    pub fn new(name: String, date: NaiveDateTime, price: BigDecimal) -> Self {
        Self {
            name,
            client_name: String::new(),
            client_email: String::new(),
            client_phone: String::new(),
            client_tax_id: String::new(),
            client_address: String::new(),
            location: String::new(),
            date,
            duration_minutes: 60,
            price,
            deposit: None,
            notes: String::new(),
        }
    }

    /// Prefill order fields from a template preset
    pub fn from_template(template: &OrderTemplate, date: NaiveDateTime) -> Self {
        let mut fields = Self::new(template.name.clone(), date, template.price.clone());
        fields.duration_minutes = template.duration_minutes;
        fields.deposit = Some(template.deposit.clone());
        fields.notes = template.description.clone();
        fields
    }
}

/// Replacement values for an order's mutable fields
#[derive(Debug, Clone)]
pub struct OrderUpdate {
    pub name: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub client_tax_id: String,
    pub client_address: String,
    pub location: String,
    pub date: NaiveDateTime,
    pub duration_minutes: u32,
    pub price: BigDecimal,
    pub deposit: BigDecimal,
    pub notes: String,
}

impl OrderUpdate {
    /// Start from an order's current values, edit-form style
    pub fn from_order(order: &Order) -> Self {
        Self {
            name: order.name.clone(),
            client_name: order.client_name.clone(),
            client_email: order.client_email.clone(),
            client_phone: order.client_phone.clone(),
            client_tax_id: order.client_tax_id.clone(),
            client_address: order.client_address.clone(),
            location: order.location.clone(),
            date: order.date,
            duration_minutes: order.duration_minutes,
            price: order.price.clone(),
            deposit: order.deposit.clone(),
            notes: order.notes.clone(),
        }
    }
}

/// Owner of the order collection and its lifecycle.
///
/// The only writer of `client_id` resolution at creation time. Every money-
/// or identity-affecting mutation notifies the [`ClientLedger`] passed in
/// by the caller, always in mutate-then-persist-then-reconcile order.
pub struct OrderBook<S: DocumentStore, N: NotificationScheduler> {
    store: S,
    scheduler: N,
    config: BookingConfig,
    orders: Vec<Order>,
    validator: Box<dyn OrderValidator>,
}

impl<S: DocumentStore, N: NotificationScheduler> OrderBook<S, N> {
    /// Create an empty order book
    pub fn new(store: S, scheduler: N, config: BookingConfig) -> Self {
        Self::with_collection(store, scheduler, config, Vec::new())
    }

    /// Create an order book over an already-loaded collection
    pub fn with_collection(
        store: S,
        scheduler: N,
        config: BookingConfig,
        orders: Vec<Order>,
    ) -> Self {
        Self {
            store,
            scheduler,
            config,
            orders,
            validator: Box::new(DefaultOrderValidator),
        }
    }

    /// All orders
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Get an order by id
    pub fn get(&self, order_id: Uuid) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == order_id)
    }

    /// Create an order.
    ///
    /// Resolves `client_id` by name when a client already exists; otherwise
    /// the reconciliation pass creates one from the order's snapshot
    /// (resolve-or-create). A missing deposit falls back to the configured
    /// default.
    #[instrument(skip_all, fields(order = %fields.name, client = %fields.client_name))]
    pub async fn add(
        &mut self,
        fields: NewOrder,
        clients: &mut ClientLedger<S>,
    ) -> BookingResult<Order> {
        self.validator.validate_new_order(&fields)?;

        let client_id = clients.find_by_name(&fields.client_name).map(|c| c.id);
        let deposit = fields
            .deposit
            .unwrap_or_else(|| self.config.default_deposit.clone());

        let mut order = Order::new(fields.name, fields.date, fields.price);
        order.client_name = fields.client_name;
        order.client_id = client_id;
        order.client_email = fields.client_email;
        order.client_phone = fields.client_phone;
        order.client_tax_id = fields.client_tax_id;
        order.client_address = fields.client_address;
        order.location = fields.location;
        order.duration_minutes = fields.duration_minutes;
        order.deposit = deposit;
        order.notes = fields.notes;

        self.orders.push(order.clone());
        self.persist().await?;
        self.schedule_reminder(&order).await;
        clients.apply_order_delta(&order, false).await?;

        debug!(order_id = %order.id, "order created");
        Ok(order)
    }

    /// Change an order's status.
    ///
    /// Status alone never changes the paid amount, so there is no ledger
    /// effect; terminal statuses cancel the pending reminder.
    pub async fn update_status(&mut self, order_id: Uuid, status: OrderStatus) -> BookingResult<()> {
        let index = self.index_required(order_id)?;
        self.orders[index].status = status;
        self.persist().await?;

        if status.is_terminal() {
            self.cancel_reminder(order_id).await;
        }
        Ok(())
    }

    /// Change an order's deposit amount.
    ///
    /// Persist only: money moves when the payment flags flip, not when the
    /// requested deposit changes.
    pub async fn update_deposit(&mut self, order_id: Uuid, deposit: BigDecimal) -> BookingResult<()> {
        self.validator.validate_deposit(&deposit)?;
        let index = self.index_required(order_id)?;
        self.orders[index].deposit = deposit;
        self.persist().await
    }

    /// Mark the deposit as paid or unpaid, then rebuild client totals.
    ///
    /// A flag flip changes the paid amount in a way that is simpler to
    /// re-derive globally than to delta against possibly stale client
    /// associations.
    pub async fn set_deposit_paid(
        &mut self,
        order_id: Uuid,
        paid: bool,
        clients: &mut ClientLedger<S>,
    ) -> BookingResult<()> {
        let index = self.index_required(order_id)?;
        self.orders[index].is_deposit_paid = paid;
        self.persist().await?;
        clients.recalculate_all(&self.orders).await
    }

    /// Mark the final payment as paid or unpaid, then rebuild client totals
    pub async fn set_final_payment_paid(
        &mut self,
        order_id: Uuid,
        paid: bool,
        clients: &mut ClientLedger<S>,
    ) -> BookingResult<()> {
        let index = self.index_required(order_id)?;
        self.orders[index].is_final_payment_paid = paid;
        self.persist().await?;
        clients.recalculate_all(&self.orders).await
    }

    /// Replace an order's mutable fields.
    ///
    /// `client_id` is re-resolved only when the client name changed, by a
    /// fresh lookup on the new name; an unknown name yields `None`, never
    /// the old id. When the client identity changed, the old client gets a
    /// negative delta and the new one a positive delta; otherwise totals
    /// are rebuilt wholesale. The reminder is rescheduled either way.
    #[instrument(skip_all, fields(order_id = %order_id))]
    pub async fn update(
        &mut self,
        order_id: Uuid,
        update: OrderUpdate,
        clients: &mut ClientLedger<S>,
    ) -> BookingResult<Order> {
        self.validator.validate_update(&update)?;
        let index = self.index_required(order_id)?;
        let original = self.orders[index].clone();

        self.cancel_reminder(order_id).await;

        let mut updated = original.clone();
        updated.name = update.name;
        updated.client_name = update.client_name;
        updated.client_email = update.client_email;
        updated.client_phone = update.client_phone;
        updated.client_tax_id = update.client_tax_id;
        updated.client_address = update.client_address;
        updated.location = update.location;
        updated.date = update.date;
        updated.duration_minutes = update.duration_minutes;
        updated.price = update.price;
        updated.deposit = update.deposit;
        updated.notes = update.notes;

        if original.client_name != updated.client_name {
            updated.client_id = clients.find_by_name(&updated.client_name).map(|c| c.id);
        }

        self.orders[index] = updated.clone();
        self.persist().await?;
        self.schedule_reminder(&updated).await;

        if original.client_name != updated.client_name || original.client_id != updated.client_id {
            debug!("client identity changed, moving order between clients");
            clients.apply_order_delta(&original, true).await?;
            clients.apply_order_delta(&updated, false).await?;
        } else {
            clients.recalculate_all(&self.orders).await?;
        }

        Ok(updated)
    }

    /// Delete an order.
    ///
    /// The trailing rebuild defends against any drift a prior incremental
    /// delta may have left behind.
    #[instrument(skip_all, fields(order_id = %order_id))]
    pub async fn delete(&mut self, order_id: Uuid, clients: &mut ClientLedger<S>) -> BookingResult<()> {
        let index = self.index_required(order_id)?;

        self.cancel_reminder(order_id).await;

        let order = self.orders[index].clone();
        clients.apply_order_delta(&order, true).await?;

        self.orders.remove(index);
        self.persist().await?;
        clients.recalculate_all(&self.orders).await
    }

    /// Delete several orders, batching the persist and the trailing rebuild.
    ///
    /// Unknown ids are skipped.
    pub async fn delete_many(
        &mut self,
        order_ids: &[Uuid],
        clients: &mut ClientLedger<S>,
    ) -> BookingResult<()> {
        for &order_id in order_ids {
            let Some(index) = self.orders.iter().position(|o| o.id == order_id) else {
                continue;
            };
            self.cancel_reminder(order_id).await;
            let order = self.orders.remove(index);
            clients.apply_order_delta(&order, true).await?;
        }

        self.persist().await?;
        clients.recalculate_all(&self.orders).await
    }

    /// Backfill client links on legacy orders and persist if anything
    /// changed. Safe to run on every load.
    pub async fn migrate_client_ids(&mut self, clients: &ClientLedger<S>) -> BookingResult<bool> {
        let changed = clients.migrate_client_ids(&mut self.orders);
        if changed {
            self.persist().await?;
        }
        Ok(changed)
    }

    /// Schedule the reminder for an order's start time.
    ///
    /// Past-due fire times are silently skipped. Scheduling failures are
    /// logged but never abort the mutation, which is already persisted.
    async fn schedule_reminder(&mut self, order: &Order) {
        let fire_at = order.date - Duration::hours(self.config.notification_lead_hours);
        if fire_at <= chrono::Utc::now().naive_utc() {
            debug!(order_id = %order.id, "reminder fire time already past, not scheduling");
            return;
        }

        let body = format!("Upcoming shoot: {}", order.name);
        if let Err(err) = self
            .scheduler
            .schedule(order.id, fire_at, "Session reminder", &body)
            .await
        {
            warn!(order_id = %order.id, %err, "failed to schedule reminder");
        }
    }

    async fn cancel_reminder(&mut self, order_id: Uuid) {
        if let Err(err) = self.scheduler.cancel(order_id).await {
            warn!(%order_id, %err, "failed to cancel reminder");
        }
    }

    fn index_required(&self, order_id: Uuid) -> BookingResult<usize> {
        self.orders
            .iter()
            .position(|o| o.id == order_id)
            .ok_or_else(|| BookingError::OrderNotFound(order_id.to_string()))
    }

    async fn persist(&mut self) -> BookingResult<()> {
        save_collection(&mut self.store, ORDERS_COLLECTION, &self.orders).await
    }
}
