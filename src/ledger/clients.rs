//! Client collection ownership and ledger reconciliation

use bigdecimal::BigDecimal;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::traits::*;
use crate::types::*;

/// Single source of truth for the client collection.
///
/// Keeps each client's `total_orders` / `total_spent` synchronized with the
/// paid amounts actually collected across all orders, via the incremental
/// [`Self::apply_order_delta`] and the full rebuild
/// [`Self::recalculate_all`]. Persists the whole collection after every
/// mutating operation.
pub struct ClientLedger<S: DocumentStore> {
    store: S,
    clients: Vec<Client>,
    validator: Box<dyn ClientValidator>,
}

impl<S: DocumentStore> ClientLedger<S> {
    /// Create an empty client ledger
    pub fn new(store: S) -> Self {
        Self::with_collection(store, Vec::new())
    }

    /// Create a client ledger over an already-loaded collection
    pub fn with_collection(store: S, clients: Vec<Client>) -> Self {
        Self {
            store,
            clients,
            validator: Box::new(DefaultClientValidator),
        }
    }

    /// Create a client ledger with a custom validator
    pub fn with_validator(store: S, validator: Box<dyn ClientValidator>) -> Self {
        Self {
            store,
            clients: Vec::new(),
            validator,
        }
    }

    /// All clients
    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    /// Get a client by id
    pub fn get(&self, client_id: Uuid) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == client_id)
    }

    /// Case-insensitive exact match on the trimmed name.
    ///
    /// Duplicate names are permitted; the earliest-created client wins,
    /// with the id as the final tie-break, so resolution is deterministic.
    pub fn find_by_name(&self, name: &str) -> Option<&Client> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.clients
            .iter()
            .filter(|c| c.name.trim().to_lowercase() == needle)
            .min_by_key(|c| (c.created_date, c.id))
    }

    /// Create a new client
    pub async fn create(&mut self, client: Client) -> BookingResult<Client> {
        self.validator.validate_client(&client)?;
        self.clients.push(client.clone());
        self.persist().await?;
        Ok(client)
    }

    /// Update a client by id.
    ///
    /// The ledger fields stay reconciliation-owned: whatever totals the
    /// incoming record carries are replaced with the stored ones.
    pub async fn update(&mut self, client: Client) -> BookingResult<()> {
        self.validator.validate_client(&client)?;
        let index = self
            .index_of(client.id)
            .ok_or_else(|| BookingError::ClientNotFound(client.id.to_string()))?;

        let mut client = client;
        client.total_orders = self.clients[index].total_orders;
        client.total_spent = self.clients[index].total_spent.clone();
        self.clients[index] = client;
        self.persist().await
    }

    /// Delete a client by id.
    ///
    /// Deletion does not cascade to orders: they keep their denormalized
    /// snapshot and possibly a now-dangling `client_id`.
    pub async fn delete(&mut self, client_id: Uuid) -> BookingResult<()> {
        let before = self.clients.len();
        self.clients.retain(|c| c.id != client_id);
        if self.clients.len() == before {
            return Err(BookingError::ClientNotFound(client_id.to_string()));
        }
        self.persist().await
    }

    /// Apply one order's contribution to its client's totals.
    ///
    /// Resolves the target client by `client_id` first, then by trimmed
    /// case-insensitive name. On insert with no resolvable client and a
    /// non-empty name, a new client is synthesized from the order's contact
    /// snapshot. On delete with no resolvable client the call is a silent
    /// no-op: the order's contribution is already gone from the ledger.
    #[instrument(skip_all, fields(order_id = %order.id, is_deleting))]
    pub async fn apply_order_delta(&mut self, order: &Order, is_deleting: bool) -> BookingResult<()> {
        let paid = order.paid_amount();

        match self.resolve_order_client(order) {
            Some(index) => {
                let client = &mut self.clients[index];
                if is_deleting {
                    client.total_orders -= 1;
                    client.total_spent -= &paid;
                } else {
                    client.total_orders += 1;
                    client.total_spent += &paid;
                }
                // Totals never go below zero
                client.total_orders = client.total_orders.max(0);
                if client.total_spent < BigDecimal::from(0) {
                    client.total_spent = BigDecimal::from(0);
                }
                debug!(
                    client = %client.name,
                    total_orders = client.total_orders,
                    total_spent = %client.total_spent,
                    "applied order delta"
                );
                self.persist().await
            }
            None if !is_deleting && !order.client_name.trim().is_empty() => {
                let mut client = Client::from_order(order);
                client.total_orders = 1;
                client.total_spent = paid;
                debug!(client = %client.name, "created client from order");
                self.clients.push(client);
                self.persist().await
            }
            None => {
                if is_deleting {
                    debug!("no client resolved for deleted order, already consistent");
                } else {
                    warn!("order has no client name, nothing to reconcile");
                }
                Ok(())
            }
        }
    }

    /// Rebuild every client's totals from the given order collection.
    ///
    /// Zeroes all totals, then folds each order through the same two-tier
    /// resolution as [`Self::apply_order_delta`], accumulating only paid
    /// amounts. Deterministic and idempotent.
    #[instrument(skip_all, fields(orders = orders.len()))]
    pub async fn recalculate_all(&mut self, orders: &[Order]) -> BookingResult<()> {
        for client in &mut self.clients {
            client.total_orders = 0;
            client.total_spent = BigDecimal::from(0);
        }

        for order in orders {
            if let Some(index) = self.resolve_order_client(order) {
                let client = &mut self.clients[index];
                client.total_orders += 1;
                client.total_spent += order.paid_amount();
            }
        }

        debug!(clients = self.clients.len(), "rebuilt client totals");
        self.persist().await
    }

    /// Sum of everything this client still owes across their orders.
    ///
    /// With a deposit, the unpaid deposit and the unpaid remainder count
    /// separately; without one, the whole price counts until the final
    /// payment lands. The branches are mutually exclusive per order.
    pub fn unpaid_balance(&self, client: &Client, orders: &[Order]) -> BigDecimal {
        let zero = BigDecimal::from(0);
        let mut unpaid = BigDecimal::from(0);

        for order in orders.iter().filter(|o| o.matches_client(client)) {
            if order.deposit == zero {
                if !order.is_final_payment_paid {
                    unpaid += &order.price;
                }
            } else {
                if !order.is_deposit_paid {
                    unpaid += &order.deposit;
                }
                let remaining = order.remaining_amount();
                if remaining > zero && !order.is_final_payment_paid {
                    unpaid += remaining;
                }
            }
        }

        unpaid
    }

    /// Backfill `client_id` on orders that predate client linking.
    ///
    /// Non-destructive and idempotent, safe to run on every load. Returns
    /// whether any order changed so the caller knows to persist them.
    pub fn migrate_client_ids(&self, orders: &mut [Order]) -> bool {
        let mut changed = false;
        for order in orders.iter_mut() {
            if order.client_id.is_none() {
                if let Some(client) = self.find_by_name(&order.client_name) {
                    order.client_id = Some(client.id);
                    changed = true;
                }
            }
        }
        if changed {
            debug!("backfilled client ids on legacy orders");
        }
        changed
    }

    /// Orders belonging to this client, via the same two-tier match used
    /// for the unpaid balance
    pub fn order_history(&self, client: &Client, orders: &[Order]) -> Vec<Order> {
        orders
            .iter()
            .filter(|o| o.matches_client(client))
            .cloned()
            .collect()
    }

    /// Resolve the client an order belongs to: `client_id` match first,
    /// trimmed case-insensitive name match second. A dangling `client_id`
    /// falls through to the name fallback.
    fn resolve_order_client(&self, order: &Order) -> Option<usize> {
        if let Some(client_id) = order.client_id {
            if let Some(index) = self.clients.iter().position(|c| c.id == client_id) {
                return Some(index);
            }
        }

        let needle = order.client_name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.clients
            .iter()
            .enumerate()
            .filter(|(_, c)| c.name.trim().to_lowercase() == needle)
            .min_by_key(|(_, c)| (c.created_date, c.id))
            .map(|(index, _)| index)
    }

    fn index_of(&self, client_id: Uuid) -> Option<usize> {
        self.clients.iter().position(|c| c.id == client_id)
    }

    async fn persist(&mut self) -> BookingResult<()> {
        save_collection(&mut self.store, CLIENTS_COLLECTION, &self.clients).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_store::MemoryStore;
    use chrono::NaiveDate;

    fn ledger() -> ClientLedger<MemoryStore> {
        ClientLedger::new(MemoryStore::new())
    }

    fn order_for(client_name: &str, price: i64, deposit: i64) -> Order {
        let date = NaiveDate::from_ymd_opt(2025, 4, 12)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap();
        let mut order = Order::new("Session".to_string(), date, BigDecimal::from(price));
        order.client_name = client_name.to_string();
        order.deposit = BigDecimal::from(deposit);
        order
    }

    #[tokio::test]
    async fn find_by_name_ignores_case_and_whitespace() {
        let mut ledger = ledger();
        ledger
            .create(Client::new("Jana Nováková".to_string()))
            .await
            .unwrap();

        assert!(ledger.find_by_name("jana nováková").is_some());
        assert!(ledger.find_by_name("  Jana Nováková  ").is_some());
        assert!(ledger.find_by_name("").is_none());
        assert!(ledger.find_by_name("Jana").is_none());
    }

    #[tokio::test]
    async fn duplicate_names_resolve_to_earliest_created() {
        let mut ledger = ledger();
        let mut first = Client::new("Petr Svoboda".to_string());
        first.created_date = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let mut second = Client::new("Petr Svoboda".to_string());
        second.created_date = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();

        let first_id = first.id;
        // Insertion order deliberately newest-first
        ledger.create(second).await.unwrap();
        ledger.create(first).await.unwrap();

        assert_eq!(ledger.find_by_name("petr svoboda").unwrap().id, first_id);
    }

    #[tokio::test]
    async fn delta_synthesizes_client_from_order_snapshot() {
        let mut ledger = ledger();
        let mut order = order_for("Petr Svoboda", 18000, 2000);
        order.client_email = "petr@example.com".to_string();

        ledger.apply_order_delta(&order, false).await.unwrap();

        let client = ledger.find_by_name("Petr Svoboda").unwrap();
        assert_eq!(client.total_orders, 1);
        assert_eq!(client.total_spent, BigDecimal::from(0));
        assert_eq!(client.email, "petr@example.com");
    }

    #[tokio::test]
    async fn delta_for_unknown_client_on_delete_is_a_no_op() {
        let mut ledger = ledger();
        let order = order_for("Ghost", 1000, 0);

        ledger.apply_order_delta(&order, true).await.unwrap();
        assert!(ledger.clients().is_empty());
    }

    #[tokio::test]
    async fn totals_are_clamped_at_zero() {
        let mut ledger = ledger();
        let mut order = order_for("Petr Svoboda", 5000, 0);
        order.is_final_payment_paid = true;

        ledger.apply_order_delta(&order, false).await.unwrap();
        ledger.apply_order_delta(&order, true).await.unwrap();
        // A second delete would drive totals negative without the clamp
        ledger.apply_order_delta(&order, true).await.unwrap();

        let client = ledger.find_by_name("Petr Svoboda").unwrap();
        assert_eq!(client.total_orders, 0);
        assert_eq!(client.total_spent, BigDecimal::from(0));
    }

    #[tokio::test]
    async fn delta_prefers_client_id_and_falls_back_on_dangling_link() {
        let mut ledger = ledger();
        let linked = ledger
            .create(Client::new("Petr Svoboda".to_string()))
            .await
            .unwrap();

        let mut order = order_for("Petr Svoboda", 6000, 0);
        order.client_id = Some(Uuid::new_v4()); // dangling
        ledger.apply_order_delta(&order, false).await.unwrap();

        // The dangling id fell back to the name match
        assert_eq!(ledger.get(linked.id).unwrap().total_orders, 1);
    }

    #[tokio::test]
    async fn recalculate_rebuilds_and_is_idempotent() {
        let mut ledger = ledger();
        ledger
            .create(Client::new("Petr Svoboda".to_string()))
            .await
            .unwrap();

        let mut paid = order_for("Petr Svoboda", 18000, 2000);
        paid.is_deposit_paid = true;
        let unpaid = order_for("Petr Svoboda", 3500, 0);
        let orders = vec![paid, unpaid];

        ledger.recalculate_all(&orders).await.unwrap();
        let after_first: Vec<Client> = ledger.clients().to_vec();

        ledger.recalculate_all(&orders).await.unwrap();
        assert_eq!(ledger.clients(), &after_first[..]);

        let client = ledger.find_by_name("Petr Svoboda").unwrap();
        assert_eq!(client.total_orders, 2);
        assert_eq!(client.total_spent, BigDecimal::from(2000));
    }

    #[tokio::test]
    async fn unpaid_balance_covers_all_three_branches() {
        let mut ledger = ledger();
        let client = ledger
            .create(Client::new("Petr Svoboda".to_string()))
            .await
            .unwrap();

        // Unpaid deposit and unpaid remainder
        let with_deposit = order_for("Petr Svoboda", 18000, 2000);
        // No deposit, final payment outstanding
        let no_deposit = order_for("Petr Svoboda", 3500, 0);
        // Fully settled
        let mut settled = order_for("Petr Svoboda", 5000, 1000);
        settled.is_deposit_paid = true;
        settled.is_final_payment_paid = true;

        let orders = vec![with_deposit, no_deposit, settled];
        assert_eq!(
            ledger.unpaid_balance(&client, &orders),
            BigDecimal::from(18000 + 3500)
        );
    }

    #[tokio::test]
    async fn unpaid_balance_with_paid_deposit_counts_only_remainder() {
        let mut ledger = ledger();
        let client = ledger
            .create(Client::new("Petr Svoboda".to_string()))
            .await
            .unwrap();

        let mut order = order_for("Petr Svoboda", 18000, 2000);
        order.is_deposit_paid = true;
        assert_eq!(
            ledger.unpaid_balance(&client, &[order]),
            BigDecimal::from(16000)
        );
    }

    #[tokio::test]
    async fn migrate_backfills_ids_and_is_idempotent() {
        let mut ledger = ledger();
        let client = ledger
            .create(Client::new("Jana Nováková".to_string()))
            .await
            .unwrap();

        let mut orders = vec![order_for("jana nováková", 5000, 0), order_for("Ghost", 1000, 0)];

        assert!(ledger.migrate_client_ids(&mut orders));
        assert_eq!(orders[0].client_id, Some(client.id));
        assert_eq!(orders[1].client_id, None);

        // Nothing left to backfill
        assert!(!ledger.migrate_client_ids(&mut orders));
    }

    #[tokio::test]
    async fn update_preserves_reconciliation_owned_totals() {
        let mut ledger = ledger();
        let client = ledger
            .create(Client::new("Petr Svoboda".to_string()))
            .await
            .unwrap();

        let mut order = order_for("Petr Svoboda", 5000, 0);
        order.is_final_payment_paid = true;
        ledger.apply_order_delta(&order, false).await.unwrap();

        // An edited record carrying stale totals cannot override the ledger
        let mut edited = ledger.get(client.id).unwrap().clone();
        edited.notes = "Prefers outdoor shoots".to_string();
        edited.total_orders = 99;
        edited.total_spent = BigDecimal::from(1);
        ledger.update(edited).await.unwrap();

        let stored = ledger.get(client.id).unwrap();
        assert_eq!(stored.notes, "Prefers outdoor shoots");
        assert_eq!(stored.total_orders, 1);
        assert_eq!(stored.total_spent, BigDecimal::from(5000));
    }

    #[tokio::test]
    async fn delete_missing_client_is_an_error() {
        let mut ledger = ledger();
        let result = ledger.delete(Uuid::new_v4()).await;
        assert!(matches!(result, Err(BookingError::ClientNotFound(_))));
    }
}
