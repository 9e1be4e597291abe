//! In-memory boundary implementations for testing and development

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::traits::*;
use crate::types::*;

/// In-memory document store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    /// Create a new memory store instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        self.collections.write().unwrap().clear();
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn load(&self, collection: &str) -> BookingResult<Option<Vec<u8>>> {
        Ok(self.collections.read().unwrap().get(collection).cloned())
    }

    async fn save(&mut self, collection: &str, data: &[u8]) -> BookingResult<()> {
        self.collections
            .write()
            .unwrap()
            .insert(collection.to_string(), data.to_vec());
        Ok(())
    }
}

/// A reminder recorded by [`MemoryScheduler`]
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledReminder {
    pub fire_at: NaiveDateTime,
    pub title: String,
    pub body: String,
}

/// Recording notification scheduler for tests.
///
/// Keeps the pending reminder per order id so tests can assert on what was
/// scheduled or cancelled.
#[derive(Debug, Clone, Default)]
pub struct MemoryScheduler {
    pending: Arc<RwLock<HashMap<Uuid, ScheduledReminder>>>,
}

impl MemoryScheduler {
    /// Create a new memory scheduler instance
    pub fn new() -> Self {
        Self::default()
    }

    /// The pending reminder for an order, if any
    pub fn pending_for(&self, order_id: Uuid) -> Option<ScheduledReminder> {
        self.pending.read().unwrap().get(&order_id).cloned()
    }

    /// Number of pending reminders
    pub fn pending_count(&self) -> usize {
        self.pending.read().unwrap().len()
    }
}

#[async_trait]
impl NotificationScheduler for MemoryScheduler {
    async fn schedule(
        &mut self,
        order_id: Uuid,
        fire_at: NaiveDateTime,
        title: &str,
        body: &str,
    ) -> BookingResult<()> {
        self.pending.write().unwrap().insert(
            order_id,
            ScheduledReminder {
                fire_at,
                title: title.to_string(),
                body: body.to_string(),
            },
        );
        Ok(())
    }

    async fn cancel(&mut self, order_id: Uuid) -> BookingResult<()> {
        // Cancelling an absent reminder is not an error
        self.pending.write().unwrap().remove(&order_id);
        Ok(())
    }

    async fn cancel_all(&mut self) -> BookingResult<()> {
        self.pending.write().unwrap().clear();
        Ok(())
    }
}
