//! Injected configuration for the booking system
//!
//! Loaded once at startup by the host and passed into
//! [`crate::ledger::BookingSystem`]; never read ad hoc from process-wide
//! storage.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// Business identity used on invoices and messages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub tax_id: String,
}

/// Recognized configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Deposit prefilled on new orders when none is given
    #[serde(default)]
    pub default_deposit: BigDecimal,
    /// How long before a session its reminder fires
    #[serde(default = "default_lead_hours")]
    pub notification_lead_hours: i64,
    #[serde(default)]
    pub business_profile: BusinessProfile,
}

fn default_lead_hours() -> i64 {
    1
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            default_deposit: BigDecimal::from(0),
            notification_lead_hours: default_lead_hours(),
            business_profile: BusinessProfile::default(),
        }
    }
}
