//! # Booking Core
//!
//! A booking and billing core for freelance photographers, providing
//! client ledger reconciliation, order lifecycle management, and financial
//! statistics.
//!
//! ## Features
//!
//! - **Client ledger**: per-client order counts and spend totals kept
//!   consistent with the payments actually collected across all orders
//! - **Order lifecycle**: creation, editing, status changes, deposit and
//!   final-payment tracking, with reminder notifications at the boundary
//! - **Two-tier client matching**: id link first, case-insensitive name
//!   fallback for legacy orders that predate client linking
//! - **Financial statistics**: period-bucketed revenue, expense, and
//!   profit rollups recomputed on demand
//! - **Storage abstraction**: backend-agnostic design with a trait-based
//!   document store
//!
//! ## Quick Start
//!
//! ```rust
//! use booking_core::utils::{MemoryScheduler, MemoryStore};
//! use booking_core::{BookingConfig, BookingSystem};
//!
//! # async fn run() -> booking_core::BookingResult<()> {
//! let store = MemoryStore::new();
//! let scheduler = MemoryScheduler::new();
//! let system = BookingSystem::load(store, scheduler, BookingConfig::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod ledger;
pub mod stats;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use ledger::*;
pub use traits::*;
pub use types::*;
