//! Ledger module containing client reconciliation and order lifecycle

pub mod clients;
pub mod core;
pub mod orders;

pub use clients::*;
pub use core::*;
pub use orders::*;
