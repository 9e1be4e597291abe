//! Validation utilities

use bigdecimal::BigDecimal;

use crate::ledger::{NewOrder, OrderUpdate};
use crate::traits::*;
use crate::types::*;

/// Validate that a required name is non-empty
pub fn validate_required_name(name: &str, what: &str) -> BookingResult<()> {
    if name.trim().is_empty() {
        Err(BookingError::Validation(format!(
            "{what} name cannot be empty"
        )))
    } else {
        Ok(())
    }
}

/// Validate that a name fits the storage and display limits
pub fn validate_name_length(name: &str, what: &str) -> BookingResult<()> {
    if name.len() > 100 {
        Err(BookingError::Validation(format!(
            "{what} name cannot exceed 100 characters"
        )))
    } else {
        Ok(())
    }
}

/// Validate that a monetary amount is not negative
pub fn validate_non_negative_amount(amount: &BigDecimal, what: &str) -> BookingResult<()> {
    if *amount < BigDecimal::from(0) {
        Err(BookingError::Validation(format!(
            "{what} cannot be negative"
        )))
    } else {
        Ok(())
    }
}

/// Validate that a session duration is positive
pub fn validate_positive_duration(duration_minutes: u32) -> BookingResult<()> {
    if duration_minutes == 0 {
        Err(BookingError::Validation(
            "Duration must be positive".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Enhanced order validator with length limits on top of the basic rules
pub struct EnhancedOrderValidator;

impl OrderValidator for EnhancedOrderValidator {
    fn validate_new_order(&self, order: &NewOrder) -> BookingResult<()> {
        DefaultOrderValidator.validate_new_order(order)?;
        validate_name_length(&order.name, "Order")?;
        validate_name_length(&order.client_name, "Client")?;
        Ok(())
    }

    fn validate_update(&self, update: &OrderUpdate) -> BookingResult<()> {
        DefaultOrderValidator.validate_update(update)?;
        validate_name_length(&update.name, "Order")?;
        validate_name_length(&update.client_name, "Client")?;
        Ok(())
    }

    fn validate_deposit(&self, deposit: &BigDecimal) -> BookingResult<()> {
        DefaultOrderValidator.validate_deposit(deposit)
    }
}

/// Enhanced client validator with length limits on top of the basic rules
pub struct EnhancedClientValidator;

impl ClientValidator for EnhancedClientValidator {
    fn validate_client(&self, client: &Client) -> BookingResult<()> {
        DefaultClientValidator.validate_client(client)?;
        validate_name_length(&client.name, "Client")?;
        Ok(())
    }
}
