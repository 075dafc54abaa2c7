//! Upper bounds on stored amounts and counts.
//!
//! Aggregates are summed over every stored record, so each value is capped
//! well below the range of its type.

use rust_decimal::Decimal;

use crate::error::{DomainError, DomainResult};

/// Largest monetary amount a single record may carry (one trillion).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Largest quantity a single record may carry.
pub const MAX_QUANTITY: i64 = 1_000_000_000;

/// Reject `amount` above [`MAX_AMOUNT`] with `message`.
pub fn cap_amount(amount: Decimal, message: &str) -> DomainResult<Decimal> {
    if amount > MAX_AMOUNT {
        return Err(DomainError::validation(message));
    }
    Ok(amount)
}

/// Reject `quantity` above [`MAX_QUANTITY`] with `message`.
pub fn cap_quantity(quantity: i64, message: &str) -> DomainResult<i64> {
    if quantity > MAX_QUANTITY {
        return Err(DomainError::validation(message));
    }
    Ok(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_amount_is_one_trillion() {
        assert_eq!(MAX_AMOUNT, Decimal::from(1_000_000_000_000i64));
    }

    #[test]
    fn caps_are_inclusive() {
        assert_eq!(cap_amount(MAX_AMOUNT, "too large").unwrap(), MAX_AMOUNT);
        let err = cap_amount(MAX_AMOUNT + Decimal::new(1, 2), "too large").unwrap_err();
        assert_eq!(err.message(), "too large");

        assert_eq!(cap_quantity(MAX_QUANTITY, "too many").unwrap(), MAX_QUANTITY);
        assert!(cap_quantity(i64::MAX, "too many").is_err());
    }
}
