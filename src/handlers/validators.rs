// src/handlers/validators.rs

use rust_decimal::Decimal;
use validator::ValidationError;

use crate::common::db_utils::{MAX_MONEY, MAX_QTY};

fn range_error(message: &'static str) -> ValidationError {
    let mut err = ValidationError::new("range");
    err.message = Some(message.into());
    err
}

fn check_money_bound(val: &Decimal) -> Result<(), ValidationError> {
    if val.abs() > MAX_MONEY {
        return Err(range_error("amount is too large"));
    }
    Ok(())
}

fn check_qty_bound(val: &Decimal) -> Result<(), ValidationError> {
    if val.abs() > MAX_QTY {
        return Err(range_error("quantity is too large"));
    }
    Ok(())
}

/// Money that may be zero (prices, discounts, costs).
pub fn not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        return Err(range_error("must not be negative"));
    }
    check_money_bound(val)
}

/// Money that must be strictly positive (payment amounts).
pub fn positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        return Err(range_error("must be greater than 0"));
    }
    check_money_bound(val)
}

pub fn positive_qty(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        return Err(range_error("must be greater than 0"));
    }
    check_qty_bound(val)
}

/// Signed stock difference.
pub fn non_zero(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_zero() {
        return Err(range_error("cannot be 0"));
    }
    check_qty_bound(val)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_rules() {
        assert!(not_negative(&Decimal::ZERO).is_ok());
        assert!(not_negative(&Decimal::new(-1, 2)).is_err());
        assert!(positive(&Decimal::new(1, 3)).is_ok());
        assert!(positive(&Decimal::ZERO).is_err());
        assert!(positive_qty(&Decimal::new(5, 1)).is_ok());
        assert!(positive_qty(&Decimal::from(-1)).is_err());
        assert!(non_zero(&Decimal::from(-3)).is_ok());
        assert!(non_zero(&Decimal::ZERO).is_err());
    }

    #[test]
    fn values_beyond_the_column_precision_are_rejected() {
        let too_much_money = MAX_MONEY + Decimal::new(1, 2);
        let too_many_units = MAX_QTY + Decimal::new(1, 3);

        assert!(not_negative(&MAX_MONEY).is_ok());
        assert!(not_negative(&too_much_money).is_err());
        assert!(positive(&too_much_money).is_err());
        assert!(positive_qty(&MAX_QTY).is_ok());
        assert!(positive_qty(&too_many_units).is_err());
        assert!(non_zero(&-too_many_units).is_err());
        assert_eq!(
            positive(&too_much_money).unwrap_err().message.as_deref(),
            Some("amount is too large")
        );
    }
}
