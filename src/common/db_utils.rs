// src/common/db_utils.rs

use rust_decimal::Decimal;

use crate::common::error::AppError;

/// Largest magnitude a `NUMERIC(18, 2)` money column holds: 9999999999999999.99.
pub const MAX_MONEY: Decimal = Decimal::from_parts(0xA763_FFFF, 0x0DE0_B6B3, 0, false, 2);

/// Largest magnitude a `NUMERIC(18, 3)` quantity column holds: 999999999999999.999.
pub const MAX_QTY: Decimal = Decimal::from_parts(0xA763_FFFF, 0x0DE0_B6B3, 0, false, 3);

/// True when the store rejected a write because of a unique constraint.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}

/// Converts a unique-constraint violation into a tagged `Conflict`, leaving any
/// other store error untouched.
pub(crate) fn conflict_on_unique(
    code: &'static str,
    message: &'static str,
) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        if is_unique_violation(&e) {
            return AppError::Conflict { code, message: message.to_string() };
        }
        e.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_bounds_match_their_numeric_precision() {
        assert_eq!(MAX_MONEY, "9999999999999999.99".parse::<Decimal>().unwrap());
        assert_eq!(MAX_QTY, "999999999999999.999".parse::<Decimal>().unwrap());
    }
}
