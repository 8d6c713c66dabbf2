//! Postgres implementations of the entity gateways.
//!
//! PATCH bodies arrive as JSON maps. Each value is converted to the column's
//! Rust type before binding so that Postgres sees `int4` or `numeric`
//! parameters instead of untyped text.
//!
//! Listings order text with `COLLATE "C"` so both backends sort by bytes.

mod company;
mod job;
mod user;

pub use company::PgCompanyGateway;
pub use job::PgJobGateway;
pub use user::PgUserGateway;

use std::str::FromStr;

use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::types::BigDecimal;
use sqlx::{FromRow, Postgres};

use crate::filter::FilterParam;
use crate::gateway::{GatewayError, GatewayResult};
use crate::schemas::is_valid_equity;

pub(crate) type PgQueryAs<'q, O> = QueryAs<'q, Postgres, O, PgArguments>;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// A JSON value converted to the type of the column it is written to.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ColumnValue {
    Text(Option<String>),
    Integer(Option<i32>),
    Decimal(Option<BigDecimal>),
}

impl ColumnValue {
    pub fn bind<'q, O>(self, q: PgQueryAs<'q, O>) -> PgQueryAs<'q, O>
    where
        O: for<'r> FromRow<'r, PgRow>,
    {
        match self {
            ColumnValue::Text(v) => q.bind(v),
            ColumnValue::Integer(v) => q.bind(v),
            ColumnValue::Decimal(v) => q.bind(v),
        }
    }

    pub fn text(field: &str, value: &Value) -> GatewayResult<Self> {
        match value {
            Value::Null => Ok(ColumnValue::Text(None)),
            Value::String(s) => Ok(ColumnValue::Text(Some(s.clone()))),
            _ => Err(wrong_type(field, "a string")),
        }
    }

    pub fn integer(field: &str, value: &Value) -> GatewayResult<Self> {
        match value {
            Value::Null => Ok(ColumnValue::Integer(None)),
            Value::Number(n) => n
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(|n| ColumnValue::Integer(Some(n)))
                .ok_or_else(|| wrong_type(field, "an integer")),
            _ => Err(wrong_type(field, "an integer")),
        }
    }

    pub fn decimal(field: &str, value: &Value) -> GatewayResult<Self> {
        match value {
            Value::Null => Ok(ColumnValue::Decimal(None)),
            Value::String(s) => parse_decimal(field, s).map(|d| ColumnValue::Decimal(Some(d))),
            _ => Err(wrong_type(field, "a decimal string")),
        }
    }
}

/// Equity text to `numeric`, refusing values outside 0..=1 before the
/// column's CHECK constraint can turn them into a store error.
pub(crate) fn parse_decimal(field: &str, raw: &str) -> GatewayResult<BigDecimal> {
    if !is_valid_equity(raw) {
        return Err(wrong_type(field, "a decimal string"));
    }
    BigDecimal::from_str(raw).map_err(|_| wrong_type(field, "a decimal string"))
}

pub(crate) fn bind_filter<'q, O>(q: PgQueryAs<'q, O>, param: FilterParam) -> PgQueryAs<'q, O>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match param {
        FilterParam::Text(s) => q.bind(s),
        FilterParam::Integer(n) => q.bind(n),
    }
}

fn wrong_type(field: &str, expected: &str) -> GatewayError {
    GatewayError::BadRequest(format!("{} must be {}", field, expected))
}

fn has_code(err: &sqlx::Error, code: &str) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some(code))
}

/// Maps a unique-constraint violation to `Duplicate`; the store's constraint
/// is the last word when two creates race past the explicit check.
pub(crate) fn unique_or_database(err: sqlx::Error, message: impl FnOnce() -> String) -> GatewayError {
    if has_code(&err, UNIQUE_VIOLATION) {
        GatewayError::Duplicate(message())
    } else {
        GatewayError::Database(err)
    }
}

pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    has_code(err, FOREIGN_KEY_VIOLATION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn converts_values_to_column_types() {
        assert_eq!(
            ColumnValue::integer("salary", &json!(80000)).unwrap(),
            ColumnValue::Integer(Some(80000))
        );
        assert_eq!(
            ColumnValue::integer("salary", &Value::Null).unwrap(),
            ColumnValue::Integer(None)
        );
        assert_eq!(
            ColumnValue::decimal("equity", &json!("0.25")).unwrap(),
            ColumnValue::Decimal(Some(BigDecimal::from_str("0.25").unwrap()))
        );
    }

    #[test]
    fn refuses_mismatched_types() {
        assert!(matches!(
            ColumnValue::integer("salary", &json!("lots")),
            Err(GatewayError::BadRequest(_))
        ));
        assert!(ColumnValue::integer("salary", &json!(1.5)).is_err());
        assert!(ColumnValue::integer("salary", &json!(i64::MAX)).is_err());
        assert!(ColumnValue::decimal("equity", &json!("half")).is_err());
        assert!(ColumnValue::text("title", &json!(3)).is_err());
    }

    #[test]
    fn refuses_equity_outside_unit_range() {
        for bad in ["1.5", "-0.1", "2"] {
            assert!(matches!(
                ColumnValue::decimal("equity", &json!(bad)),
                Err(GatewayError::BadRequest(_))
            ));
        }
        assert!(ColumnValue::decimal("equity", &json!("1")).is_ok());
        assert!(parse_decimal("equity", "1.0000001").is_err());
    }
}
