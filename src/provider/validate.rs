//! Field validation shared by insert and update
//!
//! One rule table drives both paths. On insert, required columns must be
//! present; on update, only the columns actually in the payload are checked.
//! The row id is assigned by the store and never accepted from a payload.

use crate::contract::fruit_entry;
use crate::values::{ContentValues, Value};
use crate::{Error, Result};

/// Which write is being validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Insert,
    Update,
}

#[derive(Debug, Clone, Copy)]
enum Check {
    NonEmptyText,
    NonNegativeReal,
    NonNegativeInteger,
}

impl Check {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Check::NonEmptyText => value.as_string().is_some_and(|s| !s.trim().is_empty()),
            Check::NonNegativeReal => value.as_f64().is_some_and(|p| p.is_finite() && p >= 0.0),
            Check::NonNegativeInteger => value.as_i64().is_some_and(|q| q >= 0),
        }
    }
}

struct FieldRule {
    column: &'static str,
    check: Check,
    required: bool,
    message: &'static str,
}

// Columns not listed here are unconstrained, null included.
const RULES: &[FieldRule] = &[
    FieldRule {
        column: fruit_entry::NAME,
        check: Check::NonEmptyText,
        required: true,
        message: "name required",
    },
    FieldRule {
        column: fruit_entry::PRICE,
        check: Check::NonNegativeReal,
        required: true,
        message: "valid price required",
    },
    FieldRule {
        column: fruit_entry::QUANTITY,
        check: Check::NonNegativeInteger,
        required: false,
        message: "valid quantity required",
    },
];

/// Check `values` against the rule table. Fails on the first bad column.
pub fn validate(values: &ContentValues, mode: Mode) -> Result<()> {
    if values.contains_key(fruit_entry::ID) {
        return Err(Error::InvalidArgument("id cannot be written".to_string()));
    }
    for rule in RULES {
        match values.get(rule.column) {
            Some(value) if !rule.check.accepts(value) => {
                return Err(Error::InvalidArgument(rule.message.to_string()));
            }
            None if rule.required && mode == Mode::Insert => {
                return Err(Error::InvalidArgument(rule.message.to_string()));
            }
            _ => {}
        }
    }
    Ok(())
}
