//! Template filters.
//!
//! Filters take the piped value and any call arguments as JSON values, which
//! keeps the configuration independent of whichever template engine the host
//! bridges them into.

use serde_json::Value;

/// A named transformation usable from templates.
pub trait Filter: Send + Sync {
    /// Apply the filter to `input` with the given call arguments.
    fn apply(&self, input: &Value, args: &[Value]) -> Result<Value, FilterError>;

    /// Whether string results are markup that must not be escaped again.
    fn returns_markup(&self) -> bool {
        false
    }
}

/// Errors that can occur when applying a filter.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("Expected a sequence, got {0}")]
    NotASequence(&'static str),

    #[error("Expected a string, got {0}")]
    NotAString(&'static str),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Order(#[from] OrderError),
}

/// Errors produced when an item cannot be ordered.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderError {
    #[error("Item {index} has no `data.order` field")]
    Missing { index: usize },

    #[error("Item {index} has a non-numeric `data.order`: {found}")]
    NotNumeric { index: usize, found: String },
}

/// A record carrying a numeric `order` under its `data`.
pub trait Orderable {
    /// The raw `data.order` value, if any.
    fn order_value(&self) -> Option<&Value>;
}

impl Orderable for Value {
    fn order_value(&self) -> Option<&Value> {
        self.pointer("/data/order")
    }
}

impl<T: Orderable> Orderable for &T {
    fn order_value(&self) -> Option<&Value> {
        (**self).order_value()
    }
}

/// Return a sorted copy of `items`, ascending by numeric `data.order`.
///
/// The input is left untouched, so callers can keep using the unordered
/// sequence. Ties have no guaranteed relative order. `null` counts as missing;
/// strings are never coerced to numbers.
pub fn sort_by_order<T: Orderable + Clone>(items: &[T]) -> Result<Vec<T>, OrderError> {
    let mut keyed = items
        .iter()
        .enumerate()
        .map(|(index, item)| Ok((order_key(item, index)?, item)))
        .collect::<Result<Vec<(f64, &T)>, OrderError>>()?;

    keyed.sort_unstable_by(|(a, _), (b, _)| a.total_cmp(b));

    Ok(keyed.into_iter().map(|(_, item)| item.clone()).collect())
}

fn order_key<T: Orderable>(item: &T, index: usize) -> Result<f64, OrderError> {
    match item.order_value() {
        None | Some(Value::Null) => Err(OrderError::Missing { index }),
        Some(value) => value.as_f64().ok_or_else(|| OrderError::NotNumeric {
            index,
            found: value.to_string(),
        }),
    }
}

/// The `order` filter: `{% for doc in collections.docs | order %}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderFilter;

impl Filter for OrderFilter {
    fn apply(&self, input: &Value, _args: &[Value]) -> Result<Value, FilterError> {
        let items = input
            .as_array()
            .ok_or_else(|| FilterError::NotASequence(kind(input)))?;

        Ok(Value::Array(sort_by_order(items)?))
    }
}

/// Short name of a JSON value's type, for error messages.
pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "none",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "map",
    }
}
