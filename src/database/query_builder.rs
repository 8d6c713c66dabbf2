use serde_json::{Map, Value};
use thiserror::Error;

/// Application-level field name to storage column name. Fields without an
/// entry are written under their own name.
pub type ColumnMap = [(&'static str, &'static str)];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UpdateError {
    #[error("No data")]
    Empty,
}

/// SET clause plus the values for its positional parameters, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialUpdate {
    pub set_clause: String,
    pub values: Vec<Value>,
}

impl PartialUpdate {
    /// Placeholder for the first parameter a caller appends after the
    /// update values, e.g. the key in the WHERE clause.
    pub fn next_placeholder(&self) -> String {
        format!("${}", self.values.len() + 1)
    }
}

/// Compiles a sparse update into `"col"=$1, "col2"=$2` form.
///
/// Keys are visited in map order (serde_json is built with `preserve_order`),
/// so `values[i]` always belongs to placeholder `$i+1`.
///
/// ```text
/// {firstName: "Aliya", age: 32} => "first_name"=$1, "age"=$2  ["Aliya", 32]
/// ```
pub fn sql_for_partial_update(
    fields: &Map<String, Value>,
    columns: &ColumnMap,
) -> Result<PartialUpdate, UpdateError> {
    if fields.is_empty() {
        return Err(UpdateError::Empty);
    }

    let mut set_clauses = Vec::with_capacity(fields.len());
    let mut values = Vec::with_capacity(fields.len());

    for (idx, (name, value)) in fields.iter().enumerate() {
        set_clauses.push(format!(
            "{}=${}",
            quote_identifier(column_name(name, columns)),
            idx + 1
        ));
        values.push(value.clone());
    }

    Ok(PartialUpdate {
        set_clause: set_clauses.join(", "),
        values,
    })
}

pub fn column_name<'a>(field: &'a str, columns: &'a ColumnMap) -> &'a str {
    columns
        .iter()
        .find(|(from, _)| *from == field)
        .map(|(_, to)| *to)
        .unwrap_or(field)
}

/// Quote SQL identifier to prevent injection
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
