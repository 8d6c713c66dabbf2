//! Listing filters parsed from query strings.
//!
//! A filter compiles to one WHERE fragment whose conditions are joined with
//! AND, plus the parameters for its placeholders in order. The memory backend
//! evaluates the same conditions through `matches`.

pub mod company;
pub mod job;

use std::collections::HashMap;

use crate::schemas::ValidationErrors;

pub use company::CompanyFilter;
pub use job::JobFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterParam {
    Text(String),
    Integer(i32),
}

/// WHERE fragment (empty, or starting with " WHERE ") and its parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlFragment {
    pub sql: String,
    pub params: Vec<FilterParam>,
}

/// Accumulates AND-ed conditions and numbers placeholders as they are added.
#[derive(Debug, Default)]
pub(crate) struct WhereBuilder {
    conditions: Vec<String>,
    params: Vec<FilterParam>,
}

impl WhereBuilder {
    /// `template` uses `{}` for the placeholder of `param`.
    pub fn push(&mut self, template: &str, param: FilterParam) {
        self.params.push(param);
        let placeholder = format!("${}", self.params.len());
        self.conditions.push(template.replace("{}", &placeholder));
    }

    pub fn push_raw(&mut self, condition: &str) {
        self.conditions.push(condition.to_string());
    }

    pub fn build(self) -> SqlFragment {
        if self.conditions.is_empty() {
            return SqlFragment::default();
        }
        SqlFragment {
            sql: format!(" WHERE {}", self.conditions.join(" AND ")),
            params: self.params,
        }
    }
}

/// `%term%` for ILIKE, with the pattern metacharacters in `term` escaped.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Pulls the query parameters a filter understands, reporting unknown keys.
pub(crate) struct QueryReader<'a> {
    query: &'a HashMap<String, String>,
    pub errors: ValidationErrors,
}

impl<'a> QueryReader<'a> {
    pub fn new(query: &'a HashMap<String, String>, allowed: &[&str]) -> Self {
        let mut errors = ValidationErrors::new();
        for key in query.keys() {
            if !allowed.contains(&key.as_str()) {
                errors.add(key.as_str(), "is not a supported filter");
            }
        }
        Self { query, errors }
    }

    /// Non-empty text value.
    pub fn text(&self, key: &str) -> Option<String> {
        self.query
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn non_negative(&mut self, key: &str) -> Option<i32> {
        let raw = self.query.get(key)?;
        match raw.trim().parse::<i32>() {
            Ok(n) if n >= 0 => Some(n),
            _ => {
                self.errors.add(key, "must be a non-negative integer");
                None
            }
        }
    }

    pub fn boolean(&mut self, key: &str) -> Option<bool> {
        let raw = self.query.get(key)?;
        match raw.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => {
                self.errors.add(key, "must be true or false");
                None
            }
        }
    }
}
