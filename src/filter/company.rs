use std::collections::HashMap;

use super::{contains_ignore_case, contains_pattern, FilterParam, QueryReader, SqlFragment, WhereBuilder};
use crate::database::models::Company;
use crate::schemas::ValidationErrors;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyFilter {
    /// Case-insensitive substring of the company name.
    pub name: Option<String>,
    pub min_employees: Option<i32>,
    pub max_employees: Option<i32>,
}

impl CompanyFilter {
    pub fn from_query(query: &HashMap<String, String>) -> Result<Self, ValidationErrors> {
        let mut reader = QueryReader::new(query, &["name", "minEmployees", "maxEmployees"]);

        let filter = Self {
            name: reader.text("name"),
            min_employees: reader.non_negative("minEmployees"),
            max_employees: reader.non_negative("maxEmployees"),
        };

        if let (Some(min), Some(max)) = (filter.min_employees, filter.max_employees) {
            if min > max {
                reader
                    .errors
                    .add("minEmployees", "cannot be greater than maxEmployees");
            }
        }

        reader.errors.into_result().map(|_| filter)
    }

    pub fn to_sql(&self) -> SqlFragment {
        let mut builder = WhereBuilder::default();
        if let Some(name) = &self.name {
            builder.push("name ILIKE {}", FilterParam::Text(contains_pattern(name)));
        }
        if let Some(min) = self.min_employees {
            builder.push("num_employees >= {}", FilterParam::Integer(min));
        }
        if let Some(max) = self.max_employees {
            builder.push("num_employees <= {}", FilterParam::Integer(max));
        }
        builder.build()
    }

    pub fn matches(&self, company: &Company) -> bool {
        self.name
            .as_deref()
            .map_or(true, |name| contains_ignore_case(&company.name, name))
            && self.min_employees.map_or(true, |min| company.num_employees >= min)
            && self.max_employees.map_or(true, |max| company.num_employees <= max)
    }
}
