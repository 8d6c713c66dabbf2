use std::collections::HashMap;

use super::{contains_ignore_case, contains_pattern, FilterParam, QueryReader, SqlFragment, WhereBuilder};
use crate::database::models::Job;
use crate::schemas::ValidationErrors;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub title: Option<String>,
    pub min_salary: Option<i32>,
    /// Only `true` narrows the result; `false` is the same as absent.
    pub has_equity: bool,
}

impl JobFilter {
    pub fn from_query(query: &HashMap<String, String>) -> Result<Self, ValidationErrors> {
        let mut reader = QueryReader::new(query, &["title", "minSalary", "hasEquity"]);

        let filter = Self {
            title: reader.text("title"),
            min_salary: reader.non_negative("minSalary"),
            has_equity: reader.boolean("hasEquity").unwrap_or(false),
        };

        reader.errors.into_result().map(|_| filter)
    }

    pub fn to_sql(&self) -> SqlFragment {
        let mut builder = WhereBuilder::default();
        if let Some(title) = &self.title {
            builder.push("title ILIKE {}", FilterParam::Text(contains_pattern(title)));
        }
        if let Some(min) = self.min_salary {
            builder.push("salary >= {}", FilterParam::Integer(min));
        }
        if self.has_equity {
            builder.push_raw("equity > 0");
        }
        builder.build()
    }

    pub fn matches(&self, job: &Job) -> bool {
        self.title
            .as_deref()
            .map_or(true, |title| contains_ignore_case(&job.title, title))
            && self
                .min_salary
                .map_or(true, |min| job.salary.is_some_and(|salary| salary >= min))
            && (!self.has_equity || job.has_equity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(title: &str, salary: Option<i32>, equity: Option<&str>) -> Job {
        Job {
            id: 1,
            title: title.to_string(),
            salary,
            equity: equity.map(str::to_string),
            company_handle: "c1".to_string(),
        }
    }

    #[test]
    fn compiles_salary_and_equity() {
        let filter = JobFilter {
            title: None,
            min_salary: Some(50000),
            has_equity: true,
        };
        let fragment = filter.to_sql();
        assert_eq!(fragment.sql, " WHERE salary >= $1 AND equity > 0");
        assert_eq!(fragment.params, vec![FilterParam::Integer(50000)]);
    }

    #[test]
    fn null_salary_never_meets_a_minimum() {
        let filter = JobFilter {
            min_salary: Some(1),
            ..Default::default()
        };
        assert!(!filter.matches(&job("eng", None, None)));
        assert!(filter.matches(&job("eng", Some(1), None)));
    }

    #[test]
    fn has_equity_false_adds_nothing() {
        let query: HashMap<String, String> =
            [("hasEquity".to_string(), "false".to_string())].into();
        let filter = JobFilter::from_query(&query).unwrap();
        assert!(filter.to_sql().sql.is_empty());
        assert!(filter.matches(&job("eng", None, Some("0"))));
    }

    #[test]
    fn rejects_non_boolean_equity_flag() {
        let query: HashMap<String, String> =
            [("hasEquity".to_string(), "maybe".to_string())].into();
        assert!(JobFilter::from_query(&query).unwrap_err().contains("hasEquity"));
    }
}
