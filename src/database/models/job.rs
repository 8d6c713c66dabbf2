use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::company::CompanyJob;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    /// Decimal text, never a float.
    pub equity: Option<String>,
    pub company_handle: String,
}

impl Job {
    pub fn has_equity(&self) -> bool {
        self.equity
            .as_deref()
            .is_some_and(|e| e.chars().any(|c| matches!(c, '1'..='9')))
    }
}

impl From<Job> for CompanyJob {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            title: job.title,
            salary: job.salary,
            equity: job.equity,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<String>,
    pub company_handle: String,
}
