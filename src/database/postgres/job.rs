use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;
use tracing::{debug, info};

use super::{bind_filter, is_foreign_key_violation, parse_decimal, unique_or_database, ColumnValue};
use crate::database::models::{Job, NewJob};
use crate::database::query_builder::{sql_for_partial_update, ColumnMap};
use crate::filter::JobFilter;
use crate::gateway::{check_update, no_job, GatewayError, GatewayResult, JobGateway, JOB_IMMUTABLE};

const JOB_COLUMNS: &ColumnMap = &[("companyHandle", "company_handle")];
const JOB_FIELDS: &str = "id, title, salary, equity::text AS equity, company_handle";

pub struct PgJobGateway {
    pool: PgPool,
}

impl PgJobGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn job_value(field: &str, value: &Value) -> GatewayResult<ColumnValue> {
    match field {
        "title" => ColumnValue::text(field, value),
        "salary" => ColumnValue::integer(field, value),
        "equity" => ColumnValue::decimal(field, value),
        other => Err(GatewayError::BadRequest(format!("Unknown job field: {}", other))),
    }
}

fn duplicate_job(job: &NewJob) -> String {
    format!("Duplicate job: {} at {}", job.title, job.company_handle)
}

fn no_company(handle: &str) -> GatewayError {
    GatewayError::BadRequest(format!("No company: {}", handle))
}

#[async_trait]
impl JobGateway for PgJobGateway {
    async fn create(&self, job: NewJob) -> GatewayResult<Job> {
        let company: Option<String> =
            sqlx::query_scalar("SELECT handle FROM companies WHERE handle = $1")
                .bind(&job.company_handle)
                .fetch_optional(&self.pool)
                .await?;
        if company.is_none() {
            return Err(no_company(&job.company_handle));
        }

        let duplicate: Option<i32> =
            sqlx::query_scalar("SELECT id FROM jobs WHERE title = $1 AND company_handle = $2")
                .bind(&job.title)
                .bind(&job.company_handle)
                .fetch_optional(&self.pool)
                .await?;
        if duplicate.is_some() {
            return Err(GatewayError::Duplicate(duplicate_job(&job)));
        }

        let equity = job
            .equity
            .as_deref()
            .map(|e| parse_decimal("equity", e))
            .transpose()?;

        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            JOB_FIELDS
        );
        let created = sqlx::query_as::<_, Job>(&sql)
            .bind(&job.title)
            .bind(job.salary)
            .bind(equity)
            .bind(&job.company_handle)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    no_company(&job.company_handle)
                } else {
                    unique_or_database(e, || duplicate_job(&job))
                }
            })?;

        info!("Created job {} ({}) at {}", created.id, created.title, created.company_handle);
        Ok(created)
    }

    async fn find_all(&self, filter: &JobFilter) -> GatewayResult<Vec<Job>> {
        let fragment = filter.to_sql();
        let sql = format!(
            "SELECT {} FROM jobs{} ORDER BY title COLLATE \"C\", id",
            JOB_FIELDS, fragment.sql
        );
        debug!("Job listing: {} ({} params)", sql, fragment.params.len());

        let mut q = sqlx::query_as::<_, Job>(&sql);
        for param in fragment.params {
            q = bind_filter(q, param);
        }
        Ok(q.fetch_all(&self.pool).await?)
    }

    async fn get(&self, id: i32) -> GatewayResult<Job> {
        let sql = format!("SELECT {} FROM jobs WHERE id = $1", JOB_FIELDS);
        sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| no_job(id))
    }

    async fn update(&self, id: i32, fields: Map<String, Value>) -> GatewayResult<Job> {
        check_update(&fields, JOB_IMMUTABLE)?;
        let update = sql_for_partial_update(&fields, JOB_COLUMNS)?;

        let sql = format!(
            "UPDATE jobs SET {} WHERE id = {} RETURNING {}",
            update.set_clause,
            update.next_placeholder(),
            JOB_FIELDS
        );
        debug!("Job update: {}", sql);

        let mut q = sqlx::query_as::<_, Job>(&sql);
        for (field, value) in fields.keys().zip(&update.values) {
            q = job_value(field, value)?.bind(q);
        }
        let job = q
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| unique_or_database(e, || "Duplicate job title for this company".to_string()))?
            .ok_or_else(|| no_job(id))?;

        info!("Updated job {}", job.id);
        Ok(job)
    }

    async fn remove(&self, id: i32) -> GatewayResult<()> {
        let removed: Option<i32> = sqlx::query_scalar("DELETE FROM jobs WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        if removed.is_none() {
            return Err(no_job(id));
        }

        info!("Removed job {}", id);
        Ok(())
    }
}
