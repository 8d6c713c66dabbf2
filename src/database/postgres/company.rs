use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;
use tracing::{debug, info};

use super::{bind_filter, unique_or_database, ColumnValue};
use crate::database::models::{Company, CompanyDetail, CompanyJob, NewCompany};
use crate::database::query_builder::{sql_for_partial_update, ColumnMap};
use crate::filter::CompanyFilter;
use crate::gateway::{
    check_update, no_company, CompanyGateway, GatewayError, GatewayResult, COMPANY_IMMUTABLE,
};

const COMPANY_COLUMNS: &ColumnMap = &[("numEmployees", "num_employees"), ("logoUrl", "logo_url")];
const COMPANY_FIELDS: &str = "handle, name, description, num_employees, logo_url";

pub struct PgCompanyGateway {
    pool: PgPool,
}

impl PgCompanyGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn company_value(field: &str, value: &Value) -> GatewayResult<ColumnValue> {
    match field {
        "numEmployees" => ColumnValue::integer(field, value),
        "name" | "description" | "logoUrl" => ColumnValue::text(field, value),
        other => Err(GatewayError::BadRequest(format!(
            "Unknown company field: {}",
            other
        ))),
    }
}

#[async_trait]
impl CompanyGateway for PgCompanyGateway {
    async fn create(&self, company: NewCompany) -> GatewayResult<Company> {
        let duplicate: Option<String> =
            sqlx::query_scalar("SELECT handle FROM companies WHERE handle = $1")
                .bind(&company.handle)
                .fetch_optional(&self.pool)
                .await?;
        if duplicate.is_some() {
            return Err(GatewayError::Duplicate(format!(
                "Duplicate company: {}",
                company.handle
            )));
        }

        let sql = format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            COMPANY_FIELDS
        );
        let created = sqlx::query_as::<_, Company>(&sql)
            .bind(&company.handle)
            .bind(&company.name)
            .bind(&company.description)
            .bind(company.num_employees)
            .bind(&company.logo_url)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| unique_or_database(e, || format!("Duplicate company: {}", company.handle)))?;

        info!("Created company {}", created.handle);
        Ok(created)
    }

    async fn find_all(&self, filter: &CompanyFilter) -> GatewayResult<Vec<Company>> {
        let fragment = filter.to_sql();
        let sql = format!(
            "SELECT {} FROM companies{} ORDER BY name COLLATE \"C\", handle",
            COMPANY_FIELDS, fragment.sql
        );
        debug!("Company listing: {} ({} params)", sql, fragment.params.len());

        let mut q = sqlx::query_as::<_, Company>(&sql);
        for param in fragment.params {
            q = bind_filter(q, param);
        }
        Ok(q.fetch_all(&self.pool).await?)
    }

    async fn get(&self, handle: &str) -> GatewayResult<CompanyDetail> {
        let sql = format!("SELECT {} FROM companies WHERE handle = $1", COMPANY_FIELDS);
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(handle)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| no_company(handle))?;

        let jobs = sqlx::query_as::<_, CompanyJob>(
            "SELECT id, title, salary, equity::text AS equity \
             FROM jobs WHERE company_handle = $1 ORDER BY id",
        )
        .bind(handle)
        .fetch_all(&self.pool)
        .await?;

        Ok(CompanyDetail { company, jobs })
    }

    async fn update(&self, handle: &str, fields: Map<String, Value>) -> GatewayResult<Company> {
        check_update(&fields, COMPANY_IMMUTABLE)?;
        let update = sql_for_partial_update(&fields, COMPANY_COLUMNS)?;

        let sql = format!(
            "UPDATE companies SET {} WHERE handle = {} RETURNING {}",
            update.set_clause,
            update.next_placeholder(),
            COMPANY_FIELDS
        );
        debug!("Company update: {}", sql);

        let mut q = sqlx::query_as::<_, Company>(&sql);
        for (field, value) in fields.keys().zip(&update.values) {
            q = company_value(field, value)?.bind(q);
        }
        let company = q
            .bind(handle)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| no_company(handle))?;

        info!("Updated company {}", company.handle);
        Ok(company)
    }

    async fn remove(&self, handle: &str) -> GatewayResult<()> {
        let removed: Option<String> =
            sqlx::query_scalar("DELETE FROM companies WHERE handle = $1 RETURNING handle")
                .bind(handle)
                .fetch_optional(&self.pool)
                .await?;
        if removed.is_none() {
            return Err(no_company(handle));
        }

        info!("Removed company {}", handle);
        Ok(())
    }
}
