use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;
use tracing::{debug, info, warn};

use super::{is_foreign_key_violation, unique_or_database, ColumnValue};
use crate::auth::password::{hash_password, verify_password};
use crate::database::models::{NewUser, User, UserCredentials, UserDetail};
use crate::database::query_builder::{sql_for_partial_update, ColumnMap};
use crate::gateway::{
    check_update, hash_password_field, no_job, no_user, GatewayError, GatewayResult, UserGateway,
    USER_IMMUTABLE,
};

const USER_COLUMNS: &ColumnMap = &[("firstName", "first_name"), ("lastName", "last_name")];
const USER_FIELDS: &str = "username, first_name, last_name, email, is_admin";

pub struct PgUserGateway {
    pool: PgPool,
    bcrypt_cost: u32,
}

impl PgUserGateway {
    pub fn new(pool: PgPool, bcrypt_cost: u32) -> Self {
        Self { pool, bcrypt_cost }
    }

    async fn exists(&self, username: &str) -> GatewayResult<bool> {
        let found: Option<String> =
            sqlx::query_scalar("SELECT username FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }
}

fn user_value(field: &str, value: &Value) -> GatewayResult<ColumnValue> {
    match field {
        "firstName" | "lastName" | "email" | "password" => ColumnValue::text(field, value),
        other => Err(GatewayError::BadRequest(format!("Unknown user field: {}", other))),
    }
}

#[async_trait]
impl UserGateway for PgUserGateway {
    async fn register(&self, user: NewUser) -> GatewayResult<User> {
        if self.exists(&user.username).await? {
            return Err(GatewayError::Duplicate(format!(
                "Duplicate username: {}",
                user.username
            )));
        }

        let hashed = hash_password(&user.password, self.bcrypt_cost).await?;
        let sql = format!(
            "INSERT INTO users (username, password, first_name, last_name, email, is_admin) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            USER_FIELDS
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(&user.username)
            .bind(hashed)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(user.is_admin)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| unique_or_database(e, || format!("Duplicate username: {}", user.username)))?;

        info!("Registered user {} (admin: {})", created.username, created.is_admin);
        Ok(created)
    }

    async fn authenticate(&self, username: &str, password: &str) -> GatewayResult<User> {
        let row = sqlx::query_as::<_, UserCredentials>(
            "SELECT username, password, first_name, last_name, email, is_admin \
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            if verify_password(password, &row.password).await? {
                return Ok(row.into());
            }
        }

        warn!("Failed login for {}", username);
        Err(GatewayError::InvalidCredentials)
    }

    async fn find_all(&self) -> GatewayResult<Vec<User>> {
        let sql = format!("SELECT {} FROM users ORDER BY username COLLATE \"C\"", USER_FIELDS);
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
    }

    async fn get(&self, username: &str) -> GatewayResult<UserDetail> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_FIELDS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| no_user(username))?;

        let jobs: Vec<i32> = sqlx::query_scalar(
            "SELECT job_id FROM applications WHERE username = $1 ORDER BY job_id",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(UserDetail { user, jobs })
    }

    async fn update(&self, username: &str, mut fields: Map<String, Value>) -> GatewayResult<User> {
        check_update(&fields, USER_IMMUTABLE)?;
        hash_password_field(&mut fields, self.bcrypt_cost).await?;
        let update = sql_for_partial_update(&fields, USER_COLUMNS)?;

        let sql = format!(
            "UPDATE users SET {} WHERE username = {} RETURNING {}",
            update.set_clause,
            update.next_placeholder(),
            USER_FIELDS
        );
        debug!("User update: {}", sql);

        let mut q = sqlx::query_as::<_, User>(&sql);
        for (field, value) in fields.keys().zip(&update.values) {
            q = user_value(field, value)?.bind(q);
        }
        let user = q
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| no_user(username))?;

        info!("Updated user {}", user.username);
        Ok(user)
    }

    async fn remove(&self, username: &str) -> GatewayResult<()> {
        let removed: Option<String> =
            sqlx::query_scalar("DELETE FROM users WHERE username = $1 RETURNING username")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        if removed.is_none() {
            return Err(no_user(username));
        }

        info!("Removed user {}", username);
        Ok(())
    }

    async fn apply(&self, username: &str, job_id: i32) -> GatewayResult<()> {
        if !self.exists(username).await? {
            return Err(no_user(username));
        }
        let job: Option<i32> = sqlx::query_scalar("SELECT id FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?;
        if job.is_none() {
            return Err(no_job(job_id));
        }

        sqlx::query("INSERT INTO applications (username, job_id) VALUES ($1, $2)")
            .bind(username)
            .bind(job_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    no_job(job_id)
                } else {
                    unique_or_database(e, || format!("Already applied to job: {}", job_id))
                }
            })?;

        info!("User {} applied to job {}", username, job_id);
        Ok(())
    }
}
