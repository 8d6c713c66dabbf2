//! Entity gateways: the data-access contract for companies, jobs and users.
//!
//! Every storage backend implements these traits with identical semantics;
//! handlers only ever see `Store`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;
use thiserror::Error;

use crate::auth::password::{hash_password, PasswordError};
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::memory::MemoryStore;
use crate::database::models::{
    Company, CompanyDetail, Job, NewCompany, NewJob, NewUser, User, UserDetail,
};
use crate::database::postgres::{PgCompanyGateway, PgJobGateway, PgUserGateway};
use crate::database::query_builder::UpdateError;
use crate::filter::{CompanyFilter, JobFilter};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    EmptyUpdate(#[from] UpdateError),

    #[error("Invalid username/password")]
    InvalidCredentials,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[async_trait]
pub trait CompanyGateway: Send + Sync {
    /// Fails with `Duplicate` when the handle is taken.
    async fn create(&self, company: NewCompany) -> GatewayResult<Company>;

    /// Ordered by name; every supplied filter must hold.
    async fn find_all(&self, filter: &CompanyFilter) -> GatewayResult<Vec<Company>>;

    /// Includes the company's jobs.
    async fn get(&self, handle: &str) -> GatewayResult<CompanyDetail>;

    async fn update(&self, handle: &str, fields: Map<String, Value>) -> GatewayResult<Company>;

    /// Cascades to the company's jobs and their applications.
    async fn remove(&self, handle: &str) -> GatewayResult<()>;
}

#[async_trait]
pub trait JobGateway: Send + Sync {
    /// Fails with `Duplicate` when (title, companyHandle) already exists and
    /// with `BadRequest` when the company does not.
    async fn create(&self, job: NewJob) -> GatewayResult<Job>;

    /// Ordered by title, then id.
    async fn find_all(&self, filter: &JobFilter) -> GatewayResult<Vec<Job>>;

    async fn get(&self, id: i32) -> GatewayResult<Job>;

    /// `id` and `companyHandle` are immutable.
    async fn update(&self, id: i32, fields: Map<String, Value>) -> GatewayResult<Job>;

    async fn remove(&self, id: i32) -> GatewayResult<()>;
}

#[async_trait]
pub trait UserGateway: Send + Sync {
    /// Hashes the password and stores the user. `Duplicate` on a taken username.
    async fn register(&self, user: NewUser) -> GatewayResult<User>;

    /// `InvalidCredentials` for an unknown user or a wrong password alike.
    async fn authenticate(&self, username: &str, password: &str) -> GatewayResult<User>;

    /// Ordered by username.
    async fn find_all(&self) -> GatewayResult<Vec<User>>;

    /// Includes the ids of jobs applied to.
    async fn get(&self, username: &str) -> GatewayResult<UserDetail>;

    /// A `password` field is hashed before it is written.
    async fn update(&self, username: &str, fields: Map<String, Value>) -> GatewayResult<User>;

    async fn remove(&self, username: &str) -> GatewayResult<()>;

    /// `NotFound` if the user or job is missing, `Duplicate` on a repeat.
    async fn apply(&self, username: &str, job_id: i32) -> GatewayResult<()>;
}

pub const COMPANY_IMMUTABLE: &[&str] = &["handle"];
pub const JOB_IMMUTABLE: &[&str] = &["id", "companyHandle"];
pub const USER_IMMUTABLE: &[&str] = &["username"];

/// Shared pre-write checks for `update`: immutable keys are refused before
/// anything touches the store, then an empty update is refused.
pub fn check_update(fields: &Map<String, Value>, immutable: &[&str]) -> GatewayResult<()> {
    if immutable.iter().any(|key| fields.contains_key(*key)) {
        return Err(GatewayError::BadRequest(format!(
            "Cannot update {}",
            immutable.join(" or ")
        )));
    }
    if fields.is_empty() {
        return Err(UpdateError::Empty.into());
    }
    Ok(())
}

/// Replaces a plain `password` value with its bcrypt hash, in place.
pub async fn hash_password_field(fields: &mut Map<String, Value>, cost: u32) -> GatewayResult<()> {
    let plain = match fields.get("password") {
        None => return Ok(()),
        Some(Value::String(plain)) => plain.clone(),
        Some(_) => return Err(GatewayError::BadRequest("password must be a string".to_string())),
    };
    let hashed = hash_password(&plain, cost).await?;
    fields.insert("password".to_string(), Value::String(hashed));
    Ok(())
}

pub fn no_company(handle: &str) -> GatewayError {
    GatewayError::NotFound(format!("No company: {}", handle))
}

pub fn no_job(id: i32) -> GatewayError {
    GatewayError::NotFound(format!("No job with id of: {}", id))
}

pub fn no_user(username: &str) -> GatewayError {
    GatewayError::NotFound(format!("No user: {}", username))
}

#[derive(Clone)]
pub enum Backend {
    Postgres(PgPool),
    Memory,
}

/// The three gateways of one backend, shared by every request.
#[derive(Clone)]
pub struct Store {
    pub companies: Arc<dyn CompanyGateway>,
    pub jobs: Arc<dyn JobGateway>,
    pub users: Arc<dyn UserGateway>,
    backend: Backend,
}

impl Store {
    pub fn postgres(pool: PgPool, bcrypt_cost: u32) -> Self {
        Self {
            companies: Arc::new(PgCompanyGateway::new(pool.clone())),
            jobs: Arc::new(PgJobGateway::new(pool.clone())),
            users: Arc::new(PgUserGateway::new(pool.clone(), bcrypt_cost)),
            backend: Backend::Postgres(pool),
        }
    }

    pub fn memory(bcrypt_cost: u32) -> Self {
        Self::from_memory(MemoryStore::new(bcrypt_cost))
    }

    pub fn from_memory(store: MemoryStore) -> Self {
        Self {
            companies: Arc::new(store.clone()),
            jobs: Arc::new(store.clone()),
            users: Arc::new(store),
            backend: Backend::Memory,
        }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        match &self.backend {
            Backend::Postgres(pool) => DatabaseManager::health_check(pool).await,
            Backend::Memory => Ok(()),
        }
    }
}
