//! In-process storage backend.
//!
//! Mirrors the Postgres gateways row for row: same ordering, same duplicate
//! and existence checks, same cascades. Used by the test suite and by
//! `STORAGE_BACKEND=memory` for running without a database.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::database::models::{
    Company, CompanyDetail, CompanyJob, Job, NewCompany, NewJob, NewUser, User, UserCredentials,
    UserDetail,
};
use crate::filter::{CompanyFilter, JobFilter};
use crate::gateway::{
    check_update, hash_password_field, no_company, no_job, no_user, CompanyGateway, GatewayError,
    GatewayResult, JobGateway, UserGateway, COMPANY_IMMUTABLE, JOB_IMMUTABLE, USER_IMMUTABLE,
};
use crate::schemas::is_valid_equity;

#[derive(Debug, Default)]
struct Tables {
    companies: BTreeMap<String, Company>,
    jobs: BTreeMap<i32, Job>,
    users: BTreeMap<String, UserCredentials>,
    /// (username, job id)
    applications: BTreeSet<(String, i32)>,
    last_job_id: i32,
}

impl Tables {
    fn next_job_id(&mut self) -> i32 {
        self.last_job_id += 1;
        self.last_job_id
    }

    fn remove_job(&mut self, id: i32) -> Option<Job> {
        let job = self.jobs.remove(&id)?;
        self.applications.retain(|(_, job_id)| *job_id != id);
        Some(job)
    }

    fn has_job_titled(&self, title: &str, company_handle: &str, except: Option<i32>) -> bool {
        self.jobs.values().any(|job| {
            job.title == title && job.company_handle == company_handle && Some(job.id) != except
        })
    }
}

#[derive(Debug, Clone)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    bcrypt_cost: u32,
}

impl MemoryStore {
    pub fn new(bcrypt_cost: u32) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            bcrypt_cost,
        }
    }
}

fn text(field: &str, value: &Value) -> GatewayResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(wrong_type(field, "a string")),
    }
}

fn required_text(field: &str, value: &Value) -> GatewayResult<String> {
    text(field, value)?.ok_or_else(|| wrong_type(field, "a string"))
}

fn integer(field: &str, value: &Value) -> GatewayResult<Option<i32>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| wrong_type(field, "an integer")),
        _ => Err(wrong_type(field, "an integer")),
    }
}

fn equity(field: &str, value: &Value) -> GatewayResult<Option<String>> {
    match text(field, value)? {
        Some(e) if !is_valid_equity(&e) => Err(wrong_type(field, "a decimal string")),
        other => Ok(other),
    }
}

fn wrong_type(field: &str, expected: &str) -> GatewayError {
    GatewayError::BadRequest(format!("{} must be {}", field, expected))
}

fn unknown_field(entity: &str, field: &str) -> GatewayError {
    GatewayError::BadRequest(format!("Unknown {} field: {}", entity, field))
}

fn apply_company_fields(company: &mut Company, fields: &Map<String, Value>) -> GatewayResult<()> {
    for (field, value) in fields {
        match field.as_str() {
            "name" => company.name = required_text(field, value)?,
            "description" => company.description = required_text(field, value)?,
            "numEmployees" => {
                company.num_employees =
                    integer(field, value)?.ok_or_else(|| wrong_type(field, "an integer"))?
            }
            "logoUrl" => company.logo_url = text(field, value)?,
            other => return Err(unknown_field("company", other)),
        }
    }
    Ok(())
}

fn apply_job_fields(job: &mut Job, fields: &Map<String, Value>) -> GatewayResult<()> {
    for (field, value) in fields {
        match field.as_str() {
            "title" => job.title = required_text(field, value)?,
            "salary" => job.salary = integer(field, value)?,
            "equity" => job.equity = equity(field, value)?,
            other => return Err(unknown_field("job", other)),
        }
    }
    Ok(())
}

fn apply_user_fields(user: &mut UserCredentials, fields: &Map<String, Value>) -> GatewayResult<()> {
    for (field, value) in fields {
        match field.as_str() {
            "firstName" => user.first_name = required_text(field, value)?,
            "lastName" => user.last_name = required_text(field, value)?,
            "email" => user.email = required_text(field, value)?,
            "password" => user.password = required_text(field, value)?,
            other => return Err(unknown_field("user", other)),
        }
    }
    Ok(())
}

#[async_trait]
impl CompanyGateway for MemoryStore {
    async fn create(&self, company: NewCompany) -> GatewayResult<Company> {
        let mut tables = self.tables.write().await;
        if tables.companies.contains_key(&company.handle) {
            return Err(GatewayError::Duplicate(format!(
                "Duplicate company: {}",
                company.handle
            )));
        }

        let created = Company {
            handle: company.handle,
            name: company.name,
            description: company.description,
            num_employees: company.num_employees,
            logo_url: company.logo_url,
        };
        tables
            .companies
            .insert(created.handle.clone(), created.clone());

        info!("Created company {}", created.handle);
        Ok(created)
    }

    async fn find_all(&self, filter: &CompanyFilter) -> GatewayResult<Vec<Company>> {
        let tables = self.tables.read().await;
        let mut companies: Vec<Company> = tables
            .companies
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        companies.sort_by(|a, b| a.name.cmp(&b.name));
        debug!("Company listing matched {} rows", companies.len());
        Ok(companies)
    }

    async fn get(&self, handle: &str) -> GatewayResult<CompanyDetail> {
        let tables = self.tables.read().await;
        let company = tables
            .companies
            .get(handle)
            .cloned()
            .ok_or_else(|| no_company(handle))?;

        // BTreeMap iteration is already ordered by id.
        let jobs: Vec<CompanyJob> = tables
            .jobs
            .values()
            .filter(|job| job.company_handle == handle)
            .cloned()
            .map(CompanyJob::from)
            .collect();

        Ok(CompanyDetail { company, jobs })
    }

    async fn update(&self, handle: &str, fields: Map<String, Value>) -> GatewayResult<Company> {
        check_update(&fields, COMPANY_IMMUTABLE)?;
        let mut tables = self.tables.write().await;
        let stored = tables
            .companies
            .get(handle)
            .ok_or_else(|| no_company(handle))?;

        let mut company = stored.clone();
        apply_company_fields(&mut company, &fields)?;
        tables.companies.insert(handle.to_string(), company.clone());

        info!("Updated company {}", handle);
        Ok(company)
    }

    async fn remove(&self, handle: &str) -> GatewayResult<()> {
        let mut tables = self.tables.write().await;
        if tables.companies.remove(handle).is_none() {
            return Err(no_company(handle));
        }

        let owned: Vec<i32> = tables
            .jobs
            .values()
            .filter(|job| job.company_handle == handle)
            .map(|job| job.id)
            .collect();
        for id in owned {
            tables.remove_job(id);
        }

        info!("Removed company {}", handle);
        Ok(())
    }
}

#[async_trait]
impl JobGateway for MemoryStore {
    async fn create(&self, job: NewJob) -> GatewayResult<Job> {
        let mut tables = self.tables.write().await;
        if !tables.companies.contains_key(&job.company_handle) {
            return Err(GatewayError::BadRequest(format!(
                "No company: {}",
                job.company_handle
            )));
        }
        if tables.has_job_titled(&job.title, &job.company_handle, None) {
            return Err(GatewayError::Duplicate(format!(
                "Duplicate job: {} at {}",
                job.title, job.company_handle
            )));
        }
        if let Some(e) = &job.equity {
            if !is_valid_equity(e) {
                return Err(wrong_type("equity", "a decimal string"));
            }
        }

        let created = Job {
            id: tables.next_job_id(),
            title: job.title,
            salary: job.salary,
            equity: job.equity,
            company_handle: job.company_handle,
        };
        tables.jobs.insert(created.id, created.clone());

        info!("Created job {} ({}) at {}", created.id, created.title, created.company_handle);
        Ok(created)
    }

    async fn find_all(&self, filter: &JobFilter) -> GatewayResult<Vec<Job>> {
        let tables = self.tables.read().await;
        let mut jobs: Vec<Job> = tables
            .jobs
            .values()
            .filter(|job| filter.matches(job))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        debug!("Job listing matched {} rows", jobs.len());
        Ok(jobs)
    }

    async fn get(&self, id: i32) -> GatewayResult<Job> {
        let tables = self.tables.read().await;
        tables.jobs.get(&id).cloned().ok_or_else(|| no_job(id))
    }

    async fn update(&self, id: i32, fields: Map<String, Value>) -> GatewayResult<Job> {
        check_update(&fields, JOB_IMMUTABLE)?;
        let mut tables = self.tables.write().await;
        let mut job = tables.jobs.get(&id).cloned().ok_or_else(|| no_job(id))?;
        apply_job_fields(&mut job, &fields)?;

        if tables.has_job_titled(&job.title, &job.company_handle, Some(id)) {
            return Err(GatewayError::Duplicate(
                "Duplicate job title for this company".to_string(),
            ));
        }
        tables.jobs.insert(id, job.clone());

        info!("Updated job {}", id);
        Ok(job)
    }

    async fn remove(&self, id: i32) -> GatewayResult<()> {
        let mut tables = self.tables.write().await;
        tables.remove_job(id).ok_or_else(|| no_job(id))?;

        info!("Removed job {}", id);
        Ok(())
    }
}

#[async_trait]
impl UserGateway for MemoryStore {
    async fn register(&self, user: NewUser) -> GatewayResult<User> {
        if self.tables.read().await.users.contains_key(&user.username) {
            return Err(GatewayError::Duplicate(format!(
                "Duplicate username: {}",
                user.username
            )));
        }

        // Hash outside the lock.
        let password = hash_password(&user.password, self.bcrypt_cost).await?;

        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.username) {
            return Err(GatewayError::Duplicate(format!(
                "Duplicate username: {}",
                user.username
            )));
        }
        let row = UserCredentials {
            username: user.username,
            password,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            is_admin: user.is_admin,
        };
        tables.users.insert(row.username.clone(), row.clone());

        let created = User::from(row);
        info!("Registered user {} (admin: {})", created.username, created.is_admin);
        Ok(created)
    }

    async fn authenticate(&self, username: &str, password: &str) -> GatewayResult<User> {
        let row = self.tables.read().await.users.get(username).cloned();

        if let Some(row) = row {
            if verify_password(password, &row.password).await? {
                return Ok(row.into());
            }
        }

        warn!("Failed login for {}", username);
        Err(GatewayError::InvalidCredentials)
    }

    async fn find_all(&self) -> GatewayResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().cloned().map(User::from).collect())
    }

    async fn get(&self, username: &str) -> GatewayResult<UserDetail> {
        let tables = self.tables.read().await;
        let user = tables
            .users
            .get(username)
            .cloned()
            .map(User::from)
            .ok_or_else(|| no_user(username))?;

        let jobs: Vec<i32> = tables
            .applications
            .iter()
            .filter(|(applicant, _)| applicant == username)
            .map(|(_, job_id)| *job_id)
            .collect();

        Ok(UserDetail { user, jobs })
    }

    async fn update(&self, username: &str, mut fields: Map<String, Value>) -> GatewayResult<User> {
        check_update(&fields, USER_IMMUTABLE)?;
        if !self.tables.read().await.users.contains_key(username) {
            return Err(no_user(username));
        }
        hash_password_field(&mut fields, self.bcrypt_cost).await?;

        let mut tables = self.tables.write().await;
        let mut row = tables
            .users
            .get(username)
            .cloned()
            .ok_or_else(|| no_user(username))?;
        apply_user_fields(&mut row, &fields)?;
        tables.users.insert(username.to_string(), row.clone());

        info!("Updated user {}", username);
        Ok(row.into())
    }

    async fn remove(&self, username: &str) -> GatewayResult<()> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(username).is_none() {
            return Err(no_user(username));
        }
        tables
            .applications
            .retain(|(applicant, _)| applicant != username);

        info!("Removed user {}", username);
        Ok(())
    }

    async fn apply(&self, username: &str, job_id: i32) -> GatewayResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(username) {
            return Err(no_user(username));
        }
        if !tables.jobs.contains_key(&job_id) {
            return Err(no_job(job_id));
        }
        if !tables.applications.insert((username.to_string(), job_id)) {
            return Err(GatewayError::Duplicate(format!(
                "Already applied to job: {}",
                job_id
            )));
        }

        info!("User {} applied to job {}", username, job_id);
        Ok(())
    }
}
