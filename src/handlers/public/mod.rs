// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, read-only company and job views, service status.

pub mod auth;
pub mod companies;
pub mod jobs;
pub mod system;
