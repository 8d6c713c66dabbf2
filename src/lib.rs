pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod handlers;
pub mod middleware;
pub mod schemas;
pub mod state;

pub use api::router;
pub use gateway::Store;
pub use state::AppState;
