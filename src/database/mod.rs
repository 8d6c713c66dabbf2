pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod query_builder;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
