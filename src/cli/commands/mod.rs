pub mod ping;
pub mod token;
pub mod user;
