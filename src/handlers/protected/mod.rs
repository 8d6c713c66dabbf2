// handlers/protected/mod.rs - Protected handlers
//
// Every handler here names `AdminUser` or `SelfOrAdmin` as its first
// extractor; the request is refused with 401 before anything else runs.

pub mod companies;
pub mod jobs;
pub mod users;
