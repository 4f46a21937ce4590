pub mod auth;
pub mod export;
pub mod households;
pub mod summary;
