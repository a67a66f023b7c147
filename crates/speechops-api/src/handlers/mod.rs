pub mod auth;
pub mod health;
pub mod tables;
pub mod transcriptions;
