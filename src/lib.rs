//! Recipe and ingredient catalog service: CRUD over both, integrity rules
//! for the recipe/ingredient relationship, and "which recipes can I make
//! with what I have?".

pub mod catalog;
pub mod config;
pub mod cors;
pub mod db;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod integrity;
pub mod matcher;
pub mod models;
mod query;
pub mod schema;

pub use handlers::configure;
