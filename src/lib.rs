//! Equipdesk - REST backend for users, employees, equipment requests and files
//!
//! Each route leases one pooled connection, runs one parameterized statement
//! and maps the result to JSON.

pub mod bind;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
