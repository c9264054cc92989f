//! Request handlers module

use serde::Deserialize;

pub mod employee;
pub mod event;
pub mod file;
pub mod request;
pub mod user;

/// `?ids=1,2,3` query for multi-id endpoints
#[derive(Debug, Deserialize)]
pub struct IdsQuery {
    pub ids: Option<String>,
}
