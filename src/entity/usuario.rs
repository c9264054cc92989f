//! User entity
//!
//! Table: usuarios
//!
//! Passwords are stored and compared in plain text. This is a known defect
//! of the schema; `senha` is never serialized in responses.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "usuarios")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id_user: i32,

    /// Login name
    #[sea_orm(column_type = "String(Some(64))")]
    pub usuario: String,

    /// Password (plain text)
    #[sea_orm(column_type = "String(Some(128))")]
    #[serde(skip_serializing)]
    pub senha: String,

    /// Access level
    pub nivel_acesso: i32,

    /// Set until the user changes the initial password
    pub pri_login: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
