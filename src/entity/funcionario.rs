//! Employee entity
//!
//! Table: funcionarios

use sea_orm::entity::prelude::*;
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "funcionarios")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id_func: i32,

    #[sea_orm(column_type = "String(Some(64))")]
    pub nome: String,

    #[sea_orm(column_type = "String(Some(64))")]
    pub sobrenome: String,

    #[sea_orm(column_type = "String(Some(128))", nullable)]
    pub email: Option<String>,

    /// Leader (another employee)
    pub id_lider: Option<i32>,

    /// Owning user account
    pub usuarios_id_user: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Led employee, as listed for a leader
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct Subordinate {
    pub id_func: i32,
    pub nome_completo: String,
    pub email: Option<String>,
}
