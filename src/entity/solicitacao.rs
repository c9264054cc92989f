//! Equipment request entity
//!
//! Table: solicitacao

use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::entity::prelude::*;
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

/// Status given to every new request
pub const STATUS_REQUESTED: &str = "solicitado";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "solicitacao")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id_solic: i32,

    /// Creation time
    pub dt_solic: NaiveDateTime,

    #[sea_orm(column_type = "String(Some(512))")]
    pub motivo: String,

    /// Free text; `solicitado` until approved or rejected
    #[sea_orm(column_type = "String(Some(32))")]
    pub status: String,

    pub funcionarios_id_func: i32,

    /// Delivery address
    #[sea_orm(column_type = "String(Some(256))", nullable)]
    pub endereco: Option<String>,

    /// Expected delivery date
    pub prev_entrega: Option<NaiveDate>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A request with its equipment list flattened to one string
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct RequestSummary {
    pub id_funcionario: i32,
    pub id_solicitacao: i32,
    pub data_solicitacao: NaiveDateTime,
    pub motivo_solicitacao: String,
    pub status_solicitacao: String,
    pub data_prevista_entrega: Option<NaiveDate>,
    /// e.g. `"1x Monitor, 2x Notebook"`
    pub equipamentos_solicitados: String,
}
