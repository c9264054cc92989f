//! Request/equipment join entity
//!
//! Table: solic_equip

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "solic_equip")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub solic_id_solic: i32,

    #[sea_orm(primary_key, auto_increment = false)]
    pub equip_id_equip: i32,

    pub quantidade: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
