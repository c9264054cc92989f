//! Entity module - SeaORM entity definitions
//!
//! One module per table. Events have no entity; their rows are returned as
//! free-form JSON.

pub mod arquivo;
pub mod funcionario;
pub mod solic_equip;
pub mod solicitacao;
pub mod usuario;
