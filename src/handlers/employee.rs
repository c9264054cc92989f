//! Employee handlers

use axum::{
    extract::State,
    response::Json,
};
use sea_orm::{sea_query::Expr, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::entity::funcionario::{self, Subordinate};
use crate::error::{non_empty, AppResult, OptionExt};
use crate::extract::PathParam;
use crate::state::AppState;

/// GET /api/v2/funcio/:id
///
/// Looks the employee up by the id of the user account that owns it.
pub async fn get_employee_by_user(
    State(state): State<AppState>,
    PathParam(user_id): PathParam<i32>,
) -> AppResult<Json<funcionario::Model>> {
    let db = state.lease()?;

    let employee = funcionario::Entity::find()
        .filter(funcionario::Column::UsuariosIdUser.eq(user_id))
        .one(&*db)
        .await?
        .ok_or_not_found("Employee not found")?;

    Ok(Json(employee))
}

/// GET /api/v2/liderados/:id
pub async fn list_subordinates(
    State(state): State<AppState>,
    PathParam(leader_id): PathParam<i32>,
) -> AppResult<Json<Vec<Subordinate>>> {
    let db = state.lease()?;

    let rows = funcionario::Entity::find()
        .select_only()
        .column(funcionario::Column::IdFunc)
        .column_as(Expr::cust("nome || ' ' || sobrenome"), "nome_completo")
        .column(funcionario::Column::Email)
        .filter(funcionario::Column::IdLider.eq(leader_id))
        .order_by_asc(funcionario::Column::IdFunc)
        .into_model::<Subordinate>()
        .all(&*db)
        .await?;

    Ok(Json(non_empty(rows, "No subordinates found")?))
}
