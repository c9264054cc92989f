//! Equipment request handlers
//!
//! Request listing, the equipment-per-request aggregation, creation,
//! approval and equipment lines.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

use crate::bind::{parse_id_list, Binds};
use crate::entity::solicitacao::{self, RequestSummary, STATUS_REQUESTED};
use crate::entity::solic_equip;
use crate::error::{non_empty, AppError, AppResult};
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::handlers::IdsQuery;
use crate::state::AppState;

/// Shared projection for the equipment-per-request aggregation.
///
/// `{filter}` is replaced by the WHERE clause. Every non-aggregated column
/// is part of the GROUP BY.
const SUMMARY_SQL: &str = r#"
SELECT
    s.funcionarios_id_func AS id_funcionario,
    s.id_solic AS id_solicitacao,
    s.dt_solic AS data_solicitacao,
    s.motivo AS motivo_solicitacao,
    s.status AS status_solicitacao,
    s.prev_entrega AS data_prevista_entrega,
    string_agg(se.quantidade || 'x ' || e.nome, ', ' ORDER BY e.nome) AS equipamentos_solicitados
FROM solicitacao s
JOIN solic_equip se ON s.id_solic = se.solic_id_solic
JOIN equipamentos e ON se.equip_id_equip = e.id_equip
WHERE {filter}
GROUP BY
    s.funcionarios_id_func,
    s.id_solic,
    s.dt_solic,
    s.motivo,
    s.status,
    s.prev_entrega
"#;

pub(crate) fn summary_sql(filter: &str) -> String {
    SUMMARY_SQL.replace("{filter}", filter)
}

/// Create request body
#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    pub motivo: String,
    #[serde(rename = "idFuncio")]
    pub id_funcio: i32,
    pub endereco: Option<String>,
    #[serde(rename = "prevEntrega")]
    pub prev_entrega: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct CreatedRequest {
    pub id: i32,
}

/// Approval body; `aprovacao` becomes the new status
#[derive(Debug, Deserialize)]
pub struct ApprovalBody {
    pub aprovacao: String,
}

#[derive(Debug, Serialize)]
pub struct ApprovalResponse {
    pub id: i32,
    pub aprovacao: String,
}

/// Equipment line body
#[derive(Debug, Deserialize, Serialize)]
pub struct EquipmentLine {
    #[serde(rename = "solicID")]
    pub solic_id: i32,
    #[serde(rename = "equipID")]
    pub equip_id: i32,
    #[serde(rename = "Qdte")]
    pub quantidade: i32,
}

/// GET /api/v2/solic/:id
pub async fn list_requests(
    State(state): State<AppState>,
    PathParam(employee_id): PathParam<i32>,
) -> AppResult<Json<Vec<solicitacao::Model>>> {
    let db = state.lease()?;

    let rows = solicitacao::Entity::find()
        .filter(solicitacao::Column::FuncionariosIdFunc.eq(employee_id))
        .order_by_desc(solicitacao::Column::IdSolic)
        .all(&*db)
        .await?;

    Ok(Json(non_empty(rows, "No requests found")?))
}

/// GET /api/v2/solic2/:id
pub async fn list_request_summaries(
    State(state): State<AppState>,
    PathParam(employee_id): PathParam<i32>,
) -> AppResult<Json<Vec<RequestSummary>>> {
    let db = state.lease()?;

    let mut binds = Binds::new();
    let employee = binds.bind(employee_id);
    let sql = summary_sql(&format!("s.funcionarios_id_func = {}", employee));
    let stmt = binds.into_statement(db.get_database_backend(), &sql);

    let rows = RequestSummary::find_by_statement(stmt).all(&*db).await?;

    Ok(Json(non_empty(rows, "No requests found")?))
}

/// GET /api/v2/solicAprov?ids=1,2,3
///
/// Pending requests of every listed employee, for a leader's approval queue.
pub async fn list_pending_approvals(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<IdsQuery>,
) -> AppResult<Json<Vec<RequestSummary>>> {
    let ids = parse_id_list(query.ids.as_deref())?;
    let db = state.lease()?;

    let mut binds = Binds::new();
    let status = binds.bind(STATUS_REQUESTED);
    let employees = binds.bind_all(&ids);
    let sql = summary_sql(&format!(
        "s.status = {} AND s.funcionarios_id_func IN ({})",
        status, employees
    ));
    tracing::debug!(ids = ids.len(), "Querying pending approvals");
    let stmt = binds.into_statement(db.get_database_backend(), &sql);

    let rows = RequestSummary::find_by_statement(stmt).all(&*db).await?;

    Ok(Json(non_empty(rows, "No pending requests found")?))
}

/// POST /api/v2/solicitacao
pub async fn create_request(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateRequestBody>,
) -> AppResult<impl IntoResponse> {
    let db = state.lease()?;

    let new_request = solicitacao::ActiveModel {
        dt_solic: Set(Utc::now().naive_utc()),
        motivo: Set(req.motivo),
        status: Set(STATUS_REQUESTED.to_string()),
        funcionarios_id_func: Set(req.id_funcio),
        endereco: Set(req.endereco),
        prev_entrega: Set(req.prev_entrega),
        ..Default::default()
    };
    let created = new_request.insert(&*db).await?;

    tracing::info!(
        "Created request {} for employee {}",
        created.id_solic,
        created.funcionarios_id_func
    );
    Ok((StatusCode::CREATED, Json(CreatedRequest { id: created.id_solic })))
}

/// PUT /api/v2/solicitacao/:id
pub async fn update_request_status(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
    JsonBody(req): JsonBody<ApprovalBody>,
) -> AppResult<Json<ApprovalResponse>> {
    let db = state.lease()?;

    let result = solicitacao::Entity::update_many()
        .col_expr(solicitacao::Column::Status, Expr::value(req.aprovacao.clone()))
        .filter(solicitacao::Column::IdSolic.eq(id))
        .exec(&*db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Request not found".to_string()));
    }

    Ok(Json(ApprovalResponse {
        id,
        aprovacao: req.aprovacao,
    }))
}

/// POST /api/v2/solicitacao/equipamentos
pub async fn add_request_equipment(
    State(state): State<AppState>,
    JsonBody(line): JsonBody<EquipmentLine>,
) -> AppResult<impl IntoResponse> {
    let db = state.lease()?;

    let row = solic_equip::ActiveModel {
        solic_id_solic: Set(line.solic_id),
        equip_id_equip: Set(line.equip_id),
        quantidade: Set(line.quantidade),
    };
    let saved = row.insert(&*db).await?;

    Ok((
        StatusCode::CREATED,
        Json(EquipmentLine {
            solic_id: saved.solic_id_solic,
            equip_id: saved.equip_id_equip,
            quantidade: saved.quantidade,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_groups_by_every_plain_column() {
        let sql = summary_sql("s.funcionarios_id_func = $1");
        assert!(sql.contains("WHERE s.funcionarios_id_func = $1"));
        assert!(sql.contains("ORDER BY e.nome"));
        let group_by = sql.split("GROUP BY").nth(1).unwrap();
        for column in [
            "s.funcionarios_id_func",
            "s.id_solic",
            "s.dt_solic",
            "s.motivo",
            "s.status",
            "s.prev_entrega",
        ] {
            assert!(group_by.contains(column), "missing {}", column);
        }
    }
}
