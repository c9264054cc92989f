//! Event handlers

use axum::{extract::State, response::Json};
use sea_orm::{ConnectionTrait, FromQueryResult};
use serde_json::Value as JsonValue;

use crate::bind::{parse_id_list, Binds};
use crate::error::{non_empty, AppResult};
use crate::extract::QueryParams;
use crate::handlers::IdsQuery;
use crate::state::AppState;

/// GET /api/v3/events?ids=1,2,3
///
/// Event rows are returned with whatever columns the table carries.
pub async fn list_events(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<IdsQuery>,
) -> AppResult<Json<Vec<JsonValue>>> {
    let ids = parse_id_list(query.ids.as_deref())?;
    let db = state.lease()?;

    let mut binds = Binds::new();
    let sql = format!(
        "SELECT * FROM eventos WHERE id_event IN ({}) ORDER BY id_event",
        binds.bind_all(&ids)
    );
    let stmt = binds.into_statement(db.get_database_backend(), &sql);

    let rows = JsonValue::find_by_statement(stmt).all(&*db).await?;

    Ok(Json(non_empty(rows, "No events found")?))
}
