//! User handlers
//!
//! Implements user CRUD operations and the login placeholder

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

use crate::entity::usuario;
use crate::error::{AppError, AppResult, OptionExt};
use crate::extract::{JsonBody, PathParam};
use crate::state::AppState;

const USER_NOT_FOUND: &str = "User not found";

/// Login names that collide with static segments under `/api/v1/users/`
const RESERVED_NAMES: &[&str] = &["login"];

/// Access level given when a create request carries none
const DEFAULT_ACCESS_LEVEL: i32 = 1;

fn default_access_level() -> i32 {
    DEFAULT_ACCESS_LEVEL
}

/// Create user request (`name`/`password` accepted for older clients)
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(alias = "name")]
    pub usuario: String,
    #[serde(alias = "password")]
    pub senha: String,
    #[serde(default = "default_access_level")]
    pub acesso: i32,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i32,
}

/// Update user request
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(alias = "password")]
    pub senha: String,
    pub nivel_acesso: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct UpdateUserResponse {
    pub id: i32,
    pub senha: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nivel_acesso: Option<i32>,
}

/// Password change request (first login)
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(alias = "password")]
    pub senha: String,
}

#[derive(Debug, Serialize)]
pub struct ChangePasswordResponse {
    pub id: i32,
    pub senha: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "name")]
    pub usuario: String,
    #[serde(alias = "password")]
    pub senha: String,
}

/// GET /api/v1/users
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<usuario::Model>>> {
    let db = state.lease()?;

    let users = usuario::Entity::find()
        .order_by_asc(usuario::Column::IdUser)
        .all(&*db)
        .await?;

    Ok(Json(users))
}

/// GET /api/users/:id
pub async fn get_user_by_id(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> AppResult<Json<usuario::Model>> {
    let db = state.lease()?;

    let user = usuario::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found(USER_NOT_FOUND)?;

    Ok(Json(user))
}

/// GET /api/v1/users/:user
pub async fn get_user_by_name(
    State(state): State<AppState>,
    PathParam(name): PathParam<String>,
) -> AppResult<Json<usuario::Model>> {
    let db = state.lease()?;

    let user = usuario::Entity::find()
        .filter(usuario::Column::Usuario.eq(name.as_str()))
        .one(&*db)
        .await?
        .ok_or_not_found(USER_NOT_FOUND)?;

    Ok(Json(user))
}

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateUserRequest>,
) -> AppResult<impl IntoResponse> {
    if RESERVED_NAMES.contains(&req.usuario.as_str()) {
        return Err(AppError::BadRequest("User name is reserved".to_string()));
    }
    let db = state.lease()?;

    let new_user = usuario::ActiveModel {
        usuario: Set(req.usuario),
        senha: Set(req.senha),
        nivel_acesso: Set(req.acesso),
        pri_login: Set(false),
        ..Default::default()
    };
    let user = new_user.insert(&*db).await?;

    tracing::info!("Created user {} ({})", user.usuario, user.id_user);
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: user.id_user })))
}

/// PUT /api/v1/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
    JsonBody(req): JsonBody<UpdateUserRequest>,
) -> AppResult<Json<UpdateUserResponse>> {
    let db = state.lease()?;

    let mut update = usuario::Entity::update_many()
        .col_expr(usuario::Column::Senha, Expr::value(req.senha.clone()));
    if let Some(level) = req.nivel_acesso {
        update = update.col_expr(usuario::Column::NivelAcesso, Expr::value(level));
    }

    let result = update
        .filter(usuario::Column::IdUser.eq(id))
        .exec(&*db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound(USER_NOT_FOUND.to_string()));
    }

    Ok(Json(UpdateUserResponse {
        id,
        senha: req.senha,
        nivel_acesso: req.nivel_acesso,
    }))
}

/// PUT /api/v1/users/login/:id
pub async fn change_password(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
    JsonBody(req): JsonBody<ChangePasswordRequest>,
) -> AppResult<Json<ChangePasswordResponse>> {
    let db = state.lease()?;

    let result = usuario::Entity::update_many()
        .col_expr(usuario::Column::Senha, Expr::value(req.senha.clone()))
        .filter(usuario::Column::IdUser.eq(id))
        .exec(&*db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound(USER_NOT_FOUND.to_string()));
    }

    Ok(Json(ChangePasswordResponse { id, senha: req.senha }))
}

/// DELETE /api/v1/users/:user
pub async fn delete_user(
    State(state): State<AppState>,
    PathParam(name): PathParam<String>,
) -> AppResult<StatusCode> {
    let db = state.lease()?;

    let result = usuario::Entity::delete_many()
        .filter(usuario::Column::Usuario.eq(name.as_str()))
        .exec(&*db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound(USER_NOT_FOUND.to_string()));
    }

    tracing::info!("Deleted user {}", name);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/users/login
///
/// Placeholder login: matches name and password, issues no session.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> AppResult<Json<usuario::Model>> {
    let db = state.lease()?;

    let user = usuario::Entity::find()
        .filter(usuario::Column::Usuario.eq(req.usuario.as_str()))
        .filter(usuario::Column::Senha.eq(req.senha.as_str()))
        .one(&*db)
        .await?;

    match user {
        Some(user) => Ok(Json(user)),
        None => {
            tracing::warn!("Login failed for user {}", req.usuario);
            Err(AppError::Unauthorized)
        }
    }
}
