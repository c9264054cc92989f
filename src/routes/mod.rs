use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{employee, event, file, request, user};
use crate::state::AppState;

pub mod health;


/// `/api/v1`: user accounts
fn v1_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(user::list_users).post(user::create_user))
        .route("/users/login", post(user::login))
        .route("/users/login/:id", put(user::change_password))
        // `:user` is a login name for GET/DELETE and a numeric id for PUT
        .route(
            "/users/:user",
            get(user::get_user_by_name)
                .put(user::update_user)
                .delete(user::delete_user),
        )
}

/// `/api/v2`: employees and equipment requests
fn v2_routes() -> Router<AppState> {
    Router::new()
        .route("/funcio/:id", get(employee::get_employee_by_user))
        .route("/liderados/:id", get(employee::list_subordinates))
        .route("/solic/:id", get(request::list_requests))
        .route("/solic2/:id", get(request::list_request_summaries))
        .route("/solicAprov", get(request::list_pending_approvals))
        .route("/solicitacao", post(request::create_request))
        .route("/solicitacao/equipamentos", post(request::add_request_equipment))
        .route("/solicitacao/:id", put(request::update_request_status))
}

/// `/api/v3`: events
fn v3_routes() -> Router<AppState> {
    Router::new().route("/events", get(event::list_events))
}

/// Unversioned blob storage routes
fn file_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/upload",
            post(file::upload_file).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/list-files", get(file::list_files))
        .route("/download/:id", get(file::download_file))
}

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/users/:id", get(user::get_user_by_id))
        .nest("/api/v1", v1_routes())
        .nest("/api/v2", v2_routes())
        .nest("/api/v3", v3_routes())
        .merge(file_routes(state.config.max_upload_size))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
