use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode, Uri},
    middleware as axum_middleware,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Router,
};
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

mod auth;
mod config;
mod database;
mod error;
mod handlers;
mod middleware;
mod services;
mod state;
mod validation;

use config::{AppConfig, SecurityConfig};
use error::ApiError;
use state::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    tracing::info!("Starting kanban API in {:?} mode", config.environment);

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| panic!("DATABASE_URL must be set"));

    let pool = database::connect(&database_url, &config.database)
        .await
        .unwrap_or_else(|e| panic!("failed to connect to database: {}", e));

    let port = config.server.port;
    let state = AppState::new(pool, config);
    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("kanban API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/api/health", get(health))
        .route("/api/auth/register", post(handlers::public::auth::register))
        .route("/api/auth/login", post(handlers::public::auth::login))
        // Everything else sits behind the auth middleware
        .merge(protected_routes(state.clone()))
        .fallback(not_found)
        // Global middleware
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::timeout_middleware,
        ))
        .layer(cors_layer(&state.config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::{auth, boards, cards, lists, users};

    Router::new()
        // Session and profile
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/profile", put(auth::update_profile))
        // Boards and membership
        .route("/api/boards", get(boards::index).post(boards::create))
        .route(
            "/api/boards/:id",
            get(boards::show).put(boards::update).delete(boards::delete),
        )
        .route("/api/boards/:id/members", post(boards::add_member))
        .route(
            "/api/boards/:id/members/:memberId",
            delete(boards::remove_member),
        )
        // Lists
        .route("/api/lists/board/:boardId", get(lists::by_board))
        .route("/api/lists", post(lists::create))
        .route("/api/lists/:id", put(lists::update).delete(lists::delete))
        .route("/api/lists/:id/reorder", put(lists::reorder))
        // Cards, comments, search
        .route("/api/cards/list/:listId", get(cards::by_list))
        .route("/api/cards/search", get(cards::search))
        .route("/api/cards", post(cards::create))
        .route("/api/cards/:id", put(cards::update).delete(cards::delete))
        .route("/api/cards/:id/move", put(cards::move_card))
        .route("/api/cards/:id/comments", post(cards::add_comment))
        // Users
        .route("/api/users/search", get(users::search))
        .route("/api/users/profile", put(users::update_profile))
        .route("/api/users/preferences", put(users::update_preferences))
        .route("/api/users/stats", get(users::stats))
        .route("/api/users/account", delete(users::delete_account))
        .route("/api/users/:id", get(users::show))
        .layer(axum_middleware::from_fn_with_state(
            state,
            middleware::auth_middleware,
        ))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match database::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Server is running",
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "message": "Server degraded",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "databaseError": e.to_string()
                }
            })),
        ),
    }
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("Route {} not found", uri.path()))
}
