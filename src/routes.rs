use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

pub fn app(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(business_routes())
        .merge(review_routes())
        .merge(photo_routes())
        .merge(user_routes(state.clone()))
        // Global middleware
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn business_routes() -> Router<AppState> {
    use public::businesses;

    Router::new()
        .route("/businesses", get(businesses::list).post(businesses::create))
        .route(
            "/businesses/:businessid",
            get(businesses::get).put(businesses::update).delete(businesses::delete),
        )
}

fn review_routes() -> Router<AppState> {
    use public::reviews;

    Router::new()
        .route("/reviews", post(reviews::create))
        .route(
            "/reviews/:reviewid",
            get(reviews::get).put(reviews::update).delete(reviews::delete),
        )
}

fn photo_routes() -> Router<AppState> {
    use public::photos;

    Router::new()
        .route("/photos", post(photos::create))
        .route(
            "/photos/:photoid",
            get(photos::get).put(photos::update).delete(photos::delete),
        )
}

fn user_routes(state: AppState) -> Router<AppState> {
    // Owner-scoped reads require a bearer token
    let owner_scoped = Router::new()
        .route("/users/:userid", get(protected::users::get))
        .route("/users/:userid/businesses", get(protected::users::businesses))
        .route("/users/:userid/reviews", get(protected::users::reviews))
        .route("/users/:userid/photos", get(protected::users::photos))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    Router::new()
        .route("/users", post(public::users::create))
        .route("/users/login", post(public::users::login))
        .merge(owner_scoped)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "Business Review API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "businesses": "/businesses[?page=N], /businesses/:id (public)",
            "reviews": "/reviews, /reviews/:id (public)",
            "photos": "/photos, /photos/:id (public)",
            "users": "/users, /users/login (public)",
            "owned": "/users/:id[/businesses|/reviews|/photos] (bearer token, owner only)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.repository.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "timestamp": now, "database": "ok" })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "timestamp": now, "database": "unavailable" })),
            )
        }
    }
}
