use crate::{handlers, AppState};
use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        // Users
        .route("/api/users", post(handlers::register_handler))
        .route(
            "/api/users/authenticate",
            post(handlers::authenticate_handler),
        )
        .route("/api/users/{id}/balance", get(handlers::balance_handler))
        // Entries
        .route(
            "/api/entries",
            get(handlers::search_entries_handler).post(handlers::create_entry_handler),
        )
        .route(
            "/api/entries/{id}",
            get(handlers::get_entry_handler)
                .put(handlers::update_entry_handler)
                .delete(handlers::delete_entry_handler),
        )
        .route(
            "/api/entries/{id}/status",
            put(handlers::update_status_handler),
        )
        // Layers
        .layer(middleware::from_fn(add_security_headers))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn add_security_headers(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );

    response
}
