use axum::Router;
use axum::http::Method;
use axum::middleware;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::types::AppState;

mod auth;
mod bookmarks;
mod healthz;

const BODY_LIMIT_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let bookmark_routes = Router::new()
        .route(
            "/bookmarks",
            get(bookmarks::list_bookmarks).post(bookmarks::create_bookmark),
        )
        .route(
            "/bookmarks/:id",
            get(bookmarks::get_bookmark)
                .patch(bookmarks::update_bookmark)
                .delete(bookmarks::delete_bookmark),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_token,
        ));

    Router::new()
        .route("/healthz", get(healthz::healthz))
        .merge(bookmark_routes)
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
