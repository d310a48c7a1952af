use std::sync::Arc;

use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware::from_fn,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::{handler::*, middleware::mw_log_request, AppState};

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let origin = match app_state.config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(e) => {
            warn!("Invalid CORS origin, allowing any: {e}");
            AllowOrigin::any()
        }
    };

    // Configure CORS settings for the application
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([ACCEPT, CONTENT_TYPE]);

    Router::new()
        .route("/", get(health_checker_handler))
        .route("/books", get(get_books).post(create_book))
        .route("/books/:id", put(update_book).delete(delete_book))
        .route("/tasks", get(get_tasks).post(create_task))
        .route("/tasks/reorder", post(reorder_tasks))
        .route("/tasks/countdown", get(get_countdown))
        .route("/tasks/:id", axum::routing::delete(delete_task))
        .route("/tasks/:id/toggle", patch(toggle_task))
        .route("/theme", get(get_theme).put(set_theme))
        .route("/theme/toggle", post(toggle_theme))
        .route("/contact", post(submit_contact))
        .route("/contact/validate", post(validate_contact))
        .route("/contact/status", get(contact_status))
        .route("/users", get(get_users))
        .route("/users/reload", post(get_users))
        .route("/blog/enhance", post(enhance_page))
        .layer(from_fn(mw_log_request))
        .layer(cors)
        .with_state(app_state)
}
