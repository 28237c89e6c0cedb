use crate::{AppState, handlers, storage::MAX_UPLOAD_BYTES};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};

/// Request body cap on the upload route. Leaves room for multipart framing around a
/// file at the size limit so oversized files reach the handler's own 413 check.
const UPLOAD_BODY_LIMIT: usize = 2 * MAX_UPLOAD_BYTES;

/// Admin Router Module
///
/// Every route here is reachable only with a valid bearer token: `create_router`
/// wraps this router in the `auth_middleware` route layer before nesting it at
/// `/api/admin`. A request without a valid token never reaches a handler and has no
/// side effect.
///
/// The static segments (`messages`, `upload`) take precedence over `{resource}`.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /messages
        // The contact inbox, newest first.
        .route("/messages", get(handlers::list_messages))
        .route("/messages/{id}", delete(handlers::delete_message))
        .route("/messages/{id}/read", put(handlers::mark_message_read))
        // POST /upload
        // Multipart image upload to the object store.
        .route(
            "/upload",
            post(handlers::upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        // GET/POST /{resource}
        // Generic CRUD over the content kinds. Unknown kinds are 404.
        .route(
            "/{resource}",
            get(handlers::admin_list_resources).post(handlers::admin_create_resource),
        )
        .route(
            "/{resource}/{id}",
            put(handlers::admin_update_resource).delete(handlers::admin_delete_resource),
        )
}
