use crate::{AppState, handlers, resources::ResourceKind};
use axum::{
    Router,
    extract::State,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints consumed by the marketing site itself. Mounted under `/api`.
pub fn public_routes() -> Router<AppState> {
    let router = Router::new()
        // POST /auth/login, /auth/register
        // Token issuance. Register only succeeds while no admin account exists.
        .route("/auth/login", post(handlers::login))
        .route("/auth/register", post(handlers::register))
        // POST /contact
        // The contact form. Stored unread in the admin inbox.
        .route("/contact", post(handlers::create_contact_message))
        // GET /page-content?page=about
        .route("/page-content", get(handlers::list_page_content))
        // GET/PUT /page-content/{key}
        // PUT requires a bearer token; the handler takes `AuthUser` directly.
        .route(
            "/page-content/{key}",
            get(handlers::get_page_content).put(handlers::put_page_content),
        );

    // GET /services, /testimonials, /gallery, /stats, /values, /contact-info
    ResourceKind::ALL.into_iter().fold(router, |router, kind| {
        router.route(
            &format!("/{}", kind.segment()),
            get(move |State(state): State<AppState>| handlers::list_public(state, kind)),
        )
    })
}
