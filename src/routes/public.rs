use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a credential. User creation lives here because
/// self-registration is anonymous; the handler still resolves an optional
/// caller so a super-admin can provision elevated accounts through the same
/// endpoint.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated monitoring/load-balancer probe.
        .route("/health", get(|| async { "ok" }))
        // POST /users
        // Creates a user. Role assignment beyond Regular requires a
        // super-admin credential; everything else is gated by validation.
        .route("/users", post(handlers::create_user))
}
