use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Every route here requires a resolved `AuthUser`; the router is wrapped in
/// the auth middleware layer in `create_router`, and each handler additionally
/// consults the access policy for the specific (caller, target, operation)
/// triple. Role checks are therefore never implied by routing alone.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /users?page=&perPage=
        // Pages through all users. The access policy restricts this to Admin
        // and SuperAdmin callers.
        .route("/users", get(handlers::list_users))
        // GET/PATCH/PUT/DELETE /users/{user_id}
        // Per-record operations: self-service or SuperAdmin only. PATCH merges
        // sparse payloads, PUT requires a complete one.
        .route(
            "/users/{user_id}",
            get(handlers::get_user)
                .patch(handlers::patch_user)
                .put(handlers::replace_user)
                .delete(handlers::delete_user),
        )
}
