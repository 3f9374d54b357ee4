use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{CreateUserRequest, ReplaceUserRequest, UpdateUserRequest, UserOut, UserPage},
};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

// --- Filter Structs ---

/// PageQuery
///
/// Accepted query parameters for the user listing endpoint (GET /users).
/// Out-of-range values are clamped by the service, not rejected.
#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    /// 1-based page number.
    pub page: Option<i64>,
    /// Page size; clamped to the configured maximum.
    pub per_page: Option<i64>,
}

// Axum renders serde failures inside a Json extractor as 422 by default; the
// API contract wants a uniform 400 for any undecodable body, including a PUT
// payload missing a required field.
fn decoded<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::DecodeFailed(rejection.body_text()))
}

// --- Handlers ---

/// list_users
///
/// [Authenticated Route] Lists users one page at a time. Only Admin and
/// SuperAdmin callers pass the access policy; Regular callers receive 401.
#[utoipa::path(
    get,
    path = "/users",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of users", body = UserPage),
        (status = 401, description = "Caller may not list users")
    )
)]
pub async fn list_users(
    caller: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<PageQuery>,
) -> Result<Json<UserPage>, ApiError> {
    let page = state
        .service
        .list(&caller, filter.page, filter.per_page)
        .await?;
    Ok(Json(page))
}

/// get_user
///
/// [Authenticated Route] Fetches a single user. Allowed for the record's owner
/// and for SuperAdmins; authorization is checked before existence, so outsiders
/// cannot distinguish 404 from 401.
#[utoipa::path(
    get,
    path = "/users/{user_id}",
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Found", body = UserOut),
        (status = 401, description = "Not self and not super-admin"),
        (status = 404, description = "No such user")
    )
)]
pub async fn get_user(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserOut>, ApiError> {
    let user = state.service.get(&caller, user_id).await?;
    Ok(Json(user))
}

/// create_user
///
/// [Public Route] Creates a new user. Anonymous callers self-register with the
/// Regular role; assigning an elevated role requires a SuperAdmin credential on
/// the request. The raw password is hashed before storage and never echoed.
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Created", body = UserOut),
        (status = 400, description = "Validation failed; body lists every field error"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn create_user(
    caller: Option<AuthUser>,
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserOut>), ApiError> {
    let req = decoded(payload)?;
    let user = state.service.create(caller.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// patch_user
///
/// [Authenticated Route] Sparse update: only fields present in the body are
/// merged. A non-super-admin supplying a changed `role` value has the whole
/// request rejected with 401.
#[utoipa::path(
    patch,
    path = "/users/{user_id}",
    params(("user_id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = UserOut),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Not permitted"),
        (status = 404, description = "No such user")
    )
)]
pub async fn patch_user(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserOut>, ApiError> {
    let req = decoded(payload)?;
    let user = state.service.patch(&caller, user_id, req).await?;
    Ok(Json(user))
}

/// replace_user
///
/// [Authenticated Route] Full replacement: the body must carry every field, so
/// omitting one is a 400 rather than "leave unchanged". Role rules match the
/// PATCH path.
#[utoipa::path(
    put,
    path = "/users/{user_id}",
    params(("user_id" = Uuid, Path, description = "User ID")),
    request_body = ReplaceUserRequest,
    responses(
        (status = 200, description = "Replaced", body = UserOut),
        (status = 400, description = "Missing field or validation failed"),
        (status = 401, description = "Not permitted"),
        (status = 404, description = "No such user")
    )
)]
pub async fn replace_user(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    payload: Result<Json<ReplaceUserRequest>, JsonRejection>,
) -> Result<Json<UserOut>, ApiError> {
    let req = decoded(payload)?;
    let user = state.service.replace(&caller, user_id, req).await?;
    Ok(Json(user))
}

/// delete_user
///
/// [Authenticated Route] Removes a user record. Self-service or SuperAdmin
/// only; authorization precedes the existence check.
#[utoipa::path(
    delete,
    path = "/users/{user_id}",
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Not permitted"),
        (status = 404, description = "No such user")
    )
)]
pub async fn delete_user(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.service.delete(&caller, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
