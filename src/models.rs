use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// Role
///
/// The closed three-tier role model. Serialized as lowercase strings on the wire
/// ("regular", "admin", "superadmin") and stored as TEXT in the `users` table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Regular,
    Admin,
    SuperAdmin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Regular => write!(f, "regular"),
            Role::Admin => write!(f, "admin"),
            Role::SuperAdmin => write!(f, "superadmin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(Role::Regular),
            "admin" => Ok(Role::Admin),
            "superadmin" => Ok(Role::SuperAdmin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// User
///
/// The canonical identity record stored in the `users` table.
/// `id` is immutable and never reused; `email` uniquely identifies at most one user.
/// `password_hash` is write-only: it never appears in any response DTO.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// CreateUserRequest
///
/// Input payload for POST /users. The raw password is hashed before storage and
/// never persisted as-is. `role` defaults to Regular when omitted; requesting an
/// elevated role requires a super-admin caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// UpdateUserRequest
///
/// Sparse update payload for PATCH /users/{id}. Every field is `Option<T>` so that
/// "field absent" is distinguishable from "field set to empty": only keys present
/// in the JSON body are considered for merge. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// ReplaceUserRequest
///
/// Full-replace payload for PUT /users/{id}. Every field is required; a missing
/// key fails body decoding with a 400 rather than meaning "leave unchanged".
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

// --- Response Schemas (Output) ---

/// UserOut
///
/// The public projection of a user record. Deliberately omits `password_hash`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserOut {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserOut {
    fn from(user: User) -> Self {
        UserOut {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// PageInfo
///
/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

/// UserPage
///
/// Output schema for GET /users: one page of users plus pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    pub items: Vec<UserOut>,
    pub page_info: PageInfo,
}
