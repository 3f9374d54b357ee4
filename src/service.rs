use chrono::Utc;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::merge::{apply_patch, apply_replace};
use crate::models::{
    CreateUserRequest, PageInfo, ReplaceUserRequest, Role, UpdateUserRequest, User, UserOut,
    UserPage,
};
use crate::password::HasherState;
use crate::policy::{AccessDecision, Operation, authorize};
use crate::repository::RepositoryState;
use crate::validate::{FieldError, ValidationPolicy, validate};

/// UserService
///
/// Orchestrates each operation as a short deterministic pipeline:
/// authorize → (fetch → merge → validate) → persist → project. Stateless apart
/// from the shared collaborator handles; every request gets at most one
/// read-then-write round trip to storage, and dropping the request future
/// before the persist call aborts the write.
///
/// Ordering decision: authorization is evaluated against the target id before
/// any storage read, so a non-owner always sees 401 and can never use the API
/// to probe which ids exist.
#[derive(Clone)]
pub struct UserService {
    repo: RepositoryState,
    hasher: HasherState,
    config: AppConfig,
}

impl UserService {
    pub fn new(repo: RepositoryState, hasher: HasherState, config: AppConfig) -> Self {
        Self {
            repo,
            hasher,
            config,
        }
    }

    fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            min_password_length: self.config.min_password_length,
        }
    }

    /// List: authorize(list) → fetch page → 200. Regular callers are denied.
    pub async fn list(
        &self,
        caller: &AuthUser,
        page: Option<i64>,
        per_page: Option<i64>,
    ) -> Result<UserPage, ApiError> {
        check(authorize(Some(caller), None, Operation::List))?;

        let page = page.unwrap_or(1).max(1);
        let per_page = per_page
            .unwrap_or(self.config.default_page_size)
            .clamp(1, self.config.max_page_size);
        // Caller-supplied page numbers go up to i64::MAX; saturate instead of
        // overflowing, which just yields an empty page far past the data.
        let offset = page.saturating_sub(1).saturating_mul(per_page);

        let users = self.repo.list_users(offset, per_page).await?;
        let total = self.repo.count_users().await?;

        Ok(UserPage {
            items: users.into_iter().map(UserOut::from).collect(),
            page_info: PageInfo {
                page,
                per_page,
                total,
            },
        })
    }

    /// Get: authorize(get, id) → fetch-by-id → 200 | 404.
    pub async fn get(&self, caller: &AuthUser, id: Uuid) -> Result<UserOut, ApiError> {
        check(authorize(Some(caller), Some(id), Operation::Get))?;

        let user = self.repo.get_user(id).await?.ok_or(ApiError::NotFound)?;
        Ok(user.into())
    }

    /// Create: decode has already happened; validate everything, hash the
    /// password, persist. Anonymous callers may only create Regular accounts.
    pub async fn create(
        &self,
        caller: Option<&AuthUser>,
        req: CreateUserRequest,
    ) -> Result<UserOut, ApiError> {
        check(authorize(caller, None, Operation::Create))?;

        let requested_role = req.role.unwrap_or_default();

        let now = Utc::now();
        let candidate = User {
            id: Uuid::new_v4(),
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            role: requested_role,
            password_hash: String::new(),
            created_at: now,
            updated_at: now,
        };

        let mut errors = validate(&candidate, Some(&req.password), &self.validation_policy());
        if requested_role != Role::Regular
            && caller.map(|c| c.role) != Some(Role::SuperAdmin)
        {
            errors.push(FieldError::new(
                "role",
                "an elevated role can only be assigned by a super-admin",
            ));
        }
        if !errors.is_empty() {
            return Err(ApiError::ValidationFailed(errors));
        }

        let password_hash = self
            .hasher
            .hash(&req.password)
            .map_err(ApiError::Internal)?;
        let candidate = User {
            password_hash,
            ..candidate
        };

        let created = self.repo.insert_user(candidate).await?;
        tracing::info!(user_id = %created.id, "user created");
        Ok(created.into())
    }

    /// Patch: authorize → fetch → sparse merge → validate → persist.
    pub async fn patch(
        &self,
        caller: &AuthUser,
        id: Uuid,
        req: UpdateUserRequest,
    ) -> Result<UserOut, ApiError> {
        check(authorize(Some(caller), Some(id), Operation::Update))?;

        let existing = self.repo.get_user(id).await?.ok_or(ApiError::NotFound)?;
        let candidate = apply_patch(&existing, &req, caller.role).map_err(ApiError::Unauthorized)?;

        self.persist_update(candidate).await
    }

    /// Put: as Patch, but the payload carries every field by construction.
    pub async fn replace(
        &self,
        caller: &AuthUser,
        id: Uuid,
        req: ReplaceUserRequest,
    ) -> Result<UserOut, ApiError> {
        check(authorize(Some(caller), Some(id), Operation::Replace))?;

        let existing = self.repo.get_user(id).await?.ok_or(ApiError::NotFound)?;
        let candidate =
            apply_replace(&existing, &req, caller.role).map_err(ApiError::Unauthorized)?;

        self.persist_update(candidate).await
    }

    /// Delete: authorize → delete → 204 | 404.
    pub async fn delete(&self, caller: &AuthUser, id: Uuid) -> Result<(), ApiError> {
        check(authorize(Some(caller), Some(id), Operation::Delete))?;

        if self.repo.delete_user(id).await? {
            tracing::info!(user_id = %id, "user deleted");
            Ok(())
        } else {
            Err(ApiError::NotFound)
        }
    }

    async fn persist_update(&self, mut candidate: User) -> Result<UserOut, ApiError> {
        let errors = validate(&candidate, None, &self.validation_policy());
        if !errors.is_empty() {
            return Err(ApiError::ValidationFailed(errors));
        }

        candidate.updated_at = Utc::now();
        let updated = self
            .repo
            .update_user(candidate)
            .await?
            // The record passed authorization but vanished before the write;
            // concurrent delete. Surface the same 404 the fetch would have.
            .ok_or(ApiError::NotFound)?;

        Ok(updated.into())
    }
}

fn check(decision: AccessDecision) -> Result<(), ApiError> {
    match decision {
        AccessDecision::Allow => Ok(()),
        AccessDecision::Deny(reason) => Err(ApiError::Unauthorized(reason)),
    }
}
