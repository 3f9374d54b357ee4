//! Field merge engine.
//!
//! Turns an existing record plus a caller-supplied payload into a candidate
//! record, applying field-level authorization before any value is copied.
//! The candidate is validated and persisted by the service; nothing here
//! touches storage.
//!
//! `first_name`, `last_name` and `email` are mergeable by anyone who already
//! passed the access policy for the target. The `role` field is special:
//! changing it requires a SuperAdmin caller, and a non-super-admin who
//! supplies a *different* role value gets the whole request rejected rather
//! than a silent partial apply. Supplying the record's current role is
//! accepted as a no-op, so full-replace payloads that echo the existing role
//! back still work for self-service callers.
//!
//! Neither payload type can express `id` or `password_hash`, so those fields
//! are structurally unreachable from the update paths.

use crate::models::{ReplaceUserRequest, Role, UpdateUserRequest, User};
use crate::policy::DenyReason;

/// apply_patch
///
/// Sparse merge: only fields present in the payload are considered. Absent
/// fields keep the existing value; they are never zeroed.
pub fn apply_patch(
    existing: &User,
    update: &UpdateUserRequest,
    caller_role: Role,
) -> Result<User, DenyReason> {
    let mut candidate = existing.clone();

    if let Some(first_name) = &update.first_name {
        candidate.first_name = first_name.clone();
    }
    if let Some(last_name) = &update.last_name {
        candidate.last_name = last_name.clone();
    }
    if let Some(email) = &update.email {
        candidate.email = email.clone();
    }
    if let Some(role) = update.role {
        candidate.role = merge_role(existing.role, role, caller_role)?;
    }

    Ok(candidate)
}

/// apply_replace
///
/// Full-replace merge: every field is present by construction of
/// `ReplaceUserRequest`, so all of them overwrite the existing values. The
/// role rule is identical to the patch path.
pub fn apply_replace(
    existing: &User,
    update: &ReplaceUserRequest,
    caller_role: Role,
) -> Result<User, DenyReason> {
    let mut candidate = existing.clone();

    candidate.first_name = update.first_name.clone();
    candidate.last_name = update.last_name.clone();
    candidate.email = update.email.clone();
    candidate.role = merge_role(existing.role, update.role, caller_role)?;

    Ok(candidate)
}

fn merge_role(current: Role, requested: Role, caller_role: Role) -> Result<Role, DenyReason> {
    if requested == current {
        return Ok(current);
    }
    if caller_role == Role::SuperAdmin {
        Ok(requested)
    } else {
        Err(DenyReason::RoleChangeForbidden)
    }
}
