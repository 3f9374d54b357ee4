use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::Role;

/// Operation
///
/// The set of actions the access policy knows how to judge. Mirrors the HTTP
/// surface one-to-one: List/Get/Create/Update/Replace/Delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Replace,
    Delete,
}

/// DenyReason
///
/// Stable reason codes for a policy denial. These are logged internally for
/// diagnosis but rendered to clients as a single generic message, so that a
/// caller cannot distinguish "wrong role" from "not your record" (or probe
/// which ids exist).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No resolved identity on the request.
    NotAuthenticated,
    /// The caller's role is below what the operation requires.
    InsufficientRole,
    /// The target record belongs to somebody else and the caller is not a
    /// super-admin.
    NotSelf,
    /// The update payload tried to change the `role` field without super-admin
    /// rights. Produced by the merge engine, never by `authorize` itself.
    RoleChangeForbidden,
}

/// AccessDecision
///
/// Result of policy evaluation for one (caller, target, operation) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(DenyReason),
}

/// authorize
///
/// The pure access-policy decision function. Given the resolved caller (if any),
/// the target user id (None for List/Create, which have no single target), and
/// the requested operation, decides Allow or Deny without touching storage.
///
/// Rules, first match wins:
/// 1. Create is always allowed at the policy layer: it has no target, and the
///    field-level role rule plus validation gate everything else.
/// 2. Every other operation requires an authenticated caller.
/// 3. List requires Admin or SuperAdmin.
/// 4. Per-record operations (Get/Update/Replace/Delete) allow self-service or a
///    SuperAdmin caller. Admins hold no elevated per-record rights: their only
///    elevation over Regular users is List access.
pub fn authorize(
    caller: Option<&AuthUser>,
    target: Option<Uuid>,
    operation: Operation,
) -> AccessDecision {
    if operation == Operation::Create {
        return AccessDecision::Allow;
    }

    let Some(caller) = caller else {
        return AccessDecision::Deny(DenyReason::NotAuthenticated);
    };

    match operation {
        Operation::Create => unreachable!("handled above"),
        Operation::List => match caller.role {
            Role::Admin | Role::SuperAdmin => AccessDecision::Allow,
            Role::Regular => AccessDecision::Deny(DenyReason::InsufficientRole),
        },
        Operation::Get | Operation::Update | Operation::Replace | Operation::Delete => {
            match target {
                Some(target_id) if caller.id == target_id => AccessDecision::Allow,
                _ => match caller.role {
                    Role::SuperAdmin => AccessDecision::Allow,
                    Role::Regular | Role::Admin => AccessDecision::Deny(DenyReason::NotSelf),
                },
            }
        }
    }
}
