use user_vault::auth::AuthUser;
use user_vault::models::Role;
use user_vault::policy::{AccessDecision, DenyReason, Operation, authorize};
use uuid::Uuid;

const REGULAR_ID: Uuid = Uuid::from_u128(1);
const ADMIN_ID: Uuid = Uuid::from_u128(2);
const SUPER_ID: Uuid = Uuid::from_u128(3);

fn regular() -> AuthUser {
    AuthUser {
        id: REGULAR_ID,
        role: Role::Regular,
    }
}
fn admin() -> AuthUser {
    AuthUser {
        id: ADMIN_ID,
        role: Role::Admin,
    }
}
fn super_admin() -> AuthUser {
    AuthUser {
        id: SUPER_ID,
        role: Role::SuperAdmin,
    }
}

// --- List ---

#[test]
fn list_denied_for_regular_callers() {
    let caller = regular();
    assert_eq!(
        authorize(Some(&caller), None, Operation::List),
        AccessDecision::Deny(DenyReason::InsufficientRole)
    );
}

#[test]
fn list_allowed_for_admin_and_super_admin() {
    let admin = admin();
    let sa = super_admin();
    assert_eq!(
        authorize(Some(&admin), None, Operation::List),
        AccessDecision::Allow
    );
    assert_eq!(
        authorize(Some(&sa), None, Operation::List),
        AccessDecision::Allow
    );
}

// --- Per-record operations ---

#[test]
fn get_allowed_iff_self_or_super_admin() {
    let reg = regular();
    let adm = admin();
    let sa = super_admin();

    for target in [REGULAR_ID, ADMIN_ID, SUPER_ID] {
        let expected_for = |caller: &AuthUser| {
            if caller.id == target || caller.role == Role::SuperAdmin {
                AccessDecision::Allow
            } else {
                AccessDecision::Deny(DenyReason::NotSelf)
            }
        };
        for caller in [&reg, &adm, &sa] {
            assert_eq!(
                authorize(Some(caller), Some(target), Operation::Get),
                expected_for(caller),
                "caller {:?} target {}",
                caller.role,
                target
            );
        }
    }
}

#[test]
fn admin_has_no_elevated_per_record_rights() {
    let adm = admin();
    for op in [Operation::Get, Operation::Update, Operation::Replace, Operation::Delete] {
        assert_eq!(
            authorize(Some(&adm), Some(REGULAR_ID), op),
            AccessDecision::Deny(DenyReason::NotSelf)
        );
    }
}

#[test]
fn super_admin_may_act_on_anyone_including_admins_and_self() {
    let sa = super_admin();
    for target in [REGULAR_ID, ADMIN_ID, SUPER_ID] {
        for op in [Operation::Get, Operation::Update, Operation::Replace, Operation::Delete] {
            assert_eq!(
                authorize(Some(&sa), Some(target), op),
                AccessDecision::Allow
            );
        }
    }
}

#[test]
fn self_service_allowed_for_every_role() {
    for caller in [regular(), admin(), super_admin()] {
        for op in [Operation::Get, Operation::Update, Operation::Replace, Operation::Delete] {
            assert_eq!(
                authorize(Some(&caller), Some(caller.id), op),
                AccessDecision::Allow
            );
        }
    }
}

// --- Unauthenticated callers ---

#[test]
fn anonymous_denied_for_everything_except_create() {
    for op in [
        Operation::List,
        Operation::Get,
        Operation::Update,
        Operation::Replace,
        Operation::Delete,
    ] {
        assert_eq!(
            authorize(None, Some(REGULAR_ID), op),
            AccessDecision::Deny(DenyReason::NotAuthenticated)
        );
    }
}

#[test]
fn create_has_no_target_and_is_always_allowed_at_the_policy_layer() {
    let reg = regular();
    assert_eq!(authorize(None, None, Operation::Create), AccessDecision::Allow);
    assert_eq!(
        authorize(Some(&reg), None, Operation::Create),
        AccessDecision::Allow
    );
}
