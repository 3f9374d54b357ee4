use chrono::Utc;
use user_vault::merge::{apply_patch, apply_replace};
use user_vault::models::{ReplaceUserRequest, Role, UpdateUserRequest, User, UserOut};
use user_vault::policy::DenyReason;
use user_vault::validate::{ValidationPolicy, email_is_valid, validate};
use uuid::Uuid;

fn existing_user(role: Role) -> User {
    User {
        id: Uuid::from_u128(42),
        first_name: "Testy".to_string(),
        last_name: "McTest".to_string(),
        email: "testymctest@test.com".to_string(),
        role,
        password_hash: "hashed::testpassword7".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

const POLICY: ValidationPolicy = ValidationPolicy {
    min_password_length: 8,
};

// --- Field Merge Engine: PATCH ---

#[test]
fn patch_merges_only_present_fields() {
    let existing = existing_user(Role::Regular);
    let update = UpdateUserRequest {
        first_name: Some("Testie".to_string()),
        ..UpdateUserRequest::default()
    };

    let candidate = apply_patch(&existing, &update, Role::Regular).unwrap();

    assert_eq!(candidate.first_name, "Testie");
    assert_eq!(candidate.last_name, existing.last_name);
    assert_eq!(candidate.email, existing.email);
    assert_eq!(candidate.role, existing.role);
    assert_eq!(candidate.password_hash, existing.password_hash);
    assert_eq!(candidate.id, existing.id);
}

#[test]
fn patch_role_change_rejected_for_admin_caller() {
    let existing = existing_user(Role::Regular);
    let update = UpdateUserRequest {
        first_name: Some("Test".to_string()),
        role: Some(Role::Admin),
        ..UpdateUserRequest::default()
    };

    let err = apply_patch(&existing, &update, Role::Admin).unwrap_err();
    assert_eq!(err, DenyReason::RoleChangeForbidden);
}

#[test]
fn patch_role_change_applied_for_super_admin_caller() {
    let existing = existing_user(Role::Regular);
    let update = UpdateUserRequest {
        role: Some(Role::Admin),
        ..UpdateUserRequest::default()
    };

    let candidate = apply_patch(&existing, &update, Role::SuperAdmin).unwrap();
    assert_eq!(candidate.role, Role::Admin);
}

#[test]
fn patch_echoing_current_role_is_a_noop_for_any_caller() {
    let existing = existing_user(Role::Regular);
    let update = UpdateUserRequest {
        role: Some(Role::Regular),
        ..UpdateUserRequest::default()
    };

    let candidate = apply_patch(&existing, &update, Role::Regular).unwrap();
    assert_eq!(candidate, existing);
}

#[test]
fn super_admin_role_only_patch_leaves_other_fields_identical() {
    let existing = existing_user(Role::Regular);
    let update = UpdateUserRequest {
        role: Some(Role::Admin),
        ..UpdateUserRequest::default()
    };

    let candidate = apply_patch(&existing, &update, Role::SuperAdmin).unwrap();

    let mut expected = existing.clone();
    expected.role = Role::Admin;
    assert_eq!(candidate, expected);
}

// --- Field Merge Engine: PUT ---

#[test]
fn replace_overwrites_every_field() {
    let existing = existing_user(Role::Regular);
    let update = ReplaceUserRequest {
        first_name: "New".to_string(),
        last_name: "Name".to_string(),
        email: "new@name.example".to_string(),
        role: Role::Regular,
    };

    let candidate = apply_replace(&existing, &update, Role::Regular).unwrap();

    assert_eq!(candidate.first_name, "New");
    assert_eq!(candidate.last_name, "Name");
    assert_eq!(candidate.email, "new@name.example");
    // Identity and credentials are untouchable through the replace path.
    assert_eq!(candidate.id, existing.id);
    assert_eq!(candidate.password_hash, existing.password_hash);
}

#[test]
fn replace_role_rule_matches_patch() {
    let existing = existing_user(Role::Regular);
    let update = ReplaceUserRequest {
        first_name: existing.first_name.clone(),
        last_name: existing.last_name.clone(),
        email: existing.email.clone(),
        role: Role::Admin,
    };

    assert_eq!(
        apply_replace(&existing, &update, Role::Admin).unwrap_err(),
        DenyReason::RoleChangeForbidden
    );
    assert_eq!(
        apply_replace(&existing, &update, Role::SuperAdmin)
            .unwrap()
            .role,
        Role::Admin
    );
}

// --- Validator ---

#[test]
fn email_without_tld_dot_is_rejected() {
    assert!(!email_is_valid("testymctest@test"));
}

#[test]
fn email_grammar_edge_cases() {
    assert!(!email_is_valid("test.com")); // no @
    assert!(!email_is_valid("fake@email.")); // trailing dot
    assert!(!email_is_valid("@test.com")); // empty local part
    assert!(!email_is_valid("a@.com")); // leading dot in domain
    assert!(!email_is_valid("a@b@c.com")); // second @
    assert!(email_is_valid("testing@mail.test"));
    assert!(email_is_valid("testymctest@test.com"));
}

#[test]
fn validate_collects_all_violations_not_just_the_first() {
    let mut candidate = existing_user(Role::Regular);
    candidate.first_name = "".to_string();
    candidate.last_name = "  ".to_string();
    candidate.email = "not-an-email".to_string();

    let errors = validate(&candidate, Some("short"), &POLICY);

    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, ["firstName", "lastName", "email", "password"]);
}

#[test]
fn validate_passes_a_well_formed_record() {
    let candidate = existing_user(Role::Regular);
    assert!(validate(&candidate, Some("testpassword7"), &POLICY).is_empty());
}

#[test]
fn password_rule_only_applies_on_create() {
    let candidate = existing_user(Role::Regular);
    // Update paths carry no raw password, so nothing to check.
    assert!(validate(&candidate, None, &POLICY).is_empty());
}

#[test]
fn password_minimum_is_configurable() {
    let strict = ValidationPolicy {
        min_password_length: 16,
    };
    let candidate = existing_user(Role::Regular);

    let errors = validate(&candidate, Some("testpassword7"), &strict);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "password");
}

// --- Serialization invariants ---

#[test]
fn user_out_never_carries_the_password_hash() {
    let out = UserOut::from(existing_user(Role::Regular));
    let json = serde_json::to_string(&out).unwrap();

    assert!(!json.contains("password"));
    assert!(!json.contains("hashed::"));
    assert!(json.contains(r#""firstName":"Testy""#));
}

#[test]
fn update_request_omits_absent_fields_and_ignores_unknown_keys() {
    let sparse: UpdateUserRequest =
        serde_json::from_str(r#"{"firstName":"Testie","favouriteColour":"teal"}"#).unwrap();

    assert_eq!(sparse.first_name.as_deref(), Some("Testie"));
    assert!(sparse.last_name.is_none());
    assert!(sparse.role.is_none());

    let json = serde_json::to_string(&sparse).unwrap();
    assert!(!json.contains("lastName"));
}

#[test]
fn replace_request_requires_every_field() {
    let missing_role = serde_json::from_str::<ReplaceUserRequest>(
        r#"{"firstName":"A","lastName":"B","email":"a@b.co"}"#,
    );
    assert!(missing_role.is_err());
}

#[test]
fn role_wire_format_is_lowercase_strings() {
    assert_eq!(serde_json::to_string(&Role::SuperAdmin).unwrap(), r#""superadmin""#);
    assert_eq!(
        serde_json::from_str::<Role>(r#""admin""#).unwrap(),
        Role::Admin
    );
    assert!(serde_json::from_str::<Role>(r#""emperor""#).is_err());
}
