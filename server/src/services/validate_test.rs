use super::*;

fn register_req() -> RegisterRequest {
    RegisterRequest {
        name: "Ada Lovelace".into(),
        email: "ada@example.com".into(),
        password: "Secret123!".into(),
        password_confirmation: "Secret123!".into(),
    }
}

// =============================================================================
// normalize_email
// =============================================================================

#[test]
fn normalize_email_lowercases_and_trims() {
    assert_eq!(normalize_email("  Ada@Example.COM "), Some("ada@example.com".into()));
}

#[test]
fn normalize_email_rejects_empty() {
    assert!(normalize_email("").is_none());
    assert!(normalize_email("   ").is_none());
}

#[test]
fn normalize_email_rejects_missing_at() {
    assert!(normalize_email("ada.example.com").is_none());
}

#[test]
fn normalize_email_rejects_empty_parts() {
    assert!(normalize_email("@example.com").is_none());
    assert!(normalize_email("ada@").is_none());
}

#[test]
fn normalize_email_rejects_double_at() {
    assert!(normalize_email("ada@@example.com").is_none());
}

#[test]
fn normalize_email_rejects_overlong() {
    let long = format!("{}@example.com", "a".repeat(300));
    assert!(normalize_email(&long).is_none());
}

// =============================================================================
// validate_register
// =============================================================================

#[test]
fn valid_register_payload_passes() {
    assert!(validate_register(&register_req()).is_empty());
}

#[test]
fn register_missing_name_flagged() {
    let mut req = register_req();
    req.name = "  ".into();
    let errors = validate_register(&req);
    assert!(errors.contains_key("name"));
    assert_eq!(errors.len(), 1);
}

#[test]
fn register_overlong_name_flagged() {
    let mut req = register_req();
    req.name = "x".repeat(226);
    assert!(validate_register(&req).contains_key("name"));
}

#[test]
fn register_bad_email_flagged() {
    let mut req = register_req();
    req.email = "not-an-address".into();
    let errors = validate_register(&req);
    assert_eq!(errors["email"], vec!["The email must be a valid email address."]);
}

#[test]
fn register_short_password_flagged() {
    let mut req = register_req();
    req.password = "short".into();
    req.password_confirmation = "short".into();
    assert!(validate_register(&req).contains_key("password"));
}

#[test]
fn register_length_rules_count_characters_not_bytes() {
    // Four characters, eight bytes: still under the minimum.
    let mut req = register_req();
    req.password = "éééé".into();
    req.password_confirmation = "éééé".into();
    assert!(validate_register(&req).contains_key("password"));

    // 225 characters, 450 bytes: still within the maximum.
    let mut req = register_req();
    req.name = "é".repeat(225);
    assert!(!validate_register(&req).contains_key("name"));
}

#[test]
fn normalize_email_length_counts_characters_not_bytes() {
    let local = "é".repeat(213);
    assert!(normalize_email(&format!("{local}@example.com")).is_some());
}

#[test]
fn register_mismatched_confirmation_flagged() {
    let mut req = register_req();
    req.password_confirmation = "Different1!".into();
    let errors = validate_register(&req);
    assert_eq!(errors["password"], vec!["The password confirmation does not match."]);
}

#[test]
fn register_collects_multiple_fields() {
    let req = RegisterRequest {
        name: String::new(),
        email: String::new(),
        password: String::new(),
        password_confirmation: String::new(),
    };
    let errors = validate_register(&req);
    assert!(errors.contains_key("name"));
    assert!(errors.contains_key("email"));
    assert!(errors.contains_key("password"));
}

// =============================================================================
// validate_login
// =============================================================================

#[test]
fn valid_login_payload_passes() {
    let req = LoginRequest { email: "ada@example.com".into(), password: "pw".into() };
    assert!(validate_login(&req).is_empty());
}

#[test]
fn login_missing_fields_flagged() {
    let req = LoginRequest { email: String::new(), password: String::new() };
    let errors = validate_login(&req);
    assert!(errors.contains_key("email"));
    assert!(errors.contains_key("password"));
}
