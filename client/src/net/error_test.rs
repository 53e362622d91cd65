use super::*;

// =============================================================================
// decode_error classification
// =============================================================================

#[test]
fn status_422_decodes_to_validation_with_field_map() {
    let body = br#"{"success": false, "message": "Validation failed", "errors": {"email": ["The email field is required."]}}"#;
    let err = decode_error(StatusCode::UNPROCESSABLE_ENTITY, body);
    let ApiError::Validation { errors } = err else {
        panic!("expected validation, got {err:?}");
    };
    assert_eq!(errors["email"], vec!["The email field is required."]);
}

#[test]
fn status_403_decodes_to_csrf_mismatch() {
    let body = br#"{"success": false, "message": "CSRF token mismatch"}"#;
    let err = decode_error(StatusCode::FORBIDDEN, body);
    assert!(matches!(err, ApiError::CsrfMismatch { .. }));
    assert_eq!(err.to_string(), "CSRF token mismatch");
}

#[test]
fn status_401_decodes_to_session_expired() {
    let body = br#"{"success": false, "message": "Unauthenticated"}"#;
    let err = decode_error(StatusCode::UNAUTHORIZED, body);
    assert!(matches!(err, ApiError::SessionExpired { .. }));
}

#[test]
fn status_500_decodes_to_internal_with_server_message() {
    let body = br#"{"success": false, "message": "Login unsuccessful"}"#;
    let err = decode_error(StatusCode::INTERNAL_SERVER_ERROR, body);
    let ApiError::Internal { message } = err else {
        panic!("expected internal");
    };
    assert_eq!(message, "Login unsuccessful");
}

// =============================================================================
// fallbacks for hostile or absent bodies
// =============================================================================

#[test]
fn unreadable_body_falls_back_to_generic_message() {
    let err = decode_error(StatusCode::INTERNAL_SERVER_ERROR, b"<html>gateway error</html>");
    let ApiError::Internal { message } = err else {
        panic!("expected internal");
    };
    assert_eq!(message, "Something went wrong");
}

#[test]
fn empty_body_401_still_classifies() {
    let err = decode_error(StatusCode::UNAUTHORIZED, b"");
    assert!(matches!(err, ApiError::SessionExpired { .. }));
}

#[test]
fn validation_without_error_map_yields_empty_map() {
    let body = br#"{"success": false, "message": "Validation failed"}"#;
    let err = decode_error(StatusCode::UNPROCESSABLE_ENTITY, body);
    let ApiError::Validation { errors } = err else {
        panic!("expected validation");
    };
    assert!(errors.is_empty());
}
