use super::*;
use serde_json::json;

#[test]
fn from_text_parses_json_bodies() {
    let resp = ApiResponse::from_text(400, r#"{"detail":"username exists"}"#);
    assert_eq!(resp.detail(), Some("username exists"));
}

#[test]
fn from_text_keeps_non_json_as_string() {
    let resp = ApiResponse::from_text(502, "Bad Gateway");
    assert_eq!(resp.body, json!("Bad Gateway"));
    assert_eq!(resp.detail(), Some("Bad Gateway"));
}

#[test]
fn from_text_maps_empty_body_to_null() {
    assert_eq!(ApiResponse::from_text(204, "  ").body, serde_json::Value::Null);
}

#[test]
fn status_classification() {
    assert!(ApiResponse::new(200, json!({})).is_ok());
    assert!(!ApiResponse::new(201, json!({})).is_ok());
    assert!(ApiResponse::new(201, json!({})).is_ok_or_created());
    assert!(!ApiResponse::new(204, json!({})).is_ok_or_created());
    assert!(ApiResponse::new(204, json!({})).is_success());
    assert!(!ApiResponse::new(401, json!({})).is_success());
}

#[test]
fn identity_payload_reads_django_userinfo() {
    let body = json!({
        "id": 3,
        "username": "alice",
        "avatar": "http://localhost/media/avatars/a.png",
        "is_staff": true,
        "email": "a@example.com"
    });
    let payload = IdentityPayload::from_body(&body).unwrap();
    assert_eq!(payload.handle(), Some("alice"));
    assert_eq!(payload.is_staff, Some(true));
    assert_eq!(payload.is_superuser, None);
}

#[test]
fn identity_payload_accepts_handle_alias() {
    let payload = IdentityPayload::from_body(&json!({ "handle": "bob" })).unwrap();
    assert_eq!(payload.handle(), Some("bob"));
}

#[test]
fn identity_payload_rejects_missing_or_blank_handle() {
    assert!(IdentityPayload::from_body(&json!({ "avatar": "x" })).is_none());
    assert!(IdentityPayload::from_body(&json!({ "username": "  " })).is_none());
}

#[test]
fn identity_payload_rejects_malformed_bodies() {
    assert!(IdentityPayload::from_body(&json!(null)).is_none());
    assert!(IdentityPayload::from_body(&json!("alice")).is_none());
    assert!(IdentityPayload::from_body(&json!({ "username": 42 })).is_none());
    assert!(IdentityPayload::from_body(&json!({ "username": "a", "is_staff": "yes" })).is_none());
}
