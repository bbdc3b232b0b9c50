use super::*;

#[test]
fn validate_login_input_trims_username_only() {
    assert_eq!(
        validate_login_input("  alice ", " pw "),
        Ok(Credentials { username: "alice".to_owned(), password: " pw ".to_owned() })
    );
}

#[test]
fn validate_login_input_requires_both_fields() {
    assert_eq!(validate_login_input("   ", "pw"), Err(MISSING_FIELDS));
    assert_eq!(validate_login_input("alice", ""), Err(MISSING_FIELDS));
}

#[test]
fn post_login_target_follows_same_origin_paths() {
    assert_eq!(post_login_target(Some("/history")), "/history");
    assert_eq!(post_login_target(Some("/recommend?age=40&gender=F")), "/recommend?age=40&gender=F");
}

#[test]
fn post_login_target_rejects_offsite_and_missing_values() {
    assert_eq!(post_login_target(None), "/");
    assert_eq!(post_login_target(Some("")), "/");
    assert_eq!(post_login_target(Some("https://evil.example/")), "/");
    assert_eq!(post_login_target(Some("//evil.example/")), "/");
    assert_eq!(post_login_target(Some("/\\evil.example")), "/");
    assert_eq!(post_login_target(Some("history")), "/");
}
