use super::*;

#[test]
fn admin_implies_auth() {
    let route = RouteDescriptor::public("/x").admin();
    assert!(route.requires_auth);
    assert!(route.requires_admin);
    assert!(route.needs_session());
}

#[test]
fn public_route_needs_no_session() {
    assert!(!RouteDescriptor::public("/x").needs_session());
}

#[test]
fn matching_ignores_trailing_slash() {
    let route = RouteDescriptor::public("/profile");
    assert!(route.matches("/profile"));
    assert!(route.matches("/profile/"));
    assert!(!route.matches("/profiles"));
    assert!(!route.matches("/profile/edit"));
}

#[test]
fn root_matches_only_root() {
    let route = RouteDescriptor::public(ROOT_PATH);
    assert!(route.matches("/"));
    assert!(route.matches(""));
    assert!(!route.matches("/home"));
}

#[test]
fn param_segments_match_any_value() {
    let route = RouteDescriptor::public("/manage/users/:id");
    assert!(route.matches("/manage/users/42"));
    assert!(!route.matches("/manage/users"));
    assert!(!route.matches("/manage/users/42/history"));
}

#[test]
fn standard_table_requirements() {
    let table = RouteTable::standard();
    assert!(table.lookup("/profile").unwrap().requires_auth);
    assert!(!table.lookup("/profile").unwrap().requires_admin);
    assert!(table.lookup("/manage").unwrap().requires_admin);
    assert!(table.lookup("/manage/users/7").unwrap().requires_admin);
    assert!(!table.lookup("/recommend").unwrap().needs_session());
    assert!(table.lookup("/nowhere").is_none());
}

#[test]
fn allow_lists_resolve_per_route_with_global_fallback() {
    let table = RouteTable::standard();
    assert!(table.allowed_query_keys("/recommend").contains(&"gender"));
    assert_eq!(table.allowed_query_keys("/login"), &["next"]);
    assert_eq!(table.allowed_query_keys("/profile"), GLOBAL_QUERY_KEYS);
    assert_eq!(table.allowed_query_keys("/unknown"), GLOBAL_QUERY_KEYS);
}

#[test]
fn login_and_register_hide_user_menu() {
    let table = RouteTable::standard();
    assert!(table.hides_user_menu("/login"));
    assert!(table.hides_user_menu("/register"));
    assert!(!table.hides_user_menu("/recommend"));
    assert!(!table.hides_user_menu("/unknown"));
}

#[test]
fn external_prefixes_match_whole_segments() {
    assert!(is_external("/api"));
    assert!(is_external("/api/accounts/userinfo/"));
    assert!(is_external("/django-admin/"));
    assert!(is_external("/media/avatars/a.png"));
    assert!(is_external("/static/app.css"));
    assert!(!is_external("/apiary"));
    assert!(!is_external("/recommend"));
    assert!(!is_external("/"));
}
