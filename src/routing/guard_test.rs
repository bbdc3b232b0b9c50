use super::*;
use crate::test_helpers::*;
use serde_json::json;
use tokio::sync::oneshot;

fn guard(mock: MockIdentity) -> NavigationGuard<MockIdentity> {
    NavigationGuard::new(RouteTable::standard(), store(mock))
}

fn intent(href: &str) -> NavigationIntent {
    NavigationIntent::parse(href, "/recommend").unwrap()
}

fn login_redirect(next: &str) -> Decision {
    Decision::Redirect { target: "/login".into(), query: QueryParams::new().with("next", next) }
}

fn root_redirect() -> Decision {
    Decision::Redirect { target: "/".into(), query: QueryParams::new() }
}

// =============================================================================
// NavigationIntent / Decision
// =============================================================================

#[test]
fn intent_parse_splits_path_query_and_fragment() {
    let intent = NavigationIntent::parse("/result?history=3#top", "/recommend").unwrap();
    assert_eq!(intent.target_path, "/result");
    assert_eq!(intent.query.get("history"), Some("3"));
    assert_eq!(intent.current_path, "/recommend");
    assert_eq!(intent.target_href(), "/result?history=3");
}

#[test]
fn intent_parse_defaults_empty_path_to_root() {
    assert_eq!(NavigationIntent::parse("?next=x", "/").unwrap().target_path, "/");
}

#[test]
fn decision_href_encodes_query() {
    assert_eq!(login_redirect("/manage").href().as_deref(), Some("/login?next=%2Fmanage"));
    assert_eq!(root_redirect().href().as_deref(), Some("/"));
    assert_eq!(Decision::Proceed.href(), None);
}

#[test]
fn pipeline_order_is_fixed() {
    assert_eq!(
        PIPELINE,
        [Stage::EscapeHatch, Stage::QueryParams, Stage::Reconcile, Stage::AdminCheck, Stage::AuthCheck]
    );
}

// =============================================================================
// stages in isolation
// =============================================================================

#[test]
fn admin_check_skips_non_admin_routes() {
    let route = RouteDescriptor::public("/profile").authenticated();
    assert_eq!(admin_check(Some(&route), &Session::default(), &intent("/profile")), ControlFlow::Continue(()));
    assert_eq!(admin_check(None, &Session::default(), &intent("/x")), ControlFlow::Continue(()));
}

#[test]
fn admin_check_sends_signed_out_user_to_login() {
    let route = RouteDescriptor::public("/manage").admin();
    assert_eq!(
        admin_check(Some(&route), &Session::default(), &intent("/manage")),
        ControlFlow::Break(login_redirect("/manage"))
    );
}

#[test]
fn auth_check_lets_public_routes_through() {
    let route = RouteDescriptor::public("/home");
    assert_eq!(auth_check(Some(&route), &Session::default(), &intent("/home")), ControlFlow::Continue(()));
}

#[test]
fn escape_hatch_keeps_query() {
    assert_eq!(
        escape_hatch(&intent("/django-admin/?q=1")),
        ControlFlow::Break(Decision::FullPageLoad { href: "/django-admin/?q=1".into() })
    );
}

// =============================================================================
// full pipeline
// =============================================================================

#[tokio::test]
async fn public_route_proceeds_without_network() {
    let guard = guard(MockIdentity::new());
    assert_eq!(guard.before_navigate(&intent("/recommend?gender=m")).await, Decision::Proceed);
    assert_eq!(guard.store().client().call_count("identity"), 0);
}

#[tokio::test]
async fn disallowed_query_key_redirects_to_root_before_reconciling() {
    let guard = guard(MockIdentity::new().identity(ok(user("alice"))));
    assert_eq!(guard.before_navigate(&intent("/recommend?evil=1")).await, root_redirect());
    assert_eq!(guard.before_navigate(&intent("/profile?evil=1")).await, root_redirect());
    assert_eq!(guard.store().client().call_count("identity"), 0);
}

#[tokio::test]
async fn malformed_query_redirects_to_root() {
    let guard = guard(MockIdentity::new());
    assert_eq!(guard.before_navigate_href("/recommend?=x", "/").await, root_redirect());
    assert_eq!(guard.before_navigate_href("/recommend?gender=%FF", "/").await, root_redirect());
}

#[tokio::test]
async fn backend_paths_leave_the_spa() {
    let guard = guard(MockIdentity::new());
    assert_eq!(
        guard.before_navigate_href("/django-admin/", "/").await,
        Decision::FullPageLoad { href: "/django-admin/".into() }
    );
    assert_eq!(
        guard.before_navigate_href("/api/?=bad", "/").await,
        Decision::FullPageLoad { href: "/api/?=bad".into() }
    );
}

#[tokio::test]
async fn signed_out_user_on_admin_route_goes_to_login_with_next() {
    let guard = guard(MockIdentity::new().identity(status(401, json!({ "detail": "unauthenticated" }))));
    assert_eq!(guard.before_navigate(&intent("/manage")).await, login_redirect("/manage"));
    assert_eq!(guard.store().client().call_count("identity"), 1);
}

#[tokio::test]
async fn next_carries_original_query() {
    let guard = guard(MockIdentity::new().identity(status(401, json!({}))));
    let decision = guard.before_navigate(&intent("/profile?next=/history")).await;
    assert_eq!(decision, login_redirect("/profile?next=%2Fhistory"));
}

#[tokio::test]
async fn non_admin_on_admin_route_goes_to_root() {
    let guard = guard(MockIdentity::new().identity(ok(user("alice"))));
    assert_eq!(guard.before_navigate(&intent("/manage")).await, root_redirect());
}

#[tokio::test]
async fn admin_on_admin_route_proceeds() {
    let guard = guard(MockIdentity::new().identity(ok(staff("sam"))));
    assert_eq!(guard.before_navigate(&intent("/manage/users/4")).await, Decision::Proceed);

    let guard = guard_with_superuser();
    assert_eq!(guard.before_navigate(&intent("/manage")).await, Decision::Proceed);
}

fn guard_with_superuser() -> NavigationGuard<MockIdentity> {
    guard(MockIdentity::new().identity(ok(superuser("root"))))
}

#[tokio::test]
async fn cached_session_skips_reconciliation() {
    let guard = guard(MockIdentity::new().identity(ok(user("alice"))));
    guard.store().fetch_identity().await;

    assert_eq!(guard.before_navigate(&intent("/profile")).await, Decision::Proceed);
    assert_eq!(guard.before_navigate(&intent("/history")).await, Decision::Proceed);
    assert_eq!(guard.store().client().call_count("identity"), 1);
}

#[tokio::test]
async fn signed_out_user_on_auth_route_goes_to_login() {
    let guard = guard(MockIdentity::new().identity(Err(crate::net::types::ApiError::Network("down".into()))));
    assert_eq!(guard.before_navigate(&intent("/profile")).await, login_redirect("/profile"));
    assert!(!guard.store().is_authenticated());
}

#[tokio::test]
async fn reconciliation_success_lets_auth_route_through() {
    let guard = guard(MockIdentity::new().identity(ok(user("alice"))));
    assert_eq!(guard.before_navigate(&intent("/profile")).await, Decision::Proceed);
    assert!(guard.store().is_authenticated());
}

#[tokio::test]
async fn malformed_identity_body_never_escapes_the_guard() {
    let guard = guard(MockIdentity::new().identity(ok(json!([1, 2, 3]))));
    assert_eq!(guard.before_navigate(&intent("/manage")).await, login_redirect("/manage"));
}

#[tokio::test]
async fn unknown_route_is_public() {
    let guard = guard(MockIdentity::new());
    assert_eq!(guard.before_navigate(&intent("/somewhere/else?next=/x")).await, Decision::Proceed);
}

#[tokio::test]
async fn overlapping_guards_both_judge_the_settled_session() {
    let (tx_first, rx_first) = oneshot::channel();
    let (tx_second, rx_second) = oneshot::channel();
    let guard = guard(
        MockIdentity::new()
            .identity(Scripted::Later(rx_first))
            .identity(Scripted::Later(rx_second)),
    );

    let release = async {
        tx_first.send(ok(user("alice"))).unwrap();
        tokio::task::yield_now().await;
        tx_second.send(ok(user("alice"))).unwrap();
    };
    let profile_intent = intent("/profile");
    let history_intent = intent("/history");
    let (profile, history, ()) = tokio::join!(
        guard.before_navigate(&profile_intent),
        guard.before_navigate(&history_intent),
        release
    );

    assert_eq!(profile, Decision::Proceed);
    assert_eq!(history, Decision::Proceed);
    assert!(guard.store().is_authenticated());
}

#[tokio::test]
async fn overtaken_guard_follows_a_newer_sign_out() {
    let (tx_first, rx_first) = oneshot::channel();
    let (tx_second, rx_second) = oneshot::channel();
    let guard = guard(
        MockIdentity::new()
            .identity(Scripted::Later(rx_first))
            .identity(Scripted::Later(rx_second)),
    );

    let release = async {
        tx_second.send(status(401, json!({}))).unwrap();
        tokio::task::yield_now().await;
        tx_first.send(ok(user("alice"))).unwrap();
    };
    let profile_intent = intent("/profile");
    let history_intent = intent("/history");
    let (profile, history, ()) = tokio::join!(
        guard.before_navigate(&profile_intent),
        guard.before_navigate(&history_intent),
        release
    );

    assert_eq!(profile, login_redirect("/profile"));
    assert_eq!(history, login_redirect("/history"));
}
