use super::*;

fn labels(links: &[NavLink]) -> Vec<&'static str> {
    links.iter().map(|l| l.label).collect()
}

#[test]
fn guests_see_public_links_only() {
    assert_eq!(labels(&visible_links(&Session::default())), vec!["Home", "Recommend"]);
}

#[test]
fn user_menu_hidden_on_sign_in_pages() {
    let routes = RouteTable::standard();
    assert!(!show_user_menu(&routes, "/login"));
    assert!(!show_user_menu(&routes, "/register"));
    assert!(show_user_menu(&routes, "/recommend"));
    assert!(show_user_menu(&routes, "/profile"));
}

#[tokio::test]
async fn members_see_their_pages() {
    use crate::test_helpers::*;
    let store = store(MockIdentity::new().identity(ok(user("alice"))));
    store.fetch_identity().await;
    assert_eq!(labels(&visible_links(&store.snapshot())), vec!["Home", "Recommend", "History", "Profile"]);
}

#[tokio::test]
async fn admins_also_see_management() {
    use crate::test_helpers::*;
    let store = store(MockIdentity::new().identity(ok(staff("sam"))));
    store.fetch_identity().await;
    let links = visible_links(&store.snapshot());
    assert_eq!(labels(&links).last(), Some(&"Manage"));
    assert_eq!(links.len(), 5);
}
