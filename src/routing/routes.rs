//! Static route table.
//!
//! Each SPA path carries its access requirements and the closed set of query
//! keys it accepts. Paths not in the table are public and accept only the
//! global allow-list.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

pub const ROOT_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/recommend";

/// Query key carrying the post-login destination.
pub const NEXT_PARAM: &str = "next";

/// Allow-list for paths without their own.
pub const GLOBAL_QUERY_KEYS: &[&str] = &[NEXT_PARAM];

/// Prefixes served by the backend, never by the in-app router.
pub const EXTERNAL_PREFIXES: &[&str] = &["/django-admin", "/api", "/static", "/media"];

const PATIENT_QUERY_KEYS: &[&str] = &[
    "gender",
    "age",
    "disease_code",
    "disease_name",
    "urgency",
    "region",
    "economic_level",
];

const RESULT_QUERY_KEYS: &[&str] = &[
    "history",
    "gender",
    "age",
    "disease_code",
    "disease_name",
    "urgency",
    "region",
    "economic_level",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteDescriptor {
    /// Pattern; `:name` segments match any single non-empty segment.
    pub path: &'static str,
    pub requires_auth: bool,
    pub requires_admin: bool,
    /// `None` falls back to [`GLOBAL_QUERY_KEYS`].
    pub allowed_query_keys: Option<&'static [&'static str]>,
    /// Display hint: hide the navbar user menu on this page.
    pub hide_user_menu: bool,
}

impl RouteDescriptor {
    #[must_use]
    pub const fn public(path: &'static str) -> Self {
        Self { path, requires_auth: false, requires_admin: false, allowed_query_keys: None, hide_user_menu: false }
    }

    #[must_use]
    pub const fn authenticated(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// Admin pages always require sign-in first.
    #[must_use]
    pub const fn admin(mut self) -> Self {
        self.requires_auth = true;
        self.requires_admin = true;
        self
    }

    #[must_use]
    pub const fn query_keys(mut self, keys: &'static [&'static str]) -> Self {
        self.allowed_query_keys = Some(keys);
        self
    }

    #[must_use]
    pub const fn without_user_menu(mut self) -> Self {
        self.hide_user_menu = true;
        self
    }

    #[must_use]
    pub fn needs_session(&self) -> bool {
        self.requires_auth || self.requires_admin
    }

    #[must_use]
    pub fn query_allow_list(&self) -> &'static [&'static str] {
        self.allowed_query_keys.unwrap_or(GLOBAL_QUERY_KEYS)
    }

    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let pattern = segments(self.path);
        let actual = segments(path);
        pattern.len() == actual.len()
            && pattern
                .iter()
                .zip(&actual)
                .all(|(p, a)| p.starts_with(':') || p == a)
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl RouteTable {
    #[must_use]
    pub fn new(routes: Vec<RouteDescriptor>) -> Self {
        Self { routes }
    }

    /// The application's routes.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            RouteDescriptor::public(ROOT_PATH),
            RouteDescriptor::public("/home"),
            RouteDescriptor::public(LOGIN_PATH).query_keys(GLOBAL_QUERY_KEYS).without_user_menu(),
            RouteDescriptor::public("/register").query_keys(GLOBAL_QUERY_KEYS).without_user_menu(),
            RouteDescriptor::public("/profile").authenticated(),
            RouteDescriptor::public("/history").authenticated(),
            RouteDescriptor::public(HOME_PATH).query_keys(PATIENT_QUERY_KEYS),
            RouteDescriptor::public("/result").query_keys(RESULT_QUERY_KEYS),
            RouteDescriptor::public("/manage").admin(),
            RouteDescriptor::public("/manage/users/:id").admin(),
        ])
    }

    /// First route whose pattern matches `path`.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&RouteDescriptor> {
        self.routes.iter().find(|r| r.matches(path))
    }

    #[must_use]
    pub fn allowed_query_keys(&self, path: &str) -> &'static [&'static str] {
        self.lookup(path).map_or(GLOBAL_QUERY_KEYS, RouteDescriptor::query_allow_list)
    }

    #[must_use]
    pub fn hides_user_menu(&self, path: &str) -> bool {
        self.lookup(path).is_some_and(|r| r.hide_user_menu)
    }
}

/// Whether `path` belongs to the backend rather than the SPA. Prefixes match
/// whole segments: `/api` and `/api/x` do, `/apiary` does not.
#[must_use]
pub fn is_external(path: &str) -> bool {
    EXTERNAL_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}
