//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! The server-held session cookie is the source of truth; [`Session`] is this
//! tab's cached belief about it. Route guards read it to decide redirects and
//! the navbar reads it to show or hide the user menu.
//!
//! DESIGN
//! ======
//! [`SessionStore`] is the only writer. Every mutation is all-or-nothing:
//! either a full principal (identity + role flags) is installed or the whole
//! thing is cleared, so no reader can observe a half-populated session. The
//! admin flag is never stored; it is derived from the staff/superuser flags
//! on every read.
//!
//! Identity fetches are ticketed. Starting any newer request (another fetch,
//! a login, a logout, or an explicit clear) supersedes older in-flight
//! fetches, and a superseded result is dropped when it lands instead of
//! overwriting newer state. A superseded fetch then waits until the newest
//! request settles and reports the session that request left behind, so no
//! caller decides anything from a half-finished state. A request settles
//! when it completes or when its future is dropped.
//!
//! ERROR HANDLING
//! ==============
//! Network operations collapse every failure to "unauthenticated" and never
//! return an error, except `register`, whose raw outcome the form displays.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::channel::oneshot;
use serde::Serialize;

use crate::net::api::IdentityClient;
use crate::net::csrf::{CLEARED_ON_LOGOUT, expire_cookie};
use crate::net::types::{ApiError, ApiResponse, Credentials, IdentityPayload, Registration};
use crate::routing::routes::LOGIN_PATH;
use crate::util::browser::{Browser, WebBrowser};

/// Shown in place of a handle while signed out.
pub const GUEST_LABEL: &str = "Not signed in";

/// The signed-in user's minimal profile as reported by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub handle: String,
    /// Avatar URL; empty when the server reported none.
    pub avatar_ref: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Principal {
    identity: Identity,
    is_staff: bool,
    is_superuser: bool,
}

impl Principal {
    fn from_payload(payload: &IdentityPayload) -> Option<Self> {
        Some(Self {
            identity: Identity {
                handle: payload.handle()?.to_owned(),
                avatar_ref: payload.avatar.clone().unwrap_or_default(),
            },
            is_staff: payload.is_staff.unwrap_or(false),
            is_superuser: payload.is_superuser.unwrap_or(false),
        })
    }
}

/// Snapshot of the cached session. Read-only outside this module.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    principal: Option<Principal>,
    avatar_version: u64,
}

impl Session {
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.principal.as_ref().map(|p| &p.identity)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    #[must_use]
    pub fn is_staff(&self) -> bool {
        self.principal.as_ref().is_some_and(|p| p.is_staff)
    }

    #[must_use]
    pub fn is_superuser(&self) -> bool {
        self.principal.as_ref().is_some_and(|p| p.is_superuser)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_staff() || self.is_superuser()
    }

    /// Cache-busting marker, bumped whenever the avatar changes.
    #[must_use]
    pub fn avatar_version(&self) -> u64 {
        self.avatar_version
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.identity().map_or(GUEST_LABEL, |i| i.handle.as_str())
    }

    /// Avatar URL with the version marker appended as `v`, or `None` when
    /// there is no avatar to show.
    #[must_use]
    pub fn avatar_src(&self) -> Option<String> {
        let avatar = self.avatar_ref();
        if avatar.is_empty() {
            return None;
        }
        let sep = if avatar.contains('?') { '&' } else { '?' };
        Some(format!("{avatar}{sep}v={}", self.avatar_version))
    }

    fn avatar_ref(&self) -> &str {
        self.identity().map_or("", |i| i.avatar_ref.as_str())
    }

    fn install(&mut self, principal: Principal) {
        if principal.identity.avatar_ref != self.avatar_ref() {
            self.avatar_version += 1;
        }
        self.principal = Some(principal);
    }

    fn clear(&mut self) {
        if !self.avatar_ref().is_empty() {
            self.avatar_version += 1;
        }
        self.principal = None;
    }
}

/// Callback run with a fresh snapshot after every change.
pub type SessionObserver = Arc<dyn Fn(&Session) + Send + Sync>;

/// How an identity fetch ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    SignedIn(Identity),
    SignedOut,
    /// A newer request took over; carries the identity it settled on.
    Superseded(Option<Identity>),
}

impl FetchOutcome {
    #[must_use]
    pub fn into_identity(self) -> Option<Identity> {
        match self {
            Self::SignedIn(identity) => Some(identity),
            Self::SignedOut => None,
            Self::Superseded(identity) => identity,
        }
    }
}

#[derive(Default)]
struct Inner {
    session: Session,
    /// Ticket of the newest request; fetches holding an older one are stale.
    latest: u64,
    /// Newest ticket that has settled. Equal to `latest` when nothing is pending.
    settled: u64,
    /// Superseded fetches waiting for `settled` to catch up. Dropping a
    /// sender wakes its receiver.
    waiters: Vec<oneshot::Sender<()>>,
}

impl Inner {
    fn supersede(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    fn settle(&mut self, ticket: u64) {
        if ticket == self.latest {
            self.settled = ticket;
            self.waiters.clear();
        }
    }

    fn is_settled(&self) -> bool {
        self.settled == self.latest
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One in-flight request. Settles its ticket when dropped, so a cancelled
/// request never leaves waiters hanging.
struct Ticket {
    inner: Arc<Mutex<Inner>>,
    id: u64,
}

impl Drop for Ticket {
    fn drop(&mut self) {
        lock(&self.inner).settle(self.id);
    }
}

/// Process-wide session owner. Cheap to clone; clones share state.
pub struct SessionStore<C> {
    client: Arc<C>,
    browser: Arc<dyn Browser>,
    observer: Option<SessionObserver>,
    inner: Arc<Mutex<Inner>>,
}

impl<C> Clone for SessionStore<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            browser: Arc::clone(&self.browser),
            observer: self.observer.clone(),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: IdentityClient> SessionStore<C> {
    #[must_use]
    pub fn new(client: C) -> Self {
        Self {
            client: Arc::new(client),
            browser: Arc::new(WebBrowser),
            observer: None,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    #[must_use]
    pub fn with_browser(mut self, browser: impl Browser + 'static) -> Self {
        self.browser = Arc::new(browser);
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: impl Fn(&Session) + Send + Sync + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock(&self.inner)
    }

    /// Start a request that supersedes everything older.
    fn begin(&self) -> Ticket {
        let id = self.mutate(Inner::supersede);
        Ticket { inner: Arc::clone(&self.inner), id }
    }

    /// Resolve once no request is pending.
    async fn until_settled(&self) {
        loop {
            let woken = {
                let mut inner = self.lock();
                if inner.is_settled() {
                    return;
                }
                let (tx, rx) = oneshot::channel();
                inner.waiters.push(tx);
                rx
            };
            woken.await.unwrap_or_default();
        }
    }

    /// Apply `change` under the lock, then notify outside it if the snapshot moved.
    fn mutate<R>(&self, change: impl FnOnce(&mut Inner) -> R) -> R {
        let (result, changed) = {
            let mut inner = self.lock();
            let before = inner.session.clone();
            let result = change(&mut inner);
            let changed = (inner.session != before).then(|| inner.session.clone());
            (result, changed)
        };
        if let (Some(observer), Some(snapshot)) = (&self.observer, changed) {
            observer(&snapshot);
        }
        result
    }

    #[cfg(test)]
    pub(crate) fn client(&self) -> &C {
        &self.client
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.lock().session.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().session.is_authenticated()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.lock().session.is_admin()
    }

    /// Ask the server who is signed in and cache the answer.
    ///
    /// Returns the identity on success. Any failure (transport error, non-200
    /// status, body without a handle) clears the session and returns `None`.
    /// A superseded fetch returns whatever identity the newer request settled on.
    pub async fn fetch_identity(&self) -> Option<Identity> {
        self.fetch_identity_outcome().await.into_identity()
    }

    /// [`Self::fetch_identity`], telling apart a fetch that decided the
    /// session from one a newer request overtook.
    pub async fn fetch_identity_outcome(&self) -> FetchOutcome {
        let ticket = self.begin();
        let outcome = match self.client.get_identity().await {
            Ok(resp) => principal_from_response(&resp),
            Err(e) => Err(e.to_string()),
        };

        let applied = self.mutate(|inner| {
            if inner.latest != ticket.id {
                return None;
            }
            Some(match outcome {
                Ok(principal) => {
                    inner.session.install(principal);
                    inner.session.identity().cloned().map_or(FetchOutcome::SignedOut, FetchOutcome::SignedIn)
                }
                Err(reason) => {
                    leptos::logging::warn!("identity fetch failed: {reason}");
                    inner.session.clear();
                    FetchOutcome::SignedOut
                }
            })
        });
        let superseded_id = ticket.id;
        drop(ticket);

        match applied {
            Some(outcome) => outcome,
            None => {
                leptos::logging::log!("identity fetch #{superseded_id} superseded; result dropped");
                self.until_settled().await;
                FetchOutcome::Superseded(self.snapshot().identity().cloned())
            }
        }
    }

    /// Post credentials, then re-fetch the identity to populate the session.
    ///
    /// Returns `true` only when the session ends up holding an identity: a
    /// login the server accepts but whose follow-up fetch fails reports `false`.
    pub async fn login(&self, credentials: &Credentials) -> bool {
        let _pending = self.begin();
        match self.client.login(credentials).await {
            Ok(resp) if resp.is_ok_or_created() => {}
            Ok(resp) => {
                leptos::logging::warn!("login rejected: status {}", resp.status);
                self.clear_auth();
                return false;
            }
            Err(e) => {
                leptos::logging::warn!("login failed: {e}");
                self.clear_auth();
                return false;
            }
        }
        self.fetch_identity().await.is_some()
    }

    /// Create an account. Does not sign in; the raw outcome is returned so
    /// server messages such as "username exists" reach the user verbatim.
    ///
    /// # Errors
    ///
    /// Returns the transport error when the request never got a response.
    pub async fn register(&self, registration: &Registration) -> Result<ApiResponse, ApiError> {
        let result = self.client.register(registration).await;
        if let Err(e) = &result {
            leptos::logging::warn!("register failed: {e}");
        }
        result
    }

    /// Sign out. Always succeeds locally: the server call, cookie clearing and
    /// the redirect to the login page are all best-effort, and the session is
    /// cleared regardless of how they go.
    pub async fn logout(&self) {
        let _pending = self.begin();
        match self.client.logout().await {
            Ok(resp) if !resp.is_success() => leptos::logging::warn!("logout returned status {}", resp.status),
            Ok(_) => {}
            Err(e) => leptos::logging::warn!("logout request failed: {e}"),
        }
        self.clear_auth();

        for name in CLEARED_ON_LOGOUT {
            if let Err(e) = self.browser.set_cookie(&expire_cookie(name)) {
                leptos::logging::log!("could not clear cookie {name}: {e}");
            }
        }
        if let Err(e) = self.browser.redirect(LOGIN_PATH) {
            leptos::logging::log!("logout redirect skipped: {e}");
        }
    }

    /// Reset to signed-out. Idempotent; also supersedes in-flight fetches.
    pub fn clear_auth(&self) {
        self.mutate(|inner| {
            let ticket = inner.supersede();
            inner.session.clear();
            inner.settle(ticket);
        });
    }

    /// Point the avatar at `avatar_ref` and bump the cache-busting version,
    /// even when the URL is unchanged (the image behind it may not be).
    /// Ignored while signed out; returns whether it applied.
    pub fn refresh_avatar(&self, avatar_ref: &str) -> bool {
        self.mutate(|inner| {
            let Some(principal) = inner.session.principal.as_mut() else {
                return false;
            };
            avatar_ref.clone_into(&mut principal.identity.avatar_ref);
            inner.session.avatar_version += 1;
            true
        })
    }

    /// App start: best-effort anti-forgery cookie priming, then an identity fetch.
    pub async fn bootstrap(&self) -> Option<Identity> {
        if let Err(e) = self.client.prime_csrf().await {
            leptos::logging::warn!("csrf priming failed: {e}");
        }
        self.fetch_identity().await
    }
}

fn principal_from_response(resp: &ApiResponse) -> Result<Principal, String> {
    if !resp.is_ok() {
        return Err(format!("status {}", resp.status));
    }
    IdentityPayload::from_body(&resp.body)
        .as_ref()
        .and_then(Principal::from_payload)
        .ok_or_else(|| "response has no usable handle".to_owned())
}
