//! Scripted identity client and recording browser for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::oneshot;

use crate::net::api::IdentityClient;
use crate::net::types::{ApiError, ApiResponse, Credentials, Registration};
use crate::state::session::SessionStore;
use crate::util::browser::{Browser, BrowserError};

pub type Reply = Result<ApiResponse, ApiError>;

/// A scripted reply: ready now, or held until the test releases it.
pub enum Scripted {
    Now(Reply),
    Later(oneshot::Receiver<Reply>),
}

impl From<Reply> for Scripted {
    fn from(reply: Reply) -> Self {
        Self::Now(reply)
    }
}

#[derive(Default)]
pub struct MockIdentity {
    identity: Mutex<VecDeque<Scripted>>,
    login: Mutex<VecDeque<Reply>>,
    register: Mutex<VecDeque<Reply>>,
    logout: Mutex<VecDeque<Reply>>,
    pub calls: Mutex<Vec<&'static str>>,
}

impl MockIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(self, reply: impl Into<Scripted>) -> Self {
        self.identity.lock().unwrap().push_back(reply.into());
        self
    }

    pub fn login(self, reply: Reply) -> Self {
        self.login.lock().unwrap().push_back(reply);
        self
    }

    pub fn register(self, reply: Reply) -> Self {
        self.register.lock().unwrap().push_back(reply);
        self
    }

    pub fn logout(self, reply: Reply) -> Self {
        self.logout.lock().unwrap().push_back(reply);
        self
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn call_count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }
}

fn unscripted() -> Reply {
    Err(ApiError::Network("unscripted call".into()))
}

fn pop(queue: &Mutex<VecDeque<Reply>>) -> Reply {
    queue.lock().unwrap().pop_front().unwrap_or_else(unscripted)
}

#[async_trait(?Send)]
impl IdentityClient for MockIdentity {
    async fn prime_csrf(&self) -> Result<(), ApiError> {
        self.record("csrf");
        Ok(())
    }

    async fn get_identity(&self) -> Result<ApiResponse, ApiError> {
        self.record("identity");
        let next = self.identity.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Now(reply)) => reply,
            Some(Scripted::Later(rx)) => rx.await.unwrap_or_else(|_| unscripted()),
            None => unscripted(),
        }
    }

    async fn login(&self, _credentials: &Credentials) -> Result<ApiResponse, ApiError> {
        self.record("login");
        pop(&self.login)
    }

    async fn register(&self, _registration: &Registration) -> Result<ApiResponse, ApiError> {
        self.record("register");
        pop(&self.register)
    }

    async fn logout(&self) -> Result<ApiResponse, ApiError> {
        self.record("logout");
        pop(&self.logout)
    }
}

#[derive(Default)]
pub struct RecordingBrowser {
    pub cookies_set: Mutex<Vec<String>>,
    pub redirects: Mutex<Vec<String>>,
    pub fail: bool,
}

impl RecordingBrowser {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }
}

impl Browser for std::sync::Arc<RecordingBrowser> {
    fn cookies(&self) -> Result<String, BrowserError> {
        Ok(String::new())
    }

    fn set_cookie(&self, cookie: &str) -> Result<(), BrowserError> {
        if self.fail {
            return Err(BrowserError::Unavailable);
        }
        self.cookies_set.lock().unwrap().push(cookie.to_owned());
        Ok(())
    }

    fn redirect(&self, href: &str) -> Result<(), BrowserError> {
        if self.fail {
            return Err(BrowserError::Js("navigation blocked".into()));
        }
        self.redirects.lock().unwrap().push(href.to_owned());
        Ok(())
    }
}

pub fn ok(body: Value) -> Reply {
    Ok(ApiResponse::new(200, body))
}

pub fn status(code: u16, body: Value) -> Reply {
    Ok(ApiResponse::new(code, body))
}

pub fn user(handle: &str) -> Value {
    json!({ "username": handle, "avatar": format!("/media/avatars/{handle}.png") })
}

pub fn staff(handle: &str) -> Value {
    json!({ "username": handle, "avatar": "", "is_staff": true })
}

pub fn superuser(handle: &str) -> Value {
    json!({ "username": handle, "is_superuser": true })
}

pub fn creds() -> Credentials {
    Credentials { username: "alice".into(), password: "secret".into() }
}

pub fn store(mock: MockIdentity) -> SessionStore<MockIdentity> {
    SessionStore::new(mock).with_browser(std::sync::Arc::new(RecordingBrowser::default()))
}
