//! Browser side effects behind a seam.
//!
//! The session store needs three things from the page: read cookies, expire
//! cookies, and force a full-page navigation. [`WebBrowser`] does them through
//! `web-sys` in `csr` builds; elsewhere every call reports
//! [`BrowserError::Unavailable`] so SSR-free native tests stay deterministic.

#[cfg(test)]
#[path = "browser_test.rs"]
mod browser_test;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrowserError {
    #[error("no browser window available")]
    Unavailable,

    #[error("browser call failed: {0}")]
    Js(String),
}

pub trait Browser: Send + Sync {
    /// Current `document.cookie`.
    fn cookies(&self) -> Result<String, BrowserError>;

    /// Assign one `document.cookie` entry.
    fn set_cookie(&self, cookie: &str) -> Result<(), BrowserError>;

    /// Full-page navigation, bypassing the in-app router.
    fn redirect(&self, href: &str) -> Result<(), BrowserError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WebBrowser;

#[cfg(feature = "csr")]
fn html_document() -> Result<web_sys::HtmlDocument, BrowserError> {
    use wasm_bindgen::JsCast;

    web_sys::window()
        .and_then(|w| w.document())
        .ok_or(BrowserError::Unavailable)?
        .dyn_into::<web_sys::HtmlDocument>()
        .map_err(|_| BrowserError::Js("document is not an HTML document".to_owned()))
}

#[cfg(feature = "csr")]
fn js_error(err: wasm_bindgen::JsValue) -> BrowserError {
    BrowserError::Js(format!("{err:?}"))
}

impl Browser for WebBrowser {
    fn cookies(&self) -> Result<String, BrowserError> {
        #[cfg(feature = "csr")]
        {
            html_document()?.cookie().map_err(js_error)
        }
        #[cfg(not(feature = "csr"))]
        {
            Err(BrowserError::Unavailable)
        }
    }

    fn set_cookie(&self, cookie: &str) -> Result<(), BrowserError> {
        #[cfg(feature = "csr")]
        {
            html_document()?.set_cookie(cookie).map_err(js_error)
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = cookie;
            Err(BrowserError::Unavailable)
        }
    }

    fn redirect(&self, href: &str) -> Result<(), BrowserError> {
        #[cfg(feature = "csr")]
        {
            web_sys::window()
                .ok_or(BrowserError::Unavailable)?
                .location()
                .set_href(href)
                .map_err(js_error)
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = href;
            Err(BrowserError::Unavailable)
        }
    }
}
