//! Toast notifications.
//! A `Toast` is plain data so reducers can emit it through `Command::Notify`;
//! `show` renders it into a `#toast-root` container created once per page.

use crate::constants::{TOAST_CONNECTION_ERROR_MS, TOAST_DEFAULT_MS};
use serde::Serialize;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Document, Element, HtmlElement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub description: Option<String>,
    pub duration_ms: i32,
    pub closable: bool,
}

impl Toast {
    fn new(kind: ToastKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: None,
            duration_ms: TOAST_DEFAULT_MS,
            closable: false,
        }
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, title)
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(ToastKind::Error, title)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Long-lived, dismissible error for an unreachable service.
    pub fn connection_failed(api_url: &str) -> Self {
        Self {
            duration_ms: TOAST_CONNECTION_ERROR_MS,
            closable: true,
            ..Self::error("Failed to connect to the agent server")
                .with_description(format!(
                    "Please ensure your server is running at {} and that the API key, if required, is correct.",
                    api_url
                ))
        }
    }
}

pub fn show(toast: &Toast) {
    let window = match web_sys::window() {
        Some(w) => w,
        None => return,
    };
    let document = match window.document() {
        Some(d) => d,
        None => return,
    };
    let root = match ensure_root(&document) {
        Some(r) => r,
        None => return,
    };
    let el = match render(&document, toast) {
        Some(el) => el,
        None => return,
    };

    // Prepend so newest appears on top.
    let _ = root.prepend_with_node_1(&el);

    let el: HtmlElement = el.unchecked_into();
    let cb = Closure::once_into_js(move || {
        let _ = el.parent_node().map(|p| p.remove_child(&el));
    });
    let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        cb.as_ref().unchecked_ref(),
        toast.duration_ms,
    );

    ensure_styles(&document);
}

fn render(document: &Document, toast: &Toast) -> Option<Element> {
    let el = document.create_element("div").ok()?;
    el.set_class_name("toast");
    let kind_class = match toast.kind {
        ToastKind::Success => "toast-success",
        ToastKind::Error => "toast-error",
    };
    el.class_list().add_1(kind_class).ok()?;

    let title = document.create_element("div").ok()?;
    title.set_class_name("toast-title");
    title.set_text_content(Some(&toast.title));
    el.append_child(&title).ok()?;

    if let Some(description) = &toast.description {
        let body = document.create_element("div").ok()?;
        body.set_class_name("toast-description");
        body.set_text_content(Some(description));
        el.append_child(&body).ok()?;
    }

    if toast.closable {
        let close = document.create_element("button").ok()?;
        close.set_class_name("toast-close");
        close.set_text_content(Some("×"));
        let target: HtmlElement = el.clone().unchecked_into();
        let on_click = Closure::<dyn FnMut()>::new(move || {
            let _ = target.parent_node().map(|p| p.remove_child(&target));
        });
        let _ = close.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref());
        on_click.forget();
        el.append_child(&close).ok()?;
    }

    Some(el)
}

fn ensure_root(document: &Document) -> Option<Element> {
    if let Some(el) = document.get_element_by_id("toast-root") {
        return Some(el);
    }
    let root = document.create_element("div").ok()?;
    root.set_id("toast-root");
    root.set_class_name("toast-root");
    document.body()?.append_child(&root).ok()?;
    Some(root)
}

fn ensure_styles(document: &Document) {
    if document.get_element_by_id("toast-styles").is_some() {
        return;
    }

    let css = "
.toast-root{position:fixed;top:16px;right:16px;display:flex;flex-direction:column;gap:8px;z-index:9999;font-family:var(--font-family, Arial, Helvetica, sans-serif)}
.toast{position:relative;max-width:360px;padding:10px 32px 10px 16px;border-radius:4px;color:#fff;box-shadow:0 2px 4px rgba(0,0,0,.1);opacity:0;animation:toast-in .2s forwards}
.toast-title{font-weight:600}
.toast-description{margin-top:4px;font-size:.9em;opacity:.9}
.toast-close{position:absolute;top:6px;right:8px;border:0;background:none;color:inherit;cursor:pointer;font-size:16px}
.toast-success{background:#16a34a}
.toast-error{background:#dc2626}
@keyframes toast-in{to{opacity:1}}
";

    if let (Ok(style), Some(head)) = (document.create_element("style"), document.head()) {
        style.set_id("toast-styles");
        style.set_text_content(Some(css));
        let _ = head.append_child(&style);
    }
}
