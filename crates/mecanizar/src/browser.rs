//! Delegate browser contract.
//!
//! Mecanizar owns no HTTP or DOM machinery of its own. Every generated
//! method acts through the [`Browser`] trait; the real client (a WebDriver
//! session, a CDP page, an in-process fake) lives outside this crate and is
//! consumed only through this contract.
//!
//! [`ScriptedBrowser`] is the in-crate test double: it answers from scripted
//! routes, forms, and links, and records every delegate action so tests can
//! assert on call order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered field-name to value map used for form fills and link criteria.
///
/// Ordered so that trace dumps and error messages are deterministic.
pub type FieldMap = BTreeMap<String, String>;

/// How a form is looked up on the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormSelector {
    /// By the form's `name` attribute
    Name,
    /// By the form's `id` attribute
    Id,
    /// By one-based position in the page
    Number,
}

impl FormSelector {
    /// Selector kind as it appears in trace lines and error messages
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Id => "id",
            Self::Number => "number",
        }
    }
}

/// Handle to a form located by the delegate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormHandle {
    /// Selector kind the form was resolved by
    pub selector: FormSelector,
    /// The concrete name/id/number it was resolved with
    pub value: String,
}

impl FormHandle {
    /// Create a new form handle
    #[must_use]
    pub fn new(selector: FormSelector, value: impl Into<String>) -> Self {
        Self {
            selector,
            value: value.into(),
        }
    }
}

/// A link located by the delegate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Target URL of the link
    pub url: String,
    /// Link text, if the delegate knows it
    pub text: Option<String>,
}

impl Link {
    /// Create a new link
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: None,
        }
    }

    /// Set the link text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// The capability set every delegate client must provide.
///
/// Synchronous by design: generated methods are sequential call chains into
/// the delegate, and nothing at this layer is meant for concurrent use.
/// Request failure is signalled through [`Browser::is_success`], not through
/// return values; timeouts, if any, belong to the delegate.
pub trait Browser {
    /// Navigate to `url`. The delegate tracks the resulting state.
    fn get(&mut self, url: &str);

    /// Path+query of the current page. `None` (or empty) signals that no
    /// page is available.
    fn current_location(&self) -> Option<String>;

    /// Whether the last request succeeded.
    ///
    /// Takes `&mut self` so recording doubles can log the read.
    fn is_success(&mut self) -> bool;

    /// Locate a form by name, id, or number.
    fn resolve_form(&mut self, selector: FormSelector, value: &str) -> Option<FormHandle>;

    /// Populate fields on a located form.
    fn set_fields(&mut self, form: &FormHandle, fields: &FieldMap);

    /// Submit the current form, optionally via a named button.
    fn submit_form(&mut self, fields: &FieldMap, button: Option<&str>);

    /// Locate a link matching `criteria`.
    fn find_link(&mut self, criteria: &FieldMap) -> Option<Link>;
}

/// One recorded delegate action.
///
/// `current_location()` is a state read, not an action, and is not recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelegateCall {
    /// `get(url)` was invoked
    Get {
        /// Requested URL
        url: String,
    },
    /// `resolve_form` was invoked
    ResolveForm {
        /// Selector kind
        selector: FormSelector,
        /// Concrete selector value
        value: String,
    },
    /// `set_fields` was invoked
    SetFields {
        /// Target form
        form: FormHandle,
        /// Fields applied
        fields: FieldMap,
    },
    /// `submit_form` was invoked
    SubmitForm {
        /// Fields submitted
        fields: FieldMap,
        /// Button used, if any
        button: Option<String>,
    },
    /// `find_link` was invoked
    FindLink {
        /// Criteria searched with
        criteria: FieldMap,
    },
    /// `is_success` was invoked
    IsSuccess,
}

/// Shared handle onto a [`ScriptedBrowser`]'s recorded delegate actions.
///
/// Clone it out before boxing the browser into a client; both ends see the
/// same log.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: std::sync::Arc<std::sync::Mutex<Vec<DelegateCall>>>,
}

impl CallLog {
    /// Recorded delegate actions, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<DelegateCall> {
        self.calls.lock().map(|c| (*c).clone()).unwrap_or_default()
    }

    /// Drain the recorded delegate actions.
    pub fn take(&self) -> Vec<DelegateCall> {
        self.calls.lock().map(|mut c| std::mem::take(&mut *c)).unwrap_or_default()
    }

    /// Whether anything was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.lock().map(|c| c.is_empty()).unwrap_or(true)
    }

    fn record(&self, call: DelegateCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

/// A scripted link: attributes the link answers to, plus the link itself.
#[derive(Debug, Clone)]
struct ScriptedLink {
    attributes: FieldMap,
    link: Link,
}

/// Scripted [`Browser`] implementation for tests.
///
/// Routes, forms, and links are declared up front; every delegate action is
/// recorded in order and can be drained with [`ScriptedBrowser::take_calls`].
#[derive(Debug, Default)]
pub struct ScriptedBrowser {
    location: Option<String>,
    success: bool,
    routes: BTreeMap<String, String>,
    forms: Vec<(FormSelector, String)>,
    links: Vec<ScriptedLink>,
    log: CallLog,
}

impl ScriptedBrowser {
    /// Create a browser with no current page that reports success.
    #[must_use]
    pub fn new() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    /// Set the current path+query.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set what `is_success` reports.
    #[must_use]
    pub const fn with_success(mut self, success: bool) -> Self {
        self.success = success;
        self
    }

    /// Script the path+query that navigating to `url` lands on.
    ///
    /// Unrouted URLs fall back to the URL's own path.
    #[must_use]
    pub fn with_route(mut self, url: impl Into<String>, path: impl Into<String>) -> Self {
        let _ = self.routes.insert(url.into(), path.into());
        self
    }

    /// Script a form the delegate can resolve.
    #[must_use]
    pub fn with_form(mut self, selector: FormSelector, value: impl Into<String>) -> Self {
        self.forms.push((selector, value.into()));
        self
    }

    /// Script a link. It matches any criteria whose every entry equals the
    /// corresponding attribute.
    #[must_use]
    pub fn with_link(mut self, attributes: FieldMap, link: Link) -> Self {
        self.links.push(ScriptedLink { attributes, link });
        self
    }

    /// Change what `is_success` reports mid-test.
    pub fn set_success(&mut self, success: bool) {
        self.success = success;
    }

    /// Shared handle onto the call log; clone before boxing the browser
    /// into a [`crate::Client`].
    #[must_use]
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// Recorded delegate actions, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<DelegateCall> {
        self.log.calls()
    }

    /// Drain the recorded delegate actions.
    pub fn take_calls(&mut self) -> Vec<DelegateCall> {
        self.log.take()
    }
}

/// Path+query of `url`, used when no route is scripted.
fn derived_path(url: &str) -> String {
    url.split_once("://").map_or_else(
        || url.to_string(),
        |(_, rest)| rest.find('/').map_or_else(|| "/".to_string(), |i| rest[i..].to_string()),
    )
}

impl Browser for ScriptedBrowser {
    fn get(&mut self, url: &str) {
        self.log.record(DelegateCall::Get {
            url: url.to_string(),
        });
        let path = self
            .routes
            .get(url)
            .cloned()
            .unwrap_or_else(|| derived_path(url));
        self.location = Some(path);
    }

    fn current_location(&self) -> Option<String> {
        self.location.clone()
    }

    fn is_success(&mut self) -> bool {
        self.log.record(DelegateCall::IsSuccess);
        self.success
    }

    fn resolve_form(&mut self, selector: FormSelector, value: &str) -> Option<FormHandle> {
        self.log.record(DelegateCall::ResolveForm {
            selector,
            value: value.to_string(),
        });
        self.forms
            .iter()
            .find(|(s, v)| *s == selector && v == value)
            .map(|(s, v)| FormHandle::new(*s, v.clone()))
    }

    fn set_fields(&mut self, form: &FormHandle, fields: &FieldMap) {
        self.log.record(DelegateCall::SetFields {
            form: form.clone(),
            fields: fields.clone(),
        });
    }

    fn submit_form(&mut self, fields: &FieldMap, button: Option<&str>) {
        self.log.record(DelegateCall::SubmitForm {
            fields: fields.clone(),
            button: button.map(ToString::to_string),
        });
    }

    fn find_link(&mut self, criteria: &FieldMap) -> Option<Link> {
        self.log.record(DelegateCall::FindLink {
            criteria: criteria.clone(),
        });
        self.links
            .iter()
            .find(|scripted| {
                criteria
                    .iter()
                    .all(|(k, v)| scripted.attributes.get(k) == Some(v))
            })
            .map(|scripted| scripted.link.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod derived_path_tests {
        use super::*;

        #[test]
        fn test_absolute_url() {
            assert_eq!(derived_path("http://example.com/a/b?q=1"), "/a/b?q=1");
        }

        #[test]
        fn test_host_only() {
            assert_eq!(derived_path("http://example.com"), "/");
        }

        #[test]
        fn test_already_a_path() {
            assert_eq!(derived_path("/plain/path"), "/plain/path");
        }
    }

    mod scripted_browser_tests {
        use super::*;

        #[test]
        fn test_get_follows_route() {
            let mut browser = ScriptedBrowser::new().with_route("http://foo/bar", "/foo/bar");
            browser.get("http://foo/bar");
            assert_eq!(browser.current_location().as_deref(), Some("/foo/bar"));
        }

        #[test]
        fn test_get_derives_path_without_route() {
            let mut browser = ScriptedBrowser::new();
            browser.get("http://foo/bar");
            assert_eq!(browser.current_location().as_deref(), Some("/bar"));
        }

        #[test]
        fn test_resolve_form_by_kind_and_value() {
            let mut browser = ScriptedBrowser::new().with_form(FormSelector::Name, "login");
            assert!(browser.resolve_form(FormSelector::Name, "login").is_some());
            assert!(browser.resolve_form(FormSelector::Id, "login").is_none());
            assert!(browser.resolve_form(FormSelector::Name, "other").is_none());
        }

        #[test]
        fn test_find_link_matches_all_criteria_entries() {
            let mut attributes = FieldMap::new();
            let _ = attributes.insert("text".to_string(), "Log in".to_string());
            let _ = attributes.insert("class".to_string(), "nav".to_string());
            let mut browser =
                ScriptedBrowser::new().with_link(attributes, Link::new("/login").with_text("Log in"));

            let mut criteria = FieldMap::new();
            let _ = criteria.insert("text".to_string(), "Log in".to_string());
            assert_eq!(browser.find_link(&criteria).unwrap().url, "/login");

            let _ = criteria.insert("class".to_string(), "footer".to_string());
            assert!(browser.find_link(&criteria).is_none());
        }

        #[test]
        fn test_call_log_records_actions_in_order() {
            let mut browser = ScriptedBrowser::new();
            browser.get("/a");
            let _ = browser.is_success();
            let calls = browser.take_calls();
            assert_eq!(
                calls,
                vec![
                    DelegateCall::Get {
                        url: "/a".to_string()
                    },
                    DelegateCall::IsSuccess,
                ]
            );
            assert!(browser.calls().is_empty());
        }

        #[test]
        fn test_location_read_is_not_recorded() {
            let mut browser = ScriptedBrowser::new().with_location("/here");
            let _ = browser.current_location();
            assert!(browser.take_calls().is_empty());
        }
    }
}
