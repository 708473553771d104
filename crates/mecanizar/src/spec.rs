//! Declarative method specifications.
//!
//! A spec is an immutable record supplied once at registration time; the
//! registry closes over it and every later invocation of the generated
//! method replays it against the delegate. Several fields accept either a
//! literal or a per-call callback; [`FieldValue`] is that union, resolved
//! uniformly before use.

use crate::browser::FieldMap;
use crate::client::Client;
use crate::location::LocationAssertion;
use crate::result::MacroResult;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Callback computing a string from the client and the user args.
pub type ComputeFn = Arc<dyn Fn(&mut Client, &[Value]) -> String + Send + Sync>;

/// Callback producing a field map from the client and the user args.
pub type TransformFn = Arc<dyn Fn(&mut Client, &[Value]) -> FieldMap + Send + Sync>;

/// Body of a custom generated method. The returned value is discarded by
/// the runtime (chaining always yields the client), but an `Err` aborts
/// the call.
pub type HandlerFn = Arc<dyn Fn(&mut Client, &[Value]) -> MacroResult<Value> + Send + Sync>;

/// A spec field that is either a literal or computed per call.
#[derive(Clone)]
pub enum FieldValue {
    /// Fixed string supplied at registration
    Literal(String),
    /// Computed from `(client, args)` at every invocation
    Computed(ComputeFn),
}

impl FieldValue {
    /// Wrap a per-call callback.
    pub fn computed(f: impl Fn(&mut Client, &[Value]) -> String + Send + Sync + 'static) -> Self {
        Self::Computed(Arc::new(f))
    }

    /// Resolve to a concrete string for this invocation.
    pub(crate) fn resolve(&self, client: &mut Client, args: &[Value]) -> String {
        match self {
            Self::Literal(s) => s.clone(),
            Self::Computed(f) => f(client, args),
        }
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(s) => f.debug_tuple("Literal").field(s).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Literal(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Literal(s)
    }
}

/// Spec for a page-fetching method.
#[derive(Debug, Clone)]
pub struct FetchSpec {
    pub(crate) method_name: String,
    pub(crate) page_description: String,
    pub(crate) page_url: String,
    pub(crate) assert_location: Option<LocationAssertion>,
    pub(crate) required_param_label: Option<String>,
}

impl FetchSpec {
    /// Create a fetch spec. All three fields are required at registration.
    #[must_use]
    pub fn new(
        method_name: impl Into<String>,
        page_description: impl Into<String>,
        page_url: impl Into<String>,
    ) -> Self {
        Self {
            method_name: method_name.into(),
            page_description: page_description.into(),
            page_url: page_url.into(),
            assert_location: None,
            required_param_label: None,
        }
    }

    /// Assert the current location before fetching.
    #[must_use]
    pub fn with_assert_location(mut self, assertion: impl Into<LocationAssertion>) -> Self {
        self.assert_location = Some(assertion.into());
        self
    }

    /// Require a trailing call argument, described by `label` in the error
    /// raised when it is missing. The argument is appended verbatim to the
    /// page URL.
    #[must_use]
    pub fn with_required_param(mut self, label: impl Into<String>) -> Self {
        self.required_param_label = Some(label.into());
        self
    }
}

/// Spec for a form-filling-and-submitting method.
///
/// Registration requires a location assertion and at least one of the
/// name/id/number resolvers. When several resolvers are set, a fixed
/// priority applies: name over id over number.
#[derive(Clone)]
pub struct FormSpec {
    pub(crate) method_name: String,
    pub(crate) form_description: String,
    pub(crate) assert_location: Option<LocationAssertion>,
    pub(crate) form_name: Option<FieldValue>,
    pub(crate) form_id: Option<FieldValue>,
    pub(crate) form_number: Option<FieldValue>,
    pub(crate) form_button: Option<FieldValue>,
    pub(crate) transform_fields: Option<TransformFn>,
}

impl FormSpec {
    /// Create a form spec.
    #[must_use]
    pub fn new(method_name: impl Into<String>, form_description: impl Into<String>) -> Self {
        Self {
            method_name: method_name.into(),
            form_description: form_description.into(),
            assert_location: None,
            form_name: None,
            form_id: None,
            form_number: None,
            form_button: None,
            transform_fields: None,
        }
    }

    /// Assert the current location before touching the form.
    #[must_use]
    pub fn with_assert_location(mut self, assertion: impl Into<LocationAssertion>) -> Self {
        self.assert_location = Some(assertion.into());
        self
    }

    /// Resolve the form by its `name` attribute.
    #[must_use]
    pub fn with_form_name(mut self, name: impl Into<FieldValue>) -> Self {
        self.form_name = Some(name.into());
        self
    }

    /// Resolve the form by its `id` attribute.
    #[must_use]
    pub fn with_form_id(mut self, id: impl Into<FieldValue>) -> Self {
        self.form_id = Some(id.into());
        self
    }

    /// Resolve the form by its one-based position in the page.
    #[must_use]
    pub fn with_form_number(mut self, number: impl Into<FieldValue>) -> Self {
        self.form_number = Some(number.into());
        self
    }

    /// Submit via a named button.
    #[must_use]
    pub fn with_button(mut self, button: impl Into<FieldValue>) -> Self {
        self.form_button = Some(button.into());
        self
    }

    /// Turn the call arguments into the field map applied to the form.
    /// Without a transform the generated method applies no fields.
    #[must_use]
    pub fn with_transform(
        mut self,
        f: impl Fn(&mut Client, &[Value]) -> FieldMap + Send + Sync + 'static,
    ) -> Self {
        self.transform_fields = Some(Arc::new(f));
        self
    }

    pub(crate) fn has_resolver(&self) -> bool {
        self.form_name.is_some() || self.form_id.is_some() || self.form_number.is_some()
    }
}

impl fmt::Debug for FormSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormSpec")
            .field("method_name", &self.method_name)
            .field("form_description", &self.form_description)
            .field("assert_location", &self.assert_location)
            .field("form_name", &self.form_name)
            .field("form_id", &self.form_id)
            .field("form_number", &self.form_number)
            .field("form_button", &self.form_button)
            .field("transform_fields", &self.transform_fields.is_some())
            .finish()
    }
}

/// How a link-following method selects its link: fixed criteria supplied at
/// registration, or criteria computed from the call arguments. Exactly one
/// mechanism, by construction.
#[derive(Clone)]
pub enum LinkSelector {
    /// Criteria map used verbatim on every invocation
    Criteria(FieldMap),
    /// Criteria computed from `(client, args)` at every invocation
    Transform(TransformFn),
}

impl fmt::Debug for LinkSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Criteria(map) => f.debug_tuple("Criteria").field(map).finish(),
            Self::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

/// Spec for a link-following method.
#[derive(Debug, Clone)]
pub struct LinkSpec {
    pub(crate) method_name: String,
    pub(crate) link_description: String,
    pub(crate) assert_location: Option<LocationAssertion>,
    pub(crate) selector: LinkSelector,
}

impl LinkSpec {
    /// Create a link spec with fixed find-link criteria.
    #[must_use]
    pub fn with_criteria(
        method_name: impl Into<String>,
        link_description: impl Into<String>,
        criteria: FieldMap,
    ) -> Self {
        Self {
            method_name: method_name.into(),
            link_description: link_description.into(),
            assert_location: None,
            selector: LinkSelector::Criteria(criteria),
        }
    }

    /// Create a link spec whose criteria are computed per call.
    #[must_use]
    pub fn with_transform(
        method_name: impl Into<String>,
        link_description: impl Into<String>,
        f: impl Fn(&mut Client, &[Value]) -> FieldMap + Send + Sync + 'static,
    ) -> Self {
        Self {
            method_name: method_name.into(),
            link_description: link_description.into(),
            assert_location: None,
            selector: LinkSelector::Transform(Arc::new(f)),
        }
    }

    /// Assert the current location before following the link.
    #[must_use]
    pub fn with_assert_location(mut self, assertion: impl Into<LocationAssertion>) -> Self {
        self.assert_location = Some(assertion.into());
        self
    }
}

/// Spec for a custom method: the handler is the whole action.
#[derive(Clone)]
pub struct CustomSpec {
    pub(crate) method_name: String,
    pub(crate) assert_location: Option<LocationAssertion>,
    pub(crate) handler: HandlerFn,
}

impl CustomSpec {
    /// Create a custom spec.
    #[must_use]
    pub fn new(
        method_name: impl Into<String>,
        handler: impl Fn(&mut Client, &[Value]) -> MacroResult<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            method_name: method_name.into(),
            assert_location: None,
            handler: Arc::new(handler),
        }
    }

    /// Assert the current location before running the handler.
    #[must_use]
    pub fn with_assert_location(mut self, assertion: impl Into<LocationAssertion>) -> Self {
        self.assert_location = Some(assertion.into());
        self
    }
}

impl fmt::Debug for CustomSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomSpec")
            .field("method_name", &self.method_name)
            .field("assert_location", &self.assert_location)
            .finish()
    }
}

/// Union of the four generation kinds, as stored in the registry.
#[derive(Debug, Clone)]
pub enum MethodSpec {
    /// Fetch a page by URL
    Fetch(FetchSpec),
    /// Fill and submit a form
    Form(FormSpec),
    /// Find and follow a link
    Link(LinkSpec),
    /// Run a custom handler
    Custom(CustomSpec),
}

impl MethodSpec {
    /// The name the method is registered under.
    #[must_use]
    pub fn method_name(&self) -> &str {
        match self {
            Self::Fetch(s) => &s.method_name,
            Self::Form(s) => &s.method_name,
            Self::Link(s) => &s.method_name,
            Self::Custom(s) => &s.method_name,
        }
    }

    /// The location assertion to run before the action, if any.
    #[must_use]
    pub fn assert_location(&self) -> Option<&LocationAssertion> {
        match self {
            Self::Fetch(s) => s.assert_location.as_ref(),
            Self::Form(s) => s.assert_location.as_ref(),
            Self::Link(s) => s.assert_location.as_ref(),
            Self::Custom(s) => s.assert_location.as_ref(),
        }
    }
}
