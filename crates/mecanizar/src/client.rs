//! The test client and the generic dispatcher for generated methods.

use crate::browser::Browser;
use crate::diagnostics::{call_signature, DiagnosticSink, TracingSink};
use crate::location::{HardFail, LocationAssertion, MismatchHandler};
use crate::registry::MacroLibrary;
use crate::result::{Error, MacroResult};
use crate::runtime;
use crate::spec::MethodSpec;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A browser test client with generated macro methods.
///
/// The client owns exactly one delegate [`Browser`] and a [`MacroLibrary`];
/// [`Client::call`] looks the named spec up and executes it against the
/// delegate, returning `&mut Self` so calls chain:
///
/// ```
/// use mecanizar::{Client, FetchSpec, ScriptedBrowser};
///
/// # fn main() -> mecanizar::MacroResult<()> {
/// let mut client = Client::new(Box::new(ScriptedBrowser::new()));
/// client
///     .macros_mut()
///     .register_fetch(FetchSpec::new("home", "home page", "http://host/"))?;
/// client.call("home", &[])?.call("home", &[])?;
/// # Ok(())
/// # }
/// ```
pub struct Client {
    delegate: Box<dyn Browser>,
    macros: MacroLibrary,
    sink: Arc<dyn DiagnosticSink>,
    mismatch_handler: Arc<dyn MismatchHandler>,
}

impl Client {
    /// Create a client around a delegate, with an empty macro library, the
    /// `tracing`-backed sink, and the hard-fail mismatch policy.
    #[must_use]
    pub fn new(delegate: Box<dyn Browser>) -> Self {
        Self {
            delegate,
            macros: MacroLibrary::new(),
            sink: Arc::new(TracingSink),
            mismatch_handler: Arc::new(HardFail),
        }
    }

    /// Attach a pre-built macro library.
    #[must_use]
    pub fn with_macros(mut self, macros: MacroLibrary) -> Self {
        self.macros = macros;
        self
    }

    /// Replace the diagnostic sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the location-mismatch policy.
    #[must_use]
    pub fn with_mismatch_handler(mut self, handler: Arc<dyn MismatchHandler>) -> Self {
        self.mismatch_handler = handler;
        self
    }

    /// The macro library.
    #[must_use]
    pub fn macros(&self) -> &MacroLibrary {
        &self.macros
    }

    /// The macro library, for registration.
    pub fn macros_mut(&mut self) -> &mut MacroLibrary {
        &mut self.macros
    }

    /// The delegate browser.
    #[must_use]
    pub fn delegate(&self) -> &dyn Browser {
        self.delegate.as_ref()
    }

    /// The delegate browser, mutably.
    pub fn delegate_mut(&mut self) -> &mut dyn Browser {
        self.delegate.as_mut()
    }

    /// Invoke a generated method by name.
    ///
    /// Runs the shared skeleton: trace the call signature, run the
    /// location assertion if the spec carries one, perform the action,
    /// report status. Returns the client for chaining; the first error
    /// aborts the call and unwinds to the caller.
    pub fn call(&mut self, name: &str, args: &[Value]) -> MacroResult<&mut Self> {
        let Some(spec) = self.macros.get(name) else {
            return Err(Error::Argument {
                message: format!("no generated method named {name}"),
            });
        };

        self.trace(&call_signature(name, args), 0);
        if let Some(assertion) = spec.assert_location() {
            self.assert_location(assertion)?;
        }

        match spec.as_ref() {
            MethodSpec::Fetch(fetch) => runtime::run_fetch(self, fetch, args)?,
            MethodSpec::Form(form) => runtime::run_form(self, form, args)?,
            MethodSpec::Link(link) => runtime::run_link(self, link, args)?,
            MethodSpec::Custom(custom) => runtime::run_custom(self, custom, args)?,
        }
        Ok(self)
    }

    /// Check the delegate's current path+query against `assertion`.
    ///
    /// Fails with [`Error::Precondition`] when the delegate has no current
    /// URL or the assertion itself is empty. A match traces
    /// `URL [..] matched assertion`; a mismatch is handed to the injected
    /// [`MismatchHandler`], which by default fails the call.
    pub fn assert_location(&mut self, assertion: &LocationAssertion) -> MacroResult<()> {
        let url = self
            .delegate
            .current_location()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::Precondition {
                message: "delegate reports no current URL".to_string(),
            })?;
        if assertion.is_empty() {
            return Err(Error::Precondition {
                message: "location assertion is empty".to_string(),
            });
        }

        if assertion.check(&url) {
            self.trace(&format!("URL [{url}] matched assertion"), 0);
            Ok(())
        } else {
            self.mismatch_handler.on_mismatch(assertion, &url)
        }
    }

    /// Read and trace the delegate's success flag.
    ///
    /// The trace line sits one indent level deeper than the surrounding
    /// call. Generated methods ignore the returned boolean; it is exposed
    /// for callers that want it directly.
    pub fn report_status(&mut self) -> bool {
        let ok = self.delegate.is_success();
        self.trace(&format!("is_success() returned {ok}"), 1);
        ok
    }

    pub(crate) fn trace(&self, text: &str, indent: usize) {
        self.sink.write(text, indent);
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("macros", &self.macros)
            .finish_non_exhaustive()
    }
}
