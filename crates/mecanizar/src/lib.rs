//! Mecanizar: Declarative Macro Methods for Browser Test Clients
//!
//! Mecanizar (Spanish: "to mechanize") turns declarative specifications
//! into callable, chainable macro methods on a browser test client: fetch a
//! page, fill and submit a form, follow a link, or run a custom handler.
//! Every generated method traces its call signature, optionally asserts the
//! current page location, performs one delegate action, and reports request
//! success.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   MECANIZAR Architecture                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Method     │    │ Client     │    │ Delegate   │            │
//! │   │ Specs      │───►│ Dispatch + │───►│ Browser    │            │
//! │   │ (declared) │    │ Runtime    │    │ (external) │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! │                           │                                      │
//! │                           ▼                                      │
//! │                     DiagnosticSink (trace lines)                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All real HTTP/DOM work is delegated through the [`Browser`] trait; this
//! crate is the method factory, the shared execution skeleton, and the
//! diagnostic formatting, nothing more.
//!
//! # Example
//!
//! ```
//! use mecanizar::{Client, FetchSpec, ScriptedBrowser};
//!
//! # fn main() -> mecanizar::MacroResult<()> {
//! let mut client = Client::new(Box::new(ScriptedBrowser::new()));
//!
//! client.macros_mut().register_fetch(
//!     FetchSpec::new("view_account", "account page", "http://bank.example/account"),
//! )?;
//!
//! client.call("view_account", &[])?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod browser;
mod client;
mod diagnostics;
mod location;
mod registry;
mod result;
mod runtime;
mod spec;

pub use browser::{
    Browser, CallLog, DelegateCall, FieldMap, FormHandle, FormSelector, Link, ScriptedBrowser,
};
pub use client::Client;
pub use diagnostics::{
    call_signature, dump_map, dump_value, init_tracing, BufferSink, DiagnosticSink, TraceEntry,
    TracingSink,
};
pub use location::{HardFail, LocationAssertion, MismatchHandler};
pub use registry::MacroLibrary;
pub use result::{Error, MacroResult};
pub use spec::{
    ComputeFn, CustomSpec, FetchSpec, FieldValue, FormSpec, HandlerFn, LinkSelector, LinkSpec,
    MethodSpec, TransformFn,
};
