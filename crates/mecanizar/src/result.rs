//! Result and error types for Mecanizar.

use thiserror::Error;

/// Result type for Mecanizar operations
pub type MacroResult<T> = Result<T, Error>;

/// Errors raised by registration and by generated methods.
///
/// Every error is fatal to the in-progress call: it unwinds to the caller,
/// nothing is retried or swallowed. Test frameworks surface these as test
/// failures.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad registration spec (missing, empty, or conflicting fields)
    #[error("invalid method spec: {message}")]
    Config {
        /// What was wrong with the spec
        message: String,
    },

    /// Bad runtime call arguments
    #[error("bad call: {message}")]
    Argument {
        /// What was wrong with the call
        message: String,
    },

    /// The delegate could not find the requested form or link
    #[error("{message}")]
    Lookup {
        /// What could not be found, including the selector used
        message: String,
    },

    /// No current URL available, or the assertion itself is invalid
    #[error("precondition failed: {message}")]
    Precondition {
        /// Which precondition did not hold
        message: String,
    },

    /// The location assertion did not match the current location
    #[error("URL [{url}] does not match assertion [{assertion}]")]
    LocationMismatch {
        /// The assertion that was evaluated
        assertion: String,
        /// The delegate's current path+query
        url: String,
    },
}
