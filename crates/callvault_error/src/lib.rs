//! Error types for the CallVault core.
//!
//! This crate provides the foundation error types used throughout the CallVault workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use callvault_error::{CallVaultResult, TransportError, TransportErrorKind};
//!
//! fn fetch_page() -> CallVaultResult<String> {
//!     Err(TransportError::new(TransportErrorKind::Request(
//!         "Connection refused".to_string(),
//!     )))?
//! }
//!
//! assert!(fetch_page().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod json;
mod reconnect;
mod throttle;
mod transport;

pub use config::ConfigError;
pub use error::{CallVaultError, CallVaultErrorKind, CallVaultResult};
pub use json::JsonError;
pub use reconnect::{ReconnectError, ReconnectErrorKind};
pub use throttle::{ThrottleError, ThrottleErrorKind};
pub use transport::{TransportError, TransportErrorKind};
