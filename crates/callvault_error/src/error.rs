//! Top-level error wrapper types.

use crate::{ConfigError, JsonError, ReconnectError, ThrottleError, TransportError};

/// Every error the CallVault crates can surface.
///
/// # Examples
///
/// ```
/// use callvault_error::{CallVaultError, JsonError};
///
/// let json_err = JsonError::new("expected value at line 1");
/// let err: CallVaultError = json_err.into();
/// assert!(format!("{}", err).contains("JSON Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum CallVaultErrorKind {
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Transport failure
    #[from(TransportError)]
    Transport(TransportError),
    /// Throttler error
    #[from(ThrottleError)]
    Throttle(ThrottleError),
    /// Reconnect loop gave up
    #[from(ReconnectError)]
    Reconnect(ReconnectError),
}

/// CallVault error with kind discrimination.
///
/// # Examples
///
/// ```
/// use callvault_error::{CallVaultResult, ConfigError};
///
/// fn might_fail() -> CallVaultResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("CallVault Error: {}", _0)]
pub struct CallVaultError(Box<CallVaultErrorKind>);

impl CallVaultError {
    /// Create a new error from a kind.
    pub fn new(kind: CallVaultErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &CallVaultErrorKind {
        &self.0
    }
}

impl<T> From<T> for CallVaultError
where
    T: Into<CallVaultErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for CallVault operations.
pub type CallVaultResult<T> = std::result::Result<T, CallVaultError>;
