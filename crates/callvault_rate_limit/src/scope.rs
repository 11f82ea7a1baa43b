//! Throttle scope keys.

use serde::{Deserialize, Serialize};

/// Name of an admission window.
///
/// The meeting-fetch integrations use one `global` scope shared by every
/// caller plus one `user:<id>` scope per end user; a request must pass both.
///
/// # Examples
///
/// ```
/// use callvault_rate_limit::Scope;
///
/// assert_eq!(Scope::global().as_str(), "global");
/// assert_eq!(Scope::user("42").to_string(), "user:42");
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("{}", _0)]
pub struct Scope(String);

impl Scope {
    /// The scope shared by every caller in the process.
    pub fn global() -> Self {
        Self("global".to_string())
    }

    /// The scope of a single end user.
    pub fn user(id: impl AsRef<str>) -> Self {
        Self(format!("user:{}", id.as_ref()))
    }

    /// An arbitrary scope, e.g. `google-calendar:<id>`.
    pub fn named(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The scope key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Scope {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Scope {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}
