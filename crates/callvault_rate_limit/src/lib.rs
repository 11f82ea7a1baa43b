//! Admission-controlled request throttling.
//!
//! Integrations that call third-party APIs (Fathom, Zoom, Google Calendar)
//! share a [`SharedThrottle`] so that, per scope, no more than
//! `max_requests` calls are admitted per window. Callers simply await
//! admission; being over the limit is never an error, only a delay.
//!
//! ```rust,ignore
//! use callvault_rate_limit::{Scope, SharedThrottle};
//! use callvault_core::ThrottleConfig;
//!
//! let throttle = SharedThrottle::new(ThrottleConfig::default());
//! throttle.throttle_scopes(&[Scope::global(), Scope::user("user-123")]).await;
//! // issue the request
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod scope;
mod throttle;
mod window;

pub use callvault_core::limits::{RATE_JITTER_MS, RATE_MAX_REQUESTS, RATE_WINDOW_MS};
pub use scope::Scope;
pub use throttle::SharedThrottle;
pub use window::RateWindow;
