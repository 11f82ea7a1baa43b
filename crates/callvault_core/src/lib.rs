//! Core data types for the CallVault workspace.
//!
//! This crate provides the wall-clock abstraction every time-windowed
//! component is defined against, the contract constants and configuration
//! shared by the throttler and the streaming controller, the chat message
//! types the controller reasons about, and tracing initialisation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod config;
pub mod limits;
mod message;
mod role;
mod telemetry;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock, TokioClock};
pub use config::{CallVaultConfig, StreamingConfig, ThrottleConfig};
pub use message::ChatMessage;
pub use role::Role;
pub use telemetry::{ObservabilityConfig, init_tracing};
