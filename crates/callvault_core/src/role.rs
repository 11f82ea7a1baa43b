//! Role types for chat participants.

use serde::{Deserialize, Serialize};

/// Who authored a chat message.
///
/// # Examples
///
/// ```
/// use callvault_core::Role;
///
/// assert_ne!(Role::User, Role::Assistant);
/// assert_eq!(format!("{}", Role::Assistant), "Assistant");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System prompt
    System,
    /// The human asking about their calls
    User,
    /// The model answering
    Assistant,
}
