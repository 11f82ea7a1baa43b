//! Uniform view over the things a classifier may be handed.

use callvault_error::TransportError;
use std::borrow::Cow;

/// Something that may or may not be an error.
///
/// Transports report failures as structured errors, UI layers sometimes
/// only have the text, and sometimes there is nothing at all. Classifiers
/// accept any of these and answer `false` for anything that is not an error
/// or a string.
///
/// # Examples
///
/// ```
/// use callvault_streaming::ErrorSubject;
///
/// assert_eq!(ErrorSubject::from("fetch failed").message(), Some("fetch failed"));
/// assert_eq!(ErrorSubject::from(None::<&str>).message(), None);
/// assert_eq!(ErrorSubject::from(429_i64).message(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorSubject<'a> {
    /// A structured error with a name and a message
    Error {
        /// Error name, e.g. `AbortError`
        name: Cow<'a, str>,
        /// Raw error message
        message: Cow<'a, str>,
    },
    /// A bare error string
    Text(Cow<'a, str>),
    /// Absent or non-error input
    Other,
}

impl ErrorSubject<'_> {
    /// The error name, for structured errors only.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Error { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The inspectable text, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Error { message, .. } => Some(message),
            Self::Text(text) => Some(text),
            Self::Other => None,
        }
    }
}

impl<'a> From<&'a str> for ErrorSubject<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(Cow::Borrowed(text))
    }
}

impl<'a> From<&'a String> for ErrorSubject<'a> {
    fn from(text: &'a String) -> Self {
        Self::Text(Cow::Borrowed(text.as_str()))
    }
}

impl From<String> for ErrorSubject<'static> {
    fn from(text: String) -> Self {
        Self::Text(Cow::Owned(text))
    }
}

impl<'a> From<&'a TransportError> for ErrorSubject<'a> {
    fn from(err: &'a TransportError) -> Self {
        Self::Error {
            name: Cow::Borrowed(err.name()),
            message: Cow::Owned(err.message()),
        }
    }
}

impl<'a> From<&'a (dyn std::error::Error + 'a)> for ErrorSubject<'a> {
    fn from(err: &'a (dyn std::error::Error + 'a)) -> Self {
        Self::Error {
            name: Cow::Borrowed("Error"),
            message: Cow::Owned(err.to_string()),
        }
    }
}

impl<'a, T> From<Option<T>> for ErrorSubject<'a>
where
    T: Into<ErrorSubject<'a>>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Other, Into::into)
    }
}

impl From<()> for ErrorSubject<'_> {
    fn from(_: ()) -> Self {
        Self::Other
    }
}

macro_rules! not_an_error {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ErrorSubject<'_> {
                fn from(_: $ty) -> Self {
                    Self::Other
                }
            }
        )*
    };
}

not_an_error!(i32, i64, u16, u32, u64, f64, bool);
