//! Sensitive data marker for automatic redaction
//!
//! The `Sensitive<T>` wrapper ensures that database credentials (auth
//! tokens, legacy database secrets) are never accidentally logged or displayed.

use std::fmt;

/// Wrapper for sensitive data that redacts itself in Debug and Display
///
/// # Example
///
/// ```
/// use rtdbx_core_types::Sensitive;
///
/// let token = Sensitive::new("db-secret");
/// println!("{:?}", token); // Prints: ***REDACTED***
/// println!("{}", token);   // Prints: ***REDACTED***
///
/// // Access the actual value when needed
/// assert_eq!(token.expose(), &"db-secret");
/// ```
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a sensitive value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying sensitive value
    ///
    /// Only the REST transport should call this, when it builds the
    /// `auth` query parameter.
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T: Clone> Clone for Sensitive<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
