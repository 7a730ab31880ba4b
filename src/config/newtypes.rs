//! Secret-bearing newtype wrappers for configuration values.
//!
//! Both types mask their value in `Debug` output so configuration records can
//! be logged without leaking credentials.

use std::fmt;

/// The client secret of the service principal used for subscription management.
///
/// # Example
///
/// ```rust
/// use eventgrid_binding::ClientSecret;
///
/// let secret = ClientSecret::new("s3cr3t");
/// assert_eq!(secret.as_ref(), "s3cr3t");
/// assert_eq!(format!("{:?}", secret), "ClientSecret(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSecret(String);

impl ClientSecret {
    /// Wraps a client secret.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }
}

impl AsRef<str> for ClientSecret {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClientSecret(*****)")
    }
}

/// The shared access key sent in the `aeg-sas-key` header when publishing.
///
/// # Example
///
/// ```rust
/// use eventgrid_binding::AccessKey;
///
/// let key = AccessKey::new("topic-key");
/// assert_eq!(format!("{:?}", key), "AccessKey(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AccessKey(String);

impl AccessKey {
    /// Wraps a topic access key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl AsRef<str> for AccessKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessKey(*****)")
    }
}
