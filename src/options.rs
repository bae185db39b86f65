//! Request option tokens.
//!
//! These enums mirror the option vocabulary of fetch-style HTTP layers.
//! The builder records them verbatim and each [`Transport`](crate::Transport)
//! decides what, if anything, they mean; see the transport documentation for
//! how the default reqwest transport treats each one.
//!
//! | Option | Tokens |
//! |--------|--------|
//! | [`RequestMode`] | `cors`, `no-cors`, `same-origin`, `navigate` |
//! | [`RedirectPolicy`] | `follow`, `error`, `manual` |
//! | [`CredentialsPolicy`] | `omit`, `same-origin`, `include` |

use std::fmt;

/// Cross-origin mode requested for the call.
///
/// Only meaningful to transports that implement a browser-style
/// same-origin security model. Left unconfigured, no mode is forwarded
/// at all and the transport applies its own default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Allow cross-origin requests.
    Cors,
    /// Restrict to simple cross-origin requests.
    NoCors,
    /// Reject cross-origin requests outright.
    SameOrigin,
    /// Navigation request, as issued when following a link.
    Navigate,
}

impl RequestMode {
    /// The wire token for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMode::Cors => "cors",
            RequestMode::NoCors => "no-cors",
            RequestMode::SameOrigin => "same-origin",
            RequestMode::Navigate => "navigate",
        }
    }
}

impl fmt::Display for RequestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when the server answers with a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectPolicy {
    /// Follow the redirect chain transparently.
    Follow,
    /// Treat any redirect as a transport error.
    Error,
    /// Return the redirect response itself, 3xx status included.
    Manual,
}

impl RedirectPolicy {
    /// The wire token for this policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            RedirectPolicy::Follow => "follow",
            RedirectPolicy::Error => "error",
            RedirectPolicy::Manual => "manual",
        }
    }
}

impl fmt::Display for RedirectPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether ambient credentials accompany the call.
///
/// Another browser-model token: cookie jars and HTTP auth caches live in
/// the transport, so this is advisory for transports that have neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsPolicy {
    /// Never send credentials.
    Omit,
    /// Send credentials on same-origin calls only.
    SameOrigin,
    /// Always send credentials.
    Include,
}

impl CredentialsPolicy {
    /// The wire token for this policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialsPolicy::Omit => "omit",
            CredentialsPolicy::SameOrigin => "same-origin",
            CredentialsPolicy::Include => "include",
        }
    }
}

impl fmt::Display for CredentialsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
