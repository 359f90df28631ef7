//! Request method tokens.
//!
//! Covers RFC 9110 standard methods, WebDAV extensions (RFC 4918 / 4791 / 3253 / 5323),
//! and `PURGE` used by nginx and Varnish for cache invalidation. Any other
//! well-formed token (a CLI-style verb in script mode, say) is an
//! [`Extension`](Method::Extension).
//!
//! The host hands the raw method over as a string, and the pipeline compares
//! it exactly against the token a route was registered with. `"get"` never
//! matches a `GET` route.

use std::fmt;
use std::str::FromStr;

use crate::error::InvalidMethod;

/// A request method token.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    // RFC 9110 ─────────────────────────────────────────────────────────────────
    Connect,
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    Trace,
    // WebDAV RFC 4918 ──────────────────────────────────────────────────────────
    Copy,
    Lock,
    Mkcol,
    Move,
    Propfind,
    Proppatch,
    Unlock,
    // WebDAV extensions ────────────────────────────────────────────────────────
    Mkcalendar, // RFC 4791 — CalDAV
    Report,     // RFC 3253
    Search,     // RFC 5323
    // Cache invalidation ───────────────────────────────────────────────────────
    Purge, // nginx / Varnish
    /// Any other token. Build it through [`FromStr`] so known tokens never
    /// end up here.
    Extension(Box<str>),
}

impl Method {
    /// Returns the wire representation (e.g. `"GET"`).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Connect      => "CONNECT",
            Self::Copy         => "COPY",
            Self::Delete       => "DELETE",
            Self::Get          => "GET",
            Self::Head         => "HEAD",
            Self::Lock         => "LOCK",
            Self::Mkcalendar   => "MKCALENDAR",
            Self::Mkcol        => "MKCOL",
            Self::Move         => "MOVE",
            Self::Options      => "OPTIONS",
            Self::Patch        => "PATCH",
            Self::Post         => "POST",
            Self::Propfind     => "PROPFIND",
            Self::Proppatch    => "PROPPATCH",
            Self::Purge        => "PURGE",
            Self::Put          => "PUT",
            Self::Report       => "REPORT",
            Self::Search       => "SEARCH",
            Self::Trace        => "TRACE",
            Self::Unlock       => "UNLOCK",
            Self::Extension(t) => &**t,
        }
    }
}

/// RFC 9110 §5.6.2 `tchar`.
fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

/// Parses a method token. Case-sensitive per RFC 9110 §9.1; fails only for
/// empty strings or characters that cannot appear in a token.
impl FromStr for Method {
    type Err = InvalidMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "CONNECT"    => Self::Connect,
            "COPY"       => Self::Copy,
            "DELETE"     => Self::Delete,
            "GET"        => Self::Get,
            "HEAD"       => Self::Head,
            "LOCK"       => Self::Lock,
            "MKCALENDAR" => Self::Mkcalendar,
            "MKCOL"      => Self::Mkcol,
            "MOVE"       => Self::Move,
            "OPTIONS"    => Self::Options,
            "PATCH"      => Self::Patch,
            "POST"       => Self::Post,
            "PROPFIND"   => Self::Propfind,
            "PROPPATCH"  => Self::Proppatch,
            "PURGE"      => Self::Purge,
            "PUT"        => Self::Put,
            "REPORT"     => Self::Report,
            "SEARCH"     => Self::Search,
            "TRACE"      => Self::Trace,
            "UNLOCK"     => Self::Unlock,
            _ if !s.is_empty() && s.bytes().all(is_tchar) => Self::Extension(s.into()),
            _ => return Err(InvalidMethod(s.to_owned())),
        })
    }
}

impl AsRef<str> for Method {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
