//! URI model (§4.A): parse, resolve against a base, and expose the pieces
//! the tag-handler needs. Adapted from the teacher's `imurl::ImUrl` — same
//! immutable, cheaply-cloneable `Arc<Url>` wrapper — generalized with a
//! `resolve` operation since the extractor's dominant operation is
//! "resolve this relative reference against the current base", not mutation
//! of an existing URL's components.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use url::Url;

use crate::error::ExtractError;

/// An immutable, cheaply-cloneable absolute URI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Uri {
    text: Arc<str>,
    url: Arc<Url>,
}

impl Uri {
    /// Parse an absolute URI. RFC 3986 via the `url` crate; IDN hosts are
    /// accepted (the crate normalizes them through IDNA under the hood).
    pub fn parse(input: &str) -> Result<Self, ExtractError> {
        let url = Url::parse(input).map_err(|e| ExtractError::BadUri(format!("{input}: {e}")))?;
        Ok(Self {
            text: Arc::from(url.as_str()),
            url: Arc::new(url),
        })
    }

    /// Resolve `reference` (absolute or relative) against `base`.
    pub fn resolve(base: &Uri, reference: &str) -> Result<Self, ExtractError> {
        let url = base
            .url
            .join(reference)
            .map_err(|e| ExtractError::BadUri(format!("{reference} against {base}: {e}")))?;
        Ok(Self {
            text: Arc::from(url.as_str()),
            url: Arc::new(url),
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    #[must_use]
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Host plus (non-default) port, with userinfo stripped — never echo
    /// embedded credentials into a context/log string.
    #[must_use]
    pub fn authority_minus_userinfo(&self) -> String {
        match (self.url.host_str(), self.url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        }
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl Hash for Uri {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl Deref for Uri {
    type Target = Url;

    fn deref(&self) -> &Self::Target {
        &self.url
    }
}

impl AsRef<str> for Uri {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Serializes as its string form, matching how the CLI's `--json` output and
/// the teacher's own URL-bearing schema types (`page_extractor::schema`)
/// represent a URL in wire/JSON form.
impl serde::Serialize for Uri {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_absolute() {
        let u = Uri::parse("http://h/p/q").unwrap();
        assert_eq!(u.scheme(), "http");
        assert_eq!(u.path(), "/p/q");
    }

    #[test]
    fn resolve_relative_path() {
        let base = Uri::parse("http://h/p/q").unwrap();
        let r = Uri::resolve(&base, "/x").unwrap();
        assert_eq!(r.as_str(), "http://h/x");
    }

    #[test]
    fn resolve_relative_sibling() {
        let base = Uri::parse("http://h/docs/index.html").unwrap();
        let r = Uri::resolve(&base, "sibling.html").unwrap();
        assert_eq!(r.as_str(), "http://h/docs/sibling.html");
    }

    #[test]
    fn resolve_protocol_relative() {
        let base = Uri::parse("https://h/p").unwrap();
        let r = Uri::resolve(&base, "//other/q").unwrap();
        assert_eq!(r.as_str(), "https://other/q");
    }

    #[test]
    fn bad_uri_is_non_fatal_kind() {
        let base = Uri::parse("http://h/").unwrap();
        let err = Uri::resolve(&base, "http://[invalid").unwrap_err();
        assert!(matches!(err, ExtractError::BadUri(_)));
    }

    #[test]
    fn authority_strips_userinfo() {
        let u = Uri::parse("http://user:pass@h:8080/p").unwrap();
        assert_eq!(u.authority_minus_userinfo(), "h:8080");
    }
}
