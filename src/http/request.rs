//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Turn the raw query string into a validated FetchRequest
//!
//! # Design Decisions
//! - The target must be an absolute URI; anything else is rejected before any
//!   network activity
//! - The existence-check flag is lenient: absent or unparseable means false
//! - The query string is parsed by hand so repeated keys never reject the
//!   request; their values are comma-joined instead

use axum::http::{HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use url::{form_urlencoded, Url};

use crate::fetch::{FetchMode, FetchRequest};
use crate::http::response::ProxyError;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates a fresh UUID v4 for requests that arrive without an ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Raw query parameters of a proxy request.
#[derive(Debug, Clone, Default)]
pub struct SafeUrlQuery {
    pub url: Option<String>,
    pub check_exists_only: Option<String>,
}

impl SafeUrlQuery {
    /// Collect `url` and `checkExistsOnly` from a raw query string.
    ///
    /// Keys match case-insensitively. A repeated key keeps every value,
    /// joined with commas, so `checkExistsOnly=true&checkExistsOnly=x`
    /// reads as `"true,x"` and falls back to a full-content fetch.
    pub fn from_query(raw: Option<&str>) -> Self {
        let mut query = Self::default();
        for (key, value) in form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            let slot = if key.eq_ignore_ascii_case("url") {
                &mut query.url
            } else if key.eq_ignore_ascii_case("checkExistsOnly") {
                &mut query.check_exists_only
            } else {
                continue;
            };
            *slot = match slot.take() {
                Some(mut joined) => {
                    joined.push(',');
                    joined.push_str(&value);
                    Some(joined)
                }
                None => Some(value.into_owned()),
            };
        }
        query
    }

    pub fn into_fetch_request(self) -> Result<FetchRequest, ProxyError> {
        let raw = self.url.unwrap_or_default();
        let target = parse_target(&raw)?;
        let mode = FetchMode::from_flag(parse_flag(self.check_exists_only.as_deref()));
        Ok(FetchRequest { target, mode })
    }
}

/// Parse an absolute URI. Relative references and garbage are rejected.
pub fn parse_target(raw: &str) -> Result<Url, ProxyError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ProxyError::InvalidTarget(raw.to_string()));
    }
    let url = Url::parse(raw).map_err(|_| ProxyError::InvalidTarget(raw.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ProxyError::InvalidTarget(raw.to_string()));
    }
    Ok(url)
}

/// `true`/`false` in any case, surrounding whitespace ignored. Anything else is false.
pub fn parse_flag(raw: Option<&str>) -> bool {
    raw.map(str::trim)
        .is_some_and(|value| value.eq_ignore_ascii_case("true"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_urls() {
        for raw in ["not a url", "", "   ", "/relative/path.png", "mailto:someone@example.com"] {
            assert!(
                matches!(parse_target(raw), Err(ProxyError::InvalidTarget(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_accepts_absolute_urls() {
        let url = parse_target("https://example.com/icons/512.png?v=2").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(url.path(), "/icons/512.png");
    }

    #[test]
    fn test_flag_parsing() {
        assert!(parse_flag(Some("true")));
        assert!(parse_flag(Some(" TRUE ")));
        assert!(!parse_flag(Some("false")));
        assert!(!parse_flag(Some("yes")));
        assert!(!parse_flag(Some("1")));
        assert!(!parse_flag(None));
    }

    #[test]
    fn test_query_into_fetch_request() {
        let query = SafeUrlQuery {
            url: Some("http://example.com/a.png".into()),
            check_exists_only: Some("True".into()),
        };
        let request = query.into_fetch_request().unwrap();
        assert_eq!(request.mode, FetchMode::ExistenceCheck);
        assert_eq!(request.target.as_str(), "http://example.com/a.png");

        let missing = SafeUrlQuery::default().into_fetch_request();
        assert!(matches!(missing, Err(ProxyError::InvalidTarget(_))));
    }

    #[test]
    fn test_from_query_decodes_and_ignores_unknown_keys() {
        let query = SafeUrlQuery::from_query(Some(
            "URL=https%3A%2F%2Fexample.com%2Fa.png%3Fv%3D1&checkexistsonly=true&extra=1",
        ));
        assert_eq!(query.url.as_deref(), Some("https://example.com/a.png?v=1"));
        assert_eq!(query.check_exists_only.as_deref(), Some("true"));

        let empty = SafeUrlQuery::from_query(None);
        assert!(empty.url.is_none());
        assert!(empty.check_exists_only.is_none());
    }

    #[test]
    fn test_repeated_keys_are_joined() {
        let query = SafeUrlQuery::from_query(Some(
            "url=http://example.com/a.png&checkExistsOnly=true&checkExistsOnly=x",
        ));
        assert_eq!(query.check_exists_only.as_deref(), Some("true,x"));
        let request = query.into_fetch_request().unwrap();
        assert_eq!(request.mode, FetchMode::FullContent);

        let doubled = SafeUrlQuery::from_query(Some("url=&url=not%20a%20url"));
        assert_eq!(doubled.url.as_deref(), Some(",not a url"));
        assert!(matches!(
            doubled.into_fetch_request(),
            Err(ProxyError::InvalidTarget(_))
        ));
    }

    #[test]
    fn test_request_ids_are_unique() {
        let mut maker = MakeRequestUuidV4;
        let request = Request::new(());
        let a = maker.make_request_id(&request).unwrap();
        let b = maker.make_request_id(&request).unwrap();
        assert_ne!(a.header_value(), b.header_value());
    }
}
