//! Access to the parts of inbound requests switch user inspects and rewrites.
use anyhow::Result;

use crate::query::render_url;

/// Read and rewrite the query string of an inbound request.
pub trait SwitchRequest {
    /// Raw query string of the request, if any.
    fn query(&self) -> Option<&str>;

    /// Replace the raw query string of the request in place.
    fn set_query(&mut self, query: Option<String>) -> Result<()>;

    /// URL of the request, including the current query string.
    fn url(&self) -> String;
}

/// Transport independent request target: a path and an optional query string.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RequestTarget {
    /// Path component of the request URL.
    pub path: String,

    /// Raw query string of the request URL.
    pub query: Option<String>,
}

impl RequestTarget {
    /// Split a request target (`/path?query`) into its components.
    pub fn parse(target: &str) -> RequestTarget {
        match target.split_once('?') {
            None => RequestTarget {
                path: target.to_string(),
                query: None,
            },
            Some((path, query)) => RequestTarget {
                path: path.to_string(),
                query: Some(query.to_string()),
            },
        }
    }
}

impl SwitchRequest for RequestTarget {
    fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    fn set_query(&mut self, query: Option<String>) -> Result<()> {
        self.query = query;
        Ok(())
    }

    fn url(&self) -> String {
        render_url(&self.path, self.query.as_deref())
    }
}

#[cfg(feature = "actix-web")]
impl SwitchRequest for actix_web::dev::ServiceRequest {
    fn query(&self) -> Option<&str> {
        self.uri().query()
    }

    fn set_query(&mut self, query: Option<String>) -> Result<()> {
        use actix_web::http::uri::PathAndQuery;
        use actix_web::http::Uri;

        let path_and_query = render_url(self.path(), query.as_deref());
        let mut parts = self.head().uri.clone().into_parts();
        parts.path_and_query = Some(PathAndQuery::try_from(path_and_query)?);
        let uri = Uri::from_parts(parts)?;

        // Keep routing information in sync with the rewritten URI.
        self.match_info_mut().get_mut().update(&uri);
        self.head_mut().uri = uri;
        Ok(())
    }

    fn url(&self) -> String {
        self.uri().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::RequestTarget;
    use super::SwitchRequest;

    #[test]
    fn parse_target() {
        let target = RequestTarget::parse("/admin?page=3");
        assert_eq!(target.path, "/admin");
        assert_eq!(target.query(), Some("page=3"));
        assert_eq!(RequestTarget::parse("/admin").query(), None);
    }

    #[test]
    fn rewrite_query() {
        let mut target = RequestTarget::parse("/admin?_switch_user=kuba");
        target.set_query(Some("page=3".into())).unwrap();
        assert_eq!(target.url(), "/admin?page=3");
        target.set_query(None).unwrap();
        assert_eq!(target.url(), "/admin");
    }
}
