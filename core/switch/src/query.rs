//! Read and rewrite `application/x-www-form-urlencoded` request query strings.
use anyhow::Context;
use anyhow::Result;

use crate::conf::EXIT_SENTINEL;
use crate::errors::QueryDecode;
use crate::errors::QueryEncode;

type Pairs = Vec<(String, String)>;

/// Build the URL to exit impersonation from the page at `path` and `query`.
///
/// Any trigger already in the query is replaced, all other parameters are kept as they are.
pub fn exit_url(path: &str, query: Option<&str>, parameter: &str) -> Result<String> {
    let trigger = serde_urlencoded::to_string(&[(parameter, EXIT_SENTINEL)]).context(QueryEncode)?;
    let query = match strip_parameter(query, parameter)? {
        None => trigger,
        Some(query) => format!("{}&{}", query, trigger),
    };
    Ok(render_url(path, Some(&query)))
}

/// Render a URL from a path and an optional query string.
pub fn render_url(path: &str, query: Option<&str>) -> String {
    match query {
        Some(query) if !query.is_empty() => format!("{}?{}", path, query),
        _ => path.to_string(),
    }
}

/// Remove every value of `parameter` from the query string.
///
/// All other parameters are kept verbatim, in their original relative order.
/// Returns `None` when no parameter is left.
pub fn strip_parameter(query: Option<&str>, parameter: &str) -> Result<Option<String>> {
    let query = match query {
        None => return Ok(None),
        Some(query) => query,
    };
    let mut kept = Vec::new();
    for segment in query.split('&').filter(|segment| !segment.is_empty()) {
        if decode_segment(segment)?.0 != parameter {
            kept.push(segment);
        }
    }
    if kept.is_empty() {
        return Ok(None);
    }
    Ok(Some(kept.join("&")))
}

/// Look up the value of the trigger `parameter` in the query string.
///
/// When the parameter is repeated the last value wins.
/// Parameters with an empty value are treated as missing.
pub fn trigger_value(query: Option<&str>, parameter: &str) -> Result<Option<String>> {
    let query = match query {
        None => return Ok(None),
        Some(query) => query,
    };
    let mut value = None;
    for segment in query.split('&').filter(|segment| !segment.is_empty()) {
        let (name, decoded) = decode_segment(segment)?;
        if name == parameter {
            value = Some(decoded);
        }
    }
    Ok(value.filter(|value| !value.is_empty()))
}

/// Decode the name and value of a single `name=value` query segment.
fn decode_segment(segment: &str) -> Result<(String, String)> {
    let pairs: Pairs = serde_urlencoded::from_str(segment).context(QueryDecode)?;
    let pair = pairs.into_iter().next().unwrap_or_default();
    Ok(pair)
}

#[cfg(test)]
mod tests {
    #[test]
    fn exit_url_appends_sentinel() {
        let url = super::exit_url("/admin", Some("page=3"), "_switch_user").unwrap();
        assert_eq!(url, "/admin?page=3&_switch_user=_exit");
    }

    #[test]
    fn exit_url_replaces_trigger() {
        let url = super::exit_url("/", Some("_switch_user=kuba&page=3"), "_switch_user").unwrap();
        assert_eq!(url, "/?page=3&_switch_user=_exit");
        let url = super::exit_url("/", None, "_switch_user").unwrap();
        assert_eq!(url, "/?_switch_user=_exit");
    }

    #[test]
    fn render_url_without_query() {
        assert_eq!(super::render_url("/", None), "/");
        assert_eq!(super::render_url("/", Some("")), "/");
        assert_eq!(super::render_url("/a", Some("b=c")), "/a?b=c");
    }

    #[test]
    fn strip_keeps_other_parameters() {
        let query = Some("_switch_user=kuba&page=3&section=2");
        let stripped = super::strip_parameter(query, "_switch_user").unwrap();
        assert_eq!(stripped.as_deref(), Some("page=3&section=2"));
    }

    #[test]
    fn strip_keeps_order() {
        let query = Some("z=1&_switch_user=kuba&a=2&_switch_user=other&m=3");
        let stripped = super::strip_parameter(query, "_switch_user").unwrap();
        assert_eq!(stripped.as_deref(), Some("z=1&a=2&m=3"));
    }

    #[test]
    fn strip_only_parameter() {
        let stripped = super::strip_parameter(Some("_switch_user=_exit"), "_switch_user").unwrap();
        assert_eq!(stripped, None);
        let stripped = super::strip_parameter(None, "_switch_user").unwrap();
        assert_eq!(stripped, None);
    }

    #[test]
    fn strip_keeps_segments_verbatim() {
        let query = Some("_switch_user=kuba&name=%FF&greeting=a%20b&flag&q=~");
        let stripped = super::strip_parameter(query, "_switch_user").unwrap();
        assert_eq!(stripped.as_deref(), Some("name=%FF&greeting=a%20b&flag&q=~"));
    }

    #[test]
    fn strip_encoded_trigger_name() {
        let query = Some("page=3&_switch%5Fuser=kuba");
        let stripped = super::strip_parameter(query, "_switch_user").unwrap();
        assert_eq!(stripped.as_deref(), Some("page=3"));
    }

    #[test]
    fn exit_url_keeps_segments_verbatim() {
        let url = super::exit_url("/", Some("name=%FF&flag"), "_switch_user").unwrap();
        assert_eq!(url, "/?name=%FF&flag&_switch_user=_exit");
    }

    #[test]
    fn trigger_last_value_wins() {
        let query = Some("_switch_user=kuba&name=%FF&_switch_user=jane");
        let value = super::trigger_value(query, "_switch_user").unwrap();
        assert_eq!(value.as_deref(), Some("jane"));
    }

    #[test]
    fn trigger_decoded() {
        let value = super::trigger_value(Some("_switch_user=j%C3%BCrgen%40example"), "_switch_user");
        assert_eq!(value.unwrap().as_deref(), Some("jürgen@example"));
    }

    #[test]
    fn trigger_empty_is_missing() {
        let value = super::trigger_value(Some("_switch_user=&page=3"), "_switch_user").unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn trigger_missing() {
        let value = super::trigger_value(Some("page=3"), "_switch_user").unwrap();
        assert_eq!(value, None);
        let value = super::trigger_value(None, "_switch_user").unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn trigger_zero_is_present() {
        let value = super::trigger_value(Some("_switch_user=0"), "_switch_user").unwrap();
        assert_eq!(value.as_deref(), Some("0"));
    }
}
