//! String helpers for building request URLs.

/// Join a base URL and a relative path with exactly one slash between them.
///
/// An empty path yields the base without its trailing slash.
pub fn join(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return base.to_string();
    }
    format!("{base}/{path}")
}

/// Reduce a URL to `scheme://host[:port]`. `None` when it does not parse.
pub fn host_only(url: &str) -> Option<String> {
    let parsed = ::url::Url::parse(url).ok()?;
    if !parsed.has_host() {
        return None;
    }
    Some(parsed.origin().ascii_serialization())
}

/// Render `key=value` pairs joined with `&`.
///
/// Keys and values are written as given, without percent-encoding. The
/// partner API's search endpoint has always been called this way, so a
/// value containing `&` or `=` will be split by the server.
pub fn query_string<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    params
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Append a query string to `url`, leaving it untouched when `query` is empty.
pub fn with_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        url.to_string()
    } else {
        format!("{url}?{query}")
    }
}
