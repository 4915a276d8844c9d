//! URL composition and classification.

use url::Url;

/// Join `base` and `segments` with exactly one `/` at every join point.
///
/// Separators at the join points are collapsed and empty parts are skipped,
/// so nesting joins gives the same result as a single call.
///
/// ```
/// use cluster_overlay_config::join;
///
/// assert_eq!(join("a/", &["/b", "c/"]), "a/b/c");
/// assert_eq!(join("http://cluster:8443/", &["oapi", "v1"]), "http://cluster:8443/oapi/v1");
/// ```
pub fn join<S: AsRef<str>>(base: &str, segments: &[S]) -> String {
    let mut joined = base.trim_end_matches('/').to_owned();

    for segment in segments {
        let part = segment.as_ref().trim_matches('/');
        if part.is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.push('/');
        }
        joined.push_str(part);
    }

    joined
}

/// True when `url` has a host and no path beyond `/`.
///
/// Unparseable or host-less input (`alt-host:`, `mailto:x`) is classified as
/// "not root" instead of failing.
pub fn is_root_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed.has_host() && matches!(parsed.path(), "" | "/"),
        Err(error) => {
            tracing::debug!(%error, "override url is not parseable; treating as non-root");
            false
        },
    }
}

/// End `url` with exactly one `/`, collapsing any trailing run.
pub fn ensure_trailing_slash(mut url: String) -> String {
    let kept = url.trim_end_matches('/').len();
    url.truncate(kept);
    url.push('/');
    url
}
