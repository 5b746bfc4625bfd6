//! Joining of storage paths and public URLs.

/// Join `segments` onto `base` with single `/` separators.
///
/// Trailing slashes on `base` and surrounding slashes on each segment are
/// removed; empty segments are skipped. Scheme separators such as `gs://`
/// or `https://` in `base` are preserved.
///
/// ```
/// use mangaka_core::paths::join;
///
/// assert_eq!(join("gs://bucket/", &["out", "/t1/"]), "gs://bucket/out/t1");
/// assert_eq!(join("https://svc", &["", "outputs"]), "https://svc/outputs");
/// ```
pub fn join(base: &str, segments: &[&str]) -> String {
    let trimmed = base.trim_end_matches('/');
    let mut joined = if trimmed.is_empty() && base.starts_with('/') {
        String::from("/")
    } else {
        trimmed.to_owned()
    };

    for segment in segments {
        let segment = segment.trim_matches('/');
        if segment.is_empty() {
            continue;
        }
        if !joined.is_empty() && !joined.ends_with('/') {
            joined.push('/');
        }
        joined.push_str(segment);
    }
    joined
}
