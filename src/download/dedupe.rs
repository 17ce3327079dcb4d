//! Duplicate suppression by terminal filename.
//!
//! Two URLs are duplicates when the text after their last `/` is equal. This
//! assumes the catalog encodes the media filename as the final path segment;
//! the same filename under different folders, or a differing query string,
//! is not recognised.

use std::collections::HashSet;

/// The filename key of a URL: everything after the last `/`, or the whole
/// string when there is none.
pub fn file_name_key(url: &str) -> &str {
    match url.rfind('/') {
        Some(idx) => &url[idx + 1..],
        None => url,
    }
}

/// Keep the first URL for each filename key, preserving order.
pub fn dedupe<S: AsRef<str>>(urls: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.iter()
        .map(AsRef::as_ref)
        .filter(|url| seen.insert(file_name_key(url)))
        .map(str::to_string)
        .collect()
}
