//! URL utilities for consistent endpoint construction.
//!
//! The server base URL comes from config or the command line and may or
//! may not carry a trailing slash; these helpers keep the endpoint URLs
//! free of double slashes either way.

/// Normalize a base URL by removing trailing slashes.
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Construct a complete endpoint URL from a base URL and a path.
///
/// # Examples
///
/// ```
/// use confide::utils::url::endpoint_url;
///
/// assert_eq!(
///     endpoint_url("http://localhost:8000", "api/chat"),
///     "http://localhost:8000/api/chat"
/// );
/// assert_eq!(
///     endpoint_url("http://localhost:8000/", "/api/chat"),
///     "http://localhost:8000/api/chat"
/// );
/// ```
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let path = path.trim_start_matches('/');
    format!("{}/{}", normalized_base, path)
}
