//! URL utilities for building generation requests
//!
//! Endpoints are configured as bare base URLs; prompts travel as a single
//! percent-encoded path segment appended to them.

/// Normalize a base URL by removing trailing slashes
///
/// # Examples
///
/// ```
/// use chatterbox::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://text.example.com"), "https://text.example.com");
/// assert_eq!(normalize_base_url("https://text.example.com///"), "https://text.example.com");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a base URL and a path without doubling slashes
///
/// # Examples
///
/// ```
/// use chatterbox::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://image.example.com/", "/prompt"),
///     "https://image.example.com/prompt"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}

/// Percent-encode `prompt` as one path segment below `base_url/prefix`
///
/// An empty `prefix` places the prompt directly under the base URL.
///
/// # Examples
///
/// ```
/// use chatterbox::utils::url::prompt_url;
///
/// assert_eq!(
///     prompt_url("https://image.example.com", "prompt", "a cat/dog?"),
///     "https://image.example.com/prompt/a%20cat%2Fdog%3F"
/// );
/// ```
pub fn prompt_url(base_url: &str, prefix: &str, prompt: &str) -> String {
    let encoded = urlencoding::encode(prompt);
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        construct_api_url(base_url, &encoded)
    } else {
        construct_api_url(base_url, &format!("{prefix}/{encoded}"))
    }
}
