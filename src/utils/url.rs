//! URL helpers for building Gemini endpoints.

/// Normalize a base URL by removing trailing slashes
///
/// # Examples
///
/// ```
/// use gemchat::utils::url::normalize_base_url;
///
/// assert_eq!(
///     normalize_base_url("https://generativelanguage.googleapis.com/v1beta/"),
///     "https://generativelanguage.googleapis.com/v1beta"
/// );
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Build the URL of a model method such as `generateContent`.
///
/// The model may be given bare (`gemini-2.5-flash`) or with its resource
/// prefix (`models/gemini-2.5-flash`).
///
/// # Examples
///
/// ```
/// use gemchat::utils::url::model_method_url;
///
/// assert_eq!(
///     model_method_url("https://example.test/v1beta/", "gemini-2.5-flash", "generateContent"),
///     "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
/// );
/// ```
pub fn model_method_url(base_url: &str, model: &str, method: &str) -> String {
    let model = model.trim().trim_start_matches('/');
    let model = model.strip_prefix("models/").unwrap_or(model);
    format!("{}/models/{}:{}", normalize_base_url(base_url), model, method)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_removed() {
        assert_eq!(
            normalize_base_url("https://api.example.com/v1///"),
            "https://api.example.com/v1"
        );
        assert_eq!(
            normalize_base_url("https://api.example.com"),
            "https://api.example.com"
        );
    }

    #[test]
    fn model_prefix_is_not_duplicated() {
        assert_eq!(
            model_method_url("https://api.example.com/v1beta", "models/gemini-pro", "generateContent"),
            "https://api.example.com/v1beta/models/gemini-pro:generateContent"
        );
        assert_eq!(
            model_method_url("https://api.example.com/v1beta", " gemini-pro ", "generateContent"),
            "https://api.example.com/v1beta/models/gemini-pro:generateContent"
        );
    }
}
