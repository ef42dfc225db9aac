// Utility functions
pub mod validation;

/// Resolve an image URL against the page it was found on.
/// Protocol-relative URLs get an https scheme; relative paths resolve
/// against the base URL; absolute URLs pass through.
pub fn resolve_image_url(image_url: &str, base_url: &str) -> Option<String> {
    if let Some(rest) = image_url.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }

    // Try parsing as absolute URL first
    if url::Url::parse(image_url).is_ok() {
        return Some(image_url.to_string());
    }

    // Resolve relative URL against the base URL
    if let Ok(base) = url::Url::parse(base_url) {
        if let Ok(resolved) = base.join(image_url) {
            return Some(resolved.to_string());
        }
    }

    None
}
