use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static URL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());
static NON_ID_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static ID_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]+").unwrap());

/// Id of the category control at `ordinal`
pub fn category_id(ordinal: usize) -> String {
    format!("category_{}", ordinal + 1)
}

/// Id of the `sequence`-th item captured in the category at `ordinal`
pub fn question_id(ordinal: usize, sequence: usize) -> String {
    format!("q_{}_{}", ordinal, sequence)
}

/// Slug-style id derived from free text ("How to Pay?" -> "how-to-pay")
pub fn generate_id(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_ID_CHARS.replace_all(&lowered, "");
    let joined = ID_SEPARATORS.replace_all(&stripped, "-");
    joined.trim_matches('-').to_string()
}

/// Local time formatted the way every artifact records it
pub fn format_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Compact local time for file names
pub fn file_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Basic well-formedness check for a target URL
pub fn validate_url(url: &str) -> bool {
    if url.is_empty() || !URL_SHAPE.is_match(url) {
        return false;
    }
    Url::parse(url).is_ok()
}

/// Convert a string to a sanitized file name prefix
pub fn sanitize_filename(name: &str) -> String {
    let mut name = name.replace("http://", "").replace("https://", "");
    name = name.replace(['/', ':', '?', '&', '=', '#', '%', ' ', '\\'], "_");

    // Limit length on a char boundary
    if name.chars().count() > 100 {
        name.chars().take(100).collect()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids() {
        assert_eq!(category_id(0), "category_1");
        assert_eq!(question_id(3, 12), "q_3_12");
    }

    #[test]
    fn test_generate_id() {
        assert_eq!(generate_id("How to Pay?"), "how-to-pay");
        assert_eq!(generate_id("  --Spaces   and - dashes-- "), "spaces-and-dashes");
        assert_eq!(generate_id("차량 구매/주문"), "차량-구매주문");
        assert_eq!(generate_id(""), "");
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://www.kia.com/kr/customer-service/center/faq"));
        assert!(validate_url("http://localhost:8080/faq"));
        assert!(!validate_url(""));
        assert!(!validate_url("ftp://example.com"));
        assert!(!validate_url("https://"));
        assert!(!validate_url("https://exa mple.com"));
    }

    #[test]
    fn test_timestamp_shape() {
        let ts = format_timestamp();
        assert_eq!(ts.len(), 19);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(file_timestamp().len(), 15);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("kia faq/v2"), "kia_faq_v2");
        assert_eq!(sanitize_filename(&"a".repeat(150)).len(), 100);
    }
}
