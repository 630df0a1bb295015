/// Shared utility functions

/// Safely truncate a string at a UTF-8 boundary
pub fn safe_truncate(s: &str, max_bytes: usize) -> &str {
    if max_bytes >= s.len() { return s; }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// True for absolute URLs with an http or https scheme
pub fn is_web_url(raw: &str) -> bool {
    match url::Url::parse(raw) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.has_host(),
        Err(_) => false,
    }
}

/// Mask a secret for display (shows first 8 / last 4 chars)
pub fn mask_secret(secret: &str) -> String {
    if secret.len() > 12 && secret.is_ascii() {
        format!("{}...{}", &secret[..8], &secret[secret.len() - 4..])
    } else {
        "*".repeat(secret.chars().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_truncate_ascii() {
        assert_eq!(safe_truncate("hello", 3), "hel");
        assert_eq!(safe_truncate("hello", 10), "hello");
        assert_eq!(safe_truncate("hello", 5), "hello");
    }

    #[test]
    fn test_safe_truncate_utf8() {
        // "é" is two bytes; cutting inside it backs off to the boundary
        assert_eq!(safe_truncate("héllo", 2), "h");
    }

    #[test]
    fn test_is_web_url() {
        assert!(is_web_url("https://example.com/page"));
        assert!(is_web_url("http://a"));
        assert!(!is_web_url("ftp://example.com"));
        assert!(!is_web_url("/relative/path"));
        assert!(!is_web_url("javascript:void(0)"));
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("nvapi-1234567890abcd"), "nvapi-12...abcd");
        assert_eq!(mask_secret("short"), "*****");
    }
}
