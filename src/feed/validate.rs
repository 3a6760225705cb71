//! Character-set validation for feed identifiers, display names, and URLs.
//!
//! Each predicate scans its input against a fixed whitelist and rejects on
//! the first character outside it, logging which character failed. Whitelist
//! validation fails closed but is deliberately cruder than the relevant
//! RFCs — `valid_url` in particular is a stop-gap, not RFC 3986.

/// Returns true if `name` is a valid feed identifier: `[A-Za-z0-9_-]` only.
///
/// The empty string is vacuously valid; uniqueness is enforced by the store,
/// not here.
pub fn valid_name(name: &str) -> bool {
    for ch in name.chars() {
        if !(ch.is_ascii_alphanumeric() || ch == '-' || ch == '_') {
            tracing::warn!(character = %ch, "invalid feed name character");
            return false;
        }
    }
    true
}

/// Returns true if `name` is a valid display name: letters, digits,
/// apostrophe, hyphen, and space.
pub fn valid_proper_name(name: &str) -> bool {
    for ch in name.chars() {
        if !(ch.is_ascii_alphanumeric() || ch == '\'' || ch == '-' || ch == ' ') {
            tracing::warn!(character = %ch, "invalid feed proper name character");
            return false;
        }
    }
    true
}

/// Returns true if `url` starts with `http://` or `https://` and every
/// character is in `[A-Za-z0-9:/.?_%=-]`.
///
/// FIXME: replace the character whitelist with proper URL validation.
pub fn valid_url(url: &str) -> bool {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return false;
    }

    for ch in url.chars() {
        let allowed = ch.is_ascii_alphanumeric()
            || matches!(ch, ':' | '/' | '.' | '?' | '_' | '%' | '=' | '-');
        if !allowed {
            tracing::warn!(character = %ch, "invalid feed URL character");
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_valid_names() {
        assert!(valid_name("bbc"));
        assert!(valid_name("al-jazeera_world"));
        assert!(valid_name("Feed42"));
        assert!(valid_name(""));
    }

    #[test]
    fn test_invalid_names() {
        assert!(!valid_name("bad name!"));
        assert!(!valid_name("feed.name"));
        assert!(!valid_name("café"));
    }

    #[test]
    fn test_valid_proper_names() {
        assert!(valid_proper_name("BBC News"));
        assert!(valid_proper_name("O'Reilly - Radar"));
    }

    #[test]
    fn test_invalid_proper_names() {
        assert!(!valid_proper_name("News!"));
        assert!(!valid_proper_name("A&B"));
    }

    #[test]
    fn test_valid_urls() {
        assert!(valid_url("http://feeds.bbci.co.uk/news/rss.xml"));
        assert!(valid_url("https://www.aljazeera.com/xml/rss/all.xml"));
        assert!(valid_url("https://example.com/feed?format=rss"));
        // '&' is not in the whitelist, so multi-parameter query strings fail
        assert!(!valid_url("https://example.com/feed?format=rss&x=1"));
    }

    #[test]
    fn test_url_requires_http_scheme() {
        assert!(!valid_url("ftp://example.com/feed.xml"));
        assert!(!valid_url("file:///etc/passwd"));
        assert!(!valid_url("example.com/feed.xml"));
    }

    #[test]
    fn test_url_rejects_disallowed_characters() {
        assert!(!valid_url("http://example.com/feed with space"));
        assert!(!valid_url("http://example.com/feed#fragment"));
    }

    proptest! {
        #[test]
        fn prop_name_accepts_whole_charset(s in "[A-Za-z0-9_-]{0,64}") {
            prop_assert!(valid_name(&s));
        }

        #[test]
        fn prop_name_rejects_any_outsider(
            s in "[A-Za-z0-9_-]{0,32}",
            bad in proptest::char::any().prop_filter("outside whitelist", |c| {
                !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            }),
        ) {
            let mut tainted = s.clone();
            tainted.push(bad);
            prop_assert!(!valid_name(&tainted));
        }

        #[test]
        fn prop_url_accepts_whole_charset(s in "https?://[A-Za-z0-9:/.?_%=-]{0,64}") {
            prop_assert!(valid_url(&s));
        }

        #[test]
        fn prop_url_scheme_swap_rejects(s in "[A-Za-z0-9:/.?_%=-]{0,64}") {
            let url = format!("ftp://{s}");
            prop_assert!(!valid_url(&url));
        }
    }
}
