// url_filter.rs - Static asset URL filter
// Purpose: Drop harvested URLs that point at images, fonts, stylesheets,
//          scripts and media before they are persisted

use lazy_static::lazy_static;
use regex::Regex;

/// Extensions rejected anywhere in a URL.
pub const BLACKLIST: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "css", "js", "woff", "woff2", "svg", "ico", "ttf", "pdf",
    "mp3", "mp4", "webp", "eot",
];

lazy_static! {
    // Unanchored: ".js" also rejects ".json" and "/a.js?v=1".
    static ref RE_BLACKLIST: Regex = Regex::new(&format!(
        r"(?i){}",
        BLACKLIST
            .iter()
            .map(|ext| format!(r"\.{}", ext))
            .collect::<Vec<_>>()
            .join("|")
    ))
    .unwrap();
}

/// False when the URL contains a blacklisted `.ext` substring, case-insensitive.
pub fn is_allowed(url: &str) -> bool {
    !RE_BLACKLIST.is_match(url)
}

/// Keep allowed, non-empty URLs in input order. No deduplication here.
pub fn filter_urls<I, S>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    urls.into_iter()
        .filter_map(|url| {
            let url = url.as_ref();
            (!url.is_empty() && is_allowed(url)).then(|| url.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_urls_drops_assets() {
        let filtered = filter_urls(["http://x.com/a.js", "http://x.com/a.html"]);
        assert_eq!(filtered, vec!["http://x.com/a.html".to_string()]);
    }

    #[test]
    fn test_substring_match_is_preserved() {
        // Matches anywhere, not only as a suffix
        assert!(!is_allowed("http://x.com/api/data.json"));
        assert!(!is_allowed("http://x.com/static/app.js?v=3"));
        assert!(!is_allowed("http://x.com/IMG/LOGO.PNG"));
        assert!(!is_allowed("http://x.com/report.pdf#page=2"));
        assert!(is_allowed("http://x.com/login.php"));
        assert!(is_allowed("http://x.com/jsonp"));
    }

    #[test]
    fn test_filter_keeps_order_and_duplicates() {
        let filtered = filter_urls(vec![
            "http://x.com/b".to_string(),
            String::new(),
            "http://x.com/a".to_string(),
            "http://x.com/b".to_string(),
        ]);
        assert_eq!(filtered, vec!["http://x.com/b", "http://x.com/a", "http://x.com/b"]);
    }
}
