//! Search metadata for the site's client-side filter.
//!
//! Each site's `searchwords` field is what the search box matches against.
//! It is rebuilt on every run from four parts, space separated:
//!
//! 1. the title as written,
//! 2. the title's full pinyin, syllables run together (`百度` → `baidu`),
//! 3. the pinyin initials run together (`百度` → `bd`),
//! 4. the host scanned out of the URL.
//!
//! Characters without a pinyin reading (Latin letters, digits, punctuation)
//! contribute nothing to parts 2 and 3, so a purely Latin title leaves them
//! empty and the separators stay in place: `Google   www.google.com`.

use crate::naming;
use pinyin::ToPinyin;

/// Full pinyin and pinyin initials of `title`.
pub fn transliterate(title: &str) -> (String, String) {
    let mut full = String::new();
    let mut initials = String::new();
    for syllable in title.to_pinyin().flatten() {
        let plain = syllable.plain();
        full.push_str(plain);
        if let Some(first) = plain.chars().next() {
            initials.push(first);
        }
    }
    (full, initials)
}

/// The `searchwords` value for a site.
pub fn search_words(title: &str, url: &str) -> String {
    let (full, initials) = transliterate(title);
    let host = naming::extract_host(url).unwrap_or("");
    format!("{title} {full} {initials} {host}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chinese_title_transliterates() {
        assert_eq!(
            transliterate("百度"),
            ("baidu".to_string(), "bd".to_string())
        );
    }

    #[test]
    fn latin_characters_are_skipped() {
        let (full, initials) = transliterate("Google");
        assert_eq!(full, "");
        assert_eq!(initials, "");
    }

    #[test]
    fn mixed_title_keeps_only_han() {
        let (full, initials) = transliterate("QQ邮箱");
        assert_eq!(full, "youxiang");
        assert_eq!(initials, "yx");
    }

    #[test]
    fn latin_search_words() {
        let words = search_words("Google", "https://www.google.com/search");
        assert_eq!(words, "Google   www.google.com");
        assert!(words.contains("Google"));
        assert!(words.contains("www.google.com"));
    }

    #[test]
    fn chinese_search_words() {
        assert_eq!(
            search_words("百度", "https://www.baidu.com/"),
            "百度 baidu bd www.baidu.com"
        );
    }

    #[test]
    fn url_without_host_leaves_host_empty() {
        assert_eq!(search_words("测试", "localhost"), "测试 ceshi cs ");
    }
}
