//! Archive lookup link construction.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use paper_core::config::LinkStyle;

/// URI component encoding: everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Encode `input` so it survives as a single path segment.
pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, COMPONENT).to_string()
}

/// Build a link with the given template. The URL is not validated here.
pub fn build_link(style: LinkStyle, url: &str) -> String {
    format!("{}{}", style.prefix(), encode_component(url))
}

/// `https://archive.is/latest/` followed by the encoded URL.
pub fn build_archive_link(url: &str) -> String {
    build_link(LinkStyle::Latest, url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use percent_encoding::percent_decode_str;

    fn decoded_remainder(link: &str, prefix: &str) -> String {
        let rest = link.strip_prefix(prefix).expect("link starts with prefix");
        percent_decode_str(rest).decode_utf8().unwrap().into_owned()
    }

    #[test]
    fn test_example_link() {
        assert_eq!(
            build_archive_link("https://example.com/any/path"),
            "https://archive.is/latest/https%3A%2F%2Fexample.com%2Fany%2Fpath"
        );
    }

    #[test]
    fn test_plain_style() {
        assert_eq!(
            build_link(LinkStyle::Plain, "https://example.com/"),
            "https://archive.is/https%3A%2F%2Fexample.com%2F"
        );
    }

    #[test]
    fn test_reserved_escaped() {
        let link = build_archive_link("https://a.example/p?q=1&r=2;s=$,@+#top");
        let encoded = link.strip_prefix("https://archive.is/latest/").unwrap();
        for c in ['?', '&', '=', ';', '$', ',', '@', '+', '#', '/', ':'] {
            assert!(!encoded.contains(c), "{c} should be escaped in {encoded}");
        }
    }

    #[test]
    fn test_matches_uri_component_encoding() {
        assert_eq!(
            build_archive_link("https://a.example/p(1)!*'"),
            "https://archive.is/latest/https%3A%2F%2Fa.example%2Fp(1)!*'"
        );
        assert_eq!(encode_component("a b\"c<d>%"), "a%20b%22c%3Cd%3E%25");
        assert_eq!(encode_component("é"), "%C3%A9");
    }

    #[test]
    fn test_unreserved_kept() {
        assert_eq!(encode_component("AZaz09-._~!*'()"), "AZaz09-._~!*'()");
        assert_eq!(encode_component("a b"), "a%20b");
    }

    #[test]
    fn test_round_trip() {
        for url in [
            "https://example.com/any/path",
            "https://example.com/search?q=rust%20lang&page=2#results",
            "https://例え.jp/パス?ключ=значение",
            "http://user:pw@host:8080/a+b/~c",
        ] {
            let link = build_archive_link(url);
            assert!(link.starts_with("https://archive.is/latest/"));
            assert_eq!(decoded_remainder(&link, "https://archive.is/latest/"), url);
        }
    }

    #[test]
    fn test_deterministic() {
        let url = "https://example.com/news/2024/05/17/story";
        assert_eq!(build_archive_link(url), build_archive_link(url));
    }
}
