//! URL helper functions

use crate::config::SiteConfig;

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/post/my-post/") // -> "/blog/post/my-post/"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/post/my-post/") // -> "https://example.com/post/my-post/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Route of one post page, relative to the site root
pub fn post_route(config: &SiteConfig, uid: &str) -> String {
    format!("{}/{}/", config.post_dir, encode_url(uid))
}

/// Route of one list page; page 1 is the site index
pub fn list_page_route(page: usize) -> String {
    if page <= 1 {
        String::new()
    } else {
        format!("page/{}/", page)
    }
}

/// Percent-encode a URL path segment, keeping unreserved characters
pub fn encode_url(segment: &str) -> String {
    const SEGMENT: &percent_encoding::AsciiSet = &percent_encoding::NON_ALPHANUMERIC
        .remove(b'-')
        .remove(b'_')
        .remove(b'.')
        .remove(b'~');
    percent_encoding::utf8_percent_encode(segment, SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        SiteConfig {
            url: "https://example.com".to_string(),
            root: "/blog/".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/post/my-post/"), "/blog/post/my-post/");
        assert_eq!(url_for(&config, ""), "/blog/");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "/post/my-post/"),
            "https://example.com/blog/post/my-post/"
        );
    }

    #[test]
    fn test_post_route() {
        let config = test_config();
        assert_eq!(post_route(&config, "my-post"), "post/my-post/");
    }

    #[test]
    fn test_encode_url() {
        assert_eq!(encode_url("my-post"), "my-post");
        assert_eq!(encode_url("a b"), "a%20b");
    }

    #[test]
    fn test_list_page_route() {
        assert_eq!(list_page_route(1), "");
        assert_eq!(list_page_route(2), "page/2/");
    }
}
