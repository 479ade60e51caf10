//! Feed accumulation across query pages
//!
//! The backend hands out results one page at a time, each page carrying
//! an opaque continuation URL. `PostFeed` is the reducer over those
//! pages: results are appended in arrival order, never reordered or
//! de-duplicated, and the continuation of the latest page replaces the
//! previous one. A `None` continuation is terminal - whatever renders
//! the feed must not offer a "load more" affordance past it.

use serde::Serialize;

use super::PostSummary;

/// One fetched page of the feed
#[derive(Debug, Clone, Default)]
pub struct FeedPage {
    pub next_page: Option<String>,
    pub results: Vec<PostSummary>,
}

/// Accumulated feed state
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostFeed {
    pub next_page: Option<String>,
    pub results: Vec<PostSummary>,
}

impl PostFeed {
    /// Fold one fetched page into the state: order-preserving append,
    /// continuation replaced by the fetched page's.
    pub fn absorb(&mut self, page: FeedPage) {
        self.next_page = page.next_page;
        self.results.extend(page.results);
    }

    /// Whether another page can still be requested
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(uid: &str) -> PostSummary {
        PostSummary {
            uid: uid.to_string(),
            first_publication_date: None,
            title: uid.to_uppercase(),
            subtitle: String::new(),
            author: "Jane".to_string(),
        }
    }

    #[test]
    fn test_absorb_appends_in_order() {
        let mut feed = PostFeed {
            next_page: Some("p2".to_string()),
            results: vec![summary("a")],
        };
        feed.absorb(FeedPage {
            next_page: None,
            results: vec![summary("b"), summary("c")],
        });

        assert_eq!(feed.next_page, None);
        let uids: Vec<_> = feed.results.iter().map(|p| p.uid.as_str()).collect();
        assert_eq!(uids, ["a", "b", "c"]);
        assert!(!feed.has_more());
    }

    #[test]
    fn test_absorb_is_length_additive() {
        let mut feed = PostFeed::default();
        feed.absorb(FeedPage {
            next_page: Some("p2".to_string()),
            results: vec![summary("a"), summary("b")],
        });
        let before = feed.len();
        feed.absorb(FeedPage {
            next_page: Some("p3".to_string()),
            results: vec![summary("c")],
        });
        assert_eq!(feed.len(), before + 1);
        assert!(feed.has_more());
    }

    #[test]
    fn test_no_deduplication() {
        // identity is the backend's problem; the reducer never drops rows
        let mut feed = PostFeed::default();
        feed.absorb(FeedPage {
            next_page: None,
            results: vec![summary("a"), summary("a")],
        });
        assert_eq!(feed.len(), 2);
    }

    #[test]
    fn test_empty_feed_is_terminal() {
        let feed = PostFeed::default();
        assert!(feed.is_empty());
        assert!(!feed.has_more());
    }
}
