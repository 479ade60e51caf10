//! Remote content loader - pulls posts from the content backend

use std::collections::HashMap;

use super::{FeedPage, PostDetail, PostNavigation, PostSummary};
use crate::api::{ApiClient, ApiError, QueryOptions};
use crate::config::SiteConfig;

/// Loads posts from the configured backend, one snapshot at a time
pub struct RemoteLoader<'a> {
    client: &'a ApiClient,
    config: &'a SiteConfig,
    snapshot: &'a str,
}

impl<'a> RemoteLoader<'a> {
    pub fn new(client: &'a ApiClient, config: &'a SiteConfig, snapshot: &'a str) -> Self {
        Self {
            client,
            config,
            snapshot,
        }
    }

    /// Fetch every feed page, newest posts first, following the
    /// continuation URL until the backend reports no further page.
    /// Documents without a uid are logged and skipped.
    pub async fn load_feed_pages(&self) -> Result<Vec<FeedPage>, ApiError> {
        let predicate = format!("[[at(document.type,\"{}\")]]", self.client.post_type());
        let opts = QueryOptions {
            predicate: Some(&predicate),
            orderings: Some("[document.first_publication_date desc]"),
            page: 1,
            page_size: self.config.api.page_size,
        };

        let mut pages = Vec::new();
        let mut response = self.client.query(self.snapshot, &opts).await?;
        loop {
            let results: Vec<PostSummary> = response
                .results
                .iter()
                .filter_map(|doc| {
                    let summary = PostSummary::from_document(doc);
                    if summary.is_none() {
                        tracing::warn!("Skipping document {} without uid", doc.id);
                    }
                    summary
                })
                .collect();
            let next_page = response.next_page.clone();
            pages.push(FeedPage { next_page, results });

            match response.next_page {
                Some(url) => response = self.client.query_next(&url).await?,
                None => break,
            }
        }

        tracing::info!(
            "Fetched {} feed pages ({} posts)",
            pages.len(),
            pages.iter().map(|p| p.results.len()).sum::<usize>()
        );
        Ok(pages)
    }

    /// Fetch the full document for each listed post
    pub async fn load_details(&self, summaries: &[PostSummary]) -> Result<Vec<PostDetail>, ApiError> {
        let mut details = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let doc = self.client.get_by_uid(&summary.uid, self.snapshot).await?;
            match PostDetail::from_document(&doc) {
                Some(detail) => details.push(detail),
                None => tracing::warn!("Skipping document {} without uid", doc.id),
            }
        }
        Ok(details)
    }

    /// Resolve both neighbors of one post with two independent
    /// single-result lookups. A post without a publication date has no
    /// position in the chronology, so both slots stay empty.
    pub async fn resolve_navigation(&self, post: &PostDetail) -> Result<PostNavigation, ApiError> {
        let Some(date) = post.first_publication_date else {
            return Ok(PostNavigation::default());
        };

        let previous = self
            .client
            .previous_post(&date, self.snapshot)
            .await?
            .as_ref()
            .and_then(PostSummary::from_document);
        let next = self
            .client
            .next_post(&date, self.snapshot)
            .await?
            .as_ref()
            .and_then(PostSummary::from_document);

        Ok(PostNavigation { previous, next })
    }

    /// Navigation for every post, keyed by uid
    pub async fn resolve_all_navigation(
        &self,
        posts: &[PostDetail],
    ) -> Result<HashMap<String, PostNavigation>, ApiError> {
        let mut navigation = HashMap::with_capacity(posts.len());
        for post in posts {
            navigation.insert(post.uid.clone(), self.resolve_navigation(post).await?);
        }
        Ok(navigation)
    }
}
