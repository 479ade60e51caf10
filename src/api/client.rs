//! Typed HTTP client for the content backend
//!
//! The backend exposes a query endpoint (`documents/search`) that takes a
//! predicate, orderings and paging parameters, and returns one page of
//! documents plus an opaque continuation URL. Every other operation
//! (lookup by uid, adjacency lookups) is sugar over that endpoint.

use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode, Url};
use thiserror::Error;

use super::document::{ApiInfo, Document, QueryResponse};
use crate::config::ApiConfig;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("api endpoint is not configured (set api.endpoint in _config.yml)")]
    MissingEndpoint,
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("repository has no master ref")]
    MissingMasterRef,
    #[error("no document with uid {uid:?}")]
    MissingDocument { uid: String },
}

/// Query parameters for one page of results
#[derive(Debug, Clone, Default)]
pub struct QueryOptions<'a> {
    pub predicate: Option<&'a str>,
    pub orderings: Option<&'a str>,
    pub page: usize,
    pub page_size: usize,
}

pub struct ApiClient {
    client: Client,
    endpoint: Url,
    post_type: String,
    access_token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        if config.endpoint.is_empty() {
            return Err(ApiError::MissingEndpoint);
        }
        // a trailing slash keeps Url::join from eating the last segment
        let raw = if config.endpoint.ends_with('/') {
            config.endpoint.clone()
        } else {
            format!("{}/", config.endpoint)
        };
        let endpoint = Url::parse(&raw)?;
        let client = Client::builder().user_agent(Self::user_agent()).build()?;

        Ok(Self {
            client,
            endpoint,
            post_type: config.post_type.clone(),
            access_token: config.access_token.clone(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("nebula-rs/", env!("CARGO_PKG_VERSION"))
    }

    pub fn post_type(&self) -> &str {
        &self.post_type
    }

    /// Resolve the content snapshot to generate from: an explicitly given
    /// preview ref, or the repository's published master ref.
    pub async fn resolve_snapshot(&self, explicit: Option<&str>) -> Result<String, ApiError> {
        if let Some(reference) = explicit {
            return Ok(reference.to_string());
        }
        let info: ApiInfo = self.fetch_json(self.endpoint.clone()).await?;
        info.master_ref()
            .map(str::to_string)
            .ok_or(ApiError::MissingMasterRef)
    }

    /// Run one query page against the backend
    pub async fn query(
        &self,
        snapshot: &str,
        opts: &QueryOptions<'_>,
    ) -> Result<QueryResponse, ApiError> {
        let mut url = self.endpoint.join("documents/search")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("ref", snapshot);
            if let Some(predicate) = opts.predicate {
                pairs.append_pair("q", predicate);
            }
            if let Some(orderings) = opts.orderings {
                pairs.append_pair("orderings", orderings);
            }
            if opts.page > 0 {
                pairs.append_pair("page", &opts.page.to_string());
            }
            if opts.page_size > 0 {
                pairs.append_pair("pageSize", &opts.page_size.to_string());
            }
            if let Some(token) = &self.access_token {
                pairs.append_pair("access_token", token);
            }
        }
        self.fetch_json(url).await
    }

    /// Follow a continuation URL returned in `next_page`, verbatim
    pub async fn query_next(&self, next_page: &str) -> Result<QueryResponse, ApiError> {
        let url = Url::parse(next_page)?;
        self.fetch_json(url).await
    }

    /// Fetch one full document by uid; absence is an error here, not a skip
    pub async fn get_by_uid(&self, uid: &str, snapshot: &str) -> Result<Document, ApiError> {
        let predicate = format!("[[at(my.{}.uid,\"{}\")]]", self.post_type, uid);
        let opts = QueryOptions {
            predicate: Some(&predicate),
            page_size: 1,
            ..Default::default()
        };
        let response = self.query(snapshot, &opts).await?;
        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::MissingDocument {
                uid: uid.to_string(),
            })
    }

    /// The latest post published strictly before `date`, if any
    pub async fn previous_post(
        &self,
        date: &DateTime<Utc>,
        snapshot: &str,
    ) -> Result<Option<Document>, ApiError> {
        self.adjacent_post(date, snapshot, "date.before", "desc")
            .await
    }

    /// The earliest post published strictly after `date`, if any
    pub async fn next_post(
        &self,
        date: &DateTime<Utc>,
        snapshot: &str,
    ) -> Result<Option<Document>, ApiError> {
        self.adjacent_post(date, snapshot, "date.after", "asc").await
    }

    /// One single-result lookup ordered on first_publication_date.
    /// Both neighbors use the same field and symmetric directions.
    async fn adjacent_post(
        &self,
        date: &DateTime<Utc>,
        snapshot: &str,
        filter: &str,
        direction: &str,
    ) -> Result<Option<Document>, ApiError> {
        let predicate = adjacency_predicate(&self.post_type, filter, date);
        let orderings = format!("[document.first_publication_date {}]", direction);
        let opts = QueryOptions {
            predicate: Some(&predicate),
            orderings: Some(&orderings),
            page_size: 1,
            ..Default::default()
        };
        let response = self.query(snapshot, &opts).await?;
        Ok(response.results.into_iter().next())
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.client.get(url).send().await?;
        Ok(Self::handle(response).await?.json().await?)
    }

    async fn handle(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }
        Ok(response)
    }
}

/// Predicate for a single-result adjacency lookup on first_publication_date
fn adjacency_predicate(post_type: &str, filter: &str, date: &DateTime<Utc>) -> String {
    format!(
        "[[at(document.type,\"{}\")][{}(document.first_publication_date,\"{}\")]]",
        post_type,
        filter,
        date.to_rfc3339()
    )
}
