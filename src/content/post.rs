//! Post models

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::Document;

/// The fields a post contributes to list pages and navigation slots
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    /// Unique identifier; doubles as the URL slug
    pub uid: String,

    /// First publication date; drafts may not have one yet
    pub first_publication_date: Option<DateTime<Utc>>,

    pub title: String,
    pub subtitle: String,
    pub author: String,
}

impl PostSummary {
    /// Build a summary from a wire document. Returns `None` for documents
    /// without a uid - they cannot be routed and are skipped upstream.
    pub fn from_document(doc: &Document) -> Option<Self> {
        let uid = doc.uid.as_deref()?;
        Some(Self {
            uid: slug::slugify(uid),
            first_publication_date: doc.first_publication_date,
            title: doc.data.title.clone(),
            subtitle: doc.data.subtitle.clone(),
            author: doc.data.author.clone(),
        })
    }
}

/// One section of a post: a heading plus its paragraphs
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContentBlock {
    pub heading: Option<String>,
    pub body: Vec<String>,
}

/// A full post as rendered on its own page
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub uid: String,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub last_publication_date: Option<DateTime<Utc>>,
    pub title: String,
    pub subtitle: String,
    pub banner_url: Option<String>,
    pub author: String,
    pub content: Vec<ContentBlock>,
}

impl PostDetail {
    pub fn from_document(doc: &Document) -> Option<Self> {
        let uid = doc.uid.as_deref()?;
        let content = doc
            .data
            .content
            .iter()
            .map(|section| ContentBlock {
                heading: section.heading.clone(),
                body: section.body.iter().map(|span| span.text.clone()).collect(),
            })
            .collect();

        Some(Self {
            uid: slug::slugify(uid),
            first_publication_date: doc.first_publication_date,
            last_publication_date: doc.last_publication_date,
            title: doc.data.title.clone(),
            subtitle: doc.data.subtitle.clone(),
            banner_url: doc.data.banner.url.clone(),
            author: doc.data.author.clone(),
            content,
        })
    }

    pub fn summary(&self) -> PostSummary {
        PostSummary {
            uid: self.uid.clone(),
            first_publication_date: self.first_publication_date,
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            author: self.author.clone(),
        }
    }

    /// Whether the post was republished after its first publication
    pub fn edited_at(&self) -> Option<DateTime<Utc>> {
        match (self.first_publication_date, self.last_publication_date) {
            (Some(first), Some(last)) if last > first => Some(last),
            (None, Some(last)) => Some(last),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(json: &str) -> Document {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_summary_requires_uid() {
        let doc = document(r#"{"id": "x", "uid": null, "type": "posts"}"#);
        assert!(PostSummary::from_document(&doc).is_none());
    }

    #[test]
    fn test_detail_from_document() {
        let doc = document(
            r#"{
                "id": "x",
                "uid": "my-post",
                "type": "posts",
                "first_publication_date": "2021-03-15T19:25:28+00:00",
                "last_publication_date": "2021-03-19T15:49:00+00:00",
                "data": {
                    "title": "My post",
                    "subtitle": "Sub",
                    "author": "Jane",
                    "banner": {"url": "https://images.example.io/b.png"},
                    "content": [
                        {"heading": "Intro", "body": [{"text": "one"}, {"text": "two"}]},
                        {"heading": null, "body": []}
                    ]
                }
            }"#,
        );
        let post = PostDetail::from_document(&doc).unwrap();
        assert_eq!(post.uid, "my-post");
        assert_eq!(post.content.len(), 2);
        assert_eq!(post.content[0].body, vec!["one", "two"]);
        assert!(post.content[1].heading.is_none());
        assert!(post.edited_at().is_some());
    }

    #[test]
    fn test_edited_at_requires_later_republication() {
        let doc = document(
            r#"{
                "id": "x",
                "uid": "p",
                "type": "posts",
                "first_publication_date": "2021-03-15T19:25:28+00:00",
                "last_publication_date": "2021-03-15T19:25:28+00:00"
            }"#,
        );
        let post = PostDetail::from_document(&doc).unwrap();
        assert!(post.edited_at().is_none());
    }
}
