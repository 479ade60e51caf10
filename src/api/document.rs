//! Wire types for the content backend payload
//!
//! These mirror the JSON the repository API returns. They are kept
//! separate from the domain types in `crate::content`: a malformed
//! document should fail (or be skipped) at the boundary, not deep
//! inside rendering.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Repository metadata returned by the root endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub refs: Vec<ApiRef>,
}

impl ApiInfo {
    /// The ref pointing at the published content snapshot
    pub fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference.as_str())
    }
}

/// A content snapshot reference
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRef {
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, rename = "isMasterRef")]
    pub is_master_ref: bool,
}

/// One page of query results
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub page: usize,
    #[serde(default)]
    pub total_pages: usize,
    #[serde(default)]
    pub total_results_size: usize,
    /// Opaque continuation URL; `None` means this is the last page
    pub next_page: Option<String>,
    #[serde(default)]
    pub results: Vec<Document>,
}

/// A single document record
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub id: String,
    /// Unique, URL-safe identifier; documents without one cannot be routed
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub last_publication_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub data: DocumentData,
}

/// The user-defined fields of a post document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentData {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub banner: Banner,
    #[serde(default)]
    pub content: Vec<ContentSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Banner {
    #[serde(default)]
    pub url: Option<String>,
}

/// One section of post content: a heading plus its text fragments
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentSection {
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default)]
    pub body: Vec<BodySpan>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BodySpan {
    #[serde(default)]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_api_info() {
        let json = r#"{
            "refs": [
                {"id": "master", "ref": "YBnqABAAACIAyI0p", "label": "Master", "isMasterRef": true},
                {"id": "draft", "ref": "YBnqABAAACIAyI0p~draft", "label": "Drafts"}
            ]
        }"#;
        let info: ApiInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.master_ref(), Some("YBnqABAAACIAyI0p"));
    }

    #[test]
    fn test_parse_query_response() {
        let json = r#"{
            "page": 1,
            "total_pages": 2,
            "total_results_size": 3,
            "next_page": "https://blog.cdn.example.io/api/v2/documents/search?page=2",
            "results": [
                {
                    "id": "YBnq1",
                    "uid": "first-post",
                    "type": "posts",
                    "first_publication_date": "2021-03-15T19:25:28+00:00",
                    "last_publication_date": "2021-03-16T10:05:00+00:00",
                    "data": {
                        "title": "First post",
                        "subtitle": "A subtitle",
                        "author": "Jane",
                        "banner": {"url": "https://images.example.io/banner.png"},
                        "content": [
                            {"heading": "Intro", "body": [{"text": "one two three"}]}
                        ]
                    }
                }
            ]
        }"#;
        let response: QueryResponse = serde_json::from_str(json).unwrap();
        assert!(response.next_page.is_some());
        assert_eq!(response.results.len(), 1);

        let doc = &response.results[0];
        assert_eq!(doc.uid.as_deref(), Some("first-post"));
        assert_eq!(doc.data.title, "First post");
        assert_eq!(doc.data.content[0].heading.as_deref(), Some("Intro"));
        assert_eq!(doc.data.content[0].body[0].text, "one two three");
    }

    #[test]
    fn test_parse_sparse_document() {
        // null dates, missing uid, heading and banner are all valid
        let json = r#"{
            "id": "YBnq2",
            "uid": null,
            "type": "posts",
            "first_publication_date": null,
            "last_publication_date": null,
            "data": {
                "title": "Draft",
                "content": [{"body": []}]
            }
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert!(doc.uid.is_none());
        assert!(doc.first_publication_date.is_none());
        assert!(doc.data.banner.url.is_none());
        assert!(doc.data.content[0].heading.is_none());
        assert!(doc.data.content[0].body.is_empty());
    }

    #[test]
    fn test_parse_terminal_page() {
        let json = r#"{"page": 2, "next_page": null, "results": []}"#;
        let response: QueryResponse = serde_json::from_str(json).unwrap();
        assert!(response.next_page.is_none());
        assert!(response.results.is_empty());
    }
}
