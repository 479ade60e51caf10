//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Content backend
    pub api: ApiConfig,

    // Directory
    pub public_dir: String,
    pub preview_dir: String,
    pub static_dir: String,
    pub post_dir: String,
    pub i18n_dir: String,

    // Date / Time format
    pub date_format: String,
    pub time_format: String,

    // Feed
    pub feed_limit: usize,

    // Comments
    pub comments: CommentsConfig,

    // Preview mode
    pub preview: PreviewConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Nebula".to_string(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            api: ApiConfig::default(),

            public_dir: "public".to_string(),
            preview_dir: "public_preview".to_string(),
            static_dir: "static".to_string(),
            post_dir: "post".to_string(),
            i18n_dir: "languages".to_string(),

            date_format: "DD MMM YYYY".to_string(),
            time_format: "HH:mm".to_string(),

            feed_limit: 20,

            comments: CommentsConfig::default(),
            preview: PreviewConfig::default(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Content backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base endpoint of the content repository, e.g.
    /// `https://my-blog.cdn.example.io/api/v2`
    pub endpoint: String,
    /// Document type that holds blog posts
    pub post_type: String,
    /// Access token sent with every request, if the repository is private
    pub access_token: Option<String>,
    /// Posts fetched per query page
    pub page_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            post_type: "posts".to_string(),
            access_token: None,
            page_size: 20,
        }
    }
}

/// Third-party comment widget configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    /// GitHub repository backing the widget ("owner/repo"); empty disables it
    pub repo: String,
    pub issue_term: String,
    pub theme: String,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            repo: String::new(),
            issue_term: "pathname".to_string(),
            theme: "github-dark".to_string(),
        }
    }
}

/// Preview mode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Name of the cookie that keeps a browser session in preview mode
    pub cookie: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            cookie: "nebula_preview".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Nebula");
        assert_eq!(config.api.post_type, "posts");
        assert_eq!(config.api.page_size, 20);
        assert_eq!(config.preview.cookie, "nebula_preview");
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: First Blog
author: Test User
language: pt-br
api:
  endpoint: https://first-blog.cdn.example.io/api/v2
  page_size: 5
comments:
  repo: someone/first-blog
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "First Blog");
        assert_eq!(config.language, "pt-br");
        assert_eq!(
            config.api.endpoint,
            "https://first-blog.cdn.example.io/api/v2"
        );
        assert_eq!(config.api.page_size, 5);
        assert_eq!(config.comments.repo, "someone/first-blog");
        // untouched fields keep their defaults
        assert_eq!(config.api.post_type, "posts");
        assert_eq!(config.public_dir, "public");
    }
}
