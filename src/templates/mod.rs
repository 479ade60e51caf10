//! Built-in blog templates using Tera template engine
//!
//! All templates are embedded directly in the binary; sites style the
//! output through their static assets, not through a theme system.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

/// Template renderer with the embedded blog templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Disable autoescaping for HTML templates since we're generating HTML
        // and URLs/paths should not be escaped
        tera.autoescape_on(vec![]);

        // Register all templates
        tera.add_raw_templates(vec![
            ("layout.html", include_str!("blog/layout.html")),
            ("index.html", include_str!("blog/index.html")),
            ("post.html", include_str!("blog/post.html")),
            // Partials
            (
                "partials/head.html",
                include_str!("blog/partials/head.html"),
            ),
            (
                "partials/header.html",
                include_str!("blog/partials/header.html"),
            ),
            (
                "partials/footer.html",
                include_str!("blog/partials/footer.html"),
            ),
            (
                "partials/navigation.html",
                include_str!("blog/partials/navigation.html"),
            ),
            (
                "partials/comments.html",
                include_str!("blog/partials/comments.html"),
            ),
            (
                "partials/preview.html",
                include_str!("blog/partials/preview.html"),
            ),
        ])?;

        // Register custom filters
        tera.register_filter("escape_html", escape_html_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: escape HTML special characters in user-authored text
fn escape_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("escape_html", "value", String, value);
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    Ok(tera::Value::String(result))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub root: String,
    pub comments_repo: String,
    pub comments_issue_term: String,
    pub comments_theme: String,
}

/// Localized UI strings passed to templates as `t`
#[derive(Debug, Clone, Serialize)]
pub struct StringsData {
    pub load_more: String,
    pub exit_preview: String,
    pub previous_post: String,
    pub next_post: String,
}

/// One entry on a list page
#[derive(Debug, Clone, Serialize)]
pub struct PostItemData {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub url: String,
    pub date: String,
    pub datetime: String,
}

/// One section of a post page
#[derive(Debug, Clone, Serialize)]
pub struct SectionData {
    pub heading: Option<String>,
    pub body: Vec<String>,
}

/// The full post page payload
#[derive(Debug, Clone, Serialize)]
pub struct PostPageData {
    pub title: String,
    pub author: String,
    pub banner_url: Option<String>,
    pub date: String,
    pub datetime: String,
    pub read_time: String,
    pub edited: Option<String>,
    pub sections: Vec<SectionData>,
}

/// One side of the previous/next navigation
#[derive(Debug, Clone, Serialize)]
pub struct NavPostData {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NavigationData {
    pub previous: Option<NavPostData>,
    pub next: Option<NavPostData>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_filter() {
        let value = tera::Value::String("a < b & \"c\"".to_string());
        let escaped = escape_html_filter(&value, &HashMap::new()).unwrap();
        assert_eq!(
            escaped,
            tera::Value::String("a &lt; b &amp; &quot;c&quot;".to_string())
        );
    }

    #[test]
    fn test_templates_parse() {
        // add_raw_templates parses every embedded template eagerly
        assert!(TemplateRenderer::new().is_ok());
    }
}
