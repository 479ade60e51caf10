//! Generator module - renders fetched content into static HTML files

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use tera::Context;
use walkdir::WalkDir;

use crate::cache::ChangeSet;
use crate::content::read_time::estimate_read_time;
use crate::content::{FeedPage, PostDetail, PostFeed, PostNavigation, PostSummary};
use crate::helpers::{
    date_xml, format_date_localized, full_url_for, list_page_route, post_route, url_for,
};
use crate::i18n::I18n;
use crate::templates::{
    ConfigData, NavPostData, NavigationData, PostItemData, PostPageData, SectionData, StringsData,
    TemplateRenderer,
};
use crate::Nebula;

/// Static site generator for CMS-backed content
pub struct Generator {
    nebula: Nebula,
    renderer: TemplateRenderer,
    i18n: I18n,
    months: Vec<String>,
    output_dir: PathBuf,
    preview: bool,
}

impl Generator {
    /// Create a new generator. In preview mode output goes to the
    /// preview directory and pages carry the exit-preview affordance.
    pub fn new(nebula: &Nebula, preview: bool) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;

        let mut i18n = I18n::new(&nebula.config.language);
        i18n.load_languages(nebula.base_dir.join(&nebula.config.i18n_dir))?;
        let months = i18n.get_list("months_abbr");

        let output_dir = if preview {
            nebula.preview_dir.clone()
        } else {
            nebula.public_dir.clone()
        };

        Ok(Self {
            nebula: nebula.clone(),
            renderer,
            i18n,
            months,
            output_dir,
            preview,
        })
    }

    /// Generate the entire site
    pub fn generate(
        &self,
        batches: &[FeedPage],
        posts: &[PostDetail],
        navigation: &HashMap<String, PostNavigation>,
    ) -> Result<()> {
        // Ensure output directory exists
        fs::create_dir_all(&self.output_dir)?;

        // Copy static assets (logo, stylesheets, ...)
        self.copy_static_assets()?;

        // Generate list pages (with load-more pagination)
        let feed = self.generate_list_pages(batches)?;

        // Generate post pages
        for post in posts {
            let nav = navigation.get(&post.uid).cloned().unwrap_or_default();
            self.generate_post_page(post, &nav)?;
        }

        // Generate feed artifacts
        self.generate_posts_json(&feed)?;
        self.generate_atom_feed(posts)?;

        Ok(())
    }

    /// Regenerate only what a changeset marks dirty
    pub fn generate_incremental(
        &self,
        batches: &[FeedPage],
        posts: &[PostDetail],
        navigation: &HashMap<String, PostNavigation>,
        changeset: &ChangeSet,
    ) -> Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        self.copy_static_assets()?;

        for uid in &changeset.deleted_posts {
            let dir = self
                .output_dir
                .join(&self.nebula.config.post_dir)
                .join(uid);
            if dir.exists() {
                fs::remove_dir_all(&dir)?;
                tracing::debug!("Removed stale post: {:?}", dir);
            }
        }

        for post in posts {
            let nav = navigation.get(&post.uid).cloned().unwrap_or_default();
            // a changed title also shows on its neighbors' navigation
            let neighbor_changed = [&nav.previous, &nav.next].iter().any(|slot| {
                slot.as_ref()
                    .is_some_and(|p| changeset.changed_posts.contains(&p.uid))
            });
            if changeset.changed_posts.contains(&post.uid) || neighbor_changed {
                self.generate_post_page(post, &nav)?;
            }
        }

        if changeset.rebuild_lists {
            let feed = self.generate_list_pages(batches)?;
            self.generate_posts_json(&feed)?;
            self.generate_atom_feed(posts)?;
        }

        Ok(())
    }

    /// Create a base context with common variables
    fn create_base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("config", &self.build_config_data());
        context.insert("t", &self.build_strings());
        context.insert("preview", &self.preview);
        context.insert("page_title", "");
        context.insert(
            "current_year",
            &chrono::Utc::now().format("%Y").to_string(),
        );
        context
    }

    fn build_config_data(&self) -> ConfigData {
        let config = &self.nebula.config;
        ConfigData {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            root: config.root.clone(),
            comments_repo: config.comments.repo.clone(),
            comments_issue_term: config.comments.issue_term.clone(),
            comments_theme: config.comments.theme.clone(),
        }
    }

    fn build_strings(&self) -> StringsData {
        StringsData {
            load_more: self.i18n.get("load_more"),
            exit_preview: self.i18n.get("exit_preview"),
            previous_post: self.i18n.get("previous_post"),
            next_post: self.i18n.get("next_post"),
        }
    }

    fn post_item_data(&self, summary: &PostSummary) -> PostItemData {
        let (date, datetime) = self.format_dates(&summary.first_publication_date);
        PostItemData {
            title: summary.title.clone(),
            subtitle: summary.subtitle.clone(),
            author: summary.author.clone(),
            url: url_for(&self.nebula.config, &post_route(&self.nebula.config, &summary.uid)),
            date,
            datetime,
        }
    }

    fn format_dates(&self, date: &Option<chrono::DateTime<chrono::Utc>>) -> (String, String) {
        match date {
            Some(date) => (
                format_date_localized(date, &self.nebula.config.date_format, &self.months),
                date_xml(date),
            ),
            None => (String::new(), String::new()),
        }
    }

    /// Generate list pages. Page N accumulates the results of batches
    /// 1..N; its load-more link points at page N+1 and disappears once
    /// the feed reports no continuation. Returns the fully accumulated
    /// feed state.
    fn generate_list_pages(&self, batches: &[FeedPage]) -> Result<PostFeed> {
        let mut feed = PostFeed::default();

        if batches.is_empty() {
            // an empty repository still gets an index page
            self.render_list_page(1, &feed)?;
            return Ok(feed);
        }

        for (i, batch) in batches.iter().enumerate() {
            feed.absorb(batch.clone());
            self.render_list_page(i + 1, &feed)?;
        }

        Ok(feed)
    }

    fn render_list_page(&self, page_num: usize, feed: &PostFeed) -> Result<()> {
        let page_posts: Vec<PostItemData> = feed
            .results
            .iter()
            .map(|summary| self.post_item_data(summary))
            .collect();

        let load_more_url = if feed.has_more() {
            url_for(&self.nebula.config, &list_page_route(page_num + 1))
        } else {
            String::new()
        };

        let mut context = self.create_base_context();
        context.insert("page_posts", &page_posts);
        context.insert("load_more_url", &load_more_url);

        let html = self.renderer.render("index.html", &context)?;

        let route = list_page_route(page_num);
        let output_path = self.output_dir.join(route).join("index.html");
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, html)?;
        tracing::debug!("Generated: {:?}", output_path);

        Ok(())
    }

    /// Generate one post page
    fn generate_post_page(&self, post: &PostDetail, navigation: &PostNavigation) -> Result<()> {
        let (date, datetime) = self.format_dates(&post.first_publication_date);

        let edited = post.edited_at().map(|at| {
            self.i18n
                .get("edited_at")
                .replace(
                    "%date",
                    &format_date_localized(&at, &self.nebula.config.date_format, &self.months),
                )
                .replace(
                    "%time",
                    &format_date_localized(&at, &self.nebula.config.time_format, &self.months),
                )
        });

        let sections: Vec<SectionData> = post
            .content
            .iter()
            .map(|block| SectionData {
                heading: block.heading.clone(),
                body: block.body.clone(),
            })
            .collect();

        let page_data = PostPageData {
            title: post.title.clone(),
            author: post.author.clone(),
            banner_url: post.banner_url.clone(),
            date,
            datetime,
            read_time: self
                .i18n
                .get_count("read_time", estimate_read_time(&post.content)),
            edited,
            sections,
        };

        let nav_data = NavigationData {
            previous: navigation.previous.as_ref().map(|p| self.nav_post_data(p)),
            next: navigation.next.as_ref().map(|p| self.nav_post_data(p)),
        };

        let mut context = self.create_base_context();
        context.insert("page_title", &post.title);
        context.insert("post", &page_data);
        context.insert("navigation", &nav_data);

        let html = self.renderer.render("post.html", &context)?;

        let route = post_route(&self.nebula.config, &post.uid);
        let output_path = self.output_dir.join(route).join("index.html");
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
        }
        fs::write(&output_path, &html)
            .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
        tracing::debug!("Generated post: {:?}", output_path);

        Ok(())
    }

    fn nav_post_data(&self, summary: &PostSummary) -> NavPostData {
        NavPostData {
            title: summary.title.clone(),
            url: url_for(&self.nebula.config, &post_route(&self.nebula.config, &summary.uid)),
        }
    }

    /// Generate the accumulated feed as JSON for client-side consumers
    fn generate_posts_json(&self, feed: &PostFeed) -> Result<()> {
        let entries: Vec<serde_json::Value> = feed
            .results
            .iter()
            .map(|summary| {
                serde_json::json!({
                    "uid": summary.uid,
                    "title": summary.title,
                    "subtitle": summary.subtitle,
                    "author": summary.author,
                    "url": url_for(&self.nebula.config, &post_route(&self.nebula.config, &summary.uid)),
                    "first_publication_date": summary.first_publication_date,
                })
            })
            .collect();

        let output_path = self.output_dir.join("posts.json");
        let json = serde_json::to_string_pretty(&entries)?;
        fs::write(&output_path, json)?;
        tracing::info!("Generated posts.json");

        Ok(())
    }

    /// Generate Atom feed
    fn generate_atom_feed(&self, posts: &[PostDetail]) -> Result<()> {
        let config = &self.nebula.config;
        let base_url = config.url.trim_end_matches('/');

        let mut feed = String::new();
        feed.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
        feed.push('\n');
        feed.push_str(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#);
        feed.push('\n');
        feed.push_str(&format!("  <title>{}</title>\n", escape_xml(&config.title)));
        feed.push_str(&format!(
            "  <link href=\"{}/atom.xml\" rel=\"self\"/>\n",
            base_url
        ));
        feed.push_str(&format!("  <link href=\"{}/\"/>\n", base_url));
        feed.push_str(&format!(
            "  <updated>{}</updated>\n",
            chrono::Utc::now().to_rfc3339()
        ));
        feed.push_str(&format!("  <id>{}/</id>\n", base_url));
        feed.push_str(&format!(
            "  <author><name>{}</name></author>\n",
            escape_xml(&config.author)
        ));

        // Include recent posts only
        for post in posts.iter().take(config.feed_limit) {
            let permalink = full_url_for(config, &post_route(config, &post.uid));
            feed.push_str("  <entry>\n");
            feed.push_str(&format!("    <title>{}</title>\n", escape_xml(&post.title)));
            feed.push_str(&format!("    <link href=\"{}\"/>\n", permalink));
            feed.push_str(&format!("    <id>{}</id>\n", permalink));
            if let Some(published) = post.first_publication_date {
                feed.push_str(&format!(
                    "    <published>{}</published>\n",
                    published.to_rfc3339()
                ));
                feed.push_str(&format!(
                    "    <updated>{}</updated>\n",
                    post.last_publication_date.unwrap_or(published).to_rfc3339()
                ));
            }
            let summary = strip_invalid_xml_chars(&escape_xml(&post.subtitle));
            feed.push_str(&format!("    <summary>{}</summary>\n", summary));
            feed.push_str("  </entry>\n");
        }

        feed.push_str("</feed>\n");

        let output_path = self.output_dir.join("atom.xml");
        fs::write(&output_path, feed)?;
        tracing::info!("Generated atom.xml");

        Ok(())
    }

    /// Copy static assets (logo, stylesheets, etc.) to the output directory
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.nebula.static_dir;
        if !static_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() {
                let relative = path.strip_prefix(static_dir)?;
                let dest = self.output_dir.join(relative);

                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(path, &dest)?;
            }
        }

        Ok(())
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Strip invalid XML control characters (except tab, newline, carriage return)
/// XML 1.0 only allows: #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
fn strip_invalid_xml_chars(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            c == '\t'
                || c == '\n'
                || c == '\r'
                || ('\u{0020}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || ('\u{10000}'..='\u{10FFFF}').contains(&c)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use chrono::{TimeZone, Utc};
    use std::path::Path;

    fn test_nebula(dir: &Path) -> Nebula {
        let config = SiteConfig {
            title: "First Blog".to_string(),
            language: "pt-br".to_string(),
            comments: crate::config::CommentsConfig {
                repo: "someone/first-blog".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        Nebula::with_config(dir, config)
    }

    fn summary(uid: &str, day: u32) -> PostSummary {
        PostSummary {
            uid: uid.to_string(),
            first_publication_date: Some(Utc.with_ymd_and_hms(2021, 3, day, 10, 0, 0).unwrap()),
            title: format!("Post {}", uid),
            subtitle: "How to survive".to_string(),
            author: "Jane".to_string(),
        }
    }

    fn detail(uid: &str, day: u32) -> PostDetail {
        PostDetail {
            uid: uid.to_string(),
            first_publication_date: Some(Utc.with_ymd_and_hms(2021, 3, day, 10, 0, 0).unwrap()),
            last_publication_date: Some(Utc.with_ymd_and_hms(2021, 3, day, 15, 49, 0).unwrap()),
            title: format!("Post {}", uid),
            subtitle: "How to survive".to_string(),
            banner_url: Some("https://images.example.io/banner.png".to_string()),
            author: "Jane".to_string(),
            content: vec![crate::content::ContentBlock {
                heading: Some("Intro".to_string()),
                body: vec!["one two three".to_string()],
            }],
        }
    }

    #[test]
    fn test_load_more_follows_continuation() {
        let dir = tempfile::tempdir().unwrap();
        let nebula = test_nebula(dir.path());
        let generator = Generator::new(&nebula, false).unwrap();

        let batches = vec![
            FeedPage {
                next_page: Some("p2".to_string()),
                results: vec![summary("a", 1)],
            },
            FeedPage {
                next_page: None,
                results: vec![summary("b", 2), summary("c", 3)],
            },
        ];

        generator.generate(&batches, &[], &HashMap::new()).unwrap();

        let page1 = fs::read_to_string(dir.path().join("public/index.html")).unwrap();
        assert!(page1.contains("Carregar mais posts"));
        assert!(page1.contains("href=\"/page/2/\""));
        assert!(page1.contains("Post a"));
        assert!(!page1.contains("Post b"));

        // terminal page accumulates everything and hides the affordance
        let page2 = fs::read_to_string(dir.path().join("public/page/2/index.html")).unwrap();
        assert!(!page2.contains("Carregar mais posts"));
        assert!(page2.contains("Post a"));
        assert!(page2.contains("Post b"));
        assert!(page2.contains("Post c"));
        // localized date on list entries
        assert!(page2.contains("01 mar 2021"));
    }

    #[test]
    fn test_post_page_renders_read_time_and_navigation() {
        let dir = tempfile::tempdir().unwrap();
        let nebula = test_nebula(dir.path());
        let generator = Generator::new(&nebula, false).unwrap();

        let post = detail("a", 15);
        let mut navigation = HashMap::new();
        navigation.insert(
            "a".to_string(),
            PostNavigation {
                previous: None,
                next: Some(summary("b", 16)),
            },
        );

        let batches = vec![FeedPage {
            next_page: None,
            results: vec![post.summary()],
        }];
        generator
            .generate(&batches, &[post], &navigation)
            .unwrap();

        let html = fs::read_to_string(dir.path().join("public/post/a/index.html")).unwrap();
        // read time: 4 words -> 1 min
        assert!(html.contains("1 min"));
        // edited line, localized
        assert!(html.contains("* editado em 15 mar 2021, às 15:49"));
        // absent neighbor renders a placeholder, not a link
        assert!(html.contains("<span class=\"placeholder\">Post anterior</span>"));
        // present neighbor renders a link
        assert!(html.contains("href=\"/post/b/\""));
        assert!(html.contains("Próximo post"));
        // comment widget embed
        assert!(html.contains("https://utteranc.es/client.js"));
        assert!(html.contains("repo=\"someone/first-blog\""));
        // no preview affordance outside preview mode
        assert!(!html.contains("Sair do modo Preview"));
    }

    #[test]
    fn test_preview_mode_renders_exit_affordance() {
        let dir = tempfile::tempdir().unwrap();
        let nebula = test_nebula(dir.path());
        let generator = Generator::new(&nebula, true).unwrap();

        let batches = vec![FeedPage {
            next_page: None,
            results: vec![summary("a", 1)],
        }];
        generator.generate(&batches, &[], &HashMap::new()).unwrap();

        let html =
            fs::read_to_string(dir.path().join("public_preview/index.html")).unwrap();
        assert!(html.contains("Sair do modo Preview"));
        assert!(html.contains("/api/exit-preview"));
    }

    #[test]
    fn test_incremental_rebuilds_changed_post_and_neighbors() {
        let dir = tempfile::tempdir().unwrap();
        let nebula = test_nebula(dir.path());
        let generator = Generator::new(&nebula, false).unwrap();

        let posts = vec![detail("a", 15), detail("b", 16), detail("c", 17)];
        let mut navigation = HashMap::new();
        navigation.insert(
            "a".to_string(),
            PostNavigation {
                previous: None,
                next: Some(summary("b", 16)),
            },
        );
        navigation.insert(
            "b".to_string(),
            PostNavigation {
                previous: Some(summary("a", 15)),
                next: Some(summary("c", 17)),
            },
        );
        navigation.insert(
            "c".to_string(),
            PostNavigation {
                previous: Some(summary("b", 16)),
                next: None,
            },
        );

        let batches = vec![FeedPage {
            next_page: None,
            results: posts.iter().map(|p| p.summary()).collect(),
        }];
        let changeset = ChangeSet {
            changed_posts: vec!["a".to_string()],
            deleted_posts: Vec::new(),
            rebuild_lists: true,
            full_rebuild: false,
        };

        generator
            .generate_incremental(&batches, &posts, &navigation, &changeset)
            .unwrap();

        // the changed post and its referencing neighbor are rendered
        assert!(dir.path().join("public/post/a/index.html").exists());
        assert!(dir.path().join("public/post/b/index.html").exists());
        // an untouched post two steps away is not
        assert!(!dir.path().join("public/post/c/index.html").exists());
        // list pages and feed artifacts are rebuilt
        assert!(dir.path().join("public/index.html").exists());
        assert!(dir.path().join("public/posts.json").exists());
    }

    #[test]
    fn test_feed_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let nebula = test_nebula(dir.path());
        let generator = Generator::new(&nebula, false).unwrap();

        let post = detail("a", 15);
        let batches = vec![FeedPage {
            next_page: None,
            results: vec![post.summary()],
        }];
        generator.generate(&batches, &[post], &HashMap::new()).unwrap();

        let json = fs::read_to_string(dir.path().join("public/posts.json")).unwrap();
        let entries: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(entries[0]["uid"], "a");
        assert_eq!(entries[0]["url"], "/post/a/");

        let atom = fs::read_to_string(dir.path().join("public/atom.xml")).unwrap();
        assert!(atom.contains("<title>First Blog</title>"));
        assert!(atom.contains("/post/a/"));
    }
}
