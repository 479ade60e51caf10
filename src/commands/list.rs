//! List fetched content

use anyhow::Result;

use crate::api::ApiClient;
use crate::content::loader::RemoteLoader;
use crate::helpers::{list_page_route, post_route, url_for};
use crate::Nebula;

/// List backend content by type
pub async fn run(nebula: &Nebula, content_type: &str) -> Result<()> {
    let client = ApiClient::new(&nebula.config.api)?;
    let snapshot = client.resolve_snapshot(None).await?;
    let loader = RemoteLoader::new(&client, &nebula.config, &snapshot);
    let pages = loader.load_feed_pages().await?;

    match content_type {
        "post" | "posts" => {
            let count: usize = pages.iter().map(|p| p.results.len()).sum();
            println!("Posts ({}):", count);
            for page in &pages {
                for post in &page.results {
                    let date = post
                        .first_publication_date
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "unpublished".to_string());
                    println!("  {} - {} [{}]", date, post.title, post.uid);
                }
            }
        }
        "route" | "routes" => {
            println!("Routes:");
            for page_num in 1..=pages.len().max(1) {
                println!("  {}", url_for(&nebula.config, &list_page_route(page_num)));
            }
            for page in &pages {
                for post in &page.results {
                    println!(
                        "  {}",
                        url_for(&nebula.config, &post_route(&nebula.config, &post.uid))
                    );
                }
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, route", content_type);
        }
    }

    Ok(())
}
