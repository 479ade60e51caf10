//! Generate static files

use anyhow::{Context, Result};

use crate::api::ApiClient;
use crate::cache::{self, CacheDb, ChangeSet};
use crate::content::loader::RemoteLoader;
use crate::content::{PostDetail, PostSummary};
use crate::generator::Generator;
use crate::helpers::post_route;
use crate::Nebula;

/// Generate the static site (with incremental support)
pub async fn run(nebula: &Nebula) -> Result<()> {
    run_with_options(nebula, false, None).await
}

/// Generate with force option and an optional explicit snapshot ref.
/// An explicit ref means preview mode: output goes to the preview
/// directory and the cache is bypassed.
pub async fn run_with_options(
    nebula: &Nebula,
    force: bool,
    snapshot: Option<&str>,
) -> Result<()> {
    let start = std::time::Instant::now();
    let preview = snapshot.is_some();

    // Fetch content
    let client = ApiClient::new(&nebula.config.api)?;
    let snapshot = client
        .resolve_snapshot(snapshot)
        .await
        .context("failed to resolve content snapshot")?;
    let loader = RemoteLoader::new(&client, &nebula.config, &snapshot);

    let batches = loader
        .load_feed_pages()
        .await
        .context("failed to fetch the post feed")?;
    let summaries: Vec<PostSummary> = batches
        .iter()
        .flat_map(|page| page.results.iter().cloned())
        .collect();
    let posts = loader
        .load_details(&summaries)
        .await
        .context("failed to fetch post documents")?;
    let navigation = loader
        .resolve_all_navigation(&posts)
        .await
        .context("failed to resolve post navigation")?;

    tracing::info!("Loaded {} posts from snapshot {}", posts.len(), snapshot);

    let generator = Generator::new(nebula, preview)?;

    if preview {
        // preview output is transient; always render everything
        generator.generate(&batches, &posts, &navigation)?;
        let duration = start.elapsed();
        tracing::info!("Generated preview in {:.2}s", duration.as_secs_f64());
        return Ok(());
    }

    // Calculate current document hashes
    let current_posts = hash_posts(&posts)?;
    let config_hash = hash_config(nebula)?;

    // Load cache and detect changes
    let cache_db = CacheDb::load(&nebula.base_dir);
    let changeset = if force || cache_db.post_count == 0 {
        tracing::info!(
            "Full generation (force={}, cache_empty={})",
            force,
            cache_db.post_count == 0
        );
        ChangeSet::full_rebuild()
    } else {
        cache::detect_changes(&cache_db, config_hash, &snapshot, &current_posts)
    };

    if !changeset.has_changes() {
        let duration = start.elapsed();
        tracing::info!("Completed in {:.2}s (no changes)", duration.as_secs_f64());
        return Ok(());
    }

    tracing::info!("Changes detected: {}", changeset.summary());

    if changeset.full_rebuild {
        generator.generate(&batches, &posts, &navigation)?;
    } else {
        generator.generate_incremental(&batches, &posts, &navigation, &changeset)?;
    }

    // Update cache
    let mut new_cache = CacheDb::new();
    let posts_for_cache: Vec<_> = current_posts
        .into_iter()
        .map(|(uid, hash)| {
            let output_path = post_route(&nebula.config, &uid);
            (uid, hash, output_path)
        })
        .collect();
    cache::update_cache(&mut new_cache, config_hash, &snapshot, &posts_for_cache);
    new_cache.save(&nebula.base_dir)?;

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}

/// Regenerate from a preview ref into the preview directory
pub async fn run_preview(nebula: &Nebula, snapshot: &str) -> Result<()> {
    run_with_options(nebula, true, Some(snapshot)).await
}

fn hash_posts(posts: &[PostDetail]) -> Result<Vec<(String, u64)>> {
    let mut hashes = Vec::with_capacity(posts.len());
    for post in posts {
        let serialized = serde_json::to_string(post)?;
        hashes.push((post.uid.clone(), cache::hash_content(&serialized)));
    }
    Ok(hashes)
}

fn hash_config(nebula: &Nebula) -> Result<u64> {
    let serialized = serde_yaml::to_string(&nebula.config)?;
    Ok(cache::hash_content(&serialized))
}
