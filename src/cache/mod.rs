//! Cache module for incremental generation
//!
//! Content is re-fetched from the backend on every run; the cache only
//! remembers a hash per document so unchanged output files are not
//! rewritten. A config change or a change in the post set (posts added
//! or deleted shift every neighbor link) forces a full rebuild.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Cache file name
const CACHE_FILE: &str = ".nebula-cache/db.json";

/// Represents a cached entry for one post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Hash of the post's document payload
    pub content_hash: u64,
    /// Output path relative to the output dir
    pub output_path: String,
}

/// Cache database for tracking document changes
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheDb {
    /// Version of the cache format
    pub version: u32,
    /// Hash of the site config (changes trigger full rebuild)
    pub config_hash: u64,
    /// Snapshot ref the cache was built from (changes trigger full rebuild)
    pub snapshot: String,
    /// Cached entries keyed by post uid
    pub posts: HashMap<String, CacheEntry>,
    /// Total post count (for detecting additions/deletions)
    pub post_count: usize,
}

impl CacheDb {
    /// Current cache format version
    const VERSION: u32 = 1;

    /// Load cache from disk, or create a new empty cache
    pub fn load(base_dir: &Path) -> Self {
        let cache_path = base_dir.join(CACHE_FILE);
        if let Ok(content) = fs::read_to_string(&cache_path) {
            if let Ok(cache) = serde_json::from_str::<CacheDb>(&content) {
                if cache.version == Self::VERSION {
                    return cache;
                }
                tracing::info!("Cache version mismatch, rebuilding cache");
            }
        }
        Self::default()
    }

    /// Save cache to disk
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let cache_dir = base_dir.join(".nebula-cache");
        fs::create_dir_all(&cache_dir)?;

        let cache_path = base_dir.join(CACHE_FILE);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(cache_path, content)?;
        Ok(())
    }

    /// Create a new cache with version set
    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            ..Default::default()
        }
    }
}

/// Change detection result
#[derive(Debug, Clone)]
pub struct ChangeSet {
    /// Posts that need regeneration (uid)
    pub changed_posts: Vec<String>,
    /// Posts that were deleted (uid)
    pub deleted_posts: Vec<String>,
    /// Whether list pages and feed artifacts need regeneration
    pub rebuild_lists: bool,
    /// Whether to regenerate everything (config/snapshot/membership changed)
    pub full_rebuild: bool,
}

impl ChangeSet {
    /// Create a changeset indicating full rebuild is needed
    pub fn full_rebuild() -> Self {
        Self {
            changed_posts: Vec::new(),
            deleted_posts: Vec::new(),
            rebuild_lists: true,
            full_rebuild: true,
        }
    }

    /// Create an empty changeset (no changes)
    pub fn empty() -> Self {
        Self {
            changed_posts: Vec::new(),
            deleted_posts: Vec::new(),
            rebuild_lists: false,
            full_rebuild: false,
        }
    }

    /// Check if any changes were detected
    pub fn has_changes(&self) -> bool {
        self.full_rebuild
            || !self.changed_posts.is_empty()
            || !self.deleted_posts.is_empty()
            || self.rebuild_lists
    }

    /// Get summary of changes for logging
    pub fn summary(&self) -> String {
        if self.full_rebuild {
            return "full rebuild required".to_string();
        }

        let mut parts = Vec::new();
        if !self.changed_posts.is_empty() {
            parts.push(format!("{} posts changed", self.changed_posts.len()));
        }
        if !self.deleted_posts.is_empty() {
            parts.push(format!("{} posts deleted", self.deleted_posts.len()));
        }
        if self.rebuild_lists {
            parts.push("list pages".to_string());
        }

        if parts.is_empty() {
            "no changes".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Calculate a hash for serialized content
pub fn hash_content(content: &str) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}

/// Detect changes between current state and cached state
pub fn detect_changes(
    cache: &CacheDb,
    config_hash: u64,
    snapshot: &str,
    current_posts: &[(String, u64)], // (uid, hash)
) -> ChangeSet {
    if config_hash != cache.config_hash && cache.config_hash != 0 {
        tracing::info!("Config changed, full rebuild required");
        return ChangeSet::full_rebuild();
    }

    if snapshot != cache.snapshot && !cache.snapshot.is_empty() {
        tracing::info!("Content snapshot changed, full rebuild required");
        return ChangeSet::full_rebuild();
    }

    let mut changeset = ChangeSet::empty();

    // Check for changed/new posts
    for (uid, hash) in current_posts {
        match cache.posts.get(uid) {
            Some(cached) => {
                if cached.content_hash != *hash {
                    tracing::debug!("Post changed: {}", uid);
                    changeset.changed_posts.push(uid.clone());
                    // subtitles and dates show on list pages too
                    changeset.rebuild_lists = true;
                }
            }
            None => {
                // a new post shifts every neighbor link
                tracing::debug!("New post: {}", uid);
                return ChangeSet::full_rebuild();
            }
        }
    }

    // Check for deleted posts
    let current_uids: std::collections::HashSet<_> =
        current_posts.iter().map(|(uid, _)| uid.as_str()).collect();

    for uid in cache.posts.keys() {
        if !current_uids.contains(uid.as_str()) {
            tracing::debug!("Deleted post: {}", uid);
            return ChangeSet::full_rebuild();
        }
    }

    if current_posts.len() != cache.post_count {
        return ChangeSet::full_rebuild();
    }

    changeset
}

/// Update cache with current state
pub fn update_cache(
    cache: &mut CacheDb,
    config_hash: u64,
    snapshot: &str,
    posts: &[(String, u64, String)], // (uid, hash, output_path)
) {
    cache.version = CacheDb::VERSION;
    cache.config_hash = config_hash;
    cache.snapshot = snapshot.to_string();

    cache.posts.clear();
    for (uid, hash, output_path) in posts {
        cache.posts.insert(
            uid.clone(),
            CacheEntry {
                content_hash: *hash,
                output_path: output_path.clone(),
            },
        );
    }

    cache.post_count = posts.len();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cached(posts: &[(&str, u64)]) -> CacheDb {
        let mut cache = CacheDb::new();
        let entries: Vec<_> = posts
            .iter()
            .map(|(uid, hash)| (uid.to_string(), *hash, format!("post/{}/", uid)))
            .collect();
        update_cache(&mut cache, 42, "master", &entries);
        cache
    }

    #[test]
    fn test_no_changes() {
        let cache = cached(&[("a", 1), ("b", 2)]);
        let current = vec![("a".to_string(), 1), ("b".to_string(), 2)];
        let changeset = detect_changes(&cache, 42, "master", &current);
        assert!(!changeset.has_changes());
        assert_eq!(changeset.summary(), "no changes");
    }

    #[test]
    fn test_changed_post_rebuilds_lists_too() {
        let cache = cached(&[("a", 1), ("b", 2)]);
        let current = vec![("a".to_string(), 9), ("b".to_string(), 2)];
        let changeset = detect_changes(&cache, 42, "master", &current);
        assert!(!changeset.full_rebuild);
        assert_eq!(changeset.changed_posts, vec!["a".to_string()]);
        assert!(changeset.rebuild_lists);
    }

    #[test]
    fn test_membership_change_forces_full_rebuild() {
        let cache = cached(&[("a", 1)]);

        // new post
        let current = vec![("a".to_string(), 1), ("b".to_string(), 2)];
        assert!(detect_changes(&cache, 42, "master", &current).full_rebuild);

        // deleted post
        let current = vec![];
        assert!(detect_changes(&cache, 42, "master", &current).full_rebuild);
    }

    #[test]
    fn test_config_or_snapshot_change_forces_full_rebuild() {
        let cache = cached(&[("a", 1)]);
        let current = vec![("a".to_string(), 1)];
        assert!(detect_changes(&cache, 43, "master", &current).full_rebuild);
        assert!(detect_changes(&cache, 42, "preview-ref", &current).full_rebuild);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cached(&[("a", 1)]);
        cache.save(dir.path()).unwrap();

        let loaded = CacheDb::load(dir.path());
        assert_eq!(loaded.post_count, 1);
        assert_eq!(loaded.posts["a"].content_hash, 1);
        assert_eq!(loaded.snapshot, "master");
    }
}
