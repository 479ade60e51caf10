//! nebula-rs: A fast static blog generator for headless CMS content
//!
//! This crate fetches posts from a headless content backend and renders
//! them into a static blog front-end using embedded Tera templates.

pub mod api;
pub mod cache;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// The main Nebula application
#[derive(Clone)]
pub struct Nebula {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Preview-mode output directory
    pub preview_dir: PathBuf,
    /// Static assets directory
    pub static_dir: PathBuf,
}

impl Nebula {
    /// Create a new Nebula instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create an instance with an already-built configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);
        let preview_dir = base_dir.join(&config.preview_dir);
        let static_dir = base_dir.join(&config.static_dir);

        Self {
            config,
            base_dir,
            public_dir,
            preview_dir,
            static_dir,
        }
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<()> {
        commands::generate::run(self).await
    }

    /// Clean the output directories and cache
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
