//! CLI entry point for nebula-rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "nebula-rs")]
#[command(version)]
#[command(about = "A fast static blog generator for headless CMS content", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch content and generate static files
    #[command(alias = "g")]
    Generate {
        /// Regenerate everything, ignoring the cache
        #[arg(short, long)]
        force: bool,

        /// Generate from an explicit snapshot ref (preview mode)
        #[arg(long, value_name = "REF")]
        r#ref: Option<String>,
    },

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// Clean the output directories and cache
    Clean,

    /// List backend content (post, route)
    List {
        /// Type of content to list
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "nebula_rs=debug,info"
    } else {
        "nebula_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(cwd) => cwd,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Generate { force, r#ref } => {
            let nebula = nebula_rs::Nebula::new(&base_dir)?;
            tracing::info!("Generating static files...");
            nebula_rs::commands::generate::run_with_options(&nebula, force, r#ref.as_deref())
                .await?;
            println!("Generated successfully!");
        }

        Commands::Server { port, ip, open } => {
            let nebula = nebula_rs::Nebula::new(&base_dir)?;

            // Generate first
            tracing::info!("Generating static files...");
            nebula.generate().await?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            nebula_rs::server::start(&nebula, &ip, port, open).await?;
        }

        Commands::Clean => {
            let nebula = nebula_rs::Nebula::new(&base_dir)?;
            tracing::info!("Cleaning output folders...");
            nebula.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let nebula = nebula_rs::Nebula::new(&base_dir)?;
            nebula_rs::commands::list::run(&nebula, &r#type).await?;
        }

        Commands::Version => {
            println!("nebula-rs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
