//! CLI entry point for mdx-press

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mdx_press::content::loader::ContentLoader;
use mdx_press::content::Collections;
use mdx_press::helpers::Helpers;
use mdx_press::Site;

#[derive(Parser)]
#[command(name = "mdx-press")]
#[command(version)]
#[command(about = "Renders Markdown/MDX content into self-contained HTML pages", long_about = None)]
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
    /// Render every page into the output directory
    #[command(alias = "b")]
    Build,

    /// Print the sitemap to stdout
    Sitemap,

    /// Remove the output directory
    Clean,

    /// List site information
    List {
        /// Type of content to list (pages, posts, nav)
        #[arg(default_value = "pages")]
        r#type: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "mdx_press=debug,info"
    } else {
        "mdx_press=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    match cli.command {
        Commands::Build => {
            let site = Site::new(&base_dir)?;
            tracing::info!("Building {:?}", site.source_dir);
            let report = site.build().await?;
            for diagnostic in &report.diagnostics {
                tracing::warn!("{}: {}", diagnostic.page, diagnostic.message);
            }
            if !report.is_success() {
                anyhow::bail!(
                    "{} page(s) failed: {}",
                    report.failures.len(),
                    report.failures.join(", ")
                );
            }
            println!("Built {} pages", report.pages_written);
        }

        Commands::Sitemap => {
            let site = Site::new(&base_dir)?;
            let pages = ContentLoader::new(&site).load_pages()?;
            let collections = Collections::build(&pages)?;
            let helpers = Helpers::new(&site.config.metadata);
            print!(
                "{}",
                mdx_press::sitemap::render_sitemap(&collections.all, &helpers)
            );
        }

        Commands::Clean => {
            let site = Site::new(&base_dir)?;
            tracing::info!("Cleaning output folder...");
            if site.clean()? {
                println!("Cleaned successfully!");
            }
        }

        Commands::List { r#type, json } => {
            let site = Site::new(&base_dir)?;
            mdx_press::commands::list::run(&site, &r#type, json)?;
        }

        Commands::Version => {
            println!("mdx-press version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
