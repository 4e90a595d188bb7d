//! Diagnostic CLI (§6): `extract [--robots POLICY] URL`.
//!
//! The extractor core never fetches network resources (§1's scope
//! boundary) — this binary reads already-fetched document bytes from a
//! file (or stdin) and a required `--base` URI to seed the DUE, then runs
//! the extractor and prints each discovered outlink. Grounded in
//! `other_examples/..A2-ai-link-checker..main.rs`'s `clap::Parser` derive
//! shape; the `#[tokio::main]` entry point and async file read follow the
//! teacher's own `main.rs`, which is likewise an async binary built on
//! `tokio`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

use html_link_extractor::{extract, ContentSequence, Due, ExtractorConfig, Uri};

/// Extract outbound links from an already-fetched HTML document.
#[derive(Parser, Debug)]
#[command(name = "extract")]
#[command(about = "Extract outbound links from a fetched HTML document")]
#[command(version)]
struct Cli {
    /// Path to the fetched document, or `-` to read from stdin.
    input: PathBuf,

    /// Absolute URI the document was fetched from; seeds the DUE's base.
    #[arg(long)]
    base: String,

    /// Whether to honor `<meta name="robots" content="nofollow">`.
    #[arg(long, value_enum, default_value_t = RobotsPolicy::Honor)]
    robots: RobotsPolicy,

    /// Force the charset sniffer's outcome instead of auto-detecting.
    #[arg(long)]
    charset: Option<String>,

    /// Override `max_outlinks` for this run.
    #[arg(long)]
    max_links: Option<usize>,

    /// Content-Type to report to the extractor's HTML-expected gate.
    #[arg(long, default_value = "text/html")]
    content_type: String,

    /// Emit outlinks as a JSON array instead of tab-separated lines.
    #[arg(long)]
    json: bool,

    /// Raise the tracing filter to debug level.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum RobotsPolicy {
    Honor,
    Ignore,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let bytes = read_input(&cli.input).await?;
    let base_uri = Uri::parse(&cli.base).with_context(|| format!("invalid --base URI: {}", cli.base))?;

    let mut config_builder = ExtractorConfig::builder().obey_meta_robots(cli.robots == RobotsPolicy::Honor);
    if let Some(max_links) = cli.max_links {
        config_builder = config_builder.max_outlinks(max_links);
    }
    let config = config_builder.build()?;

    let content = ContentSequence::from_bytes(bytes);
    let mut due = Due::new(base_uri, content, cli.content_type);
    if let Some(charset) = cli.charset {
        due.set_content_charset(charset);
    }

    let completed = extract(&mut due, &config);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(due.outlinks())?);
    } else {
        for link in due.outlinks() {
            println!("{}\t{}\t{}", link.hop, link.context, link.target);
        }
    }

    for record in due.non_fatal_failures() {
        tracing::warn!(failure = %record.failure, at = %record.at, "non-fatal extraction failure");
    }

    if !completed {
        tracing::info!("extraction skipped or aborted before completion");
    }

    Ok(())
}

async fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut buf)
            .await
            .context("reading document bytes from stdin")?;
        Ok(buf)
    } else {
        tokio::fs::read(path)
            .await
            .with_context(|| format!("reading document bytes from {}", path.display()))
    }
}
