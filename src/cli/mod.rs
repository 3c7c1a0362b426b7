//! Command-line interface for feedgrid.
//!
//! Provides commands for inspecting a catalog's navigation graph, replaying
//! recorded pointer input, warming resources, and checking configuration.

use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::adapters::{NoopLoader, ResourceLoader, SchemeLoader};
use crate::config;
use crate::core::{resolver, FeedSession, GestureEvent, PointerSample, PreloadCache};
use crate::domain::Direction;
use crate::library::Catalog;

/// feedgrid - Navigation core for a short-form video feed
#[derive(Parser, Debug)]
#[command(name = "feedgrid")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Catalog file (defaults to the configured catalog)
    #[arg(long, global = true, env = "FEEDGRID_CATALOG")]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the four neighbors of a node
    Neighbors {
        /// Node ID
        node_id: String,
    },

    /// Show the episode indicator window around a node
    Episodes {
        /// Node ID
        node_id: String,

        /// Indicators shown at once (defaults to config)
        #[arg(short, long)]
        max_visible: Option<usize>,
    },

    /// Replay pointer samples (JSON lines) through a feed session
    Gesture {
        /// Node to start on
        #[arg(short, long)]
        start: String,

        /// Samples file (reads from stdin if not provided)
        input: Option<PathBuf>,

        /// Warm resources while navigating
        #[arg(long)]
        warm: bool,

        /// Print every feed event as JSON
        #[arg(long)]
        events: bool,
    },

    /// Warm a node and its neighborhood
    Preload {
        /// Node ID
        node_id: String,

        /// Neighbor hops to warm (defaults to config)
        #[arg(short, long)]
        depth: Option<usize>,

        /// Per-resource timeout in milliseconds (defaults to config)
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Validate a catalog and report dangling references
    Validate,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let catalog = self.catalog;

        match self.command {
            Commands::Neighbors { node_id } => show_neighbors(catalog, &node_id).await,
            Commands::Episodes {
                node_id,
                max_visible,
            } => show_episodes(catalog, &node_id, max_visible).await,
            Commands::Gesture {
                start,
                input,
                warm,
                events,
            } => replay_gesture(catalog, &start, input, warm, events).await,
            Commands::Preload {
                node_id,
                depth,
                timeout_ms,
            } => preload(catalog, &node_id, depth, timeout_ms).await,
            Commands::Validate => validate(catalog).await,
            Commands::Config => show_config().await,
        }
    }
}

/// Load the catalog from `path` or the configured location
async fn load_catalog(path: Option<PathBuf>) -> Result<Catalog> {
    let path = match path {
        Some(path) => path,
        None => config::catalog_path()?,
    };
    Catalog::load(&path).await
}

/// Show the four neighbors of a node
async fn show_neighbors(catalog_path: Option<PathBuf>, node_id: &str) -> Result<()> {
    let catalog = load_catalog(catalog_path).await?;

    if catalog.get(node_id).is_none() {
        anyhow::bail!("Node not found in catalog: {}", node_id);
    }

    let result = resolver::resolve(&catalog, node_id);

    println!("{:<8} {:<24} {:<18}", "DIR", "NODE", "REASON");
    println!("{}", "-".repeat(52));

    for (direction, neighbor) in result.iter() {
        match neighbor {
            Some(n) => println!(
                "{:<8} {:<24} {:<18}",
                direction.to_string(),
                n.node.id.as_str(),
                n.reason.as_str()
            ),
            None => println!("{:<8} {:<24} {:<18}", direction.to_string(), "-", "-"),
        }
    }

    Ok(())
}

/// Show the episode indicator window around a node
async fn show_episodes(
    catalog_path: Option<PathBuf>,
    node_id: &str,
    max_visible: Option<usize>,
) -> Result<()> {
    let catalog = Arc::new(load_catalog(catalog_path).await?);

    let mut settings = config::config()?.feed_settings();
    if let Some(max) = max_visible {
        settings.max_visible = max;
    }

    let cache = PreloadCache::new(Arc::new(NoopLoader), Duration::from_millis(0));
    let session = FeedSession::new(catalog, cache, settings, node_id)?;

    let Some(window) = session.episode_window() else {
        println!("{} is not part of a series", node_id);
        return Ok(());
    };

    for (offset, node) in window.episodes.iter().enumerate() {
        let marker = if window.start + offset == window.current { ">" } else { " " };
        println!(
            "{} {:>3}  {}",
            marker,
            node.episode_number.map(|n| n.to_string()).unwrap_or_else(|| "?".to_string()),
            node.id
        );
    }

    println!("\nEpisode {} of {}", window.current + 1, window.total);

    Ok(())
}

/// Replay recorded pointer samples through a feed session
async fn replay_gesture(
    catalog_path: Option<PathBuf>,
    start: &str,
    input_file: Option<PathBuf>,
    warm: bool,
    print_events: bool,
) -> Result<()> {
    let cfg = config::config()?;
    let catalog = Arc::new(load_catalog(catalog_path).await?);

    let input = if let Some(path) = input_file {
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read samples file: {}", path.display()))?
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    };

    let loader: Arc<dyn ResourceLoader> = if warm {
        Arc::new(SchemeLoader::new(cfg.preload.prefetch_bytes)?)
    } else {
        Arc::new(NoopLoader)
    };
    let cache = PreloadCache::new(loader, cfg.preload.timeout());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = FeedSession::new(catalog, cache, cfg.feed_settings(), start)?.with_events(tx);
    session.warm_around();

    for (line_no, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let sample: PointerSample = serde_json::from_str(line)
            .with_context(|| format!("Invalid sample on line {}", line_no + 1))?;

        match session.handle_sample(&sample) {
            Some(GestureEvent::DirectionCommitted(direction)) => {
                if session.is_shuffling() {
                    eprintln!("line {}: {} -> {}", line_no + 1, direction, session.current().id);
                    // No animation to wait for
                    session.finish_transition();
                } else {
                    eprintln!("line {}: {} (no neighbor)", line_no + 1, direction);
                }
            }
            Some(GestureEvent::Cancelled) => {
                eprintln!("line {}: cancelled", line_no + 1);
                session.finish_transition();
            }
            None => {}
        }

        while let Ok(event) = rx.try_recv() {
            if print_events {
                println!("{}", serde_json::to_string(&event)?);
            }
        }
    }

    println!("Final node: {}", session.current().id);
    session.shutdown();

    Ok(())
}

/// Warm a node and its neighborhood, reporting how each resource fared
async fn preload(
    catalog_path: Option<PathBuf>,
    node_id: &str,
    depth: Option<usize>,
    timeout_ms: Option<u64>,
) -> Result<()> {
    let cfg = config::config()?;
    let catalog = load_catalog(catalog_path).await?;

    let origin = catalog
        .get(node_id)
        .with_context(|| format!("Node not found in catalog: {}", node_id))?;

    let depth = depth.unwrap_or(cfg.preload.depth);
    let timeout = timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| cfg.preload.timeout());

    let loader = Arc::new(SchemeLoader::new(cfg.preload.prefetch_bytes)?);
    let cache = PreloadCache::new(loader, timeout);

    let mut targets = vec![origin];
    targets.extend(resolver::preload_targets(&catalog, node_id, depth));

    eprintln!("Warming {} resource(s) (depth {}, timeout {}ms)", targets.len(), depth, timeout.as_millis());

    let mut tasks = JoinSet::new();
    for node in targets {
        let cache = cache.clone();
        let id = node.id.clone();
        let url = node.resource_url.clone();
        tasks.spawn(async move {
            let started = Instant::now();
            let ready = cache.warm(&url).await;
            (id, url, ready, started.elapsed())
        });
    }

    let mut rows = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        rows.push(joined.context("Preload task panicked")?);
    }
    rows.sort_by(|a, b| a.0.cmp(&b.0));

    println!("{:<24} {:<8} {:>8}  {}", "NODE", "READY", "MS", "RESOURCE");
    println!("{}", "-".repeat(80));
    for (id, url, ready, elapsed) in rows {
        println!("{:<24} {:<8} {:>8}  {}", id.as_str(), ready, elapsed.as_millis(), url);
    }

    Ok(())
}

/// Validate a catalog
async fn validate(catalog_path: Option<PathBuf>) -> Result<()> {
    let catalog = load_catalog(catalog_path).await?;

    let mut dangling = 0;
    let mut isolated = Vec::new();

    for node in catalog.nodes() {
        for alternate in &node.alternate_versions {
            if catalog.get(alternate.as_str()).is_none() {
                eprintln!("warning: {} lists unknown alternate {}", node.id, alternate);
                dangling += 1;
            }
        }

        let result = resolver::resolve(&catalog, node.id.as_str());
        if Direction::ALL.iter().all(|d| result.get(*d).is_none()) {
            isolated.push(node.id.clone());
        }
    }

    println!("Nodes:     {}", catalog.len());
    println!("Series:    {}", catalog.series_count());
    println!("Dangling:  {}", dangling);
    println!("Isolated:  {}", isolated.len());
    for id in &isolated {
        println!("  {}", id);
    }

    Ok(())
}

/// Show the resolved configuration (for debugging)
async fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("feedgrid configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:    {}", cfg.home.display());
    println!("  Catalog: {}", cfg.catalog.display());
    println!();
    println!("Gesture:");
    println!("  Dominance threshold: {}px", cfg.gesture.dominance_px);
    println!("  Commit threshold:    {}px", cfg.gesture.commit_px);
    println!();
    println!("Preload:");
    println!("  Timeout:        {}ms", cfg.preload.timeout_ms);
    println!("  Depth:          {}", cfg.preload.depth);
    println!("  Prefetch bytes: {}", cfg.preload.prefetch_bytes);
    println!();
    println!("Episodes:");
    println!("  Max visible: {}", cfg.episodes.max_visible);

    Ok(())
}
