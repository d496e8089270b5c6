use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use portfolio_sort::{
    EngineConfig, HeroSelection, ImageInventory, ImageRecord, PortfolioEngine, select_hero_images,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "portfolio-sort",
    version,
    about = "Group portfolio photos into before/after projects"
)]
struct Cli {
    /// JSON config file (default: <config dir>/portfolio-sort/config.json)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log per-file details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Group photos and print before/after projects, oldest first
    Groups {
        /// Photo directory
        #[arg(short, long, value_name = "DIR")]
        path: PathBuf,
        /// Maximum differing fingerprint bits for photos of the same job
        #[arg(short, long)]
        threshold: Option<u32>,
        /// Extract features on a single thread
        #[arg(long)]
        sequential: bool,
        /// Create the directory if it does not exist
        #[arg(long)]
        create: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show fingerprint and clutter score for every photo
    Inspect {
        /// Photo directory
        #[arg(short, long, value_name = "DIR")]
        path: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Pick landing-page slideshow images
    Hero {
        /// Dedicated hero image directory
        #[arg(long, value_name = "DIR")]
        hero: PathBuf,
        /// Portfolio directory used when there are too few hero images
        #[arg(long, value_name = "DIR")]
        portfolio: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct InspectRow<'a> {
    filename: &'a str,
    modified_at: DateTime<Utc>,
    fingerprint: Option<String>,
    clutter_score: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Groups {
            path,
            threshold,
            sequential,
            create,
            json,
        } => {
            if let Some(threshold) = threshold {
                config.hamming_threshold = threshold;
            }
            config.parallel &= !sequential;
            config.create_missing |= create;
            config.validate()?;

            if !json {
                println!("▶ Grouping photos in: {}", path.display());
            }
            let engine = PortfolioEngine::new(config);
            let bar = progress_bar(json)?;
            let groups = benchmark("building portfolio", json, || {
                engine.build_with_progress(&path, &|_, total| {
                    bar.set_length(total as u64);
                    bar.inc(1);
                })
            });
            bar.finish_and_clear();

            if json {
                println!("{}", serde_json::to_string_pretty(&groups)?);
            } else if groups.is_empty() {
                println!("No images found.");
            } else {
                println!("Found {} project(s):", groups.len());
                for (i, group) in groups.iter().enumerate() {
                    println!("\n✨ Project {} ({}):", i + 1, group.group_timestamp.to_rfc3339());
                    if group.is_single() {
                        println!("   🖼  Single  → {}", group.before);
                        continue;
                    }
                    println!("   🔧 Before → {}", group.before);
                    println!("   🏆 After  → {}", group.after);
                    for extra in &group.extras {
                        println!("   ▶ Extra  → {}", extra);
                    }
                }
            }
        }

        Commands::Inspect { path, json } => {
            let engine = PortfolioEngine::new(config);
            let records = benchmark("analysing images", json, || engine.analyze(&path));
            let rows: Vec<InspectRow> = records.iter().map(inspect_row).collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if rows.is_empty() {
                println!("No images found.");
            } else {
                for row in &rows {
                    println!(
                        "{:<40} {:<16} {:>8.2}  {}",
                        row.filename,
                        row.fingerprint.as_deref().unwrap_or("⚠️ unreadable"),
                        row.clutter_score,
                        row.modified_at.to_rfc3339()
                    );
                }
            }
        }

        Commands::Hero {
            hero,
            portfolio,
            json,
        } => {
            let inventory = ImageInventory::new(&config.extensions);
            let selection = select_hero_images(&hero, &portfolio, &inventory);

            if json {
                println!("{}", serde_json::to_string_pretty(&selection)?);
            } else {
                let (label, dir) = match &selection {
                    HeroSelection::Hero(_) => ("hero", Some(&hero)),
                    HeroSelection::Portfolio(_) => ("portfolio", Some(&portfolio)),
                    HeroSelection::Fallback => ("fallback", None),
                };
                println!("Hero source: {}", label);
                for file in selection.files() {
                    match dir {
                        Some(dir) => println!("   ▶ {}", dir.join(file).display()),
                        None => println!("   ▶ {}", file),
                    }
                }
            }
        }
    }

    Ok(())
}

/// Explicit `--config` must load; the default location is optional.
fn load_config(explicit: Option<&Path>) -> Result<EngineConfig> {
    if let Some(path) = explicit {
        return EngineConfig::load(path)
            .with_context(|| format!("Failed to load config {:?}", path));
    }

    match EngineConfig::default_path() {
        Some(path) if path.is_file() => EngineConfig::load(&path)
            .with_context(|| format!("Failed to load config {:?}", path)),
        _ => Ok(EngineConfig::default()),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "portfolio_sort=debug"
    } else {
        "portfolio_sort=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn progress_bar(hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(0);
    bar.set_style(ProgressStyle::with_template(
        "{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}",
    )?);
    bar.set_message("Analysing images…");
    Ok(bar)
}

fn inspect_row(record: &ImageRecord) -> InspectRow<'_> {
    InspectRow {
        filename: &record.filename,
        modified_at: DateTime::<Utc>::from(record.modified_at),
        fingerprint: record.fingerprint.map(|fp| fp.to_string()),
        clutter_score: record.clutter_score,
    }
}

/// Run `f()`, report how long it took (with `label`), and return its result.
fn benchmark<T, F: FnOnce() -> T>(label: &str, quiet: bool, f: F) -> T {
    let start = Instant::now();
    let result = f();
    if quiet {
        log::debug!("{} took {:.2?}", label, start.elapsed());
    } else {
        println!("⏱ {} took {:.2?}", label, start.elapsed());
    }
    result
}
