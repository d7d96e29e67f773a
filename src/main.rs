//! markshelf - validate, deduplicate and reorganize browser bookmarks.
//!
//! Usage:
//!   markshelf import FILE         Parse a bookmark export
//!   markshelf validate FILE       Find broken links and duplicates
//!   markshelf organize FILE       Build a categorized bookmark file
//!   markshelf stats FILE          Summarize a bookmark collection
//!   markshelf info                Describe what markshelf does
//!   markshelf --help              Show help

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use markshelf_analyze::{BookmarkStats, Categorizer, DuplicateFinder};
use markshelf_check::{CheckProgress, LinkChecker};
use markshelf_core::{BrokenLink, DuplicateGroups, Folder, Settings, count_nodes};
use markshelf_io::{ExportConfig, ExportFormat, HtmlFlavor};
use markshelf_ops::{Organizer, merge_duplicates, remove_broken_links};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "MARKSHELF_LOG";

#[derive(Parser)]
#[command(
    name = "markshelf",
    version,
    about = "Validate, deduplicate and reorganize browser bookmarks",
    long_about = "markshelf reads bookmark files exported by Chrome, Edge, Firefox or \
                  Safari, finds broken links and duplicates, sorts bookmarks into \
                  categories and writes the result back as an importable file."
)]
struct Cli {
    /// Settings file (defaults to <config dir>/markshelf/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a bookmark file and report what it contains
    Import {
        /// Bookmark file (Netscape HTML or markshelf JSON)
        file: PathBuf,

        /// Save the parsed tree as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check links and look for duplicates
    Validate {
        /// Bookmark file
        file: PathBuf,

        /// Skip link checking
        #[arg(long)]
        no_check_links: bool,

        /// Skip duplicate detection
        #[arg(long)]
        no_duplicates: bool,

        /// Save a JSON report
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        check: CheckArgs,
    },

    /// Categorize bookmarks and write a reorganized file
    Organize {
        /// Bookmark file
        file: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "organized_bookmarks.html")]
        output: PathBuf,

        /// Check links first and drop broken ones
        #[arg(long)]
        remove_broken: bool,

        /// Keep one bookmark per duplicate group
        #[arg(long)]
        merge_duplicates: bool,

        /// Output format: html, json or csv (defaults to the output extension)
        #[arg(short, long)]
        format: Option<ExportFormat>,

        /// Browser dialect for HTML output: chrome, edge, firefox, safari, generic
        #[arg(long, default_value = "chrome")]
        compat: HtmlFlavor,

        /// Split categories larger than this into subfolders
        #[arg(long)]
        max_per_folder: Option<usize>,

        /// Drop the original folders instead of keeping them next to the categories
        #[arg(long)]
        no_preserve: bool,

        /// Skip text clustering of uncategorized bookmarks
        #[arg(long)]
        no_clustering: bool,

        #[command(flatten)]
        check: CheckArgs,
    },

    /// Show statistics for a bookmark file
    Stats {
        /// Bookmark file
        file: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Describe markshelf
    Info,
}

/// Link check settings that override the settings file.
#[derive(clap::Args, Debug, Default)]
struct CheckArgs {
    /// Number of links checked at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Glob pattern of URLs never to check (repeatable)
    #[arg(long = "exclude")]
    exclude: Vec<String>,
}

impl CheckArgs {
    fn apply(&self, settings: &mut Settings) -> Result<()> {
        if let Some(concurrency) = self.concurrency {
            if concurrency == 0 {
                bail!("--concurrency must be at least 1");
            }
            settings.check.concurrency = concurrency;
        }
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                bail!("--timeout must be at least 1 second");
            }
            settings.check.timeout_secs = timeout;
        }
        settings.check.exclude_patterns.extend(self.exclude.iter().cloned());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Command::Import { file, output } => {
            run_import(&file, output.as_deref())?;
        }
        Command::Validate {
            file,
            no_check_links,
            no_duplicates,
            output,
            check,
        } => {
            check.apply(&mut settings)?;
            run_validate(&file, &settings, !no_check_links, !no_duplicates, output.as_deref())
                .await?;
        }
        Command::Organize {
            file,
            output,
            remove_broken,
            merge_duplicates,
            format,
            compat,
            max_per_folder,
            no_preserve,
            no_clustering,
            check,
        } => {
            check.apply(&mut settings)?;
            if let Some(max) = max_per_folder {
                if max == 0 {
                    bail!("--max-per-folder must be at least 1");
                }
                settings.organize.max_per_folder = max;
            }
            if no_preserve {
                settings.organize.preserve_existing = false;
            }
            if no_clustering {
                settings.categorize.use_clustering = false;
            }

            let format = format
                .or_else(|| ExportFormat::from_path(&output))
                .unwrap_or_default();
            let export = ExportConfig::builder()
                .format(format)
                .flavor(compat)
                .build()
                .wrap_err("Invalid export options")?;

            let steps = OrganizeSteps {
                remove_broken,
                merge_duplicates,
            };
            run_organize(&file, &output, &settings, steps, &export).await?;
        }
        Command::Stats { file, format } => {
            run_stats(&file, format)?;
        }
        Command::Info => {
            print_info();
        }
    }

    Ok(())
}

/// Install the stderr log subscriber.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "markshelf=info",
        1 => "markshelf=debug",
        _ => "markshelf=trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Settings::load(path)
            .wrap_err_with(|| format!("Failed to load settings from {}", path.display())),
        None => Settings::discover().wrap_err("Failed to load settings"),
    }
}

fn load_tree(path: &Path) -> Result<Folder> {
    markshelf_io::read_tree(path).wrap_err_with(|| format!("Failed to read {}", path.display()))
}

/// Parse a file and print what it contains.
fn run_import(file: &Path, output: Option<&Path>) -> Result<()> {
    eprintln!("Importing {}...", file.display());
    let tree = load_tree(file)?;
    let counts = count_nodes(&tree);

    println!(
        "Imported {} bookmarks in {} folders",
        counts.bookmarks, counts.folders
    );

    if let Some(output) = output {
        markshelf_io::write_tree(output, &tree, &ExportConfig::for_format(ExportFormat::Json))
            .wrap_err_with(|| format!("Failed to write {}", output.display()))?;
        println!("Saved to {}", output.display());
    }

    Ok(())
}

/// Check links and find duplicates.
async fn run_validate(
    file: &Path,
    settings: &Settings,
    check_links: bool,
    find_duplicates: bool,
    output: Option<&Path>,
) -> Result<()> {
    eprintln!("Validating {}...", file.display());
    let tree = load_tree(file)?;

    let broken = if check_links {
        check_tree(&tree, settings).await?
    } else {
        Vec::new()
    };

    let duplicates = if find_duplicates {
        eprintln!("Finding duplicates...");
        DuplicateFinder::with_config(settings.duplicates.clone()).find_duplicates(&tree)
    } else {
        DuplicateGroups::new()
    };

    println!();
    println!("{}", "─".repeat(60));
    println!(" Validation Results");
    println!("{}", "─".repeat(60));

    if check_links {
        println!();
        println!(" {} broken links", broken.len());
        for (i, link) in broken.iter().take(5).enumerate() {
            println!(
                "   {}. {} - {} ({})",
                i + 1,
                link.bookmark.title(),
                link.url(),
                link.status
            );
        }
    }

    if find_duplicates {
        let copies: usize = duplicates.values().map(Vec::len).sum();
        println!();
        println!(
            " {} duplicate groups ({} bookmarks)",
            duplicates.len(),
            copies
        );
        for (i, group) in duplicates.values().take(3).enumerate() {
            let title = group.first().map(|b| b.title()).unwrap_or_default();
            println!("   Group {}: {} copies of {}", i + 1, group.len(), title);
        }
    }
    println!();

    if let Some(output) = output {
        let report = serde_json::json!({
            "brokenLinks": broken,
            "duplicates": duplicates,
        });
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(output, json)
            .wrap_err_with(|| format!("Failed to write {}", output.display()))?;
        println!("Report saved to {}", output.display());
    }

    Ok(())
}

/// Optional cleanup passes before categorizing.
#[derive(Debug, Clone, Copy)]
struct OrganizeSteps {
    remove_broken: bool,
    merge_duplicates: bool,
}

/// Clean up, categorize and write a reorganized tree.
async fn run_organize(
    file: &Path,
    output: &Path,
    settings: &Settings,
    steps: OrganizeSteps,
    export: &ExportConfig,
) -> Result<()> {
    eprintln!("Organizing {}...", file.display());
    let mut tree = load_tree(file)?;

    if steps.remove_broken {
        let broken = check_tree(&tree, settings).await?;
        if !broken.is_empty() {
            tree = remove_broken_links(&tree, &broken);
            println!("Removed {} broken links", broken.len());
        }
    }

    if steps.merge_duplicates {
        eprintln!("Finding duplicates...");
        let groups =
            DuplicateFinder::with_config(settings.duplicates.clone()).find_duplicates(&tree);
        if !groups.is_empty() {
            tree = merge_duplicates(&tree, &groups);
            let merged: usize = groups.values().map(|group| group.len() - 1).sum();
            println!("Merged {merged} duplicate bookmarks");
        }
    }

    eprintln!("Categorizing...");
    let categories = Categorizer::with_config(settings.categorize.clone()).categorize(&tree);

    let organized = Organizer::with_config(settings.organize.clone()).organize(&tree, &categories);

    markshelf_io::write_tree(output, &organized, export)
        .wrap_err_with(|| format!("Failed to write {}", output.display()))?;

    let counts = count_nodes(&organized);
    println!();
    println!(
        "Organized {} bookmarks into {} folders",
        counts.bookmarks, counts.folders
    );
    println!("Created {} categories", categories.len());
    for (name, items) in categories.iter().take(10) {
        println!("   {:<30} {:>6}", name, items.len());
    }
    println!("Saved {} to {}", export.format, output.display());

    Ok(())
}

/// Probe every link, printing progress to stderr. Ctrl-C stops early.
async fn check_tree(tree: &Folder, settings: &Settings) -> Result<Vec<BrokenLink>> {
    let checker =
        LinkChecker::new(settings.check.clone()).wrap_err("Failed to build HTTP client")?;

    let token = checker.cancellation_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!();
            eprintln!("Interrupted, finishing up...");
            token.cancel();
        }
    });
    let reporter = spawn_progress_reporter(checker.subscribe());

    eprintln!("Checking links...");
    let broken = checker.find_broken_links(tree).await;

    reporter.abort();
    interrupt.abort();
    eprintln!();

    Ok(broken)
}

fn spawn_progress_reporter(mut rx: broadcast::Receiver<CheckProgress>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(progress) => {
                    eprint!(
                        "\r Checked {}/{} ({:.0}%), {} broken, {:.1} urls/s",
                        progress.checked,
                        progress.total,
                        progress.fraction() * 100.0,
                        progress.broken,
                        progress.urls_per_second()
                    );
                    if progress.is_complete() {
                        break;
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Print collection statistics.
fn run_stats(file: &Path, format: OutputFormat) -> Result<()> {
    let tree = load_tree(file)?;
    let stats = BookmarkStats::from_tree(&tree);

    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(60));
            println!(" {}", file.display());
            println!("{}", "─".repeat(60));
            println!();
            println!(" Bookmarks:          {}", stats.total_bookmarks);
            println!(" Folders:            {}", stats.counts.folders);
            println!(" Average depth:      {:.2}", stats.average_path_depth);
            if let Some((month, count)) = stats.busiest_month() {
                println!(" Busiest month:      {month} ({count} added)");
            }

            if !stats.top_domains.is_empty() {
                println!();
                println!(" Top domains:");
                for entry in &stats.top_domains {
                    println!("   {:<40} {:>6}", entry.domain, entry.count);
                }
            }

            if !stats.bookmarks_by_month.is_empty() {
                println!();
                println!(" Added per month:");
                let max = stats.bookmarks_by_month.values().copied().max().unwrap_or(1);
                for (month, count) in &stats.bookmarks_by_month {
                    let bar = "█".repeat(count * 30 / max.max(1));
                    println!("   {month}  {count:>6}  {bar}");
                }
            }
            println!();
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}

fn print_info() {
    println!("markshelf {}", env!("CARGO_PKG_VERSION"));
    println!("Validate, deduplicate and reorganize browser bookmarks.");
    println!();
    println!("Features:");
    println!("  - Import Netscape bookmark files from Chrome, Edge, Firefox and Safari");
    println!("  - Check links concurrently and report broken ones");
    println!("  - Find duplicates after normalizing URLs (tracking parameters, www, trailing /)");
    println!("  - Categorize by domain, title, path, folder and TLD rules");
    println!("  - Group leftovers by text similarity");
    println!("  - Split large categories by site, TLD or first letter");
    println!("  - Export to HTML, JSON or CSV");
    println!();
    match Settings::default_path() {
        Some(path) => println!("Settings file: {}", path.display()),
        None => println!("Settings file: none (no config directory)"),
    }
}
