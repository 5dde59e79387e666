//! # Cache Command Implementation
//!
//! This module implements the `cache` subcommand for inspecting and pruning
//! cached override files. The `compose-file` command never deletes entries,
//! so every edit to a project's `docker-compose.yml` leaves the previous
//! override behind.
//!
//! ## Subcommands
//!
//! - **`list`**: Display all cached overrides
//! - **`clean`**: Remove cached overrides (--all, --older-than)

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use mac_dev_shim::cache::{list_entries, remove_entries, CacheEntry};
use mac_dev_shim::defaults;

/// Manage cached override files
#[derive(Args, Debug)]
pub struct CacheArgs {
    /// Directory holding cached override files.
    ///
    /// Defaults to `~/Library/Caches/MacDevShim`.
    /// Can also be set with the `MAC_DEV_SHIM_CACHE` environment variable.
    #[arg(long, value_name = "DIR", env = "MAC_DEV_SHIM_CACHE")]
    pub cache_root: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum CacheSubcommand {
    /// List all cached overrides
    List(ListArgs),
    /// Remove cached overrides
    Clean(CleanArgs),
}

/// Arguments for the cache list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the cache clean command
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Show what would be deleted without actually deleting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Delete all cached overrides
    #[arg(long)]
    pub all: bool,

    /// Delete entries older than the specified duration
    ///
    /// Duration format: number followed by unit (s, m, h, d, w)
    /// Examples: "30d", "7d", "1h", "30m", "2w"
    #[arg(long, value_name = "DURATION")]
    pub older_than: Option<String>,

    /// Skip confirmation prompt and delete immediately
    #[arg(long)]
    pub yes: bool,
}

/// Execute the `cache` command.
pub fn execute(args: CacheArgs) -> Result<()> {
    let cache_root = match args.cache_root {
        Some(root) => root,
        None => {
            let home = dirs::home_dir().context("Could not determine the home directory")?;
            defaults::cache_root(&home)
        }
    };

    match args.command {
        CacheSubcommand::List(list_args) => execute_list(cache_root, list_args),
        CacheSubcommand::Clean(clean_args) => execute_clean(cache_root, clean_args),
    }
}

/// Execute the `cache list` command.
fn execute_list(cache_root: PathBuf, args: ListArgs) -> Result<()> {
    let entries = list_entries(&cache_root)?;

    if args.json {
        return display_json(&entries);
    }

    if entries.is_empty() {
        println!("No cached overrides found in: {}", cache_root.display());
        return Ok(());
    }

    println!("Cached overrides in {}:\n", cache_root.display());
    println!("{:<12} {:>10} {:>10}", "HASH", "SIZE", "AGE");
    println!("{}", "-".repeat(34));
    let now = SystemTime::now();
    for entry in &entries {
        println!(
            "{:<12} {:>10} {:>10}",
            entry.hash,
            format_size(entry.size),
            format_age(entry, now)
        );
    }
    println!("\nTotal: {} cached overrides", entries.len());

    Ok(())
}

/// Execute the `cache clean` command.
fn execute_clean(cache_root: PathBuf, args: CleanArgs) -> Result<()> {
    if !args.all && args.older_than.is_none() {
        anyhow::bail!(
            "At least one filter must be specified for cache clean\n\n\
             hint: Use --all to remove all cached overrides\n\
             hint: Use --older-than <DURATION> to remove old entries (e.g., '30d', '1w')"
        );
    }

    let older_than = match args.older_than.as_deref() {
        Some(duration_str) => Some(parse_duration(duration_str).with_context(|| {
            format!(
                "Invalid duration format: '{}'. Expected format: number followed by unit (s, m, h, d, w)",
                duration_str
            )
        })?),
        None => None,
    };

    let entries = list_entries(&cache_root)?;
    let to_delete = filter_entries_for_cleanup(&entries, args.all, older_than, SystemTime::now());

    if to_delete.is_empty() {
        println!("No cache entries match the specified criteria.");
        return Ok(());
    }

    println!("Cache entries to be deleted:\n");
    for entry in &to_delete {
        println!("  {} ({})", entry.path.display(), format_size(entry.size));
    }
    println!("\nTotal: {} entries", to_delete.len());

    if args.dry_run {
        println!("\nDry run mode - no changes were made.");
        return Ok(());
    }

    if !args.yes {
        print!("\nDo you want to delete these cache entries? (y/N): ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_lowercase();

        if input != "y" && input != "yes" {
            println!("Clean cancelled.");
            return Ok(());
        }
    }

    let (removed, failures) = remove_entries(&to_delete);
    for (path, e) in &failures {
        eprintln!("Failed to delete {}: {}", path.display(), e);
    }
    println!("Deleted {} cache entries.", removed);

    if !failures.is_empty() {
        anyhow::bail!("Failed to delete {} cache entries", failures.len());
    }
    Ok(())
}

/// Select entries matching `--all` or older than `older_than`.
///
/// Entries without a readable modification time count as old.
fn filter_entries_for_cleanup(
    entries: &[CacheEntry],
    all: bool,
    older_than: Option<Duration>,
    now: SystemTime,
) -> Vec<CacheEntry> {
    entries
        .iter()
        .filter(|entry| {
            if all {
                return true;
            }
            match (older_than, entry.last_modified) {
                (Some(threshold), Some(modified)) => now
                    .duration_since(modified)
                    .map(|age| age >= threshold)
                    .unwrap_or(false),
                (Some(_), None) => true,
                (None, _) => false,
            }
        })
        .cloned()
        .collect()
}

/// Parse a duration string into a Duration
///
/// Format: number followed by unit (s, m, h, d, w)
/// Examples: "30d", "7d", "1h", "30m", "2w"
fn parse_duration(duration_str: &str) -> Result<Duration> {
    let duration_str = duration_str.trim().to_lowercase();

    if duration_str.is_empty() {
        return Err(anyhow::anyhow!("Duration string cannot be empty"));
    }

    let split_idx = duration_str
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(duration_str.len());

    if split_idx == 0 {
        return Err(anyhow::anyhow!("Duration must start with a number"));
    }

    let (number_str, unit_str) = duration_str.split_at(split_idx);
    let number: f64 = number_str
        .parse()
        .with_context(|| format!("Invalid number in duration: '{}'", number_str))?;

    let seconds = match unit_str {
        "s" | "sec" | "second" | "seconds" => number,
        "m" | "min" | "minute" | "minutes" => number * 60.0,
        "h" | "hr" | "hour" | "hours" => number * 3600.0,
        "d" | "day" | "days" => number * 86400.0,
        "w" | "week" | "weeks" => number * 604800.0,
        _ => {
            return Err(anyhow::anyhow!(
                "Invalid duration unit: '{}'. Valid units: s, m, h, d, w",
                unit_str
            ));
        }
    };

    Ok(Duration::from_secs(seconds as u64))
}

/// Print entries as a JSON array
fn display_json(entries: &[CacheEntry]) -> Result<()> {
    let json_entries: Vec<serde_json::Value> = entries
        .iter()
        .map(|e| {
            let modified = e
                .last_modified
                .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
                .map(|d| d.as_secs());
            serde_json::json!({
                "hash": e.hash,
                "path": e.path.display().to_string(),
                "size": e.size,
                "last_modified": modified,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json_entries)?);
    Ok(())
}

fn format_age(entry: &CacheEntry, now: SystemTime) -> String {
    let Some(age) = entry
        .last_modified
        .and_then(|modified| now.duration_since(modified).ok())
    else {
        return "-".to_string();
    };

    let secs = age.as_secs();
    match secs {
        0..=59 => format!("{}s", secs),
        60..=3599 => format!("{}m", secs / 60),
        3600..=86399 => format!("{}h", secs / 3600),
        _ => format!("{}d", secs / 86400),
    }
}

/// Format size in human-readable format
fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}
