//! Cache command - inspect and manage the module cache

use crate::cache::{CacheEntrySummary, CacheKey, CacheStore};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::{resolve_cache_root, Config, RootOverrides};
use crate::error::RemodResult;
use crate::resolve::parse_remote;
use console::style;
use std::io::{self, Write};

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> RemodResult<()> {
    let root = resolve_cache_root(config, &RootOverrides::from_env());
    let store = CacheStore::new(root);

    match args.action {
        CacheAction::List { format } => list_entries(&store, format).await,
        CacheAction::Info { url } => show_entry_info(&store, &url).await,
        CacheAction::Evict { url } => evict_entry(&store, &url).await,
        CacheAction::Clear { yes } => clear_entries(&store, yes).await,
    }
}

/// List every cached module
async fn list_entries(store: &CacheStore, format: OutputFormat) -> RemodResult<()> {
    let entries = store.list().await?;

    if entries.is_empty() {
        println!("No cached modules found.");
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_entry_table(&entries),
        OutputFormat::Json => print_entry_json(&entries)?,
        OutputFormat::Plain => print_entry_plain(&entries),
    }

    Ok(())
}

fn print_entry_table(entries: &[CacheEntrySummary]) {
    println!("{:<60} {:>10}", "URL", "SIZE");
    println!("{}", "-".repeat(72));

    for entry in entries {
        println!("{:<60} {:>10}", entry.url, format_size(entry.size_bytes));
    }

    println!();
    println!("Total: {} module(s)", entries.len());
}

fn print_entry_json(entries: &[CacheEntrySummary]) -> RemodResult<()> {
    #[derive(serde::Serialize)]
    struct EntryJson {
        url: String,
        path: String,
        size_bytes: u64,
    }

    let json_entries: Vec<EntryJson> = entries
        .iter()
        .map(|e| EntryJson {
            url: e.url.clone(),
            path: e.content_path.display().to_string(),
            size_bytes: e.size_bytes,
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json_entries)?);
    Ok(())
}

fn print_entry_plain(entries: &[CacheEntrySummary]) {
    for entry in entries {
        println!("{}", entry.url);
    }
}

/// Show details for one cached module
async fn show_entry_info(store: &CacheStore, url: &str) -> RemodResult<()> {
    let url = parse_remote(url)?;
    let key = CacheKey::derive(&url);

    let Some((contents, metadata)) = store.read(&key).await? else {
        println!("Not cached: {url}");
        return Ok(());
    };

    println!("URL:  {}", metadata.url);
    println!("Path: {}", store.content_path(&key).display());
    println!("Size: {}", format_size(contents.len() as u64));
    println!();

    if metadata.headers.is_empty() {
        println!("No response headers recorded.");
        return Ok(());
    }

    println!("Response headers:");
    for (name, value) in metadata.headers.iter() {
        println!("  {} {}: {}", style("•").cyan(), name, value);
    }

    Ok(())
}

/// Remove one cached module
async fn evict_entry(store: &CacheStore, url: &str) -> RemodResult<()> {
    let url = parse_remote(url)?;
    let key = CacheKey::derive(&url);

    if store.evict(&key).await? {
        println!("{} evicted {}", style("✓").green(), url);
    } else {
        println!("Not cached: {url}");
    }

    Ok(())
}

/// Remove every cached module
async fn clear_entries(store: &CacheStore, skip_confirm: bool) -> RemodResult<()> {
    let entries = store.list().await?;

    if entries.is_empty() {
        println!("No cached modules to clear.");
        return Ok(());
    }

    println!("This will remove {} cached module(s):", entries.len());
    for entry in &entries {
        println!("  {} {}", style("•").red(), entry.url);
    }
    println!();

    if !skip_confirm {
        print!("Are you sure? [y/N] ");
        let _ = io::stdout().flush();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            println!("Failed to read input, aborting.");
            return Ok(());
        }

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    store.clear().await?;
    println!("{} cleared {} module(s)", style("✓").green(), entries.len());

    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}
