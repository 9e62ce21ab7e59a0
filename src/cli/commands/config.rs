//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{RemodError, RemodResult};
use console::style;
use std::path::PathBuf;

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> RemodResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config),
        Some(ConfigAction::Path) => show_path(manager),
        Some(ConfigAction::Set { key, value }) => set_value(manager, config, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) {
    let toml =
        toml::to_string_pretty(config).unwrap_or_else(|_| "Error serializing config".to_string());
    println!("{}", toml);
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

async fn set_value(
    manager: &ConfigManager,
    config: &Config,
    key: &str,
    value: &str,
) -> RemodResult<()> {
    let mut config = config.clone();

    // Parse dot-separated key path
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["cache", "dir"] => config.cache.dir = Some(PathBuf::from(value)),

        ["fetch", "timeout_secs"] => config.fetch.timeout_secs = parse_u64(value)?,
        ["fetch", "max_redirects"] => config.fetch.max_redirects = parse_u32(value)?,
        ["fetch", "max_size_mb"] => config.fetch.max_size_mb = parse_u64(value)?,
        ["fetch", "user_agent"] => config.fetch.user_agent = value.to_string(),

        ["freshness", "accept_stale"] => config.freshness.accept_stale = parse_bool(value)?,
        ["freshness", "max_fresh_secs"] => {
            config.freshness.max_fresh_secs = if value.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(parse_u64(value)?)
            };
        }

        _ => {
            eprintln!("{} Unknown config key: {}", style("✗").red(), key);
            eprintln!("Valid keys:");
            print_valid_keys();
            return Ok(());
        }
    }

    manager.save(&config).await?;
    println!("{} Set {} = {}", style("✓").green(), key, value);

    Ok(())
}

fn parse_bool(value: &str) -> RemodResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(RemodError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_u32(value: &str) -> RemodResult<u32> {
    value
        .parse()
        .map_err(|_| RemodError::User(format!("Invalid number: {}", value)))
}

fn parse_u64(value: &str) -> RemodResult<u64> {
    value
        .parse()
        .map_err(|_| RemodError::User(format!("Invalid number: {}", value)))
}

fn print_valid_keys() {
    let keys = [
        "cache.dir",
        "fetch.timeout_secs",
        "fetch.max_redirects",
        "fetch.max_size_mb",
        "fetch.user_agent",
        "freshness.accept_stale",
        "freshness.max_fresh_secs",
    ];

    for key in keys {
        eprintln!("  {}", key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert!(parse_bool("true").unwrap());
        assert!(parse_bool("YES").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn parse_numbers_reject_garbage() {
        assert_eq!(parse_u32("12").unwrap(), 12);
        assert_eq!(parse_u64("50").unwrap(), 50);
        assert!(parse_u32("twelve").is_err());
        assert!(parse_u64("-1").is_err());
    }
}
