//! Resolve command - explain how an import specifier resolves

use crate::cache::{CacheKey, CacheStore};
use crate::cli::args::{OutputFormat, ResolveArgs};
use crate::config::{resolve_cache_root, Config, RootOverrides};
use crate::error::RemodResult;
use crate::resolve::{classify, parse_remote, Specifier, NAMESPACE};
use url::Url;

/// Execute the resolve command
pub async fn execute(args: ResolveArgs, config: &Config) -> RemodResult<()> {
    let importer = args.importer.as_deref().map(parse_remote).transpose()?;

    match classify(&args.specifier, importer.as_ref())? {
        Specifier::Remote(url) => print_remote(&args, config, &url).await,
        Specifier::Local(specifier) => print_local(&args, &specifier),
    }
}

async fn print_remote(args: &ResolveArgs, config: &Config, url: &Url) -> RemodResult<()> {
    let root = resolve_cache_root(config, &RootOverrides::from_env());
    let store = CacheStore::new(root);
    let key = CacheKey::derive(url);
    let cache_path = store.content_path(&key);
    let cached = store.read(&key).await?.is_some();

    match args.format {
        OutputFormat::Table => {
            println!("Kind:       remote");
            println!("URL:        {url}");
            println!("Namespace:  {NAMESPACE}");
            println!("Cache path: {}", cache_path.display());
            println!("Cached:     {}", if cached { "yes" } else { "no" });
        }
        OutputFormat::Json => {
            #[derive(serde::Serialize)]
            struct RemoteJson<'a> {
                kind: &'a str,
                url: String,
                namespace: &'a str,
                cache_path: String,
                cached: bool,
            }

            println!(
                "{}",
                serde_json::to_string_pretty(&RemoteJson {
                    kind: "remote",
                    url: url.to_string(),
                    namespace: NAMESPACE,
                    cache_path: cache_path.display().to_string(),
                    cached,
                })?
            );
        }
        OutputFormat::Plain => println!("{url}"),
    }

    Ok(())
}

fn print_local(args: &ResolveArgs, specifier: &str) -> RemodResult<()> {
    match args.format {
        OutputFormat::Table => {
            println!("Kind:      local");
            println!("Specifier: {specifier}");
        }
        OutputFormat::Json => {
            #[derive(serde::Serialize)]
            struct LocalJson<'a> {
                kind: &'a str,
                specifier: &'a str,
            }

            println!(
                "{}",
                serde_json::to_string_pretty(&LocalJson {
                    kind: "local",
                    specifier,
                })?
            );
        }
        OutputFormat::Plain => println!("{specifier}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_specifiers_resolve_without_a_store() {
        let args = ResolveArgs {
            specifier: "lodash".to_string(),
            importer: None,
            format: OutputFormat::Plain,
        };
        assert!(execute(args, &Config::default()).await.is_ok());
    }

    #[tokio::test]
    async fn rejects_a_local_importer() {
        let args = ResolveArgs {
            specifier: "./util.ts".to_string(),
            importer: Some("./mod.ts".to_string()),
            format: OutputFormat::Table,
        };
        assert!(execute(args, &Config::default()).await.is_err());
    }
}
