//! Fetch command - download modules through the cache

use crate::cache::CacheStore;
use crate::cli::args::FetchArgs;
use crate::config::{resolve_cache_root, Config, RootOverrides};
use crate::error::{RemodError, RemodResult};
use crate::fetch::RemoteFetcher;
use crate::loader::RemoteLoader;
use crate::resolve::parse_remote;
use console::style;
use futures_util::future::try_join_all;
use url::Url;

/// Execute the fetch command
pub async fn execute(args: FetchArgs, config: &Config) -> RemodResult<()> {
    if args.output.is_some() && args.urls.len() > 1 {
        return Err(RemodError::User(
            "--output only supports a single URL".to_string(),
        ));
    }

    let urls = args
        .urls
        .iter()
        .map(|u| parse_remote(u))
        .collect::<RemodResult<Vec<Url>>>()?;

    let mut freshness = config.freshness.clone();
    if args.accept_stale {
        freshness.accept_stale = true;
    }
    if args.max_fresh.is_some() {
        freshness.max_fresh_secs = args.max_fresh;
    }

    let root = resolve_cache_root(config, &RootOverrides::from_env());
    let loader = RemoteLoader::new(CacheStore::new(root), RemoteFetcher::new(&config.fetch))
        .with_reload(args.reload)
        .with_freshness(freshness);

    let modules = try_join_all(urls.iter().map(|url| loader.load(url))).await?;

    if let Some(output) = &args.output {
        tokio::fs::write(output, &modules[0])
            .await
            .map_err(|e| RemodError::io(format!("writing {}", output.display()), e))?;
        println!("{} {} -> {}", style("✓").green(), urls[0], output.display());
        return Ok(());
    }

    // A single module goes to stdout verbatim so the output can be
    // piped; several are only reported as cached.
    if let [contents] = modules.as_slice() {
        print!("{contents}");
        return Ok(());
    }

    for url in &urls {
        println!("{} {}", style("✓").green(), url);
    }

    Ok(())
}
