//! Bundler plugin surface
//!
//! Adapts the remote loader to the resolve/load hook pair bundlers
//! drive plugins with. The plugin claims remote specifiers into its
//! namespace during resolve and answers load calls for that namespace
//! from the cache-first loader; everything else returns `None` so the
//! pipeline can try other plugins.

use crate::error::RemodResult;
use crate::loader::RemoteLoader;
use crate::resolve::{classify, parse_remote, Specifier, NAMESPACE};
use async_trait::async_trait;

/// A module reference as bundler pipelines pass them between hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRef {
    pub path: String,
    pub namespace: Option<String>,
}

impl ModuleRef {
    /// Reference claimed into the remote-import namespace.
    pub fn remote(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            namespace: Some(NAMESPACE.to_string()),
        }
    }

    pub fn in_namespace(&self) -> bool {
        self.namespace.as_deref() == Some(NAMESPACE)
    }
}

/// The resolve/load hook pair a bundler pipeline drives.
#[async_trait]
pub trait LoaderPlugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// Claim a specifier, or `None` to let other plugins handle it.
    fn resolve(
        &self,
        specifier: &str,
        importer: Option<&ModuleRef>,
    ) -> RemodResult<Option<ModuleRef>>;

    /// Produce contents for a claimed module, or `None` when it is
    /// not ours.
    async fn load(&self, module: &ModuleRef) -> RemodResult<Option<String>>;
}

pub struct RemoteImportPlugin {
    loader: RemoteLoader,
}

impl RemoteImportPlugin {
    pub fn new(loader: RemoteLoader) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &RemoteLoader {
        &self.loader
    }
}

#[async_trait]
impl LoaderPlugin for RemoteImportPlugin {
    fn name(&self) -> &'static str {
        NAMESPACE
    }

    fn resolve(
        &self,
        specifier: &str,
        importer: Option<&ModuleRef>,
    ) -> RemodResult<Option<ModuleRef>> {
        // Imports from inside our namespace resolve against the
        // importing module's URL; all others stand on their own.
        let base = importer
            .filter(|module| module.in_namespace())
            .map(|module| parse_remote(&module.path))
            .transpose()?;

        match classify(specifier, base.as_ref())? {
            Specifier::Remote(url) => Ok(Some(ModuleRef::remote(url))),
            Specifier::Local(_) => Ok(None),
        }
    }

    async fn load(&self, module: &ModuleRef) -> RemodResult<Option<String>> {
        if !module.in_namespace() {
            return Ok(None);
        }
        let url = parse_remote(&module.path)?;
        Ok(Some(self.loader.load(&url).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheKey, CacheStore, EntryMetadata, HeaderSet};
    use crate::fetch::{FetchOptions, RemoteFetcher};
    use chrono::Utc;
    use tempfile::TempDir;
    use url::Url;

    fn plugin_with_store(dir: &TempDir) -> RemoteImportPlugin {
        let store = CacheStore::new(dir.path());
        let fetcher = RemoteFetcher::new(&FetchOptions {
            timeout_secs: 2,
            ..Default::default()
        });
        RemoteImportPlugin::new(RemoteLoader::new(store, fetcher))
    }

    async fn seed_fresh(plugin: &RemoteImportPlugin, url: &str, contents: &str) {
        let url = Url::parse(url).unwrap();
        let mut headers = HeaderSet::new();
        headers.insert("cache-control", "max-age=3600");
        headers.insert("date", Utc::now().to_rfc2822());
        let metadata = EntryMetadata {
            headers,
            url: url.to_string(),
        };
        plugin
            .loader()
            .store()
            .write(&CacheKey::derive(&url), contents, &metadata)
            .await
            .unwrap();
    }

    #[test]
    fn claims_remote_specifiers() {
        let dir = TempDir::new().unwrap();
        let plugin = plugin_with_store(&dir);

        let resolved = plugin
            .resolve("https://example.com/mod.ts", None)
            .unwrap()
            .unwrap();

        assert_eq!(resolved, ModuleRef::remote("https://example.com/mod.ts"));
        assert!(resolved.in_namespace());
    }

    #[test]
    fn declines_local_specifiers() {
        let dir = TempDir::new().unwrap();
        let plugin = plugin_with_store(&dir);

        assert!(plugin.resolve("./mod.ts", None).unwrap().is_none());
        assert!(plugin.resolve("lodash", None).unwrap().is_none());
    }

    #[test]
    fn resolves_imports_against_a_namespaced_importer() {
        let dir = TempDir::new().unwrap();
        let plugin = plugin_with_store(&dir);
        let importer = ModuleRef::remote("https://example.com/lib/mod.ts");

        let resolved = plugin
            .resolve("./util.ts", Some(&importer))
            .unwrap()
            .unwrap();

        assert_eq!(resolved.path, "https://example.com/lib/util.ts");
    }

    #[test]
    fn ignores_importers_outside_the_namespace() {
        let dir = TempDir::new().unwrap();
        let plugin = plugin_with_store(&dir);
        let importer = ModuleRef {
            path: "/src/app.ts".to_string(),
            namespace: None,
        };

        assert!(plugin.resolve("./util.ts", Some(&importer)).unwrap().is_none());
    }

    #[tokio::test]
    async fn loads_claimed_modules() {
        let dir = TempDir::new().unwrap();
        let plugin = plugin_with_store(&dir);
        seed_fresh(&plugin, "https://example.com/mod.ts", "export {};").await;

        let contents = plugin
            .load(&ModuleRef::remote("https://example.com/mod.ts"))
            .await
            .unwrap();

        assert_eq!(contents.as_deref(), Some("export {};"));
    }

    #[tokio::test]
    async fn declines_loads_outside_the_namespace() {
        let dir = TempDir::new().unwrap();
        let plugin = plugin_with_store(&dir);
        let module = ModuleRef {
            path: "https://example.com/mod.ts".to_string(),
            namespace: Some("file".to_string()),
        };

        assert!(plugin.load(&module).await.unwrap().is_none());
        assert_eq!(plugin.name(), NAMESPACE);
    }
}
