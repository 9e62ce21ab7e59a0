//! Integration tests for Remod

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use tempfile::TempDir;

/// Command wired to a throwaway cache root and config file.
fn remod(cache: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("remod");
    cmd.env("REMOD_DIR", cache.path())
        .env("REMOD_CONFIG", cache.path().join("config.toml"));
    cmd
}

mod cli_tests {
    use super::*;
    use predicates::prelude::*;

    #[test]
    fn help_displays() {
        let cache = TempDir::new().unwrap();
        remod(&cache)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("cached locally"));
    }

    #[test]
    fn version_displays() {
        let cache = TempDir::new().unwrap();
        remod(&cache)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("remod"));
    }

    #[test]
    fn resolve_local_specifier() {
        let cache = TempDir::new().unwrap();
        remod(&cache)
            .args(["resolve", "./mod.ts"])
            .assert()
            .success()
            .stdout(predicate::str::contains("local"));
    }

    #[test]
    fn resolve_remote_specifier() {
        let cache = TempDir::new().unwrap();
        remod(&cache)
            .args(["resolve", "https://example.com/mod.ts"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("remote")
                    .and(predicate::str::contains("deps/https/example.com")),
            );
    }

    #[test]
    fn resolve_against_importer() {
        let cache = TempDir::new().unwrap();
        remod(&cache)
            .args([
                "resolve",
                "./util.ts",
                "--importer",
                "https://example.com/lib/mod.ts",
                "--format",
                "plain",
            ])
            .assert()
            .success()
            .stdout("https://example.com/lib/util.ts\n");
    }

    #[test]
    fn cache_list_empty() {
        let cache = TempDir::new().unwrap();
        remod(&cache)
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached modules found."));
    }

    #[test]
    fn cache_info_uncached() {
        let cache = TempDir::new().unwrap();
        remod(&cache)
            .args(["cache", "info", "https://example.com/mod.ts"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Not cached"));
    }

    #[test]
    fn cache_evict_uncached() {
        let cache = TempDir::new().unwrap();
        remod(&cache)
            .args(["cache", "evict", "https://example.com/mod.ts"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Not cached"));
    }

    #[test]
    fn config_path() {
        let cache = TempDir::new().unwrap();
        remod(&cache)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let cache = TempDir::new().unwrap();
        remod(&cache)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[fetch]"));
    }

    #[test]
    fn config_set_roundtrip() {
        let cache = TempDir::new().unwrap();
        remod(&cache)
            .args(["config", "set", "fetch.timeout_secs", "5"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Set fetch.timeout_secs = 5"));

        remod(&cache)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("timeout_secs = 5"));
    }

    #[test]
    fn config_set_unknown_key() {
        let cache = TempDir::new().unwrap();
        remod(&cache)
            .args(["config", "set", "general.verbose", "true"])
            .assert()
            .success()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn fetch_rejects_local_specifier() {
        let cache = TempDir::new().unwrap();
        remod(&cache)
            .args(["fetch", "./mod.ts"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not a remote specifier"));
    }

    #[test]
    fn fetch_output_single_url_only() {
        let cache = TempDir::new().unwrap();
        remod(&cache)
            .args([
                "fetch",
                "--output",
                "out.ts",
                "https://example.com/a.ts",
                "https://example.com/b.ts",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--output only supports a single URL"));
    }

    #[test]
    fn verbose_flags_accepted() {
        let cache = TempDir::new().unwrap();
        remod(&cache).args(["-vv", "cache", "list"]).assert().success();
    }
}

mod cache_flow {
    use super::*;
    use chrono::Utc;
    use predicates::prelude::*;
    use std::io::{Read as _, Write as _};
    use std::net::TcpListener;

    fn stub_server(responses: Vec<String>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            for response in responses {
                let (mut socket, _) = match listener.accept() {
                    Ok(pair) => pair,
                    Err(_) => return,
                };
                let mut request = [0u8; 4096];
                let _ = socket.read(&mut request);
                let _ = socket.write_all(response.as_bytes());
            }
        });
        format!("http://{addr}")
    }

    fn module_response(body: &str, cache_control: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\n\
             cache-control: {cache_control}\r\n\
             date: {}\r\n\
             content-length: {}\r\n\
             connection: close\r\n\
             \r\n\
             {body}",
            Utc::now().to_rfc2822(),
            body.len()
        )
    }

    #[test]
    fn fetch_downloads_then_serves_from_cache() {
        let cache = TempDir::new().unwrap();
        let base = stub_server(vec![module_response("export const n = 1;\n", "max-age=3600")]);
        let url = format!("{base}/mod.ts");

        remod(&cache)
            .args(["fetch", &url])
            .assert()
            .success()
            .stdout("export const n = 1;\n");

        // The stub only answers once; this hit comes from the cache.
        remod(&cache)
            .args(["fetch", &url])
            .assert()
            .success()
            .stdout("export const n = 1;\n");

        remod(&cache)
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains(&url));

        remod(&cache)
            .args(["cache", "info", &url])
            .assert()
            .success()
            .stdout(predicate::str::contains("max-age=3600"));

        remod(&cache)
            .args(["cache", "evict", &url])
            .assert()
            .success()
            .stdout(predicate::str::contains("evicted"));

        remod(&cache)
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached modules found."));
    }

    #[test]
    fn reload_bypasses_the_cache() {
        let cache = TempDir::new().unwrap();
        let base = stub_server(vec![
            module_response("export const v = 1;\n", "max-age=3600"),
            module_response("export const v = 2;\n", "max-age=3600"),
        ]);
        let url = format!("{base}/mod.ts");

        remod(&cache)
            .args(["fetch", &url])
            .assert()
            .success()
            .stdout("export const v = 1;\n");

        remod(&cache)
            .args(["fetch", &url])
            .assert()
            .success()
            .stdout("export const v = 1;\n");

        remod(&cache)
            .args(["fetch", "--reload", &url])
            .assert()
            .success()
            .stdout("export const v = 2;\n");
    }

    #[test]
    fn stale_entries_are_refetched() {
        let cache = TempDir::new().unwrap();
        let base = stub_server(vec![
            module_response("export const v = 1;\n", "max-age=0"),
            module_response("export const v = 2;\n", "max-age=0"),
        ]);
        let url = format!("{base}/mod.ts");

        remod(&cache)
            .args(["fetch", &url])
            .assert()
            .success()
            .stdout("export const v = 1;\n");

        remod(&cache)
            .args(["fetch", &url])
            .assert()
            .success()
            .stdout("export const v = 2;\n");
    }

    #[test]
    fn clear_empties_the_store() {
        let cache = TempDir::new().unwrap();
        let base = stub_server(vec![module_response("export {};\n", "max-age=3600")]);
        let url = format!("{base}/mod.ts");

        remod(&cache).args(["fetch", &url]).assert().success();

        remod(&cache)
            .args(["cache", "clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cleared 1 module(s)"));

        remod(&cache)
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached modules found."));
    }

    #[test]
    fn fetch_writes_output_file() {
        let cache = TempDir::new().unwrap();
        let base = stub_server(vec![module_response("export {};\n", "max-age=3600")]);
        let url = format!("{base}/mod.ts");
        let out = cache.path().join("out.ts");

        remod(&cache)
            .args(["fetch", "--output"])
            .arg(&out)
            .arg(&url)
            .assert()
            .success()
            .stdout(predicate::str::contains("out.ts"));

        assert_eq!(std::fs::read_to_string(&out).unwrap(), "export {};\n");
    }
}
