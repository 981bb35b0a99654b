//! Integration tests for the spaces CLI
//!
//! These tests require a running S3-compatible server.
//!
//! Run with:
//! ```bash
//! docker run -d --name minio -p 9000:9000 \
//!     -e MINIO_ROOT_USER=accesskey -e MINIO_ROOT_PASSWORD=secretkey \
//!     minio/minio server /data
//!
//! TEST_S3_ENDPOINT=http://localhost:9000 \
//! TEST_S3_ACCESS_KEY=accesskey \
//! TEST_S3_SECRET_KEY=secretkey \
//!     cargo test -p spaces-cli --features integration
//! ```
//!
//! The ACL and CORS tests also need `TEST_S3_FULL_API=1` and a server that
//! implements those APIs (Spaces, Ceph RGW); MinIO does not.

#![cfg(feature = "integration")]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::Duration;

use tempfile::TempDir;

/// Get the path to the spaces binary
fn spaces_binary() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_spaces") {
        return PathBuf::from(path);
    }

    let target = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("target");

    let debug = target.join("debug/spaces");
    if debug.exists() {
        return debug;
    }
    target.join("release/spaces")
}

/// Run the CLI against an isolated config directory
fn run(args: &[&str], config_dir: &Path) -> Output {
    Command::new(spaces_binary())
        .args(args)
        .env("SPACES_CONFIG_DIR", config_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute spaces command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

/// Get S3 test configuration from environment
fn get_test_config() -> Option<(String, String, String)> {
    let endpoint = std::env::var("TEST_S3_ENDPOINT").ok()?;
    let access_key = std::env::var("TEST_S3_ACCESS_KEY").ok()?;
    let secret_key = std::env::var("TEST_S3_SECRET_KEY").ok()?;
    Some((endpoint, access_key, secret_key))
}

/// Generate unique suffix for test resources
fn unique_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{:x}", duration.as_nanos() % 0xFFFF_FFFF)
}

/// Save the `test` alias pointing at the test server
fn set_alias(config_dir: &Path) -> bool {
    let Some((endpoint, access_key, secret_key)) = get_test_config() else {
        return false;
    };
    let output = run(
        &[
            "alias",
            "set",
            "test",
            &access_key,
            &secret_key,
            "--host",
            &endpoint,
            "--bucket-lookup",
            "path",
        ],
        config_dir,
    );
    if !output.status.success() {
        eprintln!("Failed to set alias: {}", stderr(&output));
        return false;
    }
    true
}

/// Wait for the server to answer a space listing
fn wait_for_ready(config_dir: &Path) -> bool {
    for _ in 0..30 {
        if run(&["ls", "test", "--json"], config_dir).status.success() {
            return true;
        }
        std::thread::sleep(Duration::from_secs(1));
    }
    false
}

/// Alias plus a fresh space; `None` when no server is configured
fn setup_space(name: &str) -> Option<(TempDir, String)> {
    let config_dir = tempfile::tempdir().ok()?;
    if !set_alias(config_dir.path()) || !wait_for_ready(config_dir.path()) {
        return None;
    }

    let space = format!("test-{name}-{}", unique_suffix());
    let output = run(&["mb", &format!("test/{space}")], config_dir.path());
    if !output.status.success() {
        eprintln!("Failed to create space: {}", stderr(&output));
        return None;
    }
    Some((config_dir, space))
}

/// Whether the server implements object ACLs and bucket CORS
fn full_api() -> bool {
    std::env::var_os("TEST_S3_FULL_API").is_some()
}

fn cleanup_space(config_dir: &Path, space: &str) {
    let _ = run(&["rb", "--force", &format!("test/{space}")], config_dir);
}

mod alias_operations {
    use super::*;

    #[test]
    fn test_alias_lifecycle() {
        let config_dir = tempfile::tempdir().expect("Failed to create temp dir");

        let output = run(
            &["alias", "set", "myalias", "AKIA", "secret", "--region", "nyc3"],
            config_dir.path(),
        );
        assert!(output.status.success(), "{}", stderr(&output));

        let output = run(&["alias", "list", "--json"], config_dir.path());
        assert!(output.status.success());
        let listed = json(&output);
        assert_eq!(listed["aliases"][0]["name"], "myalias");
        assert_eq!(listed["aliases"][0]["region"], "nyc3");
        assert!(!stdout(&output).contains("secret"));

        // Same name without --force is a conflict
        let output = run(&["alias", "set", "myalias", "AKIA", "other"], config_dir.path());
        assert_eq!(output.status.code(), Some(6));

        let output = run(
            &["alias", "set", "myalias", "AKIA", "other", "--force"],
            config_dir.path(),
        );
        assert!(output.status.success());

        let output = run(&["alias", "remove", "myalias"], config_dir.path());
        assert!(output.status.success());

        let output = run(&["alias", "remove", "myalias"], config_dir.path());
        assert_eq!(output.status.code(), Some(5));
    }

    #[test]
    fn test_unknown_alias_is_not_found() {
        let config_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let output = run(&["ls", "nope/space"], config_dir.path());
        assert_eq!(output.status.code(), Some(5));
    }

    #[test]
    fn test_local_only_copy_is_usage_error() {
        let config_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let output = run(&["cp", "./a.txt", "./b.txt"], config_dir.path());
        assert_eq!(output.status.code(), Some(2));
    }
}

mod space_operations {
    use super::*;

    #[test]
    fn test_create_list_and_destroy_space() {
        let Some((config_dir, space)) = setup_space("life") else {
            eprintln!("Skipping: S3 test config not available");
            return;
        };

        let output = run(&["ls", "test", "--json"], config_dir.path());
        assert!(output.status.success());
        assert!(stdout(&output).contains(&space));

        // Creating it again conflicts
        let output = run(&["mb", &format!("test/{space}")], config_dir.path());
        assert_eq!(output.status.code(), Some(6));

        let output = run(&["mb", "-p", &format!("test/{space}")], config_dir.path());
        assert!(output.status.success());

        let output = run(&["rb", &format!("test/{space}"), "--json"], config_dir.path());
        assert!(output.status.success(), "{}", stderr(&output));

        let output = run(&["ls", &format!("test/{space}")], config_dir.path());
        assert_eq!(output.status.code(), Some(5));
    }

    #[test]
    fn test_rb_refuses_non_empty_space() {
        let Some((config_dir, space)) = setup_space("full") else {
            eprintln!("Skipping: S3 test config not available");
            return;
        };

        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "x").unwrap();
        let output = run(
            &["cp", file.path().to_str().unwrap(), &format!("test/{space}/x.txt")],
            config_dir.path(),
        );
        assert!(output.status.success(), "{}", stderr(&output));

        let output = run(&["rb", &format!("test/{space}")], config_dir.path());
        assert_eq!(output.status.code(), Some(6));

        let output = run(&["rb", "--force", &format!("test/{space}")], config_dir.path());
        assert!(output.status.success(), "{}", stderr(&output));
    }
}

mod file_operations {
    use super::*;

    #[test]
    fn test_upload_stat_cat_download() {
        let Some((config_dir, space)) = setup_space("files") else {
            eprintln!("Skipping: S3 test config not available");
            return;
        };

        let local = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        std::fs::write(local.path(), "hello").unwrap();
        let remote = format!("test/{space}/a.txt");

        let output = run(
            &["cp", local.path().to_str().unwrap(), &remote, "--json"],
            config_dir.path(),
        );
        assert!(output.status.success(), "{}", stderr(&output));
        assert_eq!(json(&output)["files"], 1);

        let output = run(&["stat", &remote, "--json"], config_dir.path());
        assert!(output.status.success(), "{}", stderr(&output));
        let stat = json(&output);
        assert_eq!(stat["key"], "a.txt");
        assert_eq!(stat["content_length"], 5);
        assert_eq!(stat["content_type"], "text/plain");
        assert_eq!(stat["public"], false);

        let output = run(&["cat", &remote], config_dir.path());
        assert!(output.status.success());
        assert_eq!(stdout(&output), "hello");

        let dest = tempfile::tempdir().unwrap();
        let target = dest.path().join("nested/copy.txt");
        let output = run(
            &["cp", &remote, target.to_str().unwrap()],
            config_dir.path(),
        );
        assert!(output.status.success(), "{}", stderr(&output));
        assert_eq!(std::fs::read_to_string(target).unwrap(), "hello");

        let output = run(&["rm", &remote], config_dir.path());
        assert!(output.status.success());

        let output = run(&["cat", &remote], config_dir.path());
        assert_eq!(output.status.code(), Some(5));

        cleanup_space(config_dir.path(), &space);
    }

    #[test]
    fn test_public_toggle() {
        if !full_api() {
            eprintln!("Skipping: TEST_S3_FULL_API not set");
            return;
        }
        let Some((config_dir, space)) = setup_space("acl") else {
            eprintln!("Skipping: S3 test config not available");
            return;
        };

        let local = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(local.path(), "x").unwrap();
        let remote = format!("test/{space}/a.txt");
        let output = run(
            &["cp", local.path().to_str().unwrap(), &remote],
            config_dir.path(),
        );
        assert!(output.status.success(), "{}", stderr(&output));

        let output = run(&["acl", "get", &remote, "--json"], config_dir.path());
        assert_eq!(json(&output)["public"], false);

        let output = run(&["acl", "public", &remote], config_dir.path());
        assert!(output.status.success(), "{}", stderr(&output));
        let output = run(&["acl", "get", &remote, "--json"], config_dir.path());
        assert_eq!(json(&output)["public"], true);

        let output = run(&["acl", "private", &remote], config_dir.path());
        assert!(output.status.success());
        let output = run(&["acl", "get", &remote, "--json"], config_dir.path());
        assert_eq!(json(&output)["public"], false);

        cleanup_space(config_dir.path(), &space);
    }

    #[test]
    fn test_server_side_copy_and_share() {
        let Some((config_dir, space)) = setup_space("share") else {
            eprintln!("Skipping: S3 test config not available");
            return;
        };

        let local = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(local.path(), "body").unwrap();
        let output = run(
            &["cp", local.path().to_str().unwrap(), &format!("test/{space}/a.txt")],
            config_dir.path(),
        );
        assert!(output.status.success(), "{}", stderr(&output));

        let output = run(
            &[
                "cp",
                &format!("test/{space}/a.txt"),
                &format!("test/{space}/copies/"),
            ],
            config_dir.path(),
        );
        assert!(output.status.success(), "{}", stderr(&output));

        let output = run(
            &["cat", &format!("test/{space}/copies/a.txt")],
            config_dir.path(),
        );
        assert_eq!(stdout(&output), "body");

        let output = run(
            &["share", &format!("test/{space}/a.txt"), "--expire", "2h", "--json"],
            config_dir.path(),
        );
        assert!(output.status.success(), "{}", stderr(&output));
        let shared = json(&output);
        assert!(shared["url"].as_str().unwrap().contains("X-Amz-Signature"));
        assert_eq!(shared["expires_in_seconds"], 7200);

        let output = run(
            &["share", &format!("test/{space}/a.txt"), "--expire", "2001-01-01T00:00:00Z"],
            config_dir.path(),
        );
        assert_eq!(output.status.code(), Some(2));

        cleanup_space(config_dir.path(), &space);
    }
}

mod directory_operations {
    use super::*;

    #[test]
    fn test_recursive_upload_list_download_remove() {
        let Some((config_dir, space)) = setup_space("dirs") else {
            eprintln!("Skipping: S3 test config not available");
            return;
        };

        let source = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(source.path().join("css")).unwrap();
        std::fs::write(source.path().join("index.html"), "<html>").unwrap();
        std::fs::write(source.path().join("css/site.css"), "body{}").unwrap();

        let output = run(
            &[
                "cp",
                "-r",
                source.path().to_str().unwrap(),
                &format!("test/{space}/www/"),
                "--json",
            ],
            config_dir.path(),
        );
        assert!(output.status.success(), "{}", stderr(&output));
        assert_eq!(json(&output)["files"], 2);

        let output = run(
            &["ls", &format!("test/{space}/www/"), "--summarize", "--json"],
            config_dir.path(),
        );
        assert!(output.status.success());
        let listing = json(&output);
        assert_eq!(listing["summary"]["total_objects"], 2);
        assert_eq!(listing["items"][0]["key"], "www/css/site.css");

        let dest = tempfile::tempdir().unwrap();
        let output = run(
            &[
                "cp",
                "-r",
                &format!("test/{space}/www/"),
                dest.path().to_str().unwrap(),
            ],
            config_dir.path(),
        );
        assert!(output.status.success(), "{}", stderr(&output));
        assert_eq!(
            std::fs::read_to_string(dest.path().join("css/site.css")).unwrap(),
            "body{}"
        );

        let output = run(
            &["rm", "-r", &format!("test/{space}/www/"), "--json"],
            config_dir.path(),
        );
        assert!(output.status.success());
        assert_eq!(json(&output)["deleted"], 2);

        cleanup_space(config_dir.path(), &space);
    }
}

mod cors_operations {
    use super::*;

    #[test]
    fn test_cors_add_list_remove() {
        if !full_api() {
            eprintln!("Skipping: TEST_S3_FULL_API not set");
            return;
        }
        let Some((config_dir, space)) = setup_space("cors") else {
            eprintln!("Skipping: S3 test config not available");
            return;
        };
        let target = format!("test/{space}");

        let output = run(&["cors", "list", &target, "--json"], config_dir.path());
        assert!(output.status.success(), "{}", stderr(&output));
        assert_eq!(json(&output)["rules"].as_array().map(Vec::len), Some(0));

        let output = run(
            &[
                "cors",
                "add",
                &target,
                "https://a.com",
                "--methods",
                "GET,HEAD",
                "--max-age",
                "600",
            ],
            config_dir.path(),
        );
        assert!(output.status.success(), "{}", stderr(&output));

        let output = run(&["cors", "list", &target, "--json"], config_dir.path());
        let rules = json(&output);
        assert_eq!(rules["rules"][0]["allowed_origins"][0], "https://a.com");
        assert_eq!(rules["rules"][0]["max_age_seconds"], 600);

        let output = run(&["cors", "remove", &target, "https://a.com"], config_dir.path());
        assert!(output.status.success());

        let output = run(&["cors", "list", &target, "--json"], config_dir.path());
        assert_eq!(json(&output)["rules"].as_array().map(Vec::len), Some(0));

        cleanup_space(config_dir.path(), &space);
    }
}
