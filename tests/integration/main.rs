//! Integration tests for cfseeker

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    /// Command isolated from the user's config and environment
    fn cfseeker(config_dir: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("cfseeker");
        cmd.env("CFSEEKER_CONFIG", config_dir.join("config.toml"))
            .env_remove("CFSEEKER_TARGET")
            .env_remove("PORT");
        cmd
    }

    fn write_config(dir: &TempDir, content: &str) {
        std::fs::write(dir.path().join("config.toml"), content).unwrap();
    }

    #[test]
    fn help_displays() {
        let dir = TempDir::new().unwrap();
        cfseeker(dir.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Cloud Foundry"));
    }

    #[test]
    fn version_displays() {
        let dir = TempDir::new().unwrap();
        cfseeker(dir.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("cfseeker"));
    }

    #[test]
    fn find_partial_names_is_input_error() {
        let dir = TempDir::new().unwrap();
        cfseeker(dir.path())
            .args(["find", "-o", "acme"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("no space name specified"))
            .stderr(predicate::str::contains("no app name specified"));
    }

    #[test]
    fn find_guid_with_names_rejected_by_parser() {
        let dir = TempDir::new().unwrap();
        cfseeker(dir.path())
            .args(["find", "-g", "abc", "-o", "acme"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("cannot be used with"));
    }

    #[test]
    fn find_without_config_hints_at_init() {
        let dir = TempDir::new().unwrap();
        cfseeker(dir.path())
            .args(["find", "-g", "abc"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("cf.api_address"))
            .stderr(predicate::str::contains("cfseeker config init"));
    }

    #[test]
    fn convert_without_config_fails() {
        let dir = TempDir::new().unwrap();
        cfseeker(dir.path())
            .args(["convert", "org", "-o", "acme"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("cf.api_address"));
    }

    #[test]
    fn invalidate_requires_target() {
        let dir = TempDir::new().unwrap();
        cfseeker(dir.path())
            .arg("invalidate")
            .assert()
            .failure()
            .stderr(predicate::str::contains("requires --target"));
    }

    #[test]
    fn meta_alias_requires_target() {
        let dir = TempDir::new().unwrap();
        cfseeker(dir.path())
            .arg("meta")
            .assert()
            .failure()
            .stderr(predicate::str::contains("info requires --target"));
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        cfseeker(dir.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_init_then_show() {
        let dir = TempDir::new().unwrap();
        cfseeker(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration initialized"));
        assert!(dir.path().join("config.toml").exists());

        cfseeker(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[bosh]"))
            .stdout(predicate::str::contains("cache_ttl_secs = 900"));
    }

    #[test]
    fn config_init_keeps_existing_without_force() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "[cf]\napi_address = \"https://api.example.com\"\n");

        cfseeker(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stderr(predicate::str::contains("--force"));

        let content = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
        assert!(content.contains("api.example.com"));
    }

    #[test]
    fn config_show_redacts_secrets() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            "[cf]\napi_address = \"https://api.example.com\"\nclient_id = \"seeker\"\nclient_secret = \"hunter2\"\n",
        );

        cfseeker(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("<redacted>"))
            .stdout(predicate::str::contains("hunter2").not());
    }

    #[test]
    fn invalid_config_is_reported() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "http_timeout_secs = \"soon\"\n");

        cfseeker(dir.path())
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn server_cf_mode_requires_port() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            "[cf]\napi_address = \"https://api.example.com\"\nclient_id = \"seeker\"\n",
        );

        cfseeker(dir.path())
            .args(["server", "--cf"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("PORT environment variable"));
    }
}
