//! Integration tests for cardcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    const CACHE_FILE: &str = "authcache.txt";

    /// Isolated flash directory and config with auditing off
    struct Node {
        temp: TempDir,
    }

    impl Node {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            fs::write(
                temp.path().join("config.toml"),
                "[general]\naudit_log = false\n\n[device]\nmachine_uid = \"laser-01\"\n",
            )
            .unwrap();
            Self { temp }
        }

        fn flash(&self) -> std::path::PathBuf {
            self.temp.path().join("flash")
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("cardcache");
            cmd.env_remove("CARDCACHE_CONFIG")
                .env_remove("CARDCACHE_DIR")
                .arg("--config")
                .arg(self.temp.path().join("config.toml"))
                .arg("--dir")
                .arg(self.flash());
            cmd
        }

        fn cache_bytes(&self) -> Vec<u8> {
            fs::read(self.flash().join(CACHE_FILE)).unwrap()
        }
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("cardcache")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("UID cache"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("cardcache")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("cardcache"));
    }

    #[test]
    fn init_creates_header_only_file() {
        let node = Node::new();
        node.cmd()
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("Created authcache.txt"));

        assert_eq!(node.cache_bytes(), b"AUTH UID\r\n");
    }

    #[test]
    fn add_check_remove_cycle() {
        let node = Node::new();

        node.cmd()
            .args(["add", "12345678"])
            .assert()
            .success()
            .stdout(predicate::str::contains("12345678 added"));

        node.cmd()
            .args(["add", "12345678"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already authorised"));

        node.cmd()
            .args(["check", "12345678"])
            .assert()
            .success()
            .stdout(predicate::str::contains("offset 10"));

        node.cmd()
            .args(["remove", "12345678"])
            .assert()
            .success()
            .stdout(predicate::str::contains("12345678 removed"));

        node.cmd()
            .args(["check", "12345678"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("UID not authorised"));

        assert_eq!(node.cache_bytes(), b"AUTH UID\r\n        \r\n");
    }

    #[test]
    fn invalid_uid_is_rejected_before_writing() {
        let node = Node::new();
        node.cmd()
            .args(["add", "AAAAAAAA", "TOOLONGUID"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid UID"));

        assert!(!node.flash().join(CACHE_FILE).exists());
    }

    #[test]
    fn add_reuses_freed_slot() {
        let node = Node::new();
        node.cmd()
            .args(["add", "11111111", "22222222", "33333333"])
            .assert()
            .success();
        node.cmd().args(["remove", "22222222"]).assert().success();
        node.cmd().args(["add", "44444444"]).assert().success();

        assert_eq!(
            node.cache_bytes(),
            b"AUTH UID\r\n11111111\r\n44444444\r\n33333333\r\n"
        );
    }

    #[test]
    fn remove_scrubs_duplicates() {
        let node = Node::new();
        fs::create_dir_all(node.flash()).unwrap();
        fs::write(
            node.flash().join(CACHE_FILE),
            b"AUTH UID\r\nDUPEDUPE\r\nDUPEDUPE\r\nDUPEDUPE\r\n",
        )
        .unwrap();

        node.cmd()
            .args(["remove", "DUPEDUPE"])
            .assert()
            .success()
            .stdout(predicate::str::contains("3 duplicate entries"));
    }

    #[test]
    fn list_formats() {
        let node = Node::new();
        node.cmd()
            .args(["add", "AAAAAAAA", "BBBBBBBB"])
            .assert()
            .success();

        node.cmd()
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout("AAAAAAAA\nBBBBBBBB\n");

        node.cmd()
            .args(["list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"offset\": 20"));
    }

    #[test]
    fn clear_with_yes() {
        let node = Node::new();
        node.cmd().args(["add", "AAAAAAAA"]).assert().success();

        node.cmd()
            .args(["clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cleared 1 UID(s)"));

        assert_eq!(node.cache_bytes(), b"AUTH UID\r\n");
    }

    #[test]
    fn clear_aborts_without_confirmation() {
        let node = Node::new();
        node.cmd().args(["add", "AAAAAAAA"]).assert().success();

        node.cmd()
            .arg("clear")
            .write_stdin("n\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Aborted."));

        assert_eq!(node.cache_bytes(), b"AUTH UID\r\nAAAAAAAA\r\n");
    }

    #[test]
    fn sync_from_stdin() {
        let node = Node::new();
        node.cmd()
            .args(["add", "AAAAAAAA", "BBBBBBBB"])
            .assert()
            .success();

        node.cmd()
            .args(["sync", "-", "--dry-run"])
            .write_stdin("# laser cutter\nBBBBBBBB\nCCCCCCCC\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Dry run"));

        node.cmd()
            .args(["sync", "-"])
            .write_stdin("# laser cutter\nBBBBBBBB\nCCCCCCCC\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("1 added, 1 removed"));

        assert_eq!(
            node.cache_bytes(),
            b"AUTH UID\r\nCCCCCCCC\r\nBBBBBBBB\r\n"
        );
    }

    #[test]
    fn sync_rejects_bad_list() {
        let node = Node::new();
        node.cmd()
            .args(["sync", "-"])
            .write_stdin("AAAAAAAA\nnope\n")
            .assert()
            .failure()
            .stderr(predicate::str::contains("line 2"));
    }

    #[test]
    fn init_format_wipes_flash() {
        let node = Node::new();
        node.cmd().args(["add", "AAAAAAAA"]).assert().success();
        fs::write(node.flash().join("other.bin"), b"junk").unwrap();

        node.cmd()
            .args(["init", "--format"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Flash formatted"));

        assert!(!node.flash().join("other.bin").exists());
        assert_eq!(node.cache_bytes(), b"AUTH UID\r\n");
    }

    #[test]
    fn status_reports_counts() {
        let node = Node::new();
        node.cmd()
            .args(["add", "AAAAAAAA", "BBBBBBBB"])
            .assert()
            .success();
        node.cmd().args(["remove", "AAAAAAAA"]).assert().success();

        node.cmd()
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("1 authorised UID(s)"))
            .stdout(predicate::str::contains("1 free slot(s)"))
            .stdout(predicate::str::contains("laser-01"));
    }

    #[test]
    fn config_path_and_show() {
        let node = Node::new();
        node.cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));

        node.cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[device]"));
    }

    #[test]
    fn config_set_persists() {
        let node = Node::new();
        node.cmd()
            .args(["config", "set", "device.auth_mode", "latch"])
            .assert()
            .success();

        let saved = fs::read_to_string(node.temp.path().join("config.toml")).unwrap();
        assert!(saved.contains("auth_mode = \"latch\""));
    }
}
