//! Integration tests for the `vtnrsc` CLI binary.
//!
//! Every test runs against its own temporary data directory and config
//! file, so state only carries across invocations through the snapshot the
//! test itself wrote.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `vtnrsc` binary isolated inside `home`.
fn vtnrsc_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("vtnrsc");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("VTNRSC_CONFIG", home.join("config.toml"))
        .env("VTNRSC_DATA_DIR", home.join("state"))
        .env("NO_COLOR", "1")
        .env_remove("VTNRSC_OUTPUT")
        .env_remove("VTNRSC_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn create_network(home: &Path, id: &str) {
    vtnrsc_cmd(home)
        .args(["networks", "create", "--id", id, "--name", id, "--tenant", "tenant-a"])
        .assert()
        .success();
}

fn plain_ids(home: &Path, args: &[&str]) -> Vec<String> {
    let output = vtnrsc_cmd(home)
        .args(args)
        .args(["-o", "plain"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|l| !l.is_empty())
        .map(str::to_owned)
        .collect()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = vtnrsc_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    vtnrsc_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("networks")
            .and(predicate::str::contains("subnets"))
            .and(predicate::str::contains("ports"))
            .and(predicate::str::contains("counter")),
    );
}

#[test]
fn test_completions_zsh() {
    let home = TempDir::new().unwrap();
    vtnrsc_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Networks and subnets ────────────────────────────────────────────

#[test]
fn test_subnet_under_existing_network_persists() {
    let home = TempDir::new().unwrap();
    create_network(home.path(), "net-1");

    vtnrsc_cmd(home.path())
        .args([
            "subnets", "create", "--id", "sub-1", "--network", "net-1", "--tenant", "tenant-a",
            "--cidr", "10.0.0.0/24",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Created subnet sub-1"));

    vtnrsc_cmd(home.path())
        .args(["subnets", "get", "sub-1", "-o", "json"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"network_id\": \"net-1\"")
                .and(predicate::str::contains("\"cidr\": \"10.0.0.0/24\"")),
        );
}

#[test]
fn test_subnet_under_missing_network_is_rejected() {
    let home = TempDir::new().unwrap();

    let output = vtnrsc_cmd(home.path())
        .args([
            "subnets", "create", "--id", "sub-2", "--network", "net-404", "--tenant", "tenant-a",
            "--cidr", "10.0.0.0/24",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(6));
    assert!(combined_output(&output).contains("does not exist"));

    vtnrsc_cmd(home.path())
        .args(["subnets", "get", "sub-2"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_batch_from_file_keeps_records_before_the_failure() {
    let home = TempDir::new().unwrap();
    create_network(home.path(), "net-1");

    let batch = home.path().join("batch.json");
    let subnet = |id: &str, network: &str| {
        format!(
            r#"{{"id":"{id}","name":"","network_id":"{network}","tenant_id":"tenant-a",
               "ip_version":"INET","cidr":"10.0.0.0/24","gateway_ip":null,
               "dhcp_enabled":true,"shared":false}}"#
        )
    };
    std::fs::write(
        &batch,
        format!(
            "[{},{},{}]",
            subnet("sub-a", "net-1"),
            subnet("sub-b", "net-404"),
            subnet("sub-c", "net-1")
        ),
    )
    .unwrap();

    vtnrsc_cmd(home.path())
        .args(["subnets", "create", "--from-file"])
        .arg(&batch)
        .assert()
        .code(6)
        .stderr(predicate::str::contains("1 earlier record(s)"));

    assert_eq!(plain_ids(home.path(), &["subnets", "list"]), ["sub-a"]);
}

#[test]
fn test_update_of_unknown_id_inserts() {
    let home = TempDir::new().unwrap();
    vtnrsc_cmd(home.path())
        .args([
            "networks", "update", "--id", "net-9", "--name", "late", "--tenant", "tenant-a",
            "--state", "DOWN",
        ])
        .assert()
        .success();

    vtnrsc_cmd(home.path())
        .args(["networks", "get", "net-9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DOWN"));
}

#[test]
fn test_state_must_match_exact_name() {
    let home = TempDir::new().unwrap();
    vtnrsc_cmd(home.path())
        .args([
            "networks", "create", "--name", "blue", "--tenant", "tenant-a", "--state", "active",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("ACTIVE, BUILD, DOWN, ERROR"));
}

#[test]
fn test_remove_is_idempotent_and_does_not_cascade() {
    let home = TempDir::new().unwrap();
    create_network(home.path(), "net-1");
    vtnrsc_cmd(home.path())
        .args([
            "subnets", "create", "--id", "sub-1", "--network", "net-1", "--tenant", "tenant-a",
            "--cidr", "10.0.0.0/24",
        ])
        .assert()
        .success();

    for _ in 0..2 {
        vtnrsc_cmd(home.path())
            .args(["networks", "remove", "net-1"])
            .assert()
            .success();
    }

    assert!(plain_ids(home.path(), &["networks", "list"]).is_empty());
    assert_eq!(plain_ids(home.path(), &["subnets", "list"]), ["sub-1"]);
}

#[test]
fn test_ephemeral_run_keeps_nothing() {
    let home = TempDir::new().unwrap();
    vtnrsc_cmd(home.path())
        .args([
            "--ephemeral", "networks", "create", "--id", "net-1", "--name", "blue", "--tenant",
            "tenant-a",
        ])
        .assert()
        .success();

    vtnrsc_cmd(home.path())
        .args(["networks", "get", "net-1"])
        .assert()
        .code(4);
}

// ── Ports ───────────────────────────────────────────────────────────

#[test]
fn test_ports_filter_by_network_tenant_and_device() {
    let home = TempDir::new().unwrap();
    create_network(home.path(), "net-1");
    create_network(home.path(), "net-2");

    for (id, network, tenant, device) in [
        ("p1", "net-1", "tenant-a", "vm-1"),
        ("p2", "net-1", "tenant-a", "vm-2"),
        ("p3", "net-2", "tenant-b", "vm-1"),
    ] {
        vtnrsc_cmd(home.path())
            .args([
                "ports", "create", "--id", id, "--network", network, "--tenant", tenant,
                "--device", device, "--mac", "fa:16:3e:00:00:01",
            ])
            .assert()
            .success();
    }

    assert_eq!(
        plain_ids(home.path(), &["ports", "list", "--network", "net-1"]),
        ["p1", "p2"]
    );
    assert_eq!(
        plain_ids(home.path(), &["ports", "list", "--tenant", "tenant-b"]),
        ["p3"]
    );
    assert_eq!(
        plain_ids(home.path(), &["ports", "list", "--device", "vm-1"]),
        ["p1", "p3"]
    );
    assert!(plain_ids(home.path(), &["ports", "list", "--network", "net-404"]).is_empty());
}

#[test]
fn test_port_on_missing_network_is_rejected() {
    let home = TempDir::new().unwrap();
    vtnrsc_cmd(home.path())
        .args([
            "ports", "create", "--id", "p1", "--network", "net-404", "--tenant", "tenant-a",
            "--device", "vm-1", "--mac", "fa:16:3e:00:00:01",
        ])
        .assert()
        .code(6);
}

// ── Counter ─────────────────────────────────────────────────────────

#[test]
fn test_counter_increments_across_runs() {
    let home = TempDir::new().unwrap();
    vtnrsc_cmd(home.path())
        .args(["counter", "increment", "c1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("c1 was incremented to 1"));
    vtnrsc_cmd(home.path())
        .args(["counter", "increment", "c1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("c1 was incremented to 2"));
}

#[test]
fn test_in_memory_counter_is_not_persisted() {
    let home = TempDir::new().unwrap();
    for _ in 0..2 {
        vtnrsc_cmd(home.path())
            .args(["counter", "increment", "c1", "-i"])
            .assert()
            .success()
            .stdout(predicate::str::contains("c1 was incremented to 1"));
    }
    vtnrsc_cmd(home.path())
        .args(["counter", "get", "c1", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::diff("0\n"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_init_set_show() {
    let home = TempDir::new().unwrap();
    vtnrsc_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    vtnrsc_cmd(home.path())
        .args(["config", "init"])
        .assert()
        .success();
    vtnrsc_cmd(home.path())
        .args(["config", "init"])
        .assert()
        .code(6);

    vtnrsc_cmd(home.path())
        .args(["config", "set", "defaults.output", "plain"])
        .assert()
        .success();
    vtnrsc_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("output = \"plain\""));

    // The configured default output now applies to inventory commands.
    create_network(home.path(), "net-1");
    vtnrsc_cmd(home.path())
        .args(["networks", "list"])
        .assert()
        .success()
        .stdout(predicate::str::diff("net-1\n"));
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let home = TempDir::new().unwrap();
    vtnrsc_cmd(home.path())
        .args(["config", "set", "profiles.home", "x"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown config key"));
}
