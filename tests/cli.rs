use assert_cmd::Command;
use predicates::prelude::*;

struct Env {
    _home: tempfile::TempDir,
    config_dir: std::path::PathBuf,
    data_dir: std::path::PathBuf,
}

fn setup() -> Env {
    let home = tempfile::tempdir().unwrap();
    let config_dir = home.path().join("config");
    let data_dir = home.path().join("data");
    let env = Env {
        config_dir,
        data_dir,
        _home: home,
    };
    minty(&env)
        .args(["init", "--data-dir", env.data_dir.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));
    env
}

fn minty(env: &Env) -> Command {
    let mut cmd = Command::cargo_bin("minty").unwrap();
    cmd.env("MINTY_CONFIG_DIR", &env.config_dir);
    cmd
}

#[test]
fn test_init_creates_table_files() {
    let env = setup();
    for table in ["accounts", "transactions", "migrations", "user_preferences"] {
        assert!(
            env.data_dir.join(format!("{table}.csv")).exists(),
            "missing {table}.csv"
        );
    }
}

#[test]
fn test_account_lifecycle() {
    let env = setup();
    minty(&env)
        .args(["accounts", "add", "Checking", "--type", "checking"])
        .assert()
        .success();
    minty(&env)
        .args(["accounts", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Checking"));
    minty(&env)
        .args(["accounts", "rename", "Checking", "Joint Checking"])
        .assert()
        .success();
    minty(&env)
        .args(["accounts", "delete", "Joint Checking"])
        .assert()
        .success();
}

#[test]
fn test_delete_account_with_transactions_rejected() {
    let env = setup();
    minty(&env)
        .args(["accounts", "add", "Checking"])
        .assert()
        .success();
    minty(&env)
        .args([
            "tx", "add", "Groceries", "--account", "Checking", "--date", "2026-01-15",
            "--amount", "-42.50",
        ])
        .assert()
        .success();
    minty(&env)
        .args(["accounts", "delete", "Checking"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("used in 1 transactions"));
    // still listed
    minty(&env)
        .args(["accounts", "list"])
        .assert()
        .stdout(predicate::str::contains("Checking"));
}

#[test]
fn test_reconcile_roundtrip() {
    let env = setup();
    minty(&env)
        .args(["accounts", "add", "Checking"])
        .assert()
        .success();
    minty(&env)
        .args([
            "tx", "add", "Rent", "--account", "Checking", "--date", "2026-02-01",
            "--amount", "-1200",
        ])
        .assert()
        .success();

    let out = minty(&env).args(["tx", "list"]).output().unwrap();
    let stdout = String::from_utf8_lossy(&out.stdout).to_string();
    let id = stdout
        .lines()
        .find(|l| l.contains("Rent"))
        .and_then(|l| l.split('|').nth(1))
        .map(|s| s.trim().to_string())
        .expect("transaction id in listing");

    minty(&env)
        .args(["tx", "reconcile", id.as_str(), "STMT-2026-02"])
        .assert()
        .success();
    minty(&env)
        .args(["tx", "list"])
        .assert()
        .stdout(predicate::str::contains("STMT-2026-02"));
    minty(&env)
        .args(["tx", "unreconcile", id.as_str()])
        .assert()
        .success();
    minty(&env)
        .args(["tx", "list"])
        .assert()
        .stdout(predicate::str::contains("STMT-2026-02").not());
}

#[test]
fn test_migration_run_rollback_cycle() {
    let env = setup();
    minty(&env)
        .args(["migrate", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("add_chf_currency"));
    let out = minty(&env)
        .args(["migrate", "run", "add_chf_currency"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout).to_string();
    let suffix = stdout
        .lines()
        .find(|l| l.starts_with("Backup suffix:"))
        .and_then(|l| l.split_whitespace().nth(2))
        .expect("backup suffix in output")
        .to_string();

    minty(&env)
        .args(["currencies", "list"])
        .assert()
        .stdout(predicate::str::contains("CHF"));

    // second run is a no-op
    minty(&env)
        .args(["migrate", "run", "add_chf_currency"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already applied"));

    minty(&env)
        .args(["migrate", "rollback", "add_chf_currency", suffix.as_str()])
        .assert()
        .success();
    minty(&env)
        .args(["currencies", "list"])
        .assert()
        .stdout(predicate::str::contains("CHF").not());
}

#[test]
fn test_rollback_with_bad_suffix_fails() {
    let env = setup();
    minty(&env)
        .args(["migrate", "run", "add_chf_currency"])
        .assert()
        .success();
    minty(&env)
        .args(["migrate", "rollback", "add_chf_currency", "19990101000000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing"));
}

#[test]
fn test_backup_create_and_verify() {
    let env = setup();
    minty(&env)
        .args(["accounts", "add", "Checking"])
        .assert()
        .success();
    minty(&env)
        .args(["backup", "create"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup saved to"));

    let backups_dir = env.data_dir.join("backups");
    let bundle = std::fs::read_dir(&backups_dir)
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();
    assert!(bundle.join("manifest.json").exists());
    minty(&env)
        .args(["backup", "verify", bundle.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("all checksums match"));
}

#[test]
fn test_settings_set_and_show() {
    let env = setup();
    minty(&env)
        .args(["settings", "set", "currency", "eur"])
        .assert()
        .success();
    minty(&env)
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EUR"));
    minty(&env)
        .args(["settings", "set", "bogus", "x"])
        .assert()
        .failure();
}

#[test]
fn test_tx_add_with_unknown_subcategory_leaves_no_row() {
    let env = setup();
    minty(&env)
        .args(["accounts", "add", "Checking"])
        .assert()
        .success();
    minty(&env)
        .args([
            "tx", "add", "Groceries", "--account", "Checking", "--date", "2026-03-01",
            "--amount", "-10", "--subcategory", "Nonexistent",
        ])
        .assert()
        .failure();
    // the rejected transaction must not have been written
    minty(&env)
        .args(["tx", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Transactions (0)"));
}

#[test]
fn test_failed_command_is_logged() {
    let env = setup();
    minty(&env)
        .args(["accounts", "delete", "Nonexistent"])
        .assert()
        .failure();
    minty(&env)
        .args(["log", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("command failed"));
}

#[test]
fn test_reset_mismatched_code_deletes_nothing() {
    let env = setup();
    minty(&env)
        .args(["accounts", "add", "Checking"])
        .assert()
        .success();
    minty(&env)
        .arg("reset")
        .write_stdin("WRONGCODE\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("did not match"));
    minty(&env)
        .args(["accounts", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Checking"));
}

#[test]
fn test_reset_confirm_flag_wipes_after_issued_code() {
    let env = setup();
    minty(&env)
        .args(["accounts", "add", "Checking"])
        .assert()
        .success();

    // first invocation issues a code; pressing enter aborts without deleting
    let out = minty(&env).arg("reset").write_stdin("\n").output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout).to_string();
    let code = stdout
        .lines()
        .find_map(|line| line.split("--confirm ").nth(1))
        .map(str::trim)
        .expect("reset output should carry an issued code")
        .to_string();
    minty(&env)
        .args(["accounts", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Checking"));

    minty(&env)
        .args(["reset", "--confirm", code.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("All data deleted"));
    minty(&env)
        .args(["accounts", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Checking").not());
}

#[test]
fn test_reset_confirm_flag_without_issued_code_rejected() {
    let env = setup();
    minty(&env)
        .args(["reset", "--confirm", "ABC234"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("did not match"));
}
