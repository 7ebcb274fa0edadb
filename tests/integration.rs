use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn pradar_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("pradar");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).unwrap();

    // Reference patch plus one patch far outside any reasonable window, so
    // prediction succeeds without an embedding provider (the empty candidate
    // set short-circuits before embedding).
    fs::write(
        data_dir.join("patches.json"),
        r#"[
            {"patch_id": "500000", "title": "Fix nova scheduler race",
             "description": "Avoid double-booking hosts.",
             "created_time": "2023-03-01 12:00:00",
             "files": ["nova/scheduler/manager.py"]},
            {"patch_id": "500777", "title": "Unrelated change months later",
             "description": "Different subsystem.",
             "created_time": "2024-01-15 09:00:00",
             "files": ["cinder/volume/driver.py"]},
            {"patch_id": "", "title": "Dropped: no id",
             "created_time": "2023-03-02 12:00:00"}
        ]"#,
    )
    .unwrap();

    fs::write(
        data_dir.join("model.json"),
        r#"{
            "feature_names": ["jaccard", "nb_shared", "delta_files",
                              "LCP_mean", "LCP_max", "LCSuff_mean", "LCSuff_max",
                              "sim_cosine", "delta_time_hours", "len_A", "len_B"],
            "coefficients": [0.8, 0.1, 0.0, 0.5, 0.3, 0.5, 0.3, 2.0, -0.01, 0.0, 0.0],
            "intercept": -1.5
        }"#,
    )
    .unwrap();

    let config_content = format!(
        r#"[server]
bind = "127.0.0.1:7311"

[embedding]
provider = "disabled"

[retrieval]
window_days = 14
top_k = 5

[[projects]]
key = "openstack"
dataset = "{root}/data/patches.json"
model = "{root}/data/model.json"
"#,
        root = root.display()
    );

    let config_path = config_dir.join("radar.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_pradar(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = pradar_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run pradar binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_projects_lists_loaded_corpus() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_pradar(&config_path, &["projects"]);
    assert!(success, "projects failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("openstack"));
    // 2 admitted records, 1 dropped for the missing id.
    assert!(stdout.contains("2 patches (1 dropped)"));
    assert!(stdout.contains("11-feature model"));
}

#[test]
fn test_predict_empty_window_is_success() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) =
        run_pradar(&config_path, &["predict", "openstack", "500000"]);
    assert!(success, "predict failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("No candidates in window."));
}

#[test]
fn test_predict_empty_window_json() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) =
        run_pradar(&config_path, &["predict", "openstack", "500000", "--json"]);
    assert!(success);
    assert_eq!(stdout.trim(), "[]");
}

#[test]
fn test_predict_project_key_is_case_insensitive() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success) = run_pradar(&config_path, &["predict", "OpenStack", "500000"]);
    assert!(success);
}

#[test]
fn test_predict_unknown_project_rejected() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_pradar(&config_path, &["predict", "nosuch", "500000"]);
    assert!(!success, "expected failure: stdout={}", stdout);
    assert!(stderr.contains("not loaded"), "stderr={}", stderr);
}

#[test]
fn test_predict_unknown_patch_not_found() {
    let (_tmp, config_path) = setup_test_env();

    // No review_url configured, so there is no remote fallback.
    let (stdout, stderr, success) = run_pradar(&config_path, &["predict", "openstack", "999999"]);
    assert!(!success, "expected failure: stdout={}", stdout);
    assert!(stderr.contains("not found"), "stderr={}", stderr);
}

#[test]
fn test_predict_rejects_negative_window() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_pradar(
        &config_path,
        &["predict", "openstack", "500000", "--time-window=-1"],
    );
    assert!(!success);
    assert!(stderr.contains(">= 0"), "stderr={}", stderr);
}

#[test]
fn test_missing_dataset_skips_project() {
    let (tmp, config_path) = setup_test_env();
    let root = tmp.path();

    let config_content = format!(
        r#"[[projects]]
key = "ghost"
dataset = "{root}/data/does-not-exist.json"
model = "{root}/data/model.json"
"#,
        root = root.display()
    );
    let ghost_config = root.join("config").join("ghost.toml");
    fs::write(&ghost_config, config_content).unwrap();

    let (stdout, _, success) = run_pradar(&ghost_config, &["projects"]);
    assert!(success);
    assert!(stdout.contains("No projects loaded."));
}

#[test]
fn test_invalid_embedding_provider_rejected() {
    let (tmp, _) = setup_test_env();
    let root = tmp.path();

    let bad_config = root.join("config").join("bad.toml");
    fs::write(&bad_config, "[embedding]\nprovider = \"magic\"\n").unwrap();

    let (_, stderr, success) = run_pradar(&bad_config, &["projects"]);
    assert!(!success);
    assert!(stderr.contains("Unknown embedding provider"), "stderr={}", stderr);
}
