//! `run` must refuse to start when required configuration is missing,
//! before anything is built, stopped or copied.

mod common;

use common::TestEnv;

#[test]
fn missing_server_path_exits_2_without_side_effects() {
    let env = TestEnv::new();

    let result = env.run(&["run"]);

    assert_eq!(result.exit_code, 2, "{}", result.combined_output());
    assert!(
        result.stderr.contains("Server path is missing"),
        "{}",
        result.stderr
    );
    assert!(!env.project_path("target/arma").exists());
}

#[test]
fn missing_deployment_path_exits_2_without_side_effects() {
    let env = TestEnv::new();

    let result = env.run_with_env(&["run"], &[("MODSHIP_SERVER_PATH", "/srv/arma3")]);

    assert_eq!(result.exit_code, 2, "{}", result.combined_output());
    assert!(
        result
            .stderr
            .contains("Deployment path is missing, please set it using `MODSHIP_DEPLOYMENT_PATH`"),
        "{}",
        result.stderr
    );
    assert!(!env.project_path("target/arma").exists());
}

#[test]
fn deployment_path_from_config_file_is_used() {
    let env = TestEnv::new();
    env.write(
        "modship.toml",
        "[deploy]\nserver_path = \"/srv/arma3\"\nremote_host = \"arma@example\"\n",
    );

    // windows target against a remote host is rejected before anything runs
    let result = env.run_with_env(&["run"], &[("MODSHIP_DEPLOYMENT_PATH", "/srv/deploy")]);

    assert_eq!(result.exit_code, 2, "{}", result.combined_output());
    assert!(
        result.stderr.contains("requires `--target linux`"),
        "{}",
        result.stderr
    );
}

#[test]
fn stale_path_outside_the_server_root_exits_2() {
    let env = TestEnv::new();
    env.write(
        "modship.toml",
        "[deploy]\nserver_path = \"/srv/arma3\"\ndeployment_path = \"/srv/deploy\"\nstale_paths = [\"@esm\", \"/\"]\n",
    );

    let result = env.run(&["run", "--target", "linux"]);

    assert_eq!(result.exit_code, 2, "{}", result.combined_output());
    assert!(
        result.stderr.contains("invalid `deploy.stale_paths` entry '/'"),
        "{}",
        result.stderr
    );
    assert!(!env.project_path("target/arma").exists());
}

#[test]
fn json_mode_reports_the_failed_state() {
    let env = TestEnv::new();

    let result = env.run(&["--json", "run"]);

    assert_eq!(result.exit_code, 2);
    let events: Vec<serde_json::Value> = result
        .stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(events.first().unwrap()["event"], "start");
    assert_eq!(events.last().unwrap()["event"], "complete");
    assert_eq!(events.last().unwrap()["state"], "failed");
}

#[test]
fn invalid_config_file_exits_2() {
    let env = TestEnv::new();
    env.write("modship.toml", "[logs]\nattempts = \"many\"\n");

    let result = env.run(&["build"]);

    assert_eq!(result.exit_code, 2, "{}", result.combined_output());
    assert!(result.stderr.contains("invalid configuration"), "{}", result.stderr);
}

#[test]
fn unknown_config_key_is_a_warning() {
    let env = TestEnv::new();
    env.write(
        "modship.toml",
        "[deploy]\nremote_hots = \"arma@example\"\n",
    );

    let result = env.run(&["run"]);

    assert!(
        result.stderr.contains("Did you mean 'remote_host'?"),
        "{}",
        result.stderr
    );
    assert_eq!(result.exit_code, 2);
}

#[test]
fn explicit_config_must_exist() {
    let env = TestEnv::new();

    let result = env.run(&["--config", "missing.toml", "build"]);

    assert_eq!(result.exit_code, 2, "{}", result.combined_output());
}
