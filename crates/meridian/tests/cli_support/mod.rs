#![allow(dead_code)]

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub fn meridian_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_meridian"))
}

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Temp `MERIDIAN_HOME` plus the environment every CLI test runs with.
pub struct CliEnv {
    pub home: TempDir,
    home_str: String,
}

impl CliEnv {
    pub fn new() -> Self {
        let home = TempDir::new().expect("create temp home");
        let home_str = home.path().to_string_lossy().to_string();
        Self { home, home_str }
    }

    pub fn envs(&self) -> [(&str, &str); 2] {
        [("MERIDIAN_HOME", self.home_str.as_str()), ("RUST_LOG", "error")]
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.home.path().join(name)
    }
}

pub fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

pub fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

pub fn run_cli(args: &[String], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(meridian_bin());
    cmd.args(args);
    for (key, value) in envs {
        cmd.env(key, value);
    }
    cmd.output().expect("failed to execute meridian CLI")
}

pub fn assert_cli_success(output: &Output, args: &[String]) {
    assert!(
        output.status.success(),
        "command failed: {}\nstdout:\n{}\nstderr:\n{}",
        args.join(" "),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

pub fn parse_json_output(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json_start = stdout
        .find(|c| c == '{' || c == '[')
        .unwrap_or_else(|| {
            panic!(
                "no JSON payload found in output\nstdout:\n{}\nstderr:\n{}",
                stdout,
                String::from_utf8_lossy(&output.stderr)
            )
        });
    let json_text = &stdout[json_start..];
    let mut deserializer = serde_json::Deserializer::from_str(json_text);
    serde_json::Value::deserialize(&mut deserializer).unwrap_or_else(|err| {
        panic!(
            "failed to parse JSON output: {}\nstdout:\n{}\nstderr:\n{}",
            err,
            stdout,
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

pub fn run_cli_json_value(args: &[String], envs: &[(&str, &str)]) -> serde_json::Value {
    let output = run_cli(args, envs);
    assert_cli_success(&output, args);
    parse_json_output(&output)
}

pub fn run_cli_json<T: DeserializeOwned>(args: &[String], envs: &[(&str, &str)]) -> T {
    let value = run_cli_json_value(args, envs);
    serde_json::from_value(value.clone()).unwrap_or_else(|err| {
        panic!(
            "failed to deserialize JSON output: {}\njson:\n{}",
            err,
            serde_json::to_string_pretty(&value).unwrap_or_default()
        )
    })
}

/// Derive `class` from the fixture definitions into `<home>/<class>.json`.
pub fn derive_fixture_schema(env: &CliEnv, class: &str) -> PathBuf {
    let out = env.path(&format!("{}.json", class));
    let derive_args = vec![
        "schema".to_string(),
        "derive".to_string(),
        path_arg(&fixture("test_schemas.toml")),
        class.to_string(),
        "--out".to_string(),
        path_arg(&out),
    ];
    let output = run_cli(&derive_args, &env.envs());
    assert_cli_success(&output, &derive_args);
    out
}
