#![allow(dead_code)]

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// Endpoint nothing listens on: any request that slips through fails as a network error.
pub const DEAD_ENDPOINT: &str = "http://127.0.0.1:9/api/1/";

/// A self-contained test environment with an isolated data directory.
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("data").join("instamojo")).unwrap();
        TestEnv { dir }
    }

    /// Create an environment whose token file already holds `token`.
    pub fn with_token(token: &str) -> Self {
        let env = Self::new();
        std::fs::write(env.token_file(), serde_json::to_string(token).unwrap()).unwrap();
        env
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data").join("instamojo")
    }

    pub fn token_file(&self) -> PathBuf {
        self.data_dir().join("auth.json")
    }

    pub fn write_token_file(&self, content: &str) {
        std::fs::write(self.token_file(), content).unwrap();
    }

    /// Parse the token file. `None` means the file holds `null`.
    pub fn read_token(&self) -> Option<String> {
        let content = std::fs::read_to_string(self.token_file()).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    pub fn write_config(&self, toml: &str) {
        std::fs::write(self.data_dir().join("config.toml"), toml).unwrap();
    }

    /// Get a Command configured to run instamojo with this environment.
    pub fn cmd(&self) -> Command {
        let mut cmd = assert_cmd::cargo_bin_cmd!("instamojo");
        cmd.env("XDG_DATA_HOME", self.dir.path().join("data"));
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("INSTAMOJO_ENDPOINT");
        cmd.env_remove("INSTAMOJO_APP_ID");
        cmd.env_remove("INSTAMOJO_PASSWORD");
        cmd.env_remove("INSTAMOJO_LOG");
        cmd
    }

    /// Get a Command pointed at `endpoint` with --json output.
    pub fn cmd_at(&self, endpoint: &str) -> Command {
        let mut cmd = self.cmd();
        cmd.args(["--json", "--endpoint", endpoint]);
        cmd
    }
}
