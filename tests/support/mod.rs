use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

pub struct TestSheet {
    dir: TempDir,
}

impl TestSheet {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        }
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().join("agenda.csv")
    }

    pub fn write(&self, contents: &str) -> PathBuf {
        let path = self.path();
        fs::write(&path, contents).expect("failed to write sheet");
        path
    }

    pub fn read(&self) -> String {
        fs::read_to_string(self.path()).expect("failed to read sheet")
    }

    /// The binary, run inside the sheet's directory with a clean environment.
    #[allow(dead_code)]
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("agenda").expect("agenda binary");
        cmd.current_dir(self.dir())
            .env_remove("AGENDA_CONFIG")
            .env_remove("AGENDA_SHEET")
            .env_remove("RUST_LOG");
        cmd
    }
}
