use assert_cmd::Command;
use image::{Rgb, RgbImage};
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;

use authcheck_core::fixtures;

pub struct TestEnv {
    tmp: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            tmp: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.tmp.path().join(name)
    }

    /// Writes the mean-pixel fixture model and returns its path.
    pub fn model(&self) -> PathBuf {
        let path = self.path("fixture.onnx");
        fixtures::write_mean_pixel_model(&path).expect("write fixture model");
        path
    }

    /// Solid gray PNG of the given intensity.
    pub fn image(&self, name: &str, value: u8) -> PathBuf {
        let path = self.path(name);
        RgbImage::from_pixel(97, 61, Rgb([value, value, value]))
            .save(&path)
            .expect("write image");
        path
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("authcheck").unwrap();
        cmd.current_dir(self.tmp.path()).env_remove("RUST_LOG");
        cmd
    }

    /// Runs `authcheck`, returning the parsed stdout and the exit code.
    pub fn run(&self, args: &[&str]) -> (Value, i32) {
        let out = self.cmd().args(args).output().expect("run authcheck");
        let json = serde_json::from_slice(&out.stdout).unwrap_or_else(|e| {
            panic!(
                "stdout is not JSON ({e}): {}",
                String::from_utf8_lossy(&out.stdout)
            )
        });
        (json, out.status.code().unwrap_or(-1))
    }
}
