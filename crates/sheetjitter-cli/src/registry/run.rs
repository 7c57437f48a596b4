use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use sheetjitter_randomize::{RandomizeOptions, RandomizeReport};

use super::{RegistryError, RegistryResult};

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub run_dir: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
    pub options: RandomizeOptions,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
pub struct RunConfig {
    pub run_id: String,
    pub started_at: String,
    pub input: String,
    pub output: String,
    /// SHA-256 of the input file before it is rewritten.
    pub input_sha256: Option<String>,
    pub options: RandomizeOptions,
    pub git: GitInfo,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub dirty: Option<bool>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub logs_path: PathBuf,
    pub report_path: PathBuf,
}

pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let root = ctx.run_dir.join(format!("{timestamp}__run_{}", ctx.run_id));

    create_dir_all(&root)?;

    let config_path = root.join("config.json");
    let logs_path = root.join("logs.ndjson");
    let report_path = root.join("report.json");

    let config = RunConfig {
        run_id: ctx.run_id.clone(),
        started_at: ctx.started_at.to_rfc3339(),
        input: ctx.input.display().to_string(),
        output: ctx.output.display().to_string(),
        input_sha256: fingerprint(&ctx.input),
        options: ctx.options.clone(),
        git: collect_git_info(),
    };

    write_json(&config_path, &config)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logs_path)?;

    Ok(RunPaths {
        root,
        logs_path,
        report_path,
    })
}

pub fn write_report(paths: &RunPaths, report: &RandomizeReport) -> RegistryResult<()> {
    write_json(&paths.report_path, report)
}

pub fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
            } else {
                None
            }
        })
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

/// Missing or unreadable inputs have no fingerprint; the read itself fails later.
fn fingerprint(path: &Path) -> Option<String> {
    let bytes = std::fs::read(path).ok()?;
    Some(format!("{:x}", Sha256::digest(&bytes)))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> RegistryResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, value).map_err(RegistryError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_run_writes_config_and_log_file() {
        let mut run_dir = std::env::temp_dir();
        run_dir.push(format!("sheetjitter_runs_{}", uuid::Uuid::new_v4()));
        let input = run_dir.join("campaigns.csv");
        create_dir_all(&run_dir).expect("create run dir");
        std::fs::write(&input, "ID,Sent\n1,10\n").expect("write input");

        let ctx = RunContext {
            run_id: "test-run".to_string(),
            started_at: Utc::now(),
            run_dir: run_dir.clone(),
            input: input.clone(),
            output: input,
            options: RandomizeOptions::default(),
        };
        let paths = start_run(&ctx).expect("start run");

        assert!(paths.logs_path.exists());
        let config: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(paths.root.join("config.json")).expect("read config"),
        )
        .expect("parse config");
        assert_eq!(config["run_id"], "test-run");
        assert_eq!(
            config["input_sha256"].as_str().map(str::len),
            Some(64)
        );
        assert_eq!(config["options"]["variation_factor"], 0.1);
        assert_eq!(config["options"]["delivered_cap"], "randomized_sent");

        std::fs::remove_dir_all(&run_dir).ok();
    }
}
