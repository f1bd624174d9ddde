use super::check_output;
use crate::error::MediaToolError;
use crate::ports::media::{MediaProbe, ProbeReport};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

/// `MediaProbe` backed by the `ffprobe` binary.
#[derive(Debug, Clone)]
pub struct FfprobeAdapter {
    binary: String,
}

impl FfprobeAdapter {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn command(&self, path: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("-v")
            .arg("error")
            .arg("-print_format")
            .arg("json")
            .arg("-show_streams")
            .arg(path)
            .kill_on_drop(true);
        command
    }
}

impl Default for FfprobeAdapter {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

#[async_trait]
impl MediaProbe for FfprobeAdapter {
    async fn probe(&self, path: &Path) -> Result<ProbeReport, MediaToolError> {
        let output = self
            .command(path)
            .output()
            .await
            .map_err(|source| MediaToolError::Spawn {
                tool: self.binary.clone(),
                source,
            })?;
        let stdout = check_output(&self.binary, output)?;
        serde_json::from_slice(&stdout).map_err(|source| MediaToolError::Parse {
            tool: self.binary.clone(),
            source,
        })
    }
}
