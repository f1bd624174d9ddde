use super::check_output;
use crate::error::MediaToolError;
use crate::ports::media::{fast_start_output_path, FastStartRemuxer};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// `FastStartRemuxer` backed by the `ffmpeg` binary.
///
/// Streams are copied untouched; only the container is rewritten with the
/// `moov` atom first.
#[derive(Debug, Clone)]
pub struct FfmpegRemuxer {
    binary: String,
}

impl FfmpegRemuxer {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("-i")
            .arg(input)
            .arg("-c")
            .arg("copy")
            .arg("-movflags")
            .arg("faststart")
            .arg("-f")
            .arg("mp4")
            .arg(output)
            .kill_on_drop(true);
        command
    }
}

impl Default for FfmpegRemuxer {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[async_trait]
impl FastStartRemuxer for FfmpegRemuxer {
    async fn remux_fast_start(&self, input: &Path) -> Result<PathBuf, MediaToolError> {
        let output_path = fast_start_output_path(input);
        let output = self
            .command(input, &output_path)
            .output()
            .await
            .map_err(|source| MediaToolError::Spawn {
                tool: self.binary.clone(),
                source,
            })?;
        check_output(&self.binary, output)?;
        Ok(output_path)
    }
}
