//! Process-backed media tools (`ffprobe`, `ffmpeg`).

mod probe;
mod remux;

pub use probe::FfprobeAdapter;
pub use remux::FfmpegRemuxer;

use crate::error::MediaToolError;
use std::process::Output;

/// Turn a finished process into its stdout, or a `Failed` error carrying stderr.
fn check_output(tool: &str, output: Output) -> Result<Vec<u8>, MediaToolError> {
    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(MediaToolError::Failed {
            tool: tool.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Whether `tool` resolves to an executable.
pub fn tool_available(tool: &str) -> bool {
    which::which(tool).is_ok()
}
