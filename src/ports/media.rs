//! Media tool capability: stream probing and fast-start remuxing.
//!
//! Both are functions from a file path to a structured result, so a process
//! based implementation can later be swapped for a library decoder.

use crate::error::MediaToolError;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Suffix appended to an input path to name its remuxed output.
pub const FAST_START_SUFFIX: &str = ".processing";

/// Geometry of one stream as reported by the probe.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProbedStream {
    #[serde(default)]
    pub codec_type: Option<String>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

/// Stream listing of a media file, in the order the probe reported it.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ProbeReport {
    #[serde(default)]
    pub streams: Vec<ProbedStream>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProbe: Send + Sync {
    /// List the streams of the file at `path`.
    async fn probe(&self, path: &Path) -> Result<ProbeReport, MediaToolError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FastStartRemuxer: Send + Sync {
    /// Copy every stream of `input` into a new MP4 whose index sits at the front.
    ///
    /// Returns the output path, which is [`fast_start_output_path`] of `input`.
    async fn remux_fast_start(&self, input: &Path) -> Result<PathBuf, MediaToolError>;
}

/// Deterministic output path for a remux of `input`.
pub fn fast_start_output_path(input: &Path) -> PathBuf {
    let mut raw = input.as_os_str().to_owned();
    raw.push(FAST_START_SUFFIX);
    PathBuf::from(raw)
}

#[async_trait]
impl<T: MediaProbe + ?Sized> MediaProbe for Arc<T> {
    async fn probe(&self, path: &Path) -> Result<ProbeReport, MediaToolError> {
        (**self).probe(path).await
    }
}

#[async_trait]
impl<T: FastStartRemuxer + ?Sized> FastStartRemuxer for Arc<T> {
    async fn remux_fast_start(&self, input: &Path) -> Result<PathBuf, MediaToolError> {
        (**self).remux_fast_start(input).await
    }
}
