//! Adapters - Concrete implementations of ports.

pub mod ffmpeg;
pub mod local;

#[cfg(feature = "aws")]
pub mod aws;
