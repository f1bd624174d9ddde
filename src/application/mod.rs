//! Application layer - Services that sequence the ports.

pub mod classifier;
pub mod gateway;
pub mod ingest;
pub mod staging;
pub mod thumbnail;
