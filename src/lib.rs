//! Tubely - Video ingestion backend
//!
//! Hexagonal Architecture:
//! - domain/: Pure business logic (aspect classes, records, naming rules)
//! - ports/: Trait definitions
//! - adapters/: Concrete implementations (ffmpeg, S3, filesystem, Redis)
//! - application/: Ingestion and thumbnail services
//! - http/: axum routes, authentication, signed object serving
//! - config: Environment configuration
//!
//! # Features
//! - `aws`: S3 object storage
//! - `local`: Redis video records

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod ports;

pub use config::Config;
pub use error::IngestError;
