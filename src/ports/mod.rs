//! Ports - Trait definitions for the collaborators the services call into.

pub mod media;
pub mod repository;
pub mod storage;
