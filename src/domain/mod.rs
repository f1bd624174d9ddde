//! Domain layer - Pure business logic.

pub mod aspect;
pub mod upload;
pub mod video;
