//! CLI command implementations.

pub mod backends;
pub mod common;
pub mod delete;
pub mod status;
pub mod submit;
pub mod template;
