//! The "none" backend: no batch scheduler, the job runs as a detached local process.

mod adapter;
mod parser;

pub use adapter::{LocalAdapter, TEMPLATE};
pub use parser::{parse_launch_output, parse_pid};
