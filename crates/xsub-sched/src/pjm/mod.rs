//! Fujitsu PJM integration (`pjsub`/`pjstat`/`pjdel`), as deployed on the K computer.
//!
//! Jobs are described by a staging script rendered from [`TEMPLATE`]; the
//! node topology and process shape are checked before anything is submitted.

mod adapter;
mod parser;
mod templates;
mod validate;

pub use adapter::PjmAdapter;
pub use parser::{PjmState, parse_pjstat_output, parse_pjsub_output};
pub use templates::{TEMPLATE, schema};
pub use validate::{CORES_PER_NODE, max_procs, parse_topology, validate};
