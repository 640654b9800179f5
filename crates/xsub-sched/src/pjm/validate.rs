//! Structural checks on PJM parameters.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{SchedError, SchedResult};
use crate::schema::{ParameterMap, int_param};

/// Cores per node; bounds the MPI process count for a given shape.
pub const CORES_PER_NODE: u64 = 8;

/// `12`, `4x3` or `2x3x2`.
static TOPOLOGY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(x\d+){0,2}$").expect("topology pattern"));

/// Parse a node/shape value into its dimensions.
pub fn parse_topology(name: &str, value: &str) -> SchedResult<Vec<u64>> {
    if !TOPOLOGY.is_match(value) {
        return Err(SchedError::Validation(format!(
            "{name} must be like 12, 4x3 or 2x3x2, got '{value}'"
        )));
    }
    value
        .split('x')
        .map(|dim| {
            dim.parse::<u64>().map_err(|_| {
                SchedError::Validation(format!("{name} dimension '{dim}' is out of range"))
            })
        })
        .collect()
}

/// Largest MPI process count a shape can host.
pub fn max_procs(shape: &[u64]) -> SchedResult<u64> {
    shape
        .iter()
        .try_fold(CORES_PER_NODE, |acc, &dim| acc.checked_mul(dim))
        .ok_or_else(|| SchedError::Validation("shape is too large".to_string()))
}

/// Validate resolved PJM parameters.
pub fn validate(params: &ParameterMap) -> SchedResult<()> {
    let mpi = int_param(params, "mpi_procs")?;
    let omp = int_param(params, "omp_threads")?;
    if mpi < 1 || omp < 1 {
        return Err(SchedError::Validation(
            "mpi_procs and omp_threads must be larger than or equal to 1".to_string(),
        ));
    }

    let node = parse_topology("node", topology_param(params, "node")?)?;
    let shape = parse_topology("shape", topology_param(params, "shape")?)?;

    if node.len() != shape.len() {
        return Err(SchedError::Validation(
            "node and shape must be a same format like node=>4x3, shape=>1x1".to_string(),
        ));
    }

    if let Some((i, (s, n))) = shape
        .iter()
        .zip(&node)
        .enumerate()
        .find(|(_, (s, n))| s > n)
    {
        return Err(SchedError::Validation(format!(
            "each # in shape must be smaller than the one of node (dimension {}: {} > {})",
            i + 1,
            s,
            n
        )));
    }

    let max = max_procs(&shape)?;
    // mpi >= 1 here, so the cast is lossless.
    if mpi as u64 > max {
        return Err(SchedError::Validation(format!(
            "mpi_procs must be less than or equal to {max}"
        )));
    }

    Ok(())
}

fn topology_param<'a>(params: &'a ParameterMap, name: &str) -> SchedResult<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| SchedError::Validation(format!("{name} is required")))
}
