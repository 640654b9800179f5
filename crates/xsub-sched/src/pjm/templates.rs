//! PJM job script template and parameters.

use crate::schema::Schema;

/// Job script handed to `pjsub`.
///
/// The `#PJM` directives are parsed literally by PJM. The working directory
/// is staged in next to the job file, and both are staged back out afterwards.
pub const TEMPLATE: &str = r#"#!/bin/bash
#
#PJM --rsc-list "node={{ node }}"
#PJM --rsc-list "elapse={{ elapse }}"
#PJM --mpi "shape={{ shape }}"
#PJM --mpi "proc={{ mpi_procs }}"
#PJM --stg-transfiles all
#PJM --stgin "{{ job_file }} {{ job_file_name }}"
#PJM --stgin-dir "{{ work_dir }} ./{{ work_dir_name }}"
#PJM --stgout "./* {{ work_dir_parent }}/"
#PJM --stgout "./{{ work_dir_name }}/* {{ work_dir }}/"
#PJM -s
cd ./{{ work_dir_name }}
LANG=C
. /work/system/Env_base
. ../{{ job_file_name }}
"#;

/// Parameters understood by [`TEMPLATE`].
pub fn schema() -> Schema {
    Schema::new()
        .with("mpi_procs", "MPI process", "1")
        .with("omp_threads", "OMP threads", "1")
        .with("elapse", "Limit on elapsed time", "1:00:00")
        .with("node", "Nodes", "1")
        .with("shape", "Shape", "1")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::template::{TemplateContext, render};

    #[test]
    fn test_render_default_script() {
        let params = schema().resolve(&Default::default());
        let ctx = TemplateContext::for_job(
            &params,
            Path::new("/data/hpc0001/run1"),
            Path::new("/home/hpc0001/job.sh"),
        )
        .unwrap();

        let script = render(TEMPLATE, &ctx).unwrap();
        let expected = r#"#!/bin/bash
#
#PJM --rsc-list "node=1"
#PJM --rsc-list "elapse=1:00:00"
#PJM --mpi "shape=1"
#PJM --mpi "proc=1"
#PJM --stg-transfiles all
#PJM --stgin "/home/hpc0001/job.sh job.sh"
#PJM --stgin-dir "/data/hpc0001/run1 ./run1"
#PJM --stgout "./* /data/hpc0001/"
#PJM --stgout "./run1/* /data/hpc0001/run1/"
#PJM -s
cd ./run1
LANG=C
. /work/system/Env_base
. ../job.sh
"#;
        assert_eq!(script, expected);
    }
}
