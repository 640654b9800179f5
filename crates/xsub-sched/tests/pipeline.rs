//! End-to-end submission pipeline tests against scripted command output.

use std::path::Path;
use std::sync::Arc;

use xsub_sched::{
    CommandOutput, JobStatus, MockRunner, ParameterMap, SchedError, Scheduler, SchedulerConfig,
    SchedulerType, build_scheduler, submit_job,
};

fn pjm(dir: &Path, runner: Arc<MockRunner>) -> Box<dyn Scheduler> {
    build_scheduler(
        SchedulerConfig::default()
            .with_scheduler(SchedulerType::Pjm)
            .with_work_dir(dir.join("work"))
            .with_log_dir(dir.join("log")),
        runner,
    )
}

fn job_file(dir: &Path) -> std::path::PathBuf {
    let job = dir.join("job.sh");
    std::fs::write(&job, "./a.out\n").unwrap();
    job
}

fn params(pairs: &[(&str, &str)]) -> ParameterMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_pjm_submit_job_id_from_submitted_line() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(MockRunner::new().respond(CommandOutput::new(
        0,
        "[INFO] PJM 0000 pjsub Job 2275991 submitted.\n",
    )));
    let scheduler = pjm(dir.path(), runner.clone());

    let job = submit_job(
        scheduler.as_ref(),
        &job_file(dir.path()),
        &params(&[("mpi_procs", "16"), ("node", "2x2"), ("shape", "1x2")]),
    )
    .await
    .unwrap();

    assert_eq!(job.job_id, "2275991");
    assert_eq!(job.parameters["mpi_procs"], "16");
    assert_eq!(job.parameters["elapse"], "1:00:00");
    assert_eq!(job.parent_script, dir.path().join("work").join("job_xsub.sh"));

    let script = std::fs::read_to_string(&job.parent_script).unwrap();
    assert!(script.contains(r#"#PJM --rsc-list "node=2x2""#));
    assert!(script.contains(r#"#PJM --mpi "shape=1x2""#));
    assert!(script.contains(r#"#PJM --mpi "proc=16""#));
    assert!(script.contains(". ../job.sh"));

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].line.starts_with("pjsub "));
    assert!(calls[0].line.contains("job_xsub.sh"));
}

#[tokio::test]
async fn test_pjm_submit_job_id_from_staging_error() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(MockRunner::new().respond(CommandOutput::new(
        0,
        "[ERR.] PJM 0007 pjsub Staging option error (3).\n\
         Refer to the staging information file. (J5333b14881e31ebcd2000001.sh.s2366652)\n",
    )));
    let scheduler = pjm(dir.path(), runner);

    let job = submit_job(scheduler.as_ref(), &job_file(dir.path()), &ParameterMap::new())
        .await
        .unwrap();
    assert_eq!(job.job_id, "2366652");
}

#[tokio::test]
async fn test_pjm_submit_unrecognized_output() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(
        MockRunner::new().respond(CommandOutput::new(0, "[WARN] something else entirely\n")),
    );
    let scheduler = pjm(dir.path(), runner);

    let err = submit_job(scheduler.as_ref(), &job_file(dir.path()), &ParameterMap::new())
        .await
        .unwrap_err();
    match err {
        SchedError::UnsupportedOutputFormat { output, .. } => {
            assert_eq!(output, ["[WARN] something else entirely"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_pjm_status_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let header = "JOB_ID     JOB_NAME   MD ST  USER     START_DATE      ELAPSE_LIM NODE_REQUIRE";
    let row = |st: &str| {
        format!("{header}\n2275991    job_xsub.sh NM {st} hpc0001  12/03 14:21:05  0001:00:00 1\n")
    };
    let runner = Arc::new(
        MockRunner::new()
            .respond(CommandOutput::new(0, row("QUE")))
            .respond(CommandOutput::new(0, row("RUN")))
            .respond(CommandOutput::new(0, row("EXT")))
            .respond(CommandOutput::new(1, "[ERR.] PJM 8001 pjstat Job not found.\n")),
    );
    let scheduler = pjm(dir.path(), runner);

    let mut seen = Vec::new();
    for _ in 0..4 {
        seen.push(scheduler.status("2275991").await.unwrap().status);
    }
    assert_eq!(
        seen,
        [
            JobStatus::Queued,
            JobStatus::Running,
            JobStatus::Finished,
            JobStatus::Finished
        ]
    );
}

#[tokio::test]
async fn test_invalid_parameters_run_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(MockRunner::new());
    let scheduler = pjm(dir.path(), runner.clone());
    let job = job_file(dir.path());

    for bad in [
        params(&[("mpi_procs", "0")]),
        params(&[("omp_threads", "x")]),
        params(&[("node", "2x2"), ("shape", "2")]),
        params(&[("node", "2x2"), ("shape", "2x3")]),
        params(&[("node", "1"), ("shape", "1"), ("mpi_procs", "9")]),
        params(&[("node", "1x1x1x1")]),
    ] {
        let err = submit_job(scheduler.as_ref(), &job, &bad).await.unwrap_err();
        assert!(matches!(err, SchedError::Validation(_)), "{bad:?}: {err}");
    }

    assert!(runner.calls().is_empty());
    assert!(!dir.path().join("work").exists());
}

#[tokio::test]
async fn test_local_submit_returns_pid() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(MockRunner::new().respond(CommandOutput::new(0, "\n12345\n")));
    let scheduler = build_scheduler(
        SchedulerConfig::default()
            .with_scheduler(SchedulerType::Local)
            .with_work_dir(dir.path().join("work")),
        runner.clone(),
    );

    let job = submit_job(scheduler.as_ref(), &job_file(dir.path()), &ParameterMap::new())
        .await
        .unwrap();
    assert_eq!(job.job_id, "12345");
    assert_eq!(job.job_id.parse::<u32>().unwrap(), 12345);
    assert!(job.parameters.is_empty());

    let call = &runner.calls()[0];
    assert!(call.line.starts_with("nohup bash "));
    assert!(call.line.ends_with("& echo $!"));
}

#[tokio::test]
async fn test_repeated_submissions_keep_earlier_scripts() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(
        MockRunner::new()
            .respond(CommandOutput::new(0, "[INFO] PJM 0000 pjsub Job 1 submitted.\n"))
            .respond(CommandOutput::new(0, "[INFO] PJM 0000 pjsub Job 2 submitted.\n")),
    );
    let scheduler = pjm(dir.path(), runner);
    let job = job_file(dir.path());

    let first = submit_job(scheduler.as_ref(), &job, &params(&[("elapse", "0:10:00")]))
        .await
        .unwrap();
    let second = submit_job(scheduler.as_ref(), &job, &params(&[("elapse", "2:00:00")]))
        .await
        .unwrap();

    assert_ne!(first.parent_script, second.parent_script);
    assert!(std::fs::read_to_string(&first.parent_script)
        .unwrap()
        .contains("elapse=0:10:00"));
    assert!(std::fs::read_to_string(&second.parent_script)
        .unwrap()
        .contains("elapse=2:00:00"));
}
