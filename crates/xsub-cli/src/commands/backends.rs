//! Backends command implementation.

use std::sync::Arc;

use console::style;

use xsub_sched::{SCHEDULER_ENV, SchedulerConfig, SchedulerType, ShellRunner, build_scheduler};

/// Execute the backends command.
pub fn execute() {
    println!("{} Available backends:\n", style("xsub").cyan().bold());

    for ty in SchedulerType::ALL {
        let backend = build_scheduler(
            SchedulerConfig::default().with_scheduler(ty),
            Arc::new(ShellRunner::new()),
        );
        let commands = match ty {
            SchedulerType::Local => "nohup bash, ps, kill",
            SchedulerType::Pjm => "pjsub, pjstat, pjdel",
        };

        println!("  {} {}", style("●").green(), style(ty.name()).bold());
        println!("    Commands: {commands}");
        if backend.schema().is_empty() {
            println!("    Parameters: (none)");
        } else {
            println!("    Parameters:");
            for spec in backend.schema().iter() {
                println!(
                    "      {:<12} {:<24} {}",
                    spec.name,
                    spec.description,
                    style(format!("[default: {}]", spec.default)).dim()
                );
            }
        }
        println!();
    }

    println!(
        "Select one with {} or the {} environment variable.",
        style("--scheduler").yellow(),
        style(SCHEDULER_ENV).yellow()
    );
}
