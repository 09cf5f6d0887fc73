//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open the data layer from `COURSEHUB_*` settings and print its counts.
//! - Keep output deterministic for quick local sanity checks.

use coursehub_core::{init_logging_from_config, open_from_config, DataLayerConfig};
use log::error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("coursehub_core ping={}", coursehub_core::ping());
    println!("coursehub_core version={}", coursehub_core::core_version());

    let config = match DataLayerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("logging disabled: {err}");
    }

    let service = match open_from_config(&config) {
        Ok(service) => service,
        Err(err) => {
            error!("event=cli_open module=cli status=error fatal={}", err.is_fatal());
            eprintln!("failed to open data layer: {err}");
            return ExitCode::FAILURE;
        }
    };

    match service.stats() {
        Ok(stats) => {
            println!("namespace={}", config.namespace);
            println!(
                "users students={} instructors={} admins={} pending_instructors={}",
                stats.students, stats.instructors, stats.admins, stats.pending_instructors
            );
            println!(
                "courses approved={} pending={}",
                stats.approved_courses, stats.pending_courses
            );
            println!(
                "enrollments total={} completed={} reviews={}",
                stats.enrollments, stats.completed_enrollments, stats.reviews
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("failed to read stats: {err}");
            ExitCode::FAILURE
        }
    }
}
