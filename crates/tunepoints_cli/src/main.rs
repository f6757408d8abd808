//! CLI probe for the rewards core.
//!
//! Usage: `tunepoints [challenge_id]`
//!
//! Opens the database from `TUNEPOINTS_DB_PATH` (in-memory when unset),
//! simulates one uninterrupted listen of the challenge and prints the
//! resulting profile. Logs go to `TUNEPOINTS_LOG_DIR` when set.

use std::process::ExitCode;
use tunepoints_core::db::{open_db, open_db_in_memory};
use tunepoints_core::{
    init_logging, Clock, CoreConfig, ScriptedPlayback, SqliteListeningService, TickOutcome,
};

const DEFAULT_CHALLENGE_ID: &str = "1";
const TICK_SECS: f64 = 1.0;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("tunepoints: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = CoreConfig::from_env();
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir).map_err(|err| err.to_string())?;
    }

    let challenge_id = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CHALLENGE_ID.to_string());

    let conn = match &config.db_path {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    }
    .map_err(|err| format!("cannot open database: {err}"))?;

    let mut service =
        SqliteListeningService::open(&conn, Clock::System).map_err(|err| err.to_string())?;

    println!("tunepoints_core ping={}", tunepoints_core::ping());
    println!("tunepoints_core version={}", tunepoints_core::core_version());

    let duration_secs = service
        .catalog()
        .get(&challenge_id)
        .map(|challenge| f64::from(challenge.duration_secs))
        .ok_or_else(|| format!("unknown challenge `{challenge_id}`"))?;

    service
        .start_challenge(&challenge_id)
        .map_err(|err| err.to_string())?;

    let mut source = ScriptedPlayback::full_listen(duration_secs, TICK_SECS);
    while source.advance() {
        let outcome = service.poll(&source).map_err(|err| err.to_string())?;
        if let TickOutcome::Evaluated(report) = outcome {
            if report.completed {
                println!(
                    "challenge={challenge_id} completed at {:.1}% points={}",
                    report.progress, report.points_earned
                );
            }
        }
    }
    let earned = service.engine().points_earned();
    service.stop();

    let profile = service.profile();
    println!("challenge={challenge_id} session_points={earned}");
    println!(
        "total_points={} completed={} streak={}",
        profile.total_points, profile.completed_count, profile.current_streak
    );
    for achievement in profile.achievements {
        println!("achievement={}", achievement.label());
    }
    Ok(())
}
