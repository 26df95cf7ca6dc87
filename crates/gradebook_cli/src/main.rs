//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `gradebook_core` linkage.
//! - Optionally print the GPA summary stored in a database file.
//! - Keep output deterministic for quick local sanity checks.

use gradebook_core::{
    overall_gpa, overall_total_credits, semester_gpa, semester_total_credits, store,
    LogDiagnostics, SqliteBlobStore,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("gradebook_core ping={}", gradebook_core::ping());
    println!("gradebook_core version={}", gradebook_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };
    let blob = match SqliteBlobStore::open(&db_path) {
        Ok(blob) => blob,
        Err(err) => {
            eprintln!("failed to open {db_path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let loaded = store::load(&blob, &LogDiagnostics);
    println!("source={:?}", loaded.source);
    for (key, record) in loaded.store.iter() {
        println!(
            "semester={} mode={} gpa={} credits={}",
            key,
            record.mode.as_str(),
            semester_gpa(record),
            semester_total_credits(record)
        );
    }
    println!(
        "overall gpa={} credits={}",
        overall_gpa(&loaded.store),
        overall_total_credits(&loaded.store)
    );
    ExitCode::SUCCESS
}
