// SPDX-License-Identifier: MIT
//
// Log setup for the binary.
//
// The terminal belongs to the full-screen UI, so logs can only go to a
// file. With `SARASWATI_LOG_FILE` unset nothing is installed and every
// `tracing` call in the terminal layer is a no-op.
//
// Filter priority: `SARASWATI_LOG` > `RUST_LOG` > `warn`.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

const FILE_VAR: &str = "SARASWATI_LOG_FILE";
const FILTER_VAR: &str = "SARASWATI_LOG";

/// Install the file subscriber if a log file was requested.
///
/// Returns whether logging is active.
///
/// # Errors
///
/// Returns an error if the log file cannot be created.
pub fn init() -> io::Result<bool> {
    let Some(path) = std::env::var_os(FILE_VAR) else {
        return Ok(false);
    };
    init_file(Path::new(&path), build_env_filter(std::env::var(FILTER_VAR).ok()))?;
    Ok(true)
}

fn init_file(path: &Path, filter: EnvFilter) -> io::Result<()> {
    let file = File::create(path)?;

    let layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_timer(fmt::time::uptime());

    // A subscriber installed by an embedding program wins.
    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
    Ok(())
}

fn build_env_filter(directives: Option<String>) -> EnvFilter {
    if let Some(filter) = directives.and_then(|d| EnvFilter::try_new(d).ok()) {
        return filter;
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(Level::WARN.as_str())
}
